use options_math::settle;
use options_types::{OptionsError, PositionState, SettlementResult};
use soroban_sdk::{log, Env, Symbol};

use crate::board::retire;
use crate::greek_cache::clear_board;
use crate::storage::{
    get_board, get_position, get_spot_price, get_strike, get_totals, remove_position_from_owner,
    set_board, set_position, set_totals,
};

/// Record the spot at expiry for an expired board
pub fn settle_board(env: &Env, board_id: u32) -> Result<i128, OptionsError> {
    let mut board = get_board(env, board_id)?;
    if !board.is_expired(env.ledger().timestamp()) {
        log!(env, "board has not expired", board_id, board.expiry);
        return Err(OptionsError::BoardNotExpired);
    }
    if board.settled {
        return Err(OptionsError::BoardAlreadySettled);
    }

    let spot = get_spot_price(env)?;
    board.settled = true;
    board.spot_at_expiry = spot;
    set_board(env, &board);
    retire(env, board_id);
    clear_board(env, board_id);

    env.events()
        .publish((Symbol::new(env, "board_settled"), board_id), spot);
    Ok(spot)
}

/// Pay out an active position on a settled board
pub fn settle_position(env: &Env, position_id: u32) -> Result<SettlementResult, OptionsError> {
    let mut position = get_position(env, position_id)?;
    if position.state != PositionState::Active {
        log!(env, "position not active", position_id);
        return Err(OptionsError::PositionNotActive);
    }
    let strike = get_strike(env, position.strike_id)?;
    let board = get_board(env, strike.board_id)?;
    if !board.settled {
        log!(env, "board not settled", board.id);
        return Err(OptionsError::BoardNotSettled);
    }

    let result = settle(env, &position, strike.strike_price, board.spot_at_expiry)?;
    if result.insolvent_amount > 0 {
        log!(env, "short settled insolvent", position_id, result.insolvent_amount);
        let mut totals = get_totals(env);
        totals.total_insolvency += result.insolvent_amount;
        set_totals(env, &totals);
    }

    position.state = PositionState::Settled;
    position.collateral = 0;
    set_position(env, &position);
    remove_position_from_owner(env, &position.owner, position_id);

    env.events().publish(
        (Symbol::new(env, "position_settled"), position.owner, position_id),
        result.clone(),
    );
    Ok(result)
}
