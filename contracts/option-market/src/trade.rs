use options_math::{apply_exposure, min_collateral, position_value};
use options_types::{Board, OptionType, OptionsError, Position, PositionState, TradeResult};
use soroban_sdk::{log, Address, Env, Symbol, Vec};

use crate::board::tradeable_strike;
use crate::greek_cache::{current_strike_greeks, update_strike};
use crate::storage::{
    add_position_to_owner, get_board, get_greek_cache_params, get_min_collat_params,
    get_position, get_spot_price, get_strike, next_id, remove_position_from_owner,
    set_position, set_strike, DataKey,
};

/// Minimum collateral of `amount` options on a strike of `board` (0 for longs)
pub fn required_collateral(
    env: &Env,
    board: &Board,
    option_type: OptionType,
    strike_price: i128,
    amount: i128,
) -> Result<i128, OptionsError> {
    if option_type.is_long() {
        return Ok(0);
    }
    let rate = get_greek_cache_params(env)?.rate_and_carry;
    min_collateral(
        env,
        &get_min_collat_params(env)?,
        rate,
        option_type,
        strike_price,
        board.time_to_expiry(env.ledger().timestamp()),
        get_spot_price(env)?,
        amount,
    )
}

pub fn open(
    env: &Env,
    trader: Address,
    strike_id: u32,
    option_type: OptionType,
    amount: i128,
    collateral: i128,
) -> Result<TradeResult, OptionsError> {
    if amount <= 0 {
        log!(env, "trade amount must be positive", amount);
        return Err(OptionsError::InvalidAmount);
    }
    if collateral < 0 || (option_type.is_long() && collateral != 0) {
        log!(env, "invalid collateral for option type", collateral);
        return Err(OptionsError::InvalidCollateral);
    }

    let (board, mut strike) = tradeable_strike(env, strike_id)?;
    let min = required_collateral(env, &board, option_type, strike.strike_price, amount)?;
    if collateral < min {
        log!(env, "collateral below minimum", collateral, min);
        return Err(OptionsError::InsufficientCollateral);
    }

    let greeks = current_strike_greeks(env, &board, strike_id)?;
    let premium = position_value(env, option_type, greeks.call_price, greeks.put_price, amount);

    let position = Position {
        id: next_id(env, DataKey::NextPositionId),
        owner: trader.clone(),
        strike_id,
        option_type,
        amount,
        collateral,
        state: PositionState::Active,
    };
    set_position(env, &position);
    add_position_to_owner(env, &trader, position.id);

    let before = strike.clone();
    apply_exposure(&mut strike, option_type, amount)?;
    set_strike(env, &strike);
    update_strike(env, &before, &strike, &greeks);

    let result = TradeResult {
        position_id: position.id,
        amount,
        premium,
        volatility: greeks.volatility,
        collateral,
        returned_collateral: 0,
        min_collateral: min,
    };
    env.events().publish(
        (Symbol::new(env, "position_opened"), trader, position.id),
        result.clone(),
    );
    Ok(result)
}

/// Close `amount` of a position, leaving `set_collateral_to` behind.
///
/// A full close must leave no collateral. A partial close of a short must
/// leave at least the minimum collateral of what remains.
pub fn close(
    env: &Env,
    trader: Address,
    position_id: u32,
    amount: i128,
    set_collateral_to: i128,
) -> Result<TradeResult, OptionsError> {
    let mut position = owned_active_position(env, &trader, position_id)?;
    if amount <= 0 || amount > position.amount {
        log!(env, "close amount out of range", amount, position.amount);
        return Err(OptionsError::InvalidAmount);
    }
    if set_collateral_to < 0 || set_collateral_to > position.collateral {
        log!(env, "invalid collateral after close", set_collateral_to);
        return Err(OptionsError::InvalidCollateral);
    }

    let (board, mut strike) = tradeable_strike(env, position.strike_id)?;
    let remaining = position.amount - amount;

    let min = if remaining == 0 {
        if set_collateral_to != 0 {
            log!(env, "full close must release all collateral", set_collateral_to);
            return Err(OptionsError::FullCloseWithCollateral);
        }
        0
    } else {
        let min = required_collateral(
            env,
            &board,
            position.option_type,
            strike.strike_price,
            remaining,
        )?;
        if set_collateral_to < min {
            log!(env, "remaining collateral below minimum", set_collateral_to, min);
            return Err(OptionsError::InsufficientCollateral);
        }
        min
    };

    let greeks = current_strike_greeks(env, &board, position.strike_id)?;
    let premium = position_value(
        env,
        position.option_type,
        greeks.call_price,
        greeks.put_price,
        amount,
    );
    let returned_collateral = position.collateral - set_collateral_to;

    position.amount = remaining;
    position.collateral = set_collateral_to;
    if remaining == 0 {
        position.state = PositionState::Closed;
        remove_position_from_owner(env, &trader, position.id);
    }
    set_position(env, &position);

    let before = strike.clone();
    apply_exposure(&mut strike, position.option_type, -amount)?;
    set_strike(env, &strike);
    update_strike(env, &before, &strike, &greeks);

    let result = TradeResult {
        position_id,
        amount,
        premium,
        volatility: greeks.volatility,
        collateral: set_collateral_to,
        returned_collateral,
        min_collateral: min,
    };
    env.events().publish(
        (Symbol::new(env, "position_closed"), trader, position_id),
        result.clone(),
    );
    Ok(result)
}

/// Top up a short position's collateral, returning the new balance
pub fn add_collateral(env: &Env, position_id: u32, amount: i128) -> Result<i128, OptionsError> {
    if amount <= 0 {
        log!(env, "collateral top up must be positive", amount);
        return Err(OptionsError::InvalidCollateral);
    }
    let mut position = get_position(env, position_id)?;
    if position.state != PositionState::Active {
        return Err(OptionsError::PositionNotActive);
    }
    if position.option_type.is_long() {
        log!(env, "long positions hold no collateral", position_id);
        return Err(OptionsError::NotShortPosition);
    }
    position.collateral = position
        .collateral
        .checked_add(amount)
        .ok_or(OptionsError::MathOverflow)?;
    set_position(env, &position);

    env.events().publish(
        (Symbol::new(env, "collateral_added"), position_id),
        (amount, position.collateral),
    );
    Ok(position.collateral)
}

/// Fold `position_ids[1..]` into `position_ids[0]`.
///
/// All positions must be active, share owner, strike and option type. The
/// merged short must still meet minimum collateral.
pub fn merge(
    env: &Env,
    owner: Address,
    position_ids: Vec<u32>,
) -> Result<u32, OptionsError> {
    if position_ids.len() < 2 {
        log!(env, "merge needs at least two positions", position_ids.len());
        return Err(OptionsError::NothingToMerge);
    }

    let mut target = owned_active_position(env, &owner, position_ids.get_unchecked(0))?;
    let mut absorbed = Vec::new(env);
    for i in 1..position_ids.len() {
        let id = position_ids.get_unchecked(i);
        if id == target.id || absorbed.iter().any(|p: Position| p.id == id) {
            log!(env, "position listed twice in merge", id);
            return Err(OptionsError::MergeMismatch);
        }
        let other = owned_active_position(env, &owner, id)?;
        if other.strike_id != target.strike_id || other.option_type != target.option_type {
            log!(env, "merged positions differ", target.id, id);
            return Err(OptionsError::MergeMismatch);
        }
        target.amount += other.amount;
        target.collateral += other.collateral;
        absorbed.push_back(other);
    }

    let strike = get_strike(env, target.strike_id)?;
    let board = get_board(env, strike.board_id)?;
    if board.is_expired(env.ledger().timestamp()) {
        log!(env, "cannot merge on expired board", board.id);
        return Err(OptionsError::BoardExpired);
    }
    let min = required_collateral(
        env,
        &board,
        target.option_type,
        strike.strike_price,
        target.amount,
    )?;
    if target.collateral < min {
        log!(env, "merged collateral below minimum", target.collateral, min);
        return Err(OptionsError::InsufficientCollateral);
    }

    set_position(env, &target);
    for mut other in absorbed.iter() {
        other.amount = 0;
        other.collateral = 0;
        other.state = PositionState::Merged;
        set_position(env, &other);
        remove_position_from_owner(env, &owner, other.id);
    }

    env.events().publish(
        (Symbol::new(env, "positions_merged"), owner, target.id),
        position_ids,
    );
    Ok(target.id)
}

fn owned_active_position(
    env: &Env,
    owner: &Address,
    position_id: u32,
) -> Result<Position, OptionsError> {
    let position = get_position(env, position_id)?;
    if position.owner != *owner {
        log!(env, "caller does not own position", position_id);
        return Err(OptionsError::NotPositionOwner);
    }
    if position.state != PositionState::Active {
        log!(env, "position not active", position_id);
        return Err(OptionsError::PositionNotActive);
    }
    Ok(position)
}
