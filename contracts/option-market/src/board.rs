use options_types::{Board, GwavKey, OptionsError, Strike};
use soroban_sdk::{log, Env, Symbol, Vec};

use crate::gwav_store;
use crate::storage::{
    get_board, get_greek_cache_params, get_live_boards, get_strike, next_id, set_board,
    set_live_boards, set_strike, DataKey,
};

/// List a new board and its strikes, seeding every GWAV history
pub fn create_board(
    env: &Env,
    expiry: u64,
    base_iv: i128,
    strike_prices: Vec<i128>,
    skews: Vec<i128>,
    frozen: bool,
) -> Result<u32, OptionsError> {
    let params = get_greek_cache_params(env)?;
    let now = env.ledger().timestamp();

    if expiry <= now {
        log!(env, "board expiry not in the future", expiry, now);
        return Err(OptionsError::InvalidExpiry);
    }
    if base_iv <= 0 {
        log!(env, "board iv must be positive", base_iv);
        return Err(OptionsError::InvalidBaseIv);
    }
    if strike_prices.len() != skews.len() {
        log!(env, "strike and skew counts differ", strike_prices.len(), skews.len());
        return Err(OptionsError::StrikeArrayLengthMismatch);
    }
    if strike_prices.len() > params.max_strikes_per_board {
        log!(env, "too many strikes", strike_prices.len());
        return Err(OptionsError::TooManyStrikes);
    }
    for i in 0..strike_prices.len() {
        validate_strike(env, strike_prices.get_unchecked(i), skews.get_unchecked(i))?;
    }

    let board_id = next_id(env, DataKey::NextBoardId);
    gwav_store::record(env, GwavKey::BoardIv(board_id), base_iv)?;

    let mut board = Board {
        id: board_id,
        expiry,
        iv: base_iv,
        frozen,
        strike_ids: Vec::new(env),
        settled: false,
        spot_at_expiry: 0,
    };
    for i in 0..strike_prices.len() {
        let strike_id = list_strike(
            env,
            board_id,
            strike_prices.get_unchecked(i),
            skews.get_unchecked(i),
        )?;
        board.strike_ids.push_back(strike_id);
    }
    set_board(env, &board);

    let mut live = get_live_boards(env);
    live.push_back(board_id);
    set_live_boards(env, &live);

    env.events().publish(
        (Symbol::new(env, "board_created"), board_id),
        (expiry, base_iv, board.strike_ids.len()),
    );
    Ok(board_id)
}

/// Add one strike to an existing, unexpired board
pub fn add_strike(
    env: &Env,
    board_id: u32,
    strike_price: i128,
    skew: i128,
) -> Result<u32, OptionsError> {
    let params = get_greek_cache_params(env)?;
    let mut board = get_board(env, board_id)?;
    if board.is_expired(env.ledger().timestamp()) {
        log!(env, "cannot add strike to expired board", board_id);
        return Err(OptionsError::BoardExpired);
    }
    if board.strike_ids.len() >= params.max_strikes_per_board {
        log!(env, "board is full", board_id, board.strike_ids.len());
        return Err(OptionsError::TooManyStrikes);
    }
    validate_strike(env, strike_price, skew)?;

    let strike_id = list_strike(env, board_id, strike_price, skew)?;
    board.strike_ids.push_back(strike_id);
    set_board(env, &board);
    Ok(strike_id)
}

pub fn set_frozen(env: &Env, board_id: u32, frozen: bool) -> Result<(), OptionsError> {
    let mut board = get_board(env, board_id)?;
    board.frozen = frozen;
    set_board(env, &board);
    env.events()
        .publish((Symbol::new(env, "board_frozen"), board_id), frozen);
    Ok(())
}

/// Update a frozen board's base iv
pub fn set_base_iv(env: &Env, board_id: u32, base_iv: i128) -> Result<(), OptionsError> {
    let mut board = get_board(env, board_id)?;
    if !board.frozen {
        log!(env, "board must be frozen to set iv", board_id);
        return Err(OptionsError::BoardNotFrozen);
    }
    if base_iv <= 0 {
        log!(env, "board iv must be positive", base_iv);
        return Err(OptionsError::InvalidBaseIv);
    }
    board.iv = base_iv;
    set_board(env, &board);
    gwav_store::record(env, GwavKey::BoardIv(board_id), base_iv)?;
    env.events()
        .publish((Symbol::new(env, "board_iv_set"), board_id), base_iv);
    Ok(())
}

/// Update the skew of a strike on a frozen board
pub fn set_skew(env: &Env, strike_id: u32, skew: i128) -> Result<(), OptionsError> {
    let mut strike = get_strike(env, strike_id)?;
    let board = get_board(env, strike.board_id)?;
    if !board.frozen {
        log!(env, "board must be frozen to set skew", board.id);
        return Err(OptionsError::BoardNotFrozen);
    }
    if skew <= 0 {
        log!(env, "skew must be positive", skew);
        return Err(OptionsError::InvalidSkew);
    }
    strike.skew = skew;
    set_strike(env, &strike);
    gwav_store::record(env, GwavKey::StrikeSkew(strike_id), skew)?;
    env.events()
        .publish((Symbol::new(env, "strike_skew_set"), strike_id), skew);
    Ok(())
}

/// Ids of boards that are neither expired nor settled
pub fn live_boards(env: &Env) -> Vec<u32> {
    let now = env.ledger().timestamp();
    let mut result = Vec::new(env);
    for board_id in get_live_boards(env).iter() {
        if let Ok(board) = get_board(env, board_id) {
            if !board.is_expired(now) {
                result.push_back(board_id);
            }
        }
    }
    result
}

/// Drop a settled board from the live list
pub fn retire(env: &Env, board_id: u32) {
    let mut live = get_live_boards(env);
    if let Some(index) = live.first_index_of(board_id) {
        live.remove(index);
        set_live_boards(env, &live);
    }
}

/// Board and strike for trading, rejecting expired or frozen boards
pub fn tradeable_strike(env: &Env, strike_id: u32) -> Result<(Board, Strike), OptionsError> {
    let strike = get_strike(env, strike_id)?;
    let board = get_board(env, strike.board_id)?;
    if board.is_expired(env.ledger().timestamp()) {
        log!(env, "board expired", board.id);
        return Err(OptionsError::BoardExpired);
    }
    if board.frozen {
        log!(env, "board frozen", board.id);
        return Err(OptionsError::BoardFrozen);
    }
    Ok((board, strike))
}

fn validate_strike(env: &Env, strike_price: i128, skew: i128) -> Result<(), OptionsError> {
    if strike_price <= 0 {
        log!(env, "strike price must be positive", strike_price);
        return Err(OptionsError::InvalidStrikePrice);
    }
    if skew <= 0 {
        log!(env, "skew must be positive", skew);
        return Err(OptionsError::InvalidSkew);
    }
    Ok(())
}

fn list_strike(
    env: &Env,
    board_id: u32,
    strike_price: i128,
    skew: i128,
) -> Result<u32, OptionsError> {
    let strike_id = next_id(env, DataKey::NextStrikeId);
    set_strike(env, &Strike::new(strike_id, board_id, strike_price, skew));
    gwav_store::record(env, GwavKey::StrikeSkew(strike_id), skew)?;
    env.events().publish(
        (Symbol::new(env, "strike_added"), board_id, strike_id),
        (strike_price, skew),
    );
    Ok(strike_id)
}
