use options_math::{add_net_greeks, strike_greeks, strike_net_greeks, sub_net_greeks};
use options_types::{Board, BoardGreeks, NetGreeks, OptionsError, Strike, StrikeGreeks};
use soroban_sdk::Env;

use crate::storage::{
    get_board_greeks, get_greek_cache_params, get_net_greeks, get_spot_price, get_strike,
    get_strike_greeks, set_board_greeks, set_net_greeks, set_strike_greeks,
};

/// Reprice every strike of `board` at the stored spot and refresh the
/// board's contribution to the market's net greeks.
pub fn refresh_board(env: &Env, board: &Board) -> Result<BoardGreeks, OptionsError> {
    let params = get_greek_cache_params(env)?;
    let spot = get_spot_price(env)?;
    let now = env.ledger().timestamp();
    let time_to_expiry = board.time_to_expiry(now);

    let mut net = NetGreeks::default();
    for strike_id in board.strike_ids.iter() {
        let strike = get_strike(env, strike_id)?;
        let greeks = strike_greeks(
            env,
            &strike,
            board.iv,
            time_to_expiry,
            spot,
            params.rate_and_carry,
            now,
        )?;
        net = add_net_greeks(&net, &strike_net_greeks(env, &strike, &greeks));
        set_strike_greeks(env, &greeks);
    }

    let board_greeks = BoardGreeks {
        board_id: board.id,
        spot_price: spot,
        net,
        updated_at: now,
    };
    replace_board_greeks(env, &board_greeks);
    Ok(board_greeks)
}

/// Cache fresh `greeks` for a strike whose open interest moved from `before`
/// to `after`. Only this strike's contribution to the board and market net
/// greeks changes; the rest of the board keeps its cached values.
pub fn update_strike(
    env: &Env,
    before: &Strike,
    after: &Strike,
    greeks: &StrikeGreeks,
) {
    let cached = get_strike_greeks(env, before.id);
    let removed = strike_net_greeks(env, before, &cached);
    let added = strike_net_greeks(env, after, greeks);

    let mut board_greeks = get_board_greeks(env, after.board_id);
    board_greeks.net = add_net_greeks(&sub_net_greeks(&board_greeks.net, &removed), &added);
    let total = sub_net_greeks(&get_net_greeks(env), &removed);
    set_net_greeks(env, &add_net_greeks(&total, &added));
    set_board_greeks(env, &board_greeks);
    set_strike_greeks(env, greeks);
}

/// Greeks of one strike at the current spot, without caching them
pub fn current_strike_greeks(
    env: &Env,
    board: &Board,
    strike_id: u32,
) -> Result<StrikeGreeks, OptionsError> {
    let params = get_greek_cache_params(env)?;
    let spot = get_spot_price(env)?;
    let strike = get_strike(env, strike_id)?;
    let now = env.ledger().timestamp();
    strike_greeks(
        env,
        &strike,
        board.iv,
        board.time_to_expiry(now),
        spot,
        params.rate_and_carry,
        now,
    )
}

/// Remove a settled board from the market's net greeks
pub fn clear_board(env: &Env, board_id: u32) {
    replace_board_greeks(
        env,
        &BoardGreeks {
            board_id,
            spot_price: 0,
            net: NetGreeks::default(),
            updated_at: env.ledger().timestamp(),
        },
    );
}

fn replace_board_greeks(env: &Env, greeks: &BoardGreeks) {
    let previous = get_board_greeks(env, greeks.board_id);
    let total = sub_net_greeks(&get_net_greeks(env), &previous.net);
    set_net_greeks(env, &add_net_greeks(&total, &greeks.net));
    set_board_greeks(env, greeks);
}
