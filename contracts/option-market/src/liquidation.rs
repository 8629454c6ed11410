use options_math::{
    apply_exposure, get_liquidation_fees, liquidation_terms, multiply_decimal, option_prices,
    position_value,
};
use options_types::{
    BlackScholesInputs, LiquidationFees, OptionType, OptionsError, Position, PositionState,
};
use soroban_sdk::{log, Address, Env, Symbol};

use crate::greek_cache::{current_strike_greeks, update_strike};
use crate::gwav_store::vol_gwav;
use crate::storage::{
    get_board, get_greek_cache_params, get_min_collat_params, get_partial_collat_params,
    get_position, get_spot_price, get_strike, get_totals, remove_position_from_owner,
    set_position, set_strike, set_totals,
};

/// True when an active short on an unexpired board is below minimum collateral
pub fn is_liquidatable(env: &Env, position: &Position) -> Result<bool, OptionsError> {
    if position.option_type.is_long() || position.state != PositionState::Active {
        return Ok(false);
    }
    let strike = get_strike(env, position.strike_id)?;
    let board = get_board(env, strike.board_id)?;
    let now = env.ledger().timestamp();
    if board.is_expired(now) {
        return Ok(false);
    }
    options_math::can_liquidate(
        env,
        &get_min_collat_params(env)?,
        get_greek_cache_params(env)?.rate_and_carry,
        position,
        strike.strike_price,
        board.time_to_expiry(now),
        get_spot_price(env)?,
    )
}

/// Premium owed on liquidation (quote), valued at the GWAV volatility
pub fn premium_owed(env: &Env, position: &Position) -> Result<i128, OptionsError> {
    let params = get_greek_cache_params(env)?;
    let strike = get_strike(env, position.strike_id)?;
    let board = get_board(env, strike.board_id)?;
    let volatility = vol_gwav(
        env,
        &params,
        board.id,
        strike.id,
        params.option_value_iv_gwav_period,
        params.option_value_skew_gwav_period,
    )?;
    let (call_price, put_price) = option_prices(
        env,
        &BlackScholesInputs {
            time_to_expiry_sec: board.time_to_expiry(env.ledger().timestamp()),
            volatility,
            spot: get_spot_price(env)?,
            strike_price: strike.strike_price,
            rate: params.rate_and_carry,
        },
    )?;
    Ok(position_value(
        env,
        position.option_type,
        call_price,
        put_price,
        position.amount,
    ))
}

/// Fee split a liquidation of `position` would produce right now
pub fn quote_fees(env: &Env, position: &Position) -> Result<LiquidationFees, OptionsError> {
    let params = get_partial_collat_params(env)?;
    let terms = liquidation_terms(
        env,
        position.option_type,
        premium_owed(env, position)?,
        params.min_liquidation_fee,
        get_spot_price(env)?,
    );
    Ok(get_liquidation_fees(
        env,
        &params,
        terms.premium,
        position.collateral,
        terms.min_fee,
        terms.insolvency_multiplier,
    ))
}

pub fn liquidate(
    env: &Env,
    liquidator: Address,
    position_id: u32,
) -> Result<LiquidationFees, OptionsError> {
    let mut position = get_position(env, position_id)?;
    if position.state != PositionState::Active {
        log!(env, "position not active", position_id);
        return Err(OptionsError::PositionNotActive);
    }
    if !is_liquidatable(env, &position)? {
        log!(env, "position is not liquidatable", position_id);
        return Err(OptionsError::NotLiquidatable);
    }

    let fees = quote_fees(env, &position)?;
    log!(
        env,
        "liquidating position",
        position_id,
        fees.lp_premiums,
        fees.insolvent_amount
    );

    let mut strike = get_strike(env, position.strike_id)?;
    let board = get_board(env, strike.board_id)?;
    let greeks = current_strike_greeks(env, &board, strike.id)?;
    let before = strike.clone();
    apply_exposure(&mut strike, position.option_type, -position.amount)?;
    set_strike(env, &strike);
    update_strike(env, &before, &strike, &greeks);

    position.state = PositionState::Liquidated;
    position.collateral = 0;
    set_position(env, &position);
    remove_position_from_owner(env, &position.owner, position_id);

    record_totals(env, position.option_type, &fees)?;

    env.events().publish(
        (Symbol::new(env, "position_liquidated"), liquidator, position_id),
        fees.clone(),
    );
    Ok(fees)
}

/// Accumulate the split into the market totals, in quote
fn record_totals(
    env: &Env,
    option_type: OptionType,
    fees: &LiquidationFees,
) -> Result<(), OptionsError> {
    let to_quote = |amount: i128| -> Result<i128, OptionsError> {
        if option_type.is_base_collateralized() {
            Ok(multiply_decimal(env, amount, get_spot_price(env)?))
        } else {
            Ok(amount)
        }
    };

    let mut totals = get_totals(env);
    totals.total_lp_premiums += to_quote(fees.lp_premiums)?;
    totals.total_lp_fees += to_quote(fees.lp_fee)?;
    totals.total_liquidator_fees += to_quote(fees.liquidator_fee)?;
    totals.total_sm_fees += to_quote(fees.sm_fee)?;
    // already scaled to quote by the insolvency multiplier
    totals.total_insolvency += fees.insolvent_amount;
    totals.liquidations += 1;
    set_totals(env, &totals);
    Ok(())
}
