use options_types::{
    BlackScholesInputs, MinCollateralParameters, OptionType, OptionsError, Position,
    PositionState,
};
use soroban_sdk::{log, Env};

use crate::black_scholes::option_prices;
use crate::decimal_math::{divide_decimal, multiply_decimal};

/// Stress volatility for a given time to maturity.
///
/// Flat at `shock_vol_a` up to `shock_vol_point_a`, flat at `shock_vol_b`
/// from `shock_vol_point_b`, linear in between.
pub fn shock_vol(params: &MinCollateralParameters, time_to_maturity: u64) -> i128 {
    if time_to_maturity <= params.shock_vol_point_a {
        return params.shock_vol_a;
    }
    if time_to_maturity >= params.shock_vol_point_b {
        return params.shock_vol_b;
    }
    let elapsed = (time_to_maturity - params.shock_vol_point_a) as i128;
    let span = (params.shock_vol_point_b - params.shock_vol_point_a) as i128;
    params.shock_vol_a - (params.shock_vol_a - params.shock_vol_b) * elapsed / span
}

/// Collateral a short position must hold to avoid liquidation.
///
/// The option is priced at the shock vol with spot moved against the
/// writer. The premium based requirement is floored by the static minimum
/// and capped at full collateralisation (none for quote backed calls).
/// Amounts are in base for `ShortCallBase`, quote otherwise.
#[allow(clippy::too_many_arguments)]
pub fn min_collateral(
    env: &Env,
    params: &MinCollateralParameters,
    rate: i128,
    option_type: OptionType,
    strike_price: i128,
    time_to_maturity: u64,
    spot: i128,
    amount: i128,
) -> Result<i128, OptionsError> {
    if option_type.is_long() {
        log!(env, "min collateral requested for long option", option_type as u32);
        return Err(OptionsError::NotShortPosition);
    }
    if amount == 0 {
        return Ok(0);
    }

    let shock_price = match option_type {
        OptionType::ShortPutQuote => multiply_decimal(env, spot, params.put_spot_price_shock),
        _ => multiply_decimal(env, spot, params.call_spot_price_shock),
    };

    let (call_price, put_price) = option_prices(
        env,
        &BlackScholesInputs {
            time_to_expiry_sec: time_to_maturity,
            volatility: shock_vol(params, time_to_maturity),
            spot: shock_price,
            strike_price,
            rate,
        },
    )?;

    let (vol_collateral, static_collateral, full_collateral) = match option_type {
        OptionType::ShortCallBase => (
            divide_decimal(env, multiply_decimal(env, call_price, amount), shock_price),
            params.min_static_base_collateral,
            amount,
        ),
        OptionType::ShortCallQuote => (
            multiply_decimal(env, call_price, amount),
            params.min_static_quote_collateral,
            i128::MAX,
        ),
        _ => (
            multiply_decimal(env, put_price, amount),
            params.min_static_quote_collateral,
            multiply_decimal(env, amount, strike_price),
        ),
    };

    Ok(full_collateral.min(vol_collateral.max(static_collateral)))
}

/// True when an active short position holds less than its minimum collateral
#[allow(clippy::too_many_arguments)]
pub fn can_liquidate(
    env: &Env,
    params: &MinCollateralParameters,
    rate: i128,
    position: &Position,
    strike_price: i128,
    time_to_maturity: u64,
    spot: i128,
) -> Result<bool, OptionsError> {
    if position.option_type.is_long() || position.state != PositionState::Active {
        return Ok(false);
    }
    let required = min_collateral(
        env,
        params,
        rate,
        position.option_type,
        strike_price,
        time_to_maturity,
        spot,
        position.amount,
    )?;
    Ok(position.collateral < required)
}
