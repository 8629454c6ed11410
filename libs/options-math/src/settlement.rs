use options_types::{OptionType, OptionsError, Position, SettlementResult};
use soroban_sdk::Env;

use crate::decimal_math::{divide_decimal, multiply_decimal};

/// Intrinsic value per option at expiry (quote)
pub fn intrinsic_value(option_type: OptionType, strike_price: i128, spot_at_expiry: i128) -> i128 {
    if option_type.is_call() {
        (spot_at_expiry - strike_price).max(0)
    } else {
        (strike_price - spot_at_expiry).max(0)
    }
}

/// Settle a position against the spot recorded at expiry.
///
/// Longs receive the intrinsic value. Shorts keep their collateral minus
/// the intrinsic value they owe; a base backed call owes it in base.
/// Whatever the collateral does not cover is reported in quote.
pub fn settle(
    env: &Env,
    position: &Position,
    strike_price: i128,
    spot_at_expiry: i128,
) -> Result<SettlementResult, OptionsError> {
    if spot_at_expiry <= 0 {
        return Err(OptionsError::InvalidSpotPrice);
    }
    let owed_quote = multiply_decimal(
        env,
        intrinsic_value(position.option_type, strike_price, spot_at_expiry),
        position.amount,
    );

    let mut result = SettlementResult {
        position_id: position.id,
        payout: 0,
        returned_collateral: 0,
        insolvent_amount: 0,
    };

    if position.option_type.is_long() {
        result.payout = owed_quote;
        return Ok(result);
    }

    let owed = if position.option_type.is_base_collateralized() {
        divide_decimal(env, owed_quote, spot_at_expiry)
    } else {
        owed_quote
    };

    if position.collateral >= owed {
        result.returned_collateral = position.collateral - owed;
    } else {
        let shortfall = owed - position.collateral;
        result.insolvent_amount = if position.option_type.is_base_collateralized() {
            multiply_decimal(env, shortfall, spot_at_expiry)
        } else {
            shortfall
        };
    }
    Ok(result)
}
