use options_types::{OptionsError, DECIMAL_UNIT, PRECISE_UNIT, UNIT_TO_PRECISE};
use soroban_fixed_point_math::SorobanFixedPoint;
use soroban_sdk::{Env, I256};

// Products wider than i128 are carried through the host's 256-bit
// integers by SorobanFixedPoint, so these never overflow halfway.

/// x * y at 1e18 scale, rounded down
pub fn multiply_decimal(env: &Env, x: i128, y: i128) -> i128 {
    x.fixed_mul_floor(env, &y, &DECIMAL_UNIT)
}

/// x * y at 1e18 scale, rounded up
pub fn multiply_decimal_round_up(env: &Env, x: i128, y: i128) -> i128 {
    x.fixed_mul_ceil(env, &y, &DECIMAL_UNIT)
}

/// x / y at 1e18 scale, rounded down
pub fn divide_decimal(env: &Env, x: i128, y: i128) -> i128 {
    x.fixed_div_floor(env, &y, &DECIMAL_UNIT)
}

/// x / y at 1e18 scale, rounded up
pub fn divide_decimal_round_up(env: &Env, x: i128, y: i128) -> i128 {
    x.fixed_div_ceil(env, &y, &DECIMAL_UNIT)
}

/// x * y at 1e27 scale, rounded down
pub fn multiply_precise(env: &Env, x: i128, y: i128) -> i128 {
    x.fixed_mul_floor(env, &y, &PRECISE_UNIT)
}

/// x / y at 1e27 scale, rounded down
pub fn divide_precise(env: &Env, x: i128, y: i128) -> i128 {
    x.fixed_div_floor(env, &y, &PRECISE_UNIT)
}

/// x / y at 1e27 scale, rounded down, or `MathOverflow` when y is zero or
/// the quotient does not fit an i128
pub fn checked_divide_precise(env: &Env, x: i128, y: i128) -> Result<i128, OptionsError> {
    if y == 0 {
        return Err(OptionsError::MathOverflow);
    }
    I256::from_i128(env, x)
        .fixed_div_floor(env, &I256::from_i128(env, y), &I256::from_i128(env, PRECISE_UNIT))
        .to_i128()
        .ok_or(OptionsError::MathOverflow)
}

/// Promote a 1e18 value to 1e27
pub fn decimal_to_precise(x: i128) -> Result<i128, OptionsError> {
    x.checked_mul(UNIT_TO_PRECISE)
        .ok_or(OptionsError::MathOverflow)
}

/// Demote a 1e27 value to 1e18, rounding towards negative infinity
pub fn precise_to_decimal(x: i128) -> i128 {
    x.div_euclid(UNIT_TO_PRECISE)
}

/// Integer division with rounding up, for non-negative operands
pub fn div_rounding_up(a: i128, b: i128) -> Result<i128, OptionsError> {
    if b <= 0 || a < 0 {
        return Err(OptionsError::MathOverflow);
    }
    if a == 0 {
        return Ok(0);
    }
    Ok((a - 1) / b + 1)
}
