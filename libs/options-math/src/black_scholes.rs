use options_types::{
    BlackScholesInputs, OptionsError, PricesAndDelta, PricesDeltaStdVega, PRECISE_UNIT,
    SECONDS_PER_DAY, SECONDS_PER_YEAR,
};
use soroban_sdk::Env;

use crate::decimal_math::{
    checked_divide_precise, decimal_to_precise, divide_precise, multiply_precise,
    precise_to_decimal,
};
use crate::fixed_point_math::{exp_precise, ln_precise, sqrt_precise};

// ============================================================================
// Black-Scholes pricing
// ============================================================================
//
// Public inputs and outputs are 1e18 fixed point. Everything in between
// runs at 1e27 and the results are rounded down when converted back.
//
// ============================================================================

/// One second, as a fraction of a year (1e27)
pub const MIN_T_ANNUALISED: i128 = PRECISE_UNIT / SECONDS_PER_YEAR as i128;

/// 0.01% volatility (1e27)
pub const MIN_VOLATILITY: i128 = PRECISE_UNIT / 10_000;

/// Shorter expiries are standardised as if they had this long left
pub const VEGA_STANDARDISATION_MIN_DAYS: u64 = 7 * SECONDS_PER_DAY;

/// sqrt(2 * pi) (1e27)
const SQRT_TWOPI: i128 = 2_506_628_274_631_000_502_415_765_285;

/// Beyond this |z| the normal CDF is 0 or 1 at 27 decimals
const CDF_CUTOFF: i128 = 37 * PRECISE_UNIT;

/// 10 / sqrt(2): rational approximation below, continued fraction above
const CDF_SPLIT: i128 = 7_071_067_811_865_470_000_000_000_000;

/// Tail continued fraction offset (0.65)
const CDF_TAIL_OFFSET: i128 = 650_000_000_000_000_000_000_000_000;

/// Hart (1968) numerator coefficients, ascending powers of z (1e27)
const HART_N: [i128; 7] = [
    220_206_867_912_376_000_000_000_000_000,
    221_213_596_169_931_000_000_000_000_000,
    112_079_291_497_871_000_000_000_000_000,
    33_912_866_078_383_000_000_000_000_000,
    6_373_962_203_531_650_000_000_000_000,
    700_383_064_443_688_000_000_000_000,
    35_262_496_599_891_100_000_000_000,
];

/// Hart (1968) denominator coefficients, ascending powers of z (1e27)
const HART_M: [i128; 8] = [
    440_413_735_824_752_000_000_000_000_000,
    793_826_512_519_948_000_000_000_000_000,
    637_333_633_378_831_000_000_000_000_000,
    296_564_248_779_674_000_000_000_000_000,
    86_780_732_202_946_100_000_000_000_000,
    16_064_177_579_207_000_000_000_000_000,
    1_755_667_163_182_640_000_000_000_000,
    88_388_347_648_318_400_000_000_000,
];

/// Inputs promoted to 1e27
struct PreciseInputs {
    time_to_expiry_sec: u64,
    t_annualised: i128,
    volatility: i128,
    spot: i128,
    strike_price: i128,
    rate: i128,
}

impl PreciseInputs {
    fn from_decimal(inputs: &BlackScholesInputs) -> Result<Self, OptionsError> {
        if inputs.spot <= 0 || inputs.strike_price <= 0 || inputs.volatility < 0 {
            return Err(OptionsError::InvalidBlackScholesInput);
        }
        Ok(Self {
            time_to_expiry_sec: inputs.time_to_expiry_sec,
            t_annualised: annualise(inputs.time_to_expiry_sec)?,
            volatility: decimal_to_precise(inputs.volatility)?,
            spot: decimal_to_precise(inputs.spot)?,
            strike_price: decimal_to_precise(inputs.strike_price)?,
            rate: decimal_to_precise(inputs.rate)?,
        })
    }

    fn d1_d2(&self, env: &Env) -> Result<(i128, i128), OptionsError> {
        d1_d2(
            env,
            self.t_annualised,
            self.volatility,
            self.spot,
            self.strike_price,
            self.rate,
        )
    }
}

/// Seconds to a year fraction (1e27)
pub fn annualise(seconds: u64) -> Result<i128, OptionsError> {
    let scaled = (seconds as i128)
        .checked_mul(PRECISE_UNIT)
        .ok_or(OptionsError::MathOverflow)?;
    Ok(scaled / SECONDS_PER_YEAR as i128)
}

/// d1 and d2 at 1e27.
///
/// Time and volatility are floored at `MIN_T_ANNUALISED` and
/// `MIN_VOLATILITY` so an expired or zero-vol option stays finite.
pub fn d1_d2(
    env: &Env,
    t_annualised: i128,
    volatility: i128,
    spot: i128,
    strike_price: i128,
    rate: i128,
) -> Result<(i128, i128), OptionsError> {
    let t = t_annualised.max(MIN_T_ANNUALISED);
    let volatility = volatility.max(MIN_VOLATILITY);

    let vol_sqrt_t = multiply_precise(env, volatility, sqrt_precise(t)?);
    let log_moneyness = ln_precise(divide_precise(env, spot, strike_price))?;
    let drift = multiply_precise(
        env,
        multiply_precise(env, volatility, volatility) / 2 + rate,
        t,
    );

    let d1 = divide_precise(env, log_moneyness + drift, vol_sqrt_t);
    Ok((d1, d1 - vol_sqrt_t))
}

/// Call and put prices at 1e27, put derived through put-call parity
fn precise_prices(
    env: &Env,
    p: &PreciseInputs,
    d1: i128,
    d2: i128,
) -> Result<(i128, i128), OptionsError> {
    let discount = exp_precise(-multiply_precise(env, p.rate, p.t_annualised))?;
    let strike_pv = multiply_precise(env, p.strike_price, discount);
    let spot_nd1 = multiply_precise(env, p.spot, std_normal_cdf(env, d1)?);
    let strike_nd2 = multiply_precise(env, strike_pv, std_normal_cdf(env, d2)?);

    // Approximation error can push either price a hair below zero
    let call = if strike_nd2 <= spot_nd1 {
        spot_nd1 - strike_nd2
    } else {
        0
    };
    let put = call + strike_pv;
    let put = if p.spot <= put { put - p.spot } else { 0 };
    Ok((call, put))
}

fn precise_vega(env: &Env, p: &PreciseInputs, d1: i128) -> Result<i128, OptionsError> {
    let sqrt_t = sqrt_precise(p.t_annualised)?;
    Ok(multiply_precise(
        env,
        sqrt_t,
        multiply_precise(env, std_normal(env, d1)?, p.spot),
    ))
}

/// sqrt(30 / days) / 100, with days floored at a week (1e27)
fn vega_normalisation_factor(time_to_expiry_sec: u64) -> Result<i128, OptionsError> {
    let days = time_to_expiry_sec.max(VEGA_STANDARDISATION_MIN_DAYS) / SECONDS_PER_DAY;
    let ratio = 30 * PRECISE_UNIT / days as i128;
    Ok(sqrt_precise(ratio)? / 100)
}

/// Call and put price
pub fn option_prices(env: &Env, inputs: &BlackScholesInputs) -> Result<(i128, i128), OptionsError> {
    let p = PreciseInputs::from_decimal(inputs)?;
    let (d1, d2) = p.d1_d2(env)?;
    let (call, put) = precise_prices(env, &p, d1, d2)?;
    Ok((precise_to_decimal(call), precise_to_decimal(put)))
}

pub fn prices_and_delta(
    env: &Env,
    inputs: &BlackScholesInputs,
) -> Result<PricesAndDelta, OptionsError> {
    let p = PreciseInputs::from_decimal(inputs)?;
    let (d1, d2) = p.d1_d2(env)?;
    let (call, put) = precise_prices(env, &p, d1, d2)?;
    let call_delta = std_normal_cdf(env, d1)?;
    Ok(PricesAndDelta {
        call_price: precise_to_decimal(call),
        put_price: precise_to_decimal(put),
        call_delta: precise_to_decimal(call_delta),
        put_delta: precise_to_decimal(call_delta - PRECISE_UNIT),
    })
}

/// Prices, deltas, vega and standardised vega in one pass
pub fn prices_delta_std_vega(
    env: &Env,
    inputs: &BlackScholesInputs,
) -> Result<PricesDeltaStdVega, OptionsError> {
    let p = PreciseInputs::from_decimal(inputs)?;
    let (d1, d2) = p.d1_d2(env)?;
    let (call, put) = precise_prices(env, &p, d1, d2)?;
    let call_delta = std_normal_cdf(env, d1)?;
    let vega = precise_vega(env, &p, d1)?;
    let std_vega = multiply_precise(env, vega, vega_normalisation_factor(p.time_to_expiry_sec)?);
    Ok(PricesDeltaStdVega {
        call_price: precise_to_decimal(call),
        put_price: precise_to_decimal(put),
        call_delta: precise_to_decimal(call_delta),
        put_delta: precise_to_decimal(call_delta - PRECISE_UNIT),
        vega: precise_to_decimal(vega),
        std_vega: precise_to_decimal(std_vega),
    })
}

/// (call delta, put delta)
pub fn delta(env: &Env, inputs: &BlackScholesInputs) -> Result<(i128, i128), OptionsError> {
    let p = PreciseInputs::from_decimal(inputs)?;
    let (d1, _) = p.d1_d2(env)?;
    let call_delta = std_normal_cdf(env, d1)?;
    Ok((
        precise_to_decimal(call_delta),
        precise_to_decimal(call_delta - PRECISE_UNIT),
    ))
}

/// Price change for a 1.0 change in volatility
pub fn vega(env: &Env, inputs: &BlackScholesInputs) -> Result<i128, OptionsError> {
    let p = PreciseInputs::from_decimal(inputs)?;
    let (d1, _) = p.d1_d2(env)?;
    Ok(precise_to_decimal(precise_vega(env, &p, d1)?))
}

/// Delta change for a 1.0 change in spot, same for calls and puts
pub fn gamma(env: &Env, inputs: &BlackScholesInputs) -> Result<i128, OptionsError> {
    let p = PreciseInputs::from_decimal(inputs)?;
    let (d1, d2) = p.d1_d2(env)?;
    let vol_sqrt_t = d1 - d2;
    let denominator = multiply_precise(env, p.spot, vol_sqrt_t);
    let gamma = checked_divide_precise(env, std_normal(env, d1)?, denominator)?;
    Ok(precise_to_decimal(gamma))
}

/// Standard normal density at x (1e27)
pub fn std_normal(env: &Env, x: i128) -> Result<i128, OptionsError> {
    if x.abs() > CDF_CUTOFF {
        return Ok(0);
    }
    let e = exp_precise(-multiply_precise(env, x, x / 2))?;
    Ok(divide_precise(env, e, SQRT_TWOPI))
}

/// Standard normal cumulative distribution at x (1e27)
///
/// Hart's rational approximation for |x| < 10/sqrt(2), a continued
/// fraction for the tail, and 0 or 1 beyond |x| = 37.
pub fn std_normal_cdf(env: &Env, x: i128) -> Result<i128, OptionsError> {
    let z = x.abs();
    let mut tail = 0;

    if z <= CDF_CUTOFF {
        let e = exp_precise(-(multiply_precise(env, z, z) / 2))?;
        if z < CDF_SPLIT {
            let n = poly(env, &HART_N, z);
            let m = poly(env, &HART_M, z);
            tail = multiply_precise(env, divide_precise(env, n, m), e);
        } else {
            let f = z + CDF_TAIL_OFFSET;
            let f = z + divide_precise(env, 4 * PRECISE_UNIT, f);
            let f = z + divide_precise(env, 3 * PRECISE_UNIT, f);
            let f = z + divide_precise(env, 2 * PRECISE_UNIT, f);
            let f = z + divide_precise(env, PRECISE_UNIT, f);
            tail = divide_precise(env, e, multiply_precise(env, f, SQRT_TWOPI));
        }
    }

    Ok(if x <= 0 { tail } else { PRECISE_UNIT - tail })
}

fn poly(env: &Env, coefficients: &[i128], z: i128) -> i128 {
    let mut acc = coefficients[coefficients.len() - 1];
    for c in coefficients[..coefficients.len() - 1].iter().rev() {
        acc = multiply_precise(env, acc, z) + c;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal_math::multiply_decimal;
    use crate::fixed_point_math::exp;
    use crate::invariants::{delta_spread_is_one, put_call_parity_holds};
    use options_types::DECIMAL_UNIT;
    use soroban_sdk::Env;

    const DAY: u64 = SECONDS_PER_DAY;
    /// 1e-9 at 1e18
    const TOLERANCE: i128 = 1_000_000_000;

    fn inputs(secs: u64, vol_bps: i128, spot: i128, strike: i128, rate_bps: i128) -> BlackScholesInputs {
        BlackScholesInputs {
            time_to_expiry_sec: secs,
            volatility: vol_bps * DECIMAL_UNIT / 10_000,
            spot: spot * DECIMAL_UNIT,
            strike_price: strike * DECIMAL_UNIT,
            rate: rate_bps * DECIMAL_UNIT / 10_000,
        }
    }

    fn assert_close(actual: i128, expected: i128, tolerance: i128) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "expected {} got {} (diff {})",
            expected,
            actual,
            diff
        );
    }

    // === Normal distribution ===

    #[test]
    fn test_cdf_at_zero_is_half() {
        let env = Env::default();
        assert_eq!(std_normal_cdf(&env, 0), Ok(PRECISE_UNIT / 2));
    }

    #[test]
    fn test_cdf_known_values() {
        let env = Env::default();
        // N(1) = 0.841344746068542948585...
        assert_close(
            std_normal_cdf(&env, PRECISE_UNIT).unwrap(),
            841_344_746_068_542_948_585_232_545,
            100_000_000_000,
        );
        // N(-2) = 0.022750131948179207200...
        assert_close(
            std_normal_cdf(&env, -2 * PRECISE_UNIT).unwrap(),
            22_750_131_948_179_207_200_282_637,
            100_000_000_000,
        );
        // tail branch: N(8) = 1 - 6.2e-16
        assert_close(
            std_normal_cdf(&env, 8 * PRECISE_UNIT).unwrap(),
            999_999_999_999_999_377_903_942_572,
            100_000_000_000,
        );
    }

    #[test]
    fn test_cdf_saturates_far_out() {
        let env = Env::default();
        assert_eq!(std_normal_cdf(&env, 40 * PRECISE_UNIT), Ok(PRECISE_UNIT));
        assert_eq!(std_normal_cdf(&env, -40 * PRECISE_UNIT), Ok(0));
    }

    #[test]
    fn test_cdf_is_symmetric() {
        let env = Env::default();
        for z in [PRECISE_UNIT / 3, 3 * PRECISE_UNIT / 2, 9 * PRECISE_UNIT] {
            let up = std_normal_cdf(&env, z).unwrap();
            let down = std_normal_cdf(&env, -z).unwrap();
            assert_eq!(up + down, PRECISE_UNIT);
        }
    }

    #[test]
    fn test_std_normal_density() {
        let env = Env::default();
        // phi(0.5) = 0.352065326764299477774...
        assert_close(
            std_normal(&env, PRECISE_UNIT / 2).unwrap(),
            352_065_326_764_299_477_774_680_441,
            1_000_000_000_000,
        );
    }

    // === Prices ===

    #[test]
    fn test_at_the_money_zero_rate_symmetry() {
        let env = Env::default();
        let (call, put) = option_prices(&env, &inputs(7 * DAY, 8_000, 2_000, 2_000, 0)).unwrap();
        // 88.350818396637589819
        assert_close(call, 88_350_818_396_637_589_819, TOLERANCE);
        assert_close(put, call, TOLERANCE);
    }

    #[test]
    fn test_prices_delta_std_vega_reference() {
        let env = Env::default();
        let result = prices_delta_std_vega(&env, &inputs(7 * DAY, 8_000, 2_000, 2_000, 0)).unwrap();
        assert_close(result.call_delta, 522_087_704_599_159_397, TOLERANCE);
        assert_close(result.put_delta, -477_912_295_400_840_603, TOLERANCE);
        assert_close(result.vega, 110_325_609_254_159_071_570, TOLERANCE);
        assert_close(result.std_vega, 2_283_957_097_792_718_713, TOLERANCE);

        let result =
            prices_delta_std_vega(&env, &inputs(30 * DAY, 7_000, 1_500, 1_700, 500)).unwrap();
        assert_close(result.call_price, 53_516_883_796_526_833_944, TOLERANCE);
        assert_close(result.put_price, 246_544_918_195_674_258_353, TOLERANCE);
        assert_close(result.call_delta, 307_530_072_788_595_736, TOLERANCE);
        assert_close(result.vega, 151_183_744_364_908_473_838, TOLERANCE);
        // 30 days normalises to exactly vega / 100
        assert_close(result.std_vega, 1_511_837_443_649_084_738, TOLERANCE);
    }

    #[test]
    fn test_deep_in_the_money_short_dated() {
        let env = Env::default();
        let result = prices_and_delta(&env, &inputs(DAY, 12_000, 1_800, 1_500, 300)).unwrap();
        assert_close(result.call_price, 300_178_394_121_563_347_314, TOLERANCE);
        assert_close(result.put_price, 55_111_516_808_287_858, TOLERANCE);
        assert_close(result.call_delta, 998_334_523_120_050_589, TOLERANCE);
    }

    #[test]
    fn test_long_dated_with_rate() {
        let env = Env::default();
        let (call, put) = option_prices(&env, &inputs(365 * DAY, 5_000, 100, 80, 200)).unwrap();
        assert_close(call, 30_390_596_838_158_761_553, TOLERANCE);
        assert_close(put, 8_806_490_702_699_185_719, TOLERANCE);
    }

    #[test]
    fn test_near_expiry_converges_to_intrinsic() {
        let env = Env::default();
        let result = prices_and_delta(&env, &inputs(60, 8_000, 2_000, 2_500, 0)).unwrap();
        assert_close(result.call_price, 0, TOLERANCE);
        assert_close(result.put_price, 500 * DECIMAL_UNIT, TOLERANCE);
        assert_close(result.call_delta, 0, TOLERANCE);
    }

    #[test]
    fn test_expired_option_is_intrinsic() {
        let env = Env::default();
        let (call, put) = option_prices(&env, &inputs(0, 8_000, 2_000, 1_500, 0)).unwrap();
        assert_close(call, 500 * DECIMAL_UNIT, TOLERANCE);
        assert_close(put, 0, TOLERANCE);
        // no time value left, so no vega either
        assert_eq!(vega(&env, &inputs(0, 8_000, 2_000, 1_500, 0)), Ok(0));
    }

    #[test]
    fn test_zero_volatility_is_floored() {
        let env = Env::default();
        let (call, put) = option_prices(&env, &inputs(30 * DAY, 0, 2_000, 1_900, 0)).unwrap();
        assert_close(call, 100 * DECIMAL_UNIT, TOLERANCE);
        assert_close(put, 0, TOLERANCE);
    }

    #[test]
    fn test_put_call_parity_and_delta_spread() {
        let env = Env::default();
        let cases = [
            inputs(7 * DAY, 8_000, 2_000, 2_000, 0),
            inputs(30 * DAY, 7_000, 1_500, 1_700, 500),
            inputs(DAY, 12_000, 1_800, 1_500, 300),
            inputs(365 * DAY, 5_000, 100, 80, 200),
            inputs(90 * DAY, 15_000, 30_000, 45_000, -100),
        ];
        for case in cases.iter() {
            let result = prices_delta_std_vega(&env, case).unwrap();
            let rate_t = case.rate * case.time_to_expiry_sec as i128 / SECONDS_PER_YEAR as i128;
            let strike_pv = multiply_decimal(&env, case.strike_price, exp(-rate_t).unwrap());
            assert!(put_call_parity_holds(
                result.call_price,
                result.put_price,
                case.spot,
                strike_pv,
                case.strike_price / 1_000_000_000,
            ));
            assert!(delta_spread_is_one(result.call_delta, result.put_delta, 1));
        }
    }

    #[test]
    fn test_delta_and_vega_match_combined() {
        let env = Env::default();
        let case = inputs(30 * DAY, 7_000, 1_500, 1_700, 500);
        let combined = prices_delta_std_vega(&env, &case).unwrap();
        assert_eq!(
            delta(&env, &case),
            Ok((combined.call_delta, combined.put_delta))
        );
        assert_eq!(vega(&env, &case), Ok(combined.vega));
    }

    #[test]
    fn test_gamma_reference() {
        let env = Env::default();
        // 0.001797716400793216
        assert_close(
            gamma(&env, &inputs(7 * DAY, 8_000, 2_000, 2_000, 0)).unwrap(),
            1_797_716_400_793_216,
            TOLERANCE / 100,
        );
        assert_close(
            gamma(&env, &inputs(30 * DAY, 7_000, 1_500, 1_700, 500)).unwrap(),
            1_167_874_427_369_134,
            TOLERANCE / 100,
        );
    }

    #[test]
    fn test_gamma_overflows_on_dust_spot() {
        let env = Env::default();
        let dust = BlackScholesInputs {
            time_to_expiry_sec: 60,
            volatility: DECIMAL_UNIT / 10,
            spot: 1,
            strike_price: 1,
            rate: 0,
        };
        assert_eq!(gamma(&env, &dust), Err(OptionsError::MathOverflow));
    }

    #[test]
    fn test_std_vega_floors_days_at_a_week() {
        let env = Env::default();
        let one_day = prices_delta_std_vega(&env, &inputs(DAY, 8_000, 2_000, 2_000, 0)).unwrap();
        // sqrt(30 / 7) / 100 = 0.020701966780270626
        let expected = multiply_decimal(&env, one_day.vega, 20_701_966_780_270_626);
        assert_close(one_day.std_vega, expected, TOLERANCE);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let env = Env::default();
        assert_eq!(
            option_prices(&env, &inputs(DAY, 8_000, 0, 2_000, 0)),
            Err(OptionsError::InvalidBlackScholesInput)
        );
        assert_eq!(
            option_prices(&env, &inputs(DAY, 8_000, 2_000, 0, 0)),
            Err(OptionsError::InvalidBlackScholesInput)
        );
        assert_eq!(
            option_prices(&env, &inputs(DAY, -1, 2_000, 2_000, 0)),
            Err(OptionsError::InvalidBlackScholesInput)
        );
    }

    #[test]
    fn test_annualise() {
        assert_eq!(annualise(SECONDS_PER_YEAR), Ok(PRECISE_UNIT));
        assert_eq!(annualise(1), Ok(MIN_T_ANNUALISED));
        assert_eq!(annualise(u64::MAX), Err(OptionsError::MathOverflow));
    }
}
