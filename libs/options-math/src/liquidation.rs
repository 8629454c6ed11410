use options_types::{LiquidationFees, OptionType, PartialCollateralParameters, DECIMAL_UNIT};
use soroban_sdk::Env;

use crate::decimal_math::{divide_decimal, multiply_decimal};

/// Premium owed, minimum fee and insolvency multiplier in the collateral's units
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidationTerms {
    pub premium: i128,
    pub min_fee: i128,
    pub insolvency_multiplier: i128,
}

/// Express a quote premium and fee in the position's collateral asset.
///
/// Base backed calls owe in base, and their shortfall is scaled back to
/// quote by spot.
pub fn liquidation_terms(
    env: &Env,
    option_type: OptionType,
    premium_quote: i128,
    min_fee_quote: i128,
    spot: i128,
) -> LiquidationTerms {
    if option_type.is_base_collateralized() {
        LiquidationTerms {
            premium: divide_decimal(env, premium_quote, spot),
            min_fee: divide_decimal(env, min_fee_quote, spot),
            insolvency_multiplier: spot,
        }
    } else {
        LiquidationTerms {
            premium: premium_quote,
            min_fee: min_fee_quote,
            insolvency_multiplier: DECIMAL_UNIT,
        }
    }
}

/// Split a liquidated position's collateral.
///
/// Solvent (collateral covers premium plus minimum fee): the premium goes
/// to the pool, a penalty of `penalty_ratio` of the rest (at least the
/// minimum fee) is taken and the remainder returned.
///
/// Insolvent: nothing is returned. The penalty is the minimum fee when
/// the collateral covers it, otherwise the whole collateral, and the
/// uncovered premium is recorded as insolvency.
///
/// The penalty is split into security module and liquidator fees by ratio,
/// the pool keeping the remainder so no rounding dust is lost.
pub fn get_liquidation_fees(
    env: &Env,
    params: &PartialCollateralParameters,
    premium_owed: i128,
    collateral: i128,
    min_fee: i128,
    insolvency_multiplier: i128,
) -> LiquidationFees {
    let min_owed = premium_owed + min_fee;
    let mut fees = LiquidationFees::default();

    let penalty = if collateral >= min_owed {
        let remaining = collateral - premium_owed;
        let penalty = multiply_decimal(env, remaining, params.penalty_ratio).max(min_fee);
        fees.return_collateral = remaining - penalty;
        penalty
    } else if collateral >= min_fee {
        fees.insolvent_amount = multiply_decimal(env, min_owed - collateral, insolvency_multiplier);
        min_fee
    } else {
        fees.insolvent_amount = multiply_decimal(env, premium_owed, insolvency_multiplier);
        collateral
    };

    fees.sm_fee = multiply_decimal(env, penalty, params.sm_fee_ratio);
    fees.liquidator_fee = multiply_decimal(env, penalty, params.liquidator_fee_ratio);
    fees.lp_fee = penalty - fees.sm_fee - fees.liquidator_fee;
    fees.lp_premiums = collateral - penalty - fees.return_collateral;
    fees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::{
        insolvent_returns_nothing, liquidation_conserves_collateral,
        liquidation_fees_non_negative, premium_accounted_for,
    };
    use soroban_sdk::Env;

    fn params() -> PartialCollateralParameters {
        PartialCollateralParameters {
            penalty_ratio: DECIMAL_UNIT / 10,
            liquidator_fee_ratio: DECIMAL_UNIT * 4 / 10,
            sm_fee_ratio: DECIMAL_UNIT * 3 / 10,
            min_liquidation_fee: 10 * DECIMAL_UNIT,
        }
    }

    const UNIT: i128 = DECIMAL_UNIT;

    fn check_invariants(fees: &LiquidationFees, premium: i128, collateral: i128, min_fee: i128) {
        assert!(liquidation_conserves_collateral(fees, collateral));
        assert!(premium_accounted_for(fees, premium));
        assert!(insolvent_returns_nothing(fees, collateral, premium, min_fee));
        assert!(liquidation_fees_non_negative(fees));
    }

    // === solvent ===

    #[test]
    fn test_solvent_penalty_by_ratio() {
        let env = Env::default();
        // 1000 collateral, 300 premium: 700 left, 10% penalty = 70
        let fees = get_liquidation_fees(&env, &params(), 300 * UNIT, 1_000 * UNIT, 10 * UNIT, UNIT);
        assert_eq!(fees.return_collateral, 630 * UNIT);
        assert_eq!(fees.lp_premiums, 300 * UNIT);
        assert_eq!(fees.sm_fee, 21 * UNIT);
        assert_eq!(fees.liquidator_fee, 28 * UNIT);
        assert_eq!(fees.lp_fee, 21 * UNIT);
        assert_eq!(fees.insolvent_amount, 0);
        check_invariants(&fees, 300 * UNIT, 1_000 * UNIT, 10 * UNIT);
    }

    #[test]
    fn test_solvent_penalty_floored_at_min_fee() {
        let env = Env::default();
        // 50 left, 10% = 5 < min fee 10
        let fees = get_liquidation_fees(&env, &params(), 100 * UNIT, 150 * UNIT, 10 * UNIT, UNIT);
        assert_eq!(fees.return_collateral, 40 * UNIT);
        assert_eq!(fees.sm_fee + fees.liquidator_fee + fees.lp_fee, 10 * UNIT);
        check_invariants(&fees, 100 * UNIT, 150 * UNIT, 10 * UNIT);
    }

    #[test]
    fn test_exactly_solvent_returns_nothing_left() {
        let env = Env::default();
        let fees = get_liquidation_fees(&env, &params(), 100 * UNIT, 110 * UNIT, 10 * UNIT, UNIT);
        assert_eq!(fees.return_collateral, 0);
        assert_eq!(fees.insolvent_amount, 0);
        check_invariants(&fees, 100 * UNIT, 110 * UNIT, 10 * UNIT);
    }

    // === insolvent ===

    #[test]
    fn test_insolvent_covers_min_fee() {
        let env = Env::default();
        // 80 collateral against 100 premium + 10 fee
        let fees = get_liquidation_fees(&env, &params(), 100 * UNIT, 80 * UNIT, 10 * UNIT, UNIT);
        assert_eq!(fees.return_collateral, 0);
        assert_eq!(fees.lp_premiums, 70 * UNIT);
        assert_eq!(fees.sm_fee + fees.liquidator_fee + fees.lp_fee, 10 * UNIT);
        assert_eq!(fees.insolvent_amount, 30 * UNIT);
        check_invariants(&fees, 100 * UNIT, 80 * UNIT, 10 * UNIT);
    }

    #[test]
    fn test_insolvent_below_min_fee() {
        let env = Env::default();
        let fees = get_liquidation_fees(&env, &params(), 100 * UNIT, 4 * UNIT, 10 * UNIT, UNIT);
        assert_eq!(fees.return_collateral, 0);
        assert_eq!(fees.lp_premiums, 0);
        assert_eq!(fees.sm_fee + fees.liquidator_fee + fees.lp_fee, 4 * UNIT);
        assert_eq!(fees.insolvent_amount, 100 * UNIT);
        check_invariants(&fees, 100 * UNIT, 4 * UNIT, 10 * UNIT);
    }

    #[test]
    fn test_insolvency_scaled_for_base_collateral() {
        let env = Env::default();
        let spot = 2_000 * UNIT;
        let terms = liquidation_terms(&env, OptionType::ShortCallBase, 1_000 * UNIT, 20 * UNIT, spot);
        assert_eq!(terms.premium, UNIT / 2);
        assert_eq!(terms.min_fee, UNIT / 100);
        assert_eq!(terms.insolvency_multiplier, spot);

        // 0.3 base against 0.5 premium + 0.01 fee
        let fees = get_liquidation_fees(
            &env,
            &params(),
            terms.premium,
            3 * UNIT / 10,
            terms.min_fee,
            terms.insolvency_multiplier,
        );
        assert_eq!(fees.return_collateral, 0);
        // 0.21 base short, worth 420 quote
        assert_eq!(fees.insolvent_amount, 420 * UNIT);
        assert!(liquidation_conserves_collateral(&fees, 3 * UNIT / 10));
    }

    #[test]
    fn test_quote_terms_pass_through() {
        let env = Env::default();
        let terms = liquidation_terms(&env, OptionType::ShortPutQuote, 123, 45, 2_000 * UNIT);
        assert_eq!(
            terms,
            LiquidationTerms {
                premium: 123,
                min_fee: 45,
                insolvency_multiplier: UNIT,
            }
        );
    }

    #[test]
    fn test_rounding_dust_goes_to_pool() {
        let env = Env::default();
        let odd = PartialCollateralParameters {
            penalty_ratio: DECIMAL_UNIT / 3,
            liquidator_fee_ratio: DECIMAL_UNIT / 3,
            sm_fee_ratio: DECIMAL_UNIT / 3,
            min_liquidation_fee: 0,
        };
        let collateral = 1_000_000_000_000_000_007;
        let fees = get_liquidation_fees(&env, &odd, 0, collateral, 0, UNIT);
        assert!(fees.lp_fee >= fees.sm_fee);
        check_invariants(&fees, 0, collateral, 0);
    }

    #[test]
    fn test_waterfall_sweep_conserves_value() {
        let env = Env::default();
        let premium = 250 * UNIT;
        let min_fee = 10 * UNIT;
        let mut collateral = 0;
        while collateral <= 1_000 * UNIT {
            let fees = get_liquidation_fees(&env, &params(), premium, collateral, min_fee, UNIT);
            check_invariants(&fees, premium, collateral, min_fee);
            collateral += 37 * UNIT + 123_456_789;
        }
    }
}
