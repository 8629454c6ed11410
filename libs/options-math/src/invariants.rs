// ============================================================================
// INVARIANTS MODULE
// ============================================================================
//
// Predicates expressing the properties the pricing and accounting code
// must preserve. Tests across the workspace assert them after every
// operation that could break them.
//
// INVARIANT CATEGORIES:
//
// 1. PRICING INVARIANTS
//    - Put-call parity
//    - Call delta minus put delta is one
//
// 2. COLLATERAL INVARIANTS
//    - Shock vol stays between the two configured vols
//
// 3. LIQUIDATION INVARIANTS
//    - Every unit of collateral is allocated exactly once
//    - Premium is either recovered or recorded as insolvency
//    - Insolvent owners receive nothing
//
// 4. REGISTRY INVARIANTS
//    - Open interest is never negative
//    - Skew stays inside its clamp
//    - GWAV timestamps strictly increase
//
// ============================================================================

use options_types::{LiquidationFees, MinCollateralParameters, Observation, Strike};

use crate::gwav::ObservationHistory;

// ============================================================================
// PRICING INVARIANTS
// ============================================================================

/// Invariant: put-call parity
///
/// Property:
///   |(call - put) - (spot - strike * e^(-rT))| <= tolerance
pub fn put_call_parity_holds(
    call: i128,
    put: i128,
    spot: i128,
    strike_pv: i128,
    tolerance: i128,
) -> bool {
    ((call - put) - (spot - strike_pv)).abs() <= tolerance
}

/// Invariant: deltas of a call and a put on the same strike differ by one
///
/// Property:
///   |call_delta - put_delta - 1| <= tolerance
pub fn delta_spread_is_one(call_delta: i128, put_delta: i128, tolerance: i128) -> bool {
    (call_delta - put_delta - options_types::DECIMAL_UNIT).abs() <= tolerance
}

// ============================================================================
// COLLATERAL INVARIANTS
// ============================================================================

/// Invariant: shock vol is bounded by its two anchor vols
///
/// Property:
///   shock_vol_b <= vol <= shock_vol_a
pub fn shock_vol_in_range(vol: i128, params: &MinCollateralParameters) -> bool {
    vol >= params.shock_vol_b && vol <= params.shock_vol_a
}

// ============================================================================
// LIQUIDATION INVARIANTS
// ============================================================================

/// Invariant: seized collateral is fully allocated
///
/// Property:
///   return + lp_premiums + lp_fee + liquidator_fee + sm_fee == collateral
pub fn liquidation_conserves_collateral(fees: &LiquidationFees, collateral: i128) -> bool {
    fees.return_collateral + fees.lp_premiums + fees.lp_fee + fees.liquidator_fee + fees.sm_fee
        == collateral
}

/// Invariant: premium owed is recovered or recorded as insolvency
///
/// Property (insolvency multiplier of one unit):
///   lp_premiums + insolvent_amount == premium
pub fn premium_accounted_for(fees: &LiquidationFees, premium: i128) -> bool {
    fees.lp_premiums + fees.insolvent_amount == premium
}

/// Invariant: an insolvent position returns nothing to its owner
///
/// Property:
///   collateral < premium + min_fee  =>  return_collateral == 0
pub fn insolvent_returns_nothing(
    fees: &LiquidationFees,
    collateral: i128,
    premium: i128,
    min_fee: i128,
) -> bool {
    collateral >= premium + min_fee || fees.return_collateral == 0
}

/// Invariant: no allocation is negative
pub fn liquidation_fees_non_negative(fees: &LiquidationFees) -> bool {
    fees.return_collateral >= 0
        && fees.lp_premiums >= 0
        && fees.lp_fee >= 0
        && fees.liquidator_fee >= 0
        && fees.sm_fee >= 0
        && fees.insolvent_amount >= 0
}

// ============================================================================
// REGISTRY INVARIANTS
// ============================================================================

/// Invariant: open interest on a strike is never negative
pub fn exposure_non_negative(strike: &Strike) -> bool {
    strike.long_call >= 0
        && strike.short_call_base >= 0
        && strike.short_call_quote >= 0
        && strike.long_put >= 0
        && strike.short_put >= 0
}

/// Invariant: skew used for valuation stays inside its clamp
///
/// Property:
///   floor <= skew <= cap
pub fn skew_within_bounds(skew: i128, floor: i128, cap: i128) -> bool {
    skew >= floor && skew <= cap
}

/// Invariant: GWAV history is strictly ordered in time
///
/// Property:
///   for all i: obs[i].timestamp < obs[i + 1].timestamp
pub fn observations_strictly_increasing<H: ObservationHistory + ?Sized>(history: &H) -> bool {
    let count = history.count();
    if count < 2 {
        return true;
    }
    let mut previous: Observation = history.observation(0);
    for i in 1..count {
        let current = history.observation(i);
        if current.timestamp <= previous.timestamp {
            return false;
        }
        previous = current;
    }
    true
}
