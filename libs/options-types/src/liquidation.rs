use soroban_sdk::contracttype;

/// Split of a liquidated position's collateral.
///
/// All amounts except `insolvent_amount` are in the position's collateral
/// asset. `insolvent_amount` is scaled by the insolvency multiplier so it is
/// always expressed in quote.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LiquidationFees {
    /// Collateral given back to the position owner
    pub return_collateral: i128,
    /// Premium recovered by the liquidity pool
    pub lp_premiums: i128,
    /// Share of the penalty kept by the liquidity pool
    pub lp_fee: i128,
    /// Share of the penalty paid to the liquidator
    pub liquidator_fee: i128,
    /// Share of the penalty paid to the security module
    pub sm_fee: i128,
    /// Premium that could not be covered (quote)
    pub insolvent_amount: i128,
}

/// Running totals kept by the market
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MarketTotals {
    pub total_lp_premiums: i128,
    pub total_lp_fees: i128,
    pub total_liquidator_fees: i128,
    pub total_sm_fees: i128,
    /// Liquidation and settlement shortfalls (quote)
    pub total_insolvency: i128,
    pub liquidations: u32,
}
