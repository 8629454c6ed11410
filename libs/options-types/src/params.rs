use soroban_sdk::contracttype;

use crate::{OptionsError, DECIMAL_UNIT, MAX_STRIKES_PER_BOARD};

/// Pricing and greek cache configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GreekCacheParameters {
    /// Maximum number of strikes a board may list (at most `MAX_STRIKES_PER_BOARD`)
    pub max_strikes_per_board: u32,
    /// Risk free rate plus carry used for every pricing (1e18)
    pub rate_and_carry: i128,
    /// Window of the board iv GWAV used to value positions (seconds)
    pub option_value_iv_gwav_period: u64,
    /// Window of the skew GWAV used to value positions (seconds)
    pub option_value_skew_gwav_period: u64,
    /// Lower clamp applied to a skew GWAV (1e18)
    pub gwav_skew_floor: i128,
    /// Upper clamp applied to a skew GWAV (1e18)
    pub gwav_skew_cap: i128,
}

impl GreekCacheParameters {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_strikes_per_board == 0
            || self.max_strikes_per_board > MAX_STRIKES_PER_BOARD
            || self.gwav_skew_floor <= 0
            || self.gwav_skew_floor > DECIMAL_UNIT
            || self.gwav_skew_cap < DECIMAL_UNIT
        {
            return Err(OptionsError::InvalidGreekCacheParams);
        }
        Ok(())
    }
}

/// Minimum collateral policy for short positions
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinCollateralParameters {
    /// Floor for quote collateralised shorts (quote, 1e18)
    pub min_static_quote_collateral: i128,
    /// Floor for base collateralised shorts (base, 1e18)
    pub min_static_base_collateral: i128,
    /// Shock volatility for near dated options (1e18)
    pub shock_vol_a: i128,
    /// Time to maturity up to which `shock_vol_a` applies (seconds)
    pub shock_vol_point_a: u64,
    /// Shock volatility for far dated options (1e18)
    pub shock_vol_b: i128,
    /// Time to maturity from which `shock_vol_b` applies (seconds)
    pub shock_vol_point_b: u64,
    /// Spot multiplier used to stress calls, at least 1.0
    pub call_spot_price_shock: i128,
    /// Spot multiplier used to stress puts, at most 1.0
    pub put_spot_price_shock: i128,
}

impl MinCollateralParameters {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.min_static_quote_collateral <= 0
            || self.min_static_base_collateral <= 0
            || self.shock_vol_b <= 0
            || self.shock_vol_a < self.shock_vol_b
            || self.shock_vol_point_a > self.shock_vol_point_b
            || self.call_spot_price_shock < DECIMAL_UNIT
            || self.put_spot_price_shock <= 0
            || self.put_spot_price_shock > DECIMAL_UNIT
        {
            return Err(OptionsError::InvalidMinCollateralParams);
        }
        Ok(())
    }
}

/// Liquidation penalty policy
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartialCollateralParameters {
    /// Share of the collateral left after premium taken as penalty (1e18)
    pub penalty_ratio: i128,
    /// Share of the penalty paid to the liquidator (1e18)
    pub liquidator_fee_ratio: i128,
    /// Share of the penalty paid to the security module (1e18)
    pub sm_fee_ratio: i128,
    /// Smallest penalty charged on a liquidation (quote, 1e18)
    pub min_liquidation_fee: i128,
}

impl PartialCollateralParameters {
    pub fn validate(&self) -> Result<(), OptionsError> {
        let in_range = |ratio: i128| (0..=DECIMAL_UNIT).contains(&ratio);
        if !in_range(self.penalty_ratio)
            || !in_range(self.liquidator_fee_ratio)
            || !in_range(self.sm_fee_ratio)
            || self.liquidator_fee_ratio + self.sm_fee_ratio > DECIMAL_UNIT
            || self.min_liquidation_fee < 0
        {
            return Err(OptionsError::InvalidPartialCollateralParams);
        }
        Ok(())
    }
}
