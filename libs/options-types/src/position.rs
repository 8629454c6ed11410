use soroban_sdk::{contracttype, Address};

/// Option side and collateral kind of a position
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum OptionType {
    LongCall = 0,
    LongPut = 1,
    ShortCallBase = 2,
    ShortCallQuote = 3,
    ShortPutQuote = 4,
}

impl OptionType {
    pub fn is_long(&self) -> bool {
        matches!(self, OptionType::LongCall | OptionType::LongPut)
    }

    pub fn is_short(&self) -> bool {
        !self.is_long()
    }

    pub fn is_call(&self) -> bool {
        matches!(
            self,
            OptionType::LongCall | OptionType::ShortCallBase | OptionType::ShortCallQuote
        )
    }

    /// Short calls backed by the base asset
    pub fn is_base_collateralized(&self) -> bool {
        matches!(self, OptionType::ShortCallBase)
    }
}

/// Lifecycle of a position
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PositionState {
    Empty = 0,
    Active = 1,
    Closed = 2,
    Liquidated = 3,
    Settled = 4,
    Merged = 5,
}

/// A trader's position on one strike
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Position id, assigned from 1 and never reused
    pub id: u32,
    /// Holder of the position
    pub owner: Address,
    /// Strike the position was opened on
    pub strike_id: u32,
    pub option_type: OptionType,
    /// Number of options (1e18)
    pub amount: i128,
    /// Collateral posted, in base for short calls backed by base, else quote (1e18)
    pub collateral: i128,
    pub state: PositionState,
}

/// Outcome of an open, close or collateral change
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeResult {
    pub position_id: u32,
    /// Options traded by this call
    pub amount: i128,
    /// Premium for `amount` at the volatility below (quote, 1e18)
    pub premium: i128,
    /// Volatility used for pricing (board iv * skew)
    pub volatility: i128,
    /// Collateral held by the position after the call
    pub collateral: i128,
    /// Collateral released back to the owner by the call
    pub returned_collateral: i128,
    /// Minimum collateral the position must hold after the call
    pub min_collateral: i128,
}

/// Payout of a position on a settled board
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettlementResult {
    pub position_id: u32,
    /// Intrinsic value paid to a long holder (quote)
    pub payout: i128,
    /// Collateral returned to a short holder after covering the intrinsic value
    pub returned_collateral: i128,
    /// Liability not covered by collateral, in quote
    pub insolvent_amount: i128,
}
