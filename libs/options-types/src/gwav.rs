use soroban_sdk::contracttype;

/// One entry of a geometric weighted average history
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Observation {
    /// Accumulated ln(value) * seconds, in 1e18 units
    pub q: i128,
    /// Value in force from `timestamp` onwards (1e18)
    pub next_val: i128,
    /// Ledger timestamp of the observation
    pub timestamp: u64,
}

/// Identifies one GWAV history kept by the market
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GwavKey {
    /// Base implied volatility of a board
    BoardIv(u32),
    /// Skew of a strike
    StrikeSkew(u32),
}
