use soroban_sdk::contracttype;

/// Black-Scholes inputs at the public 1e18 scale
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlackScholesInputs {
    pub time_to_expiry_sec: u64,
    pub volatility: i128,
    pub spot: i128,
    pub strike_price: i128,
    pub rate: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PricesAndDelta {
    pub call_price: i128,
    pub put_price: i128,
    pub call_delta: i128,
    pub put_delta: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PricesDeltaStdVega {
    pub call_price: i128,
    pub put_price: i128,
    pub call_delta: i128,
    pub put_delta: i128,
    pub vega: i128,
    /// Vega normalised to a 30 day option, per 1% of volatility
    pub std_vega: i128,
}

/// Cached pricing of one strike
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StrikeGreeks {
    pub strike_id: u32,
    /// Board iv * skew
    pub volatility: i128,
    pub call_price: i128,
    pub put_price: i128,
    pub call_delta: i128,
    pub put_delta: i128,
    pub std_vega: i128,
    pub updated_at: u64,
}

/// Net greeks of all open interest, from the traders' side
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetGreeks {
    pub net_delta: i128,
    pub net_std_vega: i128,
    pub net_option_value: i128,
}

/// Cached net greeks of one board
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BoardGreeks {
    pub board_id: u32,
    pub spot_price: i128,
    pub net: NetGreeks,
    pub updated_at: u64,
}
