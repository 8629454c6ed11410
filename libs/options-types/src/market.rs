use soroban_sdk::{contracttype, Vec};

/// A set of strikes sharing one expiry and base implied volatility
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    /// Board id, assigned from 1 and never reused
    pub id: u32,
    /// Expiry timestamp
    pub expiry: u64,
    /// Base implied volatility (1e18)
    pub iv: i128,
    /// Frozen boards reject trades but accept iv and skew updates
    pub frozen: bool,
    /// Ids of the strikes listed on this board
    pub strike_ids: Vec<u32>,
    /// Set once the board has been settled at expiry
    pub settled: bool,
    /// Spot price recorded at settlement (0 until settled)
    pub spot_at_expiry: i128,
}

impl Board {
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiry
    }

    /// Seconds left until expiry, zero once expired
    pub fn time_to_expiry(&self, now: u64) -> u64 {
        self.expiry.saturating_sub(now)
    }
}

/// A listed strike with the open interest traded against it
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Strike {
    /// Strike id, assigned from 1 and never reused
    pub id: u32,
    /// Parent board id
    pub board_id: u32,
    /// Strike price (1e18)
    pub strike_price: i128,
    /// Multiplier applied to the board iv (1e18)
    pub skew: i128,
    /// Open long calls
    pub long_call: i128,
    /// Open short calls collateralised in base
    pub short_call_base: i128,
    /// Open short calls collateralised in quote
    pub short_call_quote: i128,
    /// Open long puts
    pub long_put: i128,
    /// Open short puts
    pub short_put: i128,
}

impl Strike {
    pub fn new(id: u32, board_id: u32, strike_price: i128, skew: i128) -> Self {
        Self {
            id,
            board_id,
            strike_price,
            skew,
            long_call: 0,
            short_call_base: 0,
            short_call_quote: 0,
            long_put: 0,
            short_put: 0,
        }
    }

    /// Net call exposure held by traders
    pub fn call_exposure(&self) -> i128 {
        self.long_call - self.short_call_base - self.short_call_quote
    }

    /// Net put exposure held by traders
    pub fn put_exposure(&self) -> i128 {
        self.long_put - self.short_put
    }
}
