use soroban_sdk::contracterror;

/// Errors surfaced by the options libraries and contracts.
///
/// Codes are grouped by range so callers can branch on the failure kind:
/// 1-19 configuration, 20-39 math, 40-59 GWAV, 60-79 boards and strikes,
/// 80-99 positions.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OptionsError {
    // === Configuration ===
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidGreekCacheParams = 3,
    InvalidMinCollateralParams = 4,
    InvalidPartialCollateralParams = 5,
    InvalidSpotPrice = 6,
    SpotPriceNotSet = 7,
    MarketCallFailed = 8,

    // === Math ===
    LnOfNonPositive = 20,
    ExpOverflow = 21,
    MathOverflow = 22,
    InvalidBlackScholesInput = 23,

    // === GWAV ===
    GwavNotInitialized = 40,
    InvalidTimestamp = 41,
    InvalidGwavPeriod = 42,

    // === Boards and strikes ===
    BoardNotFound = 60,
    StrikeNotFound = 61,
    InvalidExpiry = 62,
    InvalidBaseIv = 63,
    InvalidSkew = 64,
    InvalidStrikePrice = 65,
    StrikeArrayLengthMismatch = 66,
    TooManyStrikes = 67,
    BoardFrozen = 68,
    BoardNotFrozen = 69,
    BoardExpired = 70,
    BoardNotExpired = 71,
    BoardAlreadySettled = 72,
    BoardNotSettled = 73,

    // === Positions ===
    PositionNotFound = 80,
    PositionNotActive = 81,
    InvalidAmount = 82,
    InvalidCollateral = 83,
    InsufficientCollateral = 84,
    NotShortPosition = 85,
    NotLiquidatable = 86,
    NotPositionOwner = 87,
    MergeMismatch = 88,
    NothingToMerge = 89,
    FullCloseWithCollateral = 90,
}
