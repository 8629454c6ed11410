#![no_std]

mod error;
mod gwav;
mod liquidation;
mod market;
mod params;
mod position;
mod pricing;

pub use error::*;
pub use gwav::*;
pub use liquidation::*;
pub use market::*;
pub use params::*;
pub use position::*;
pub use pricing::*;

/// Public fixed-point unit (18 decimals)
pub const DECIMAL_UNIT: i128 = 1_000_000_000_000_000_000;

/// High precision fixed-point unit (27 decimals) used inside pricing
pub const PRECISE_UNIT: i128 = 1_000_000_000_000_000_000_000_000_000;

/// Factor between the two scales
pub const UNIT_TO_PRECISE: i128 = 1_000_000_000;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// 365 days
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Maximum number of items returned by a paginated view.
/// Keeps reads well within Soroban's 100 entry read limit.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Hard ceiling on `max_strikes_per_board`.
/// A full board refresh prices every strike (~5M CPU instructions each), and
/// it has to fit Soroban's 100M instruction transaction budget.
pub const MAX_STRIKES_PER_BOARD: u32 = 10;
