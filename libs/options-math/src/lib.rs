#![no_std]

pub mod black_scholes;
pub mod collateral;
pub mod decimal_math;
pub mod fixed_point_math;
pub mod greeks;
pub mod gwav;
pub mod invariants;
pub mod liquidation;
pub mod settlement;

pub use black_scholes::*;
pub use collateral::*;
pub use decimal_math::*;
pub use fixed_point_math::*;
pub use greeks::*;
pub use liquidation::*;
pub use settlement::*;
