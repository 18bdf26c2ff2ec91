//! Fixed-point math for interest accrual and valuation

pub mod common;
pub mod decimal;
pub mod rate;

pub use common::{mul_div_ceil, mul_div_floor, TryAdd, TryDiv, TryMul, TrySub};
pub use decimal::Decimal;
pub use rate::Rate;
