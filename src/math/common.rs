//! Common module for Decimal and Rate
//!
//! Contains shared scalers, arithmetic trait definitions and the rounding
//! helpers used for share and debt conversions.

use {crate::error::VaultError, odra::casper_types::U256};

/// Scale of precision
pub const SCALE: usize = 27;
/// Identity
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;
/// Half of identity
pub const HALF_RAY: u128 = 500_000_000_000_000_000_000_000_000;

/// Try to subtract, return an error on underflow
pub trait TrySub: Sized {
    /// Subtract
    fn try_sub(self, rhs: Self) -> Result<Self, VaultError>;
}

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, VaultError>;
}

/// Try to divide, return an error on overflow or divide by zero
pub trait TryDiv<RHS>: Sized {
    /// Divide
    fn try_div(self, rhs: RHS) -> Result<Self, VaultError>;
}

/// Try to multiply, return an error on overflow
pub trait TryMul<RHS>: Sized {
    /// Multiply
    fn try_mul(self, rhs: RHS) -> Result<Self, VaultError>;
}

impl TryAdd for U256 {
    fn try_add(self, rhs: Self) -> Result<Self, VaultError> {
        self.checked_add(rhs).ok_or(VaultError::MathOverflow)
    }
}

impl TrySub for U256 {
    fn try_sub(self, rhs: Self) -> Result<Self, VaultError> {
        self.checked_sub(rhs).ok_or(VaultError::MathOverflow)
    }
}

impl TryMul<U256> for U256 {
    fn try_mul(self, rhs: U256) -> Result<Self, VaultError> {
        self.checked_mul(rhs).ok_or(VaultError::MathOverflow)
    }
}

impl TryDiv<U256> for U256 {
    fn try_div(self, rhs: U256) -> Result<Self, VaultError> {
        self.checked_div(rhs).ok_or(VaultError::MathOverflow)
    }
}

/// `a * b / c`, rounded down
pub fn mul_div_floor(a: U256, b: U256, c: U256) -> Result<U256, VaultError> {
    a.try_mul(b)?.try_div(c)
}

/// `a * b / c`, rounded up
pub fn mul_div_ceil(a: U256, b: U256, c: U256) -> Result<U256, VaultError> {
    let product = a.try_mul(b)?;
    let quotient = product.try_div(c)?;
    if product % c == U256::zero() {
        Ok(quotient)
    } else {
        quotient.try_add(U256::one())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mul_div_rounding() {
        let (a, b, c) = (U256::from(10u64), U256::from(3u64), U256::from(4u64));
        assert_eq!(mul_div_floor(a, b, c).ok(), Some(U256::from(7u64)));
        assert_eq!(mul_div_ceil(a, b, c).ok(), Some(U256::from(8u64)));
        assert_eq!(mul_div_ceil(a, c, U256::from(2u64)).ok(), Some(U256::from(20u64)));
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(matches!(
            U256::max_value().try_mul(U256::from(2u64)),
            Err(VaultError::MathOverflow)
        ));
        assert!(matches!(
            mul_div_floor(U256::one(), U256::one(), U256::zero()),
            Err(VaultError::MathOverflow)
        ));
        assert!(matches!(
            U256::zero().try_sub(U256::one()),
            Err(VaultError::MathOverflow)
        ));
    }
}
