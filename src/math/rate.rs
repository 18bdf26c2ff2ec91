//! Per-second interest rate, ray scaled

use {
    crate::{error::VaultError, math::common::*},
    alloc::{format, string::ToString},
    core::fmt,
    odra::casper_types::U256,
};

/// Interest rate as a scaled value
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Rate(pub U256);

impl odra::casper_types::bytesrepr::ToBytes for Rate {
    fn to_bytes(&self) -> Result<alloc::vec::Vec<u8>, odra::casper_types::bytesrepr::Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }
}

impl odra::casper_types::bytesrepr::FromBytes for Rate {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), odra::casper_types::bytesrepr::Error> {
        let (value, remainder) = U256::from_bytes(bytes)?;
        Ok((Rate(value), remainder))
    }
}

impl odra::casper_types::CLTyped for Rate {
    fn cl_type() -> odra::casper_types::CLType {
        odra::casper_types::CLType::U256
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl odra::schema::SchemaEvents for Rate {}

#[cfg(not(target_arch = "wasm32"))]
impl odra::schema::SchemaErrors for Rate {}

impl Rate {
    /// One (100%)
    pub fn one() -> Self {
        Self(Self::ray())
    }

    /// Zero (0%)
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    fn ray() -> U256 {
        U256::from(RAY)
    }

    /// Create rate from percent value (0-100)
    pub fn from_percent(percent: u8) -> Self {
        Self(U256::from(percent as u128 * (RAY / 100)))
    }

    /// Return raw scaled value
    pub fn to_scaled_val(&self) -> U256 {
        self.0
    }

    /// Create rate from scaled value
    pub fn from_scaled_val(scaled_val: U256) -> Self {
        Self(scaled_val)
    }

    /// Compounding factor for one second: `1 + rate`
    pub fn growth_factor(&self) -> Result<Self, VaultError> {
        Self::one().try_add(*self)
    }

    /// Multiply, rounding half up
    fn try_mul_round(self, rhs: Self) -> Result<Self, VaultError> {
        let product = self.0.try_mul(rhs.0)?;
        Ok(Self(product.try_add(U256::from(HALF_RAY))?.try_div(Self::ray())?))
    }

    /// Calculate power by squaring (for compound interest). Every
    /// intermediate product is rounded half up.
    pub fn try_pow(&self, exponent: u64) -> Result<Self, VaultError> {
        let mut base = *self;
        let mut result = if exponent % 2 == 1 { base } else { Self::one() };
        let mut exp = exponent / 2;

        while exp > 0 {
            base = base.try_mul_round(base)?;
            if exp % 2 == 1 {
                result = result.try_mul_round(base)?;
            }
            exp /= 2;
        }

        Ok(result)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            let padding = "0".repeat(SCALE - scaled_val.len());
            scaled_val = format!("0.{}{}", padding, scaled_val);
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl TryAdd for Rate {
    fn try_add(self, rhs: Self) -> Result<Self, VaultError> {
        Ok(Self(self.0.try_add(rhs.0)?))
    }
}

impl TryDiv<u64> for Rate {
    fn try_div(self, rhs: u64) -> Result<Self, VaultError> {
        Ok(Self(self.0.try_div(U256::from(rhs))?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// 10% nominal yearly rate spread over 365 days of seconds
    fn ten_percent_per_second() -> Rate {
        Rate::from_percent(10).try_div(86_400 * 365).unwrap()
    }

    #[test]
    fn test_rate_percent() {
        let rate = Rate::from_percent(5);
        assert_eq!(rate.to_scaled_val(), U256::from(50_000_000_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_rate_pow() {
        let rate = Rate::from_percent(10);
        let squared = rate.try_pow(2).unwrap();
        assert_eq!(squared, Rate::from_percent(1));
        assert_eq!(rate.try_pow(0).unwrap(), Rate::one());
        assert_eq!(rate.try_pow(1).unwrap(), rate);
    }

    #[test]
    fn zero_rate_never_grows() {
        let growth = Rate::zero().growth_factor().unwrap();
        assert_eq!(growth.try_pow(1_000_000).unwrap(), Rate::one());
    }

    #[test]
    fn compounds_a_year_of_seconds() {
        let rate = ten_percent_per_second();
        assert_eq!(rate.to_scaled_val(), U256::from(3_170_979_198_376_458_650u128));

        let growth = rate.growth_factor().unwrap().try_pow(86_400 * 365).unwrap();
        assert_eq!(
            growth.to_scaled_val(),
            U256::from_dec_str("1105170917900423925599112509").unwrap()
        );
        assert_eq!(growth.to_string(), "1.105170917900423925599112509");
    }

    #[test]
    fn pow_overflow_is_an_error() {
        let huge = Rate::from_scaled_val(U256::max_value() / U256::from(2u64));
        assert!(matches!(huge.try_pow(2), Err(VaultError::MathOverflow)));
    }
}
