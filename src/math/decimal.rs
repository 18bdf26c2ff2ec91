//! Ray-scaled decimal used for the interest accumulator.

use {
    crate::{
        error::VaultError,
        math::{common::*, Rate},
    },
    alloc::{string::ToString, vec},
    core::fmt,
    odra::casper_types::U256,
};

/// Large decimal values, precise to 27 digits
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Decimal(pub U256);

impl odra::casper_types::bytesrepr::ToBytes for Decimal {
    fn to_bytes(&self) -> Result<alloc::vec::Vec<u8>, odra::casper_types::bytesrepr::Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }
}

impl odra::casper_types::bytesrepr::FromBytes for Decimal {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), odra::casper_types::bytesrepr::Error> {
        let (value, remainder) = U256::from_bytes(bytes)?;
        Ok((Decimal(value), remainder))
    }
}

impl odra::casper_types::CLTyped for Decimal {
    fn cl_type() -> odra::casper_types::CLType {
        odra::casper_types::CLType::U256
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl odra::schema::SchemaEvents for Decimal {}

#[cfg(not(target_arch = "wasm32"))]
impl odra::schema::SchemaErrors for Decimal {}

impl Decimal {
    /// One
    pub fn one() -> Self {
        Self(Self::ray())
    }

    /// Zero
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    fn ray() -> U256 {
        U256::from(RAY)
    }

    /// Raw scaled value
    pub fn to_scaled_val(&self) -> U256 {
        self.0
    }

    /// Create decimal from scaled value
    pub fn from_scaled_val(scaled_val: U256) -> Self {
        Self(scaled_val)
    }

    /// Grow `amount` by the ratio of this value to an earlier `snapshot`,
    /// rounded down: `amount * self / snapshot`.
    pub fn try_rescale(&self, amount: U256, snapshot: Decimal) -> Result<U256, VaultError> {
        mul_div_floor(amount, self.0, snapshot.0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            scaled_val.insert_str(0, &vec!["0"; SCALE - scaled_val.len()].join(""));
            scaled_val.insert_str(0, "0.");
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl From<Rate> for Decimal {
    fn from(rate: Rate) -> Self {
        Self::from_scaled_val(rate.to_scaled_val())
    }
}

impl TryMul<Decimal> for Decimal {
    fn try_mul(self, rhs: Self) -> Result<Self, VaultError> {
        Ok(Self(mul_div_floor(self.0, rhs.0, Self::ray())?))
    }
}

impl TryMul<Rate> for Decimal {
    fn try_mul(self, rhs: Rate) -> Result<Self, VaultError> {
        self.try_mul(Decimal::from(rhs))
    }
}
