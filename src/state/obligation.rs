//! Per-account debt

use {
    crate::{
        error::VaultError,
        math::{Decimal, TryAdd, TrySub},
    },
    odra::casper_types::U256,
};

/// Debt of one account, recorded against the accumulator value at its last
/// change. The live amount is `owed * current / snapshot_accumulator`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Obligation {
    /// Owed assets as of the snapshot
    pub owed: U256,
    /// Accumulator value when `owed` was last written
    pub snapshot_accumulator: Decimal,
}

impl Obligation {
    /// Debt of `owed` recorded at `snapshot_accumulator`
    pub fn new(owed: U256, snapshot_accumulator: Decimal) -> Self {
        Self {
            owed,
            snapshot_accumulator,
        }
    }

    /// No debt recorded
    pub fn is_empty(&self) -> bool {
        self.owed.is_zero()
    }

    /// Live debt, rounded down
    pub fn debt(&self, accumulator: Decimal) -> Result<U256, VaultError> {
        if self.is_empty() {
            return Ok(U256::zero());
        }
        accumulator.try_rescale(self.owed, self.snapshot_accumulator)
    }

    /// Add borrowed assets on top of the live debt
    pub fn borrow(&mut self, assets: U256, accumulator: Decimal) -> Result<(), VaultError> {
        self.owed = self.debt(accumulator)?.try_add(assets)?;
        self.snapshot_accumulator = accumulator;
        Ok(())
    }

    /// Settle part of the live debt
    pub fn repay(&mut self, assets: U256, accumulator: Decimal) -> Result<(), VaultError> {
        let debt = self.debt(accumulator)?;
        if assets > debt {
            return Err(VaultError::RepayAssetsExceeded);
        }
        self.owed = debt.try_sub(assets)?;
        self.snapshot_accumulator = accumulator;
        Ok(())
    }
}
