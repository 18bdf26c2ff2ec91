//! Vault status checks.
//!
//! A mutating operation snapshots the vault aggregates, mutates, and then
//! either checks right away or leaves the snapshot pending until the
//! controller calls back at the end of its batch. Only the first operation of
//! a batch takes the snapshot, so caps compare against the state before the
//! whole batch.

use {
    crate::{
        error::VaultError,
        state::{valuate, Market, Valuation},
    },
    odra::{casper_types::U256, prelude::*},
};

/// Vault aggregates a status check compares against
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct VaultSnapshot {
    pub total_supply_assets: U256,
    pub total_borrowed: U256,
}

/// Where the vault is in the snapshot protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaultStatus {
    Clean,
    SnapshotTaken,
    Checked,
    CheckDeferred,
}

/// Proof that an operation opened the protocol. Consumed when it ends.
#[must_use]
#[derive(Debug)]
pub struct SnapshotTaken {
    snapshot: VaultSnapshot,
}

impl SnapshotTaken {
    pub fn snapshot(&self) -> &VaultSnapshot {
        &self.snapshot
    }
}

/// Result of ending an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Run the checks now against this snapshot
    Now(VaultSnapshot),
    /// The controller will call back later
    Deferred,
}

/// In-memory view of the pending snapshot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusCheck {
    pending: Option<VaultSnapshot>,
    status: VaultStatus,
}

impl StatusCheck {
    /// Rebuild from storage. A stored snapshot means an earlier operation of
    /// the current batch deferred its check.
    pub fn load(pending: Option<VaultSnapshot>) -> Self {
        let status = if pending.is_some() {
            VaultStatus::CheckDeferred
        } else {
            VaultStatus::Clean
        };
        Self { pending, status }
    }

    pub fn status(&self) -> VaultStatus {
        self.status
    }

    pub fn pending(&self) -> Option<VaultSnapshot> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Keep the earliest snapshot of the batch, take one otherwise
    pub fn begin(&mut self, current: VaultSnapshot) -> SnapshotTaken {
        let snapshot = *self.pending.get_or_insert(current);
        self.status = VaultStatus::SnapshotTaken;
        SnapshotTaken { snapshot }
    }

    /// Close the operation opened by `token`
    pub fn end(&mut self, token: SnapshotTaken, deferred: bool) -> CheckOutcome {
        if deferred {
            self.status = VaultStatus::CheckDeferred;
            return CheckOutcome::Deferred;
        }
        self.pending = None;
        self.status = VaultStatus::Checked;
        CheckOutcome::Now(token.snapshot)
    }

    /// Consume the pending snapshot when the controller calls back
    pub fn complete(&mut self) -> Result<VaultSnapshot, VaultError> {
        let snapshot = self.pending.take().ok_or(VaultError::SnapshotNotTaken)?;
        self.status = VaultStatus::Checked;
        Ok(snapshot)
    }
}

fn cap_violated(cap: U256, before: U256, after: U256) -> bool {
    !cap.is_zero() && after > cap && after > before
}

/// A zero cap is no cap. A figure already above its cap may still shrink.
pub fn check_caps(
    snapshot: &VaultSnapshot,
    current: &VaultSnapshot,
    supply_cap: U256,
    borrow_cap: U256,
) -> Result<(), VaultError> {
    if cap_violated(
        supply_cap,
        snapshot.total_supply_assets,
        current.total_supply_assets,
    ) {
        return Err(VaultError::SupplyCapExceeded);
    }
    if cap_violated(borrow_cap, snapshot.total_borrowed, current.total_borrowed) {
        return Err(VaultError::BorrowCapExceeded);
    }
    Ok(())
}

/// Account check: the liability must be covered by risk-adjusted collateral
pub fn check_account<M: Market>(
    market: &M,
    account: &Address,
    liability_assets: U256,
    collaterals: &[Address],
) -> Result<Valuation, VaultError> {
    let valuation = valuate(market, account, liability_assets, collaterals, true)?;
    if !valuation.is_healthy() {
        log::info!(
            "account {:?} unhealthy: liability {} above collateral {}",
            account,
            valuation.liability_value,
            valuation.collateral_value
        );
        return Err(VaultError::AccountUnhealthy);
    }
    Ok(valuation)
}
