//! Account controller interface and a reference implementation.
//!
//! The controller owns the per-account registrations (enabled collaterals and
//! the controlling vault) and the deferral of status checks. Outside a batch
//! checks run inside the vault operation; inside a batch they are queued and
//! replayed on the vaults when the batch ends.

use {
    crate::{error::VaultError, token::Cep18ContractRef},
    odra::{casper_types::U256, prelude::*, ContractRef},
};

/// Registration and check-deferral services consumed by the vault
#[odra::external_contract]
pub trait AccountController {
    fn are_checks_deferred(&self) -> bool;
    fn is_account_status_check_deferred(&self, account: Address) -> bool;
    fn is_controller_enabled(&self, account: Address, vault: Address) -> bool;
    fn is_collateral_enabled(&self, account: Address, vault: Address) -> bool;
    fn get_collaterals(&self, account: Address) -> Vec<Address>;
    fn require_account_and_vault_status_check(&mut self, account: Option<Address>);
    fn forgive_account_status_check(&mut self, account: Address);
    fn control_collateral(&mut self, collateral: Address, from: Address, to: Address, amount: U256);
    fn disable_controller(&mut self, account: Address);
}

/// Callbacks the controller invokes on a vault to finish deferred checks
#[odra::external_contract]
pub trait StatusCheckTarget {
    fn check_account_status(&mut self, account: Address, collaterals: Vec<Address>);
    fn check_vault_status(&mut self);
}

#[odra::module]
pub struct MockController {
    collaterals: Mapping<Address, Vec<Address>>,
    controllers: Mapping<Address, Option<Address>>,
    batch: Var<bool>,
    /// (vault, account) pairs awaiting an account check
    pending_accounts: Var<Vec<(Address, Address)>>,
    pending_vaults: Var<Vec<Address>>,
}

#[odra::module]
impl MockController {
    pub fn init(&mut self) {
        self.batch.set(false);
    }

    pub fn enable_collateral(&mut self, vault: Address) {
        let account = self.env().caller();
        let mut collaterals = self.get_collaterals(account);
        if !collaterals.contains(&vault) {
            collaterals.push(vault);
            self.collaterals.set(&account, collaterals);
        }
    }

    pub fn disable_collateral(&mut self, vault: Address) {
        let account = self.env().caller();
        let mut collaterals = self.get_collaterals(account);
        collaterals.retain(|enabled| *enabled != vault);
        self.collaterals.set(&account, collaterals);
    }

    pub fn enable_controller(&mut self, vault: Address) {
        let account = self.env().caller();
        self.controllers.set(&account, Some(vault));
    }

    /// Called by the controlling vault to release `account`
    pub fn disable_controller(&mut self, account: Address) {
        self.require_controller_of(account);
        self.controllers.set(&account, None);
    }

    pub fn get_collaterals(&self, account: Address) -> Vec<Address> {
        self.collaterals.get(&account).unwrap_or_default()
    }

    pub fn get_controller(&self, account: Address) -> Option<Address> {
        self.controllers.get(&account).flatten()
    }

    pub fn is_collateral_enabled(&self, account: Address, vault: Address) -> bool {
        self.get_collaterals(account).contains(&vault)
    }

    pub fn is_controller_enabled(&self, account: Address, vault: Address) -> bool {
        self.get_controller(account) == Some(vault)
    }

    pub fn begin_batch(&mut self) {
        self.batch.set(true);
    }

    /// Leave batch mode and replay queued checks: accounts first, then vaults
    pub fn end_batch(&mut self) {
        self.batch.set(false);
        let accounts = self.pending_accounts.get_or_default();
        let vaults = self.pending_vaults.get_or_default();
        self.pending_accounts.set(Vec::new());
        self.pending_vaults.set(Vec::new());

        for (vault, account) in accounts {
            let collaterals = self.get_collaterals(account);
            StatusCheckTargetContractRef::new(self.env(), vault)
                .check_account_status(account, collaterals);
        }
        for vault in vaults {
            StatusCheckTargetContractRef::new(self.env(), vault).check_vault_status();
        }
    }

    pub fn are_checks_deferred(&self) -> bool {
        self.batch.get_or_default()
    }

    pub fn is_account_status_check_deferred(&self, account: Address) -> bool {
        self.pending_accounts
            .get_or_default()
            .iter()
            .any(|(_, pending)| *pending == account)
    }

    pub fn is_vault_status_check_deferred(&self, vault: Address) -> bool {
        self.pending_vaults.get_or_default().contains(&vault)
    }

    /// Queue a vault check for the caller and, if given, an account check
    pub fn require_account_and_vault_status_check(&mut self, account: Option<Address>) {
        let vault = self.env().caller();
        if let Some(account) = account {
            self.queue_account_check(vault, account);
        }
        let mut vaults = self.pending_vaults.get_or_default();
        if !vaults.contains(&vault) {
            vaults.push(vault);
            self.pending_vaults.set(vaults);
        }
    }

    /// Drop the queued check of `account`. Only its controller may do so.
    pub fn forgive_account_status_check(&mut self, account: Address) {
        self.require_controller_of(account);
        let mut accounts = self.pending_accounts.get_or_default();
        accounts.retain(|(_, pending)| *pending != account);
        self.pending_accounts.set(accounts);
    }

    /// Move `amount` of an enabled collateral token out of `from` on behalf
    /// of its controller. Spends the allowance `from` granted this contract.
    pub fn control_collateral(&mut self, collateral: Address, from: Address, to: Address, amount: U256) {
        let vault = self.require_controller_of(from);
        if !self.is_collateral_enabled(from, collateral) {
            self.env().revert(VaultError::CollateralDisabled);
        }
        Cep18ContractRef::new(self.env(), collateral).transfer_from(from, to, amount);
        if self.are_checks_deferred() {
            self.queue_account_check(vault, from);
        }
    }

    fn require_controller_of(&self, account: Address) -> Address {
        let caller = self.env().caller();
        if !self.is_controller_enabled(account, caller) {
            self.env().revert(VaultError::NotController);
        }
        caller
    }

    fn queue_account_check(&mut self, vault: Address, account: Address) {
        let mut accounts = self.pending_accounts.get_or_default();
        if !accounts.contains(&(vault, account)) {
            accounts.push((vault, account));
            self.pending_accounts.set(accounts);
        }
    }
}
