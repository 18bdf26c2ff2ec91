//! Owner-controlled market configuration

use {
    crate::{
        error::VaultError,
        events::{CollateralFactorSet, ConfigUpdated},
        state::COLLATERAL_FACTOR_SCALE,
    },
    odra::{casper_types::U256, prelude::*},
};

/// Collaborator references, collateral factors and caps of the vault
#[odra::module(events = [CollateralFactorSet, ConfigUpdated])]
pub struct MarketConfig {
    owner: Var<Address>,
    irm: Var<Address>,
    oracle: Var<Address>,
    reference_asset: Var<Address>,
    collateral_factors: Mapping<Address, u8>,
    supply_cap: Var<U256>,
    borrow_cap: Var<U256>,
}

#[odra::module]
impl MarketConfig {
    /// Store the initial configuration. The owner is the deployer.
    pub fn init(&mut self, owner: Address, irm: Address, oracle: Address, reference_asset: Address) {
        self.owner.set(owner);
        self.irm.set(irm);
        self.oracle.set(oracle);
        self.reference_asset.set(reference_asset);
        self.supply_cap.set(U256::zero());
        self.borrow_cap.set(U256::zero());
    }

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(VaultError::Unauthorized);
        }
    }

    /// Point the vault at another interest rate model
    pub fn set_irm(&mut self, irm: Address) {
        self.require_owner();
        self.irm.set(irm);
        self.updated("set_irm");
    }

    /// Point the vault at another price oracle
    pub fn set_oracle(&mut self, oracle: Address) {
        self.require_owner();
        self.oracle.set(oracle);
        self.updated("set_oracle");
    }

    /// Change the unit every value is quoted in
    pub fn set_reference_asset(&mut self, reference_asset: Address) {
        self.require_owner();
        self.reference_asset.set(reference_asset);
        self.updated("set_reference_asset");
    }

    /// Set the collateral factor of `asset`, in percent. Zero removes the
    /// asset from valuations and liquidations.
    pub fn set_collateral_factor(&mut self, asset: Address, collateral_factor: u8) {
        self.require_owner();
        if collateral_factor > COLLATERAL_FACTOR_SCALE {
            self.env().revert(VaultError::InvalidCollateralFactor);
        }
        self.collateral_factors.set(&asset, collateral_factor);
        self.env().emit_event(CollateralFactorSet {
            asset,
            collateral_factor,
        });
    }

    /// Cap total supplied assets. Zero disables the cap.
    pub fn set_supply_cap(&mut self, supply_cap: U256) {
        self.require_owner();
        self.supply_cap.set(supply_cap);
        self.updated("set_supply_cap");
    }

    /// Cap total borrowed assets. Zero disables the cap.
    pub fn set_borrow_cap(&mut self, borrow_cap: U256) {
        self.require_owner();
        self.borrow_cap.set(borrow_cap);
        self.updated("set_borrow_cap");
    }

    /// Hand the configuration rights to `new_owner`
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.owner.set(new_owner);
        self.updated("transfer_ownership");
    }

    pub fn owner(&self) -> Address {
        self.owner.get_or_revert_with(VaultError::NotInitialized)
    }

    pub fn irm(&self) -> Address {
        self.irm.get_or_revert_with(VaultError::NotInitialized)
    }

    pub fn oracle(&self) -> Address {
        self.oracle.get_or_revert_with(VaultError::NotInitialized)
    }

    pub fn reference_asset(&self) -> Address {
        self.reference_asset.get_or_revert_with(VaultError::NotInitialized)
    }

    pub fn collateral_factor(&self, asset: Address) -> u8 {
        self.collateral_factors.get(&asset).unwrap_or_default()
    }

    pub fn supply_cap(&self) -> U256 {
        self.supply_cap.get_or_default()
    }

    pub fn borrow_cap(&self) -> U256 {
        self.borrow_cap.get_or_default()
    }

    fn updated(&self, setting: &str) {
        self.env().emit_event(ConfigUpdated {
            setting: setting.into(),
            updated_by: self.env().caller(),
        });
    }
}
