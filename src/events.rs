//! Events emitted by the vault

use odra::{casper_types::U256, prelude::*};

#[odra::event]
pub struct Deposit {
    pub sender: Address,
    pub owner: Address,
    pub assets: U256,
    pub shares: U256,
}

#[odra::event]
pub struct Withdraw {
    pub sender: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: U256,
    pub shares: U256,
}

/// Debt of `account` grew by `assets`
#[odra::event]
pub struct Borrow {
    pub account: Address,
    pub assets: U256,
}

/// Debt of `account` shrank by `assets`
#[odra::event]
pub struct Repay {
    pub account: Address,
    pub assets: U256,
}

/// Shares moved between two holders without touching the supply
#[odra::event]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub shares: U256,
}

#[odra::event]
pub struct Liquidate {
    pub liquidator: Address,
    pub violator: Address,
    pub collateral: Address,
    pub repay_assets: U256,
    pub seize_assets: U256,
}

#[odra::event]
pub struct InterestAccrued {
    pub interest_accumulator: U256,
    pub total_borrowed: U256,
    pub elapsed: u64,
}

#[odra::event]
pub struct CollateralFactorSet {
    pub asset: Address,
    pub collateral_factor: u8,
}

/// An owner-only setting changed. `setting` is the setter's name.
#[odra::event]
pub struct ConfigUpdated {
    pub setting: String,
    pub updated_by: Address,
}

#[odra::event]
pub struct VaultStatusChecked {
    pub total_supply_assets: U256,
    pub total_borrowed: U256,
    pub interest_rate: U256,
}
