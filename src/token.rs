//! Fungible token interface and a minimal CEP-18 style token

use {
    crate::{error::VaultError, math::TryAdd},
    odra::{casper_types::U256, prelude::*},
};

/// The subset of CEP-18 the vault and the controller use
#[odra::external_contract]
pub trait Cep18 {
    fn decimals(&self) -> u8;
    fn balance_of(&self, address: Address) -> U256;
    fn transfer(&mut self, recipient: Address, amount: U256);
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
}

/// Token with open minting, for tests and local deployments
#[odra::module]
pub struct MockToken {
    decimals: Var<u8>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl MockToken {
    pub fn init(&mut self, decimals: u8) {
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn mint(&mut self, owner: Address, amount: U256) {
        let supply = self.checked(self.total_supply().try_add(amount));
        let balance = self.checked(self.balance_of(owner).try_add(amount));
        self.total_supply.set(supply);
        self.balances.set(&owner, balance);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let sender = self.env().caller();
        self.move_tokens(sender, recipient, amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            self.env().revert(VaultError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), allowance - amount);
        self.move_tokens(owner, recipient, amount);
    }

    fn move_tokens(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(VaultError::InsufficientBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.checked(self.balance_of(to).try_add(amount));
        self.balances.set(&to, to_balance);
    }

    fn checked(&self, result: Result<U256, VaultError>) -> U256 {
        result.unwrap_or_else(|error| self.env().revert(error))
    }
}
