//! Price oracle interface and an owner-fed implementation

use {
    crate::{error::VaultError, math::mul_div_floor},
    odra::{casper_types::U256, prelude::*},
};

/// Quote interface the vault prices through
#[odra::external_contract]
pub trait PriceOracle {
    /// Convert `amount` of `base` into units of `quote`. Reverts when the
    /// pair is unknown.
    fn get_quote(&self, amount: U256, base: Address, quote: Address) -> U256;
}

/// Price of one whole base unit, in quote units
#[odra::odra_type]
pub struct PriceEntry {
    pub base_decimals: u8,
    pub price: U256,
}

/// Oracle with prices set by its owner
#[odra::module]
pub struct MockPriceOracle {
    owner: Var<Address>,
    prices: Mapping<(Address, Address), PriceEntry>,
}

#[odra::module]
impl MockPriceOracle {
    pub fn init(&mut self) {
        self.owner.set(self.env().caller());
    }

    /// Publish the `quote` value of one whole `base` token
    pub fn set_price(&mut self, base: Address, quote: Address, base_decimals: u8, price: U256) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(VaultError::Unauthorized);
        }
        self.prices.set(
            &(base, quote),
            PriceEntry {
                base_decimals,
                price,
            },
        );
    }

    pub fn get_quote(&self, amount: U256, base: Address, quote: Address) -> U256 {
        if base == quote {
            return amount;
        }
        let entry = self
            .prices
            .get(&(base, quote))
            .unwrap_or_else(|| self.env().revert(VaultError::PriceNotAvailable));
        let unit = U256::exp10(entry.base_decimals as usize);
        mul_div_floor(amount, entry.price, unit).unwrap_or_else(|error| self.env().revert(error))
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        odra::host::{Deployer, NoArgs},
    };

    #[test]
    fn quotes_at_the_base_decimal_unit() {
        let env = odra_test::env();
        let (usdc, weth) = (env.get_account(5), env.get_account(6));
        let mut oracle = MockPriceOracle::deploy(&env, NoArgs);
        // 1 weth (18 decimals) = 3_000 usdc (6 decimals)
        oracle.set_price(weth, usdc, 18, U256::from(3_000_000_000u64));

        let half = U256::exp10(17) * U256::from(5u64);
        assert_eq!(oracle.get_quote(half, weth, usdc), U256::from(1_500_000_000u64));
        assert_eq!(oracle.get_quote(half, weth, weth), half);
    }

    #[test]
    fn unknown_pair_fails_closed() {
        let env = odra_test::env();
        let (usdc, weth) = (env.get_account(5), env.get_account(6));
        let oracle = MockPriceOracle::deploy(&env, NoArgs);
        assert_eq!(
            oracle.try_get_quote(U256::one(), usdc, weth),
            Err(VaultError::PriceNotAvailable.into())
        );
    }

    #[test]
    fn only_the_owner_publishes() {
        let env = odra_test::env();
        let (usdc, weth) = (env.get_account(5), env.get_account(6));
        let mut oracle = MockPriceOracle::deploy(&env, NoArgs);
        env.set_caller(env.get_account(1));
        assert_eq!(
            oracle.try_set_price(weth, usdc, 18, U256::one()),
            Err(VaultError::Unauthorized.into())
        );
    }
}
