//! Account valuation in reference asset terms

use {
    crate::{
        error::VaultError,
        math::{mul_div_floor, TryAdd},
        state::COLLATERAL_FACTOR_SCALE,
    },
    odra::{casper_types::U256, prelude::*},
};

/// Everything the engines need to know about the outside world. The vault
/// implements it over its own storage and collaborator contracts; tests
/// implement it in memory.
pub trait Market {
    /// Borrowed asset of the vault
    fn asset(&self) -> Address;

    /// Unit of account for every value comparison
    fn reference_asset(&self) -> Address;

    /// Collateral factor of `asset`, 0 when not recognized
    fn collateral_factor(&self, asset: &Address) -> u8;

    /// Balance of `account` in `asset`
    fn balance_of(&self, asset: &Address, account: &Address) -> Result<U256, VaultError>;

    /// Decimals of `asset`
    fn decimals(&self, asset: &Address) -> Result<u8, VaultError>;

    /// Convert `amount` of `base` into units of `quote`
    fn quote(&self, amount: U256, base: &Address, quote: &Address) -> Result<U256, VaultError>;
}

/// Liability and risk-adjusted collateral of one account
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct Valuation {
    /// Live debt in borrowed asset units
    pub liability_assets: U256,
    /// Live debt in reference asset units
    pub liability_value: U256,
    /// Sum of collateral values weighted by their collateral factors
    pub collateral_value: U256,
}

impl Valuation {
    /// Collateral covers the liability
    pub fn is_healthy(&self) -> bool {
        self.liability_value <= self.collateral_value
    }
}

/// Value `account` with its live debt of `liability_assets`.
///
/// With `skip_if_no_liability` set, an account without debt is valued at zero
/// without consulting the oracle.
pub fn valuate<M: Market>(
    market: &M,
    account: &Address,
    liability_assets: U256,
    collaterals: &[Address],
    skip_if_no_liability: bool,
) -> Result<Valuation, VaultError> {
    if liability_assets.is_zero() && skip_if_no_liability {
        return Ok(Valuation::default());
    }

    let reference = market.reference_asset();
    let liability_value = if liability_assets.is_zero() {
        U256::zero()
    } else {
        market.quote(liability_assets, &market.asset(), &reference)?
    };

    let mut collateral_value = U256::zero();
    for collateral in collaterals {
        let factor = market.collateral_factor(collateral);
        if factor == 0 {
            continue;
        }
        let balance = market.balance_of(collateral, account)?;
        if balance.is_zero() {
            continue;
        }
        let value = market.quote(balance, collateral, &reference)?;
        collateral_value = collateral_value.try_add(mul_div_floor(
            value,
            U256::from(factor),
            U256::from(COLLATERAL_FACTOR_SCALE),
        )?)?;
    }

    let valuation = Valuation {
        liability_assets,
        liability_value,
        collateral_value,
    };
    log::debug!(
        "valuation of {:?}: liability {} ({} assets), collateral {}",
        account,
        valuation.liability_value,
        valuation.liability_assets,
        valuation.collateral_value
    );
    Ok(valuation)
}

#[cfg(test)]
pub(crate) mod test {
    use {super::*, core::cell::Cell};

    /// In-memory market with 18 decimal assets and per-asset prices in
    /// reference units per whole token
    pub struct FakeMarket {
        pub asset: Address,
        pub reference: Address,
        pub factors: Vec<(Address, u8)>,
        pub balances: Vec<(Address, Address, U256)>,
        pub prices: Vec<(Address, U256)>,
        pub quotes: Cell<usize>,
    }

    pub fn wad(units: u64) -> U256 {
        U256::from(units) * U256::exp10(18)
    }

    impl FakeMarket {
        pub fn new(asset: Address, reference: Address) -> Self {
            Self {
                asset,
                reference,
                factors: Vec::new(),
                balances: Vec::new(),
                prices: vec![(asset, wad(1)), (reference, wad(1))],
                quotes: Cell::new(0),
            }
        }

        pub fn with_collateral(mut self, asset: Address, factor: u8, price: U256) -> Self {
            self.factors.push((asset, factor));
            self.prices.push((asset, price));
            self
        }

        pub fn with_balance(mut self, asset: Address, account: Address, amount: U256) -> Self {
            self.balances.push((asset, account, amount));
            self
        }
    }

    impl Market for FakeMarket {
        fn asset(&self) -> Address {
            self.asset
        }

        fn reference_asset(&self) -> Address {
            self.reference
        }

        fn collateral_factor(&self, asset: &Address) -> u8 {
            self.factors
                .iter()
                .find(|(a, _)| a == asset)
                .map(|(_, f)| *f)
                .unwrap_or_default()
        }

        fn balance_of(&self, asset: &Address, account: &Address) -> Result<U256, VaultError> {
            Ok(self
                .balances
                .iter()
                .find(|(a, o, _)| a == asset && o == account)
                .map(|(_, _, b)| *b)
                .unwrap_or_default())
        }

        fn decimals(&self, _asset: &Address) -> Result<u8, VaultError> {
            Ok(18)
        }

        fn quote(&self, amount: U256, base: &Address, quote: &Address) -> Result<U256, VaultError> {
            self.quotes.set(self.quotes.get() + 1);
            let price_of = |asset: &Address| {
                self.prices
                    .iter()
                    .find(|(a, _)| a == asset)
                    .map(|(_, p)| *p)
                    .ok_or(VaultError::PriceNotAvailable)
            };
            let value = mul_div_floor(amount, price_of(base)?, wad(1))?;
            mul_div_floor(value, wad(1), price_of(quote)?)
        }
    }

    pub struct Accounts {
        pub asset: Address,
        pub reference: Address,
        pub collateral: Address,
        pub other: Address,
        pub borrower: Address,
    }

    pub fn accounts() -> Accounts {
        let env = odra_test::env();
        Accounts {
            asset: env.get_account(5),
            reference: env.get_account(6),
            collateral: env.get_account(7),
            other: env.get_account(8),
            borrower: env.get_account(1),
        }
    }

    #[test]
    fn no_liability_skips_the_oracle() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 80, wad(2))
            .with_balance(a.collateral, a.borrower, wad(10));

        let valuation = valuate(&market, &a.borrower, U256::zero(), &[a.collateral], true).unwrap();
        assert_eq!(valuation, Valuation::default());
        assert_eq!(market.quotes.get(), 0);
    }

    #[test]
    fn full_valuation_without_liability_still_values_collateral() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 80, wad(2))
            .with_balance(a.collateral, a.borrower, wad(10));

        let valuation =
            valuate(&market, &a.borrower, U256::zero(), &[a.collateral], false).unwrap();
        assert_eq!(valuation.liability_value, U256::zero());
        assert_eq!(valuation.collateral_value, wad(16));
        assert_eq!(market.quotes.get(), 1);
    }

    #[test]
    fn collateral_is_weighted_by_its_factor() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 80, wad(2))
            .with_collateral(a.other, 50, wad(1))
            .with_balance(a.collateral, a.borrower, wad(10))
            .with_balance(a.other, a.borrower, wad(30));

        let valuation =
            valuate(&market, &a.borrower, wad(20), &[a.collateral, a.other], true).unwrap();
        assert_eq!(valuation.liability_assets, wad(20));
        assert_eq!(valuation.liability_value, wad(20));
        assert_eq!(valuation.collateral_value, wad(31));
        assert!(valuation.is_healthy());

        let reversed =
            valuate(&market, &a.borrower, wad(20), &[a.other, a.collateral], true).unwrap();
        assert_eq!(reversed, valuation);
    }

    #[test]
    fn unrecognized_and_empty_collateral_is_never_quoted() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 0, wad(2))
            .with_collateral(a.other, 90, wad(1))
            .with_balance(a.collateral, a.borrower, wad(1_000));

        let valuation =
            valuate(&market, &a.borrower, wad(5), &[a.collateral, a.other], true).unwrap();
        assert_eq!(valuation.collateral_value, U256::zero());
        assert!(!valuation.is_healthy());
        // only the liability was quoted
        assert_eq!(market.quotes.get(), 1);
    }

    #[test]
    fn missing_price_aborts_the_valuation() {
        let a = accounts();
        let mut market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 80, wad(2))
            .with_balance(a.collateral, a.borrower, wad(1));
        market.prices.retain(|(asset, _)| *asset != a.collateral);

        let result = valuate(&market, &a.borrower, wad(1), &[a.collateral], true);
        assert_eq!(result, Err(VaultError::PriceNotAvailable));
    }
}
