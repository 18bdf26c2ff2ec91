//! Liquidation pricing.
//!
//! The incentive grows with the shortfall of the violator and is capped. The
//! repay amount is bounded so that a liquidation does not overshoot the
//! target health factor, unless the bound is already at least half of the
//! liability, in which case the position may be cleared in one go.

use {
    crate::{
        error::VaultError,
        math::{mul_div_floor, TryAdd, TryDiv, TryMul, TrySub},
        state::{
            valuate, Market, Valuation, COLLATERAL_FACTOR_SCALE, MAX_LIQUIDATION_INCENTIVE,
            TARGET_HEALTH_FACTOR,
        },
    },
    odra::{casper_types::U256, prelude::*},
};

const PERCENT: u64 = 100;

/// Outcome of pricing a liquidation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidationQuote {
    /// Full valuation of the violator before liquidation
    pub valuation: Valuation,
    /// Bonus paid to the liquidator, in percent
    pub incentive: u64,
    /// Largest repay value restoring the target health factor
    pub max_repay_value: U256,
    /// Requested repay amount in reference units
    pub repay_value: U256,
    /// Collateral value paid out, incentive included
    pub seize_value: U256,
    /// Collateral units handed to the liquidator
    pub seize_assets: U256,
}

/// `min(100 - 100 * collateral / liability, MAX_LIQUIDATION_INCENTIVE)`.
/// Only defined for an unhealthy valuation.
pub fn liquidation_incentive(valuation: &Valuation) -> Result<u64, VaultError> {
    let coverage = mul_div_floor(
        valuation.collateral_value,
        U256::from(PERCENT),
        valuation.liability_value,
    )?;
    let shortfall = U256::from(PERCENT).try_sub(coverage)?;
    Ok(shortfall.min(U256::from(MAX_LIQUIDATION_INCENTIVE)).as_u64())
}

/// Repay value bringing the violator back to the target health factor once
/// the seized collateral, worth `(100 + incentive)%` of the repaid value and
/// weighted by `collateral_factor`, leaves the account.
pub fn max_repay_value(
    valuation: &Valuation,
    collateral_factor: u8,
    incentive: u64,
) -> Result<U256, VaultError> {
    let target = U256::from(TARGET_HEALTH_FACTOR);
    let numerator = valuation
        .liability_value
        .try_mul(target)?
        .try_sub(valuation.collateral_value.try_mul(U256::from(PERCENT))?)?;
    let removed_weight = U256::from(collateral_factor)
        .try_mul(U256::from(PERCENT).try_add(U256::from(incentive))?)?
        .try_div(U256::from(COLLATERAL_FACTOR_SCALE))?;
    let denominator = target.try_sub(removed_weight)?;
    numerator.try_div(denominator)
}

/// Price the seizure of `collateral` from `violator` in exchange for
/// `repay_assets` of its debt. The violator is valued in full, without the
/// no-liability shortcut.
pub fn seize_amount<M: Market>(
    market: &M,
    violator: &Address,
    liability_assets: U256,
    collaterals: &[Address],
    collateral: &Address,
    repay_assets: U256,
) -> Result<LiquidationQuote, VaultError> {
    let collateral_factor = market.collateral_factor(collateral);
    if collateral_factor == 0 {
        return Err(VaultError::CollateralDisabled);
    }

    let valuation = valuate(market, violator, liability_assets, collaterals, false)?;

    if repay_assets > valuation.liability_assets {
        return Err(VaultError::RepayAssetsExceeded);
    }
    if valuation.is_healthy() {
        return Err(VaultError::NoLiquidationOpportunity);
    }

    let incentive = liquidation_incentive(&valuation)?;
    let max_repay_value = max_repay_value(&valuation, collateral_factor, incentive)?;

    let reference = market.reference_asset();
    let repay_value = market.quote(repay_assets, &market.asset(), &reference)?;

    let half_liability = valuation.liability_value.try_div(U256::from(2u64))?;
    if repay_value > max_repay_value && max_repay_value < half_liability {
        log::warn!(
            "liquidation of {:?} rejected: repay value {} above bound {}",
            violator,
            repay_value,
            max_repay_value
        );
        return Err(VaultError::RepayAssetsExceeded);
    }

    let seize_value = mul_div_floor(
        repay_value,
        U256::from(PERCENT + incentive),
        U256::from(PERCENT),
    )?;

    let unit = U256::exp10(market.decimals(collateral)? as usize);
    let unit_value = market.quote(unit, collateral, &reference)?;
    let seize_assets = mul_div_floor(seize_value, unit, unit_value)?;
    if seize_assets.is_zero() {
        return Err(VaultError::RepayAssetsInsufficient);
    }

    log::info!(
        "liquidation of {:?}: incentive {}%, repay value {}, seize {} of {:?}",
        violator,
        incentive,
        repay_value,
        seize_assets,
        collateral
    );

    Ok(LiquidationQuote {
        valuation,
        incentive,
        max_repay_value,
        repay_value,
        seize_value,
        seize_assets,
    })
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::state::valuation::test::{accounts, wad, FakeMarket},
    };

    #[test]
    fn shortfall_of_twenty_percent() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 100, wad(1))
            .with_balance(a.collateral, a.borrower, wad(80));

        let quote = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral],
            &a.collateral,
            wad(10),
        )
        .unwrap();

        assert_eq!(quote.valuation.liability_value, wad(100));
        assert_eq!(quote.valuation.collateral_value, wad(80));
        assert_eq!(quote.incentive, 20);
        // (125 * 100 - 100 * 80) / (125 - 100 * 120 / 100)
        assert_eq!(quote.max_repay_value, wad(900));
        assert_eq!(quote.repay_value, wad(10));
        assert_eq!(quote.seize_value, wad(12));
        assert_eq!(quote.seize_assets, wad(12));
    }

    #[test]
    fn incentive_is_capped() {
        let valuation = Valuation {
            liability_assets: wad(100),
            liability_value: wad(100),
            collateral_value: wad(10),
        };
        assert_eq!(liquidation_incentive(&valuation).unwrap(), MAX_LIQUIDATION_INCENTIVE);

        let mild = Valuation {
            collateral_value: wad(97),
            ..valuation
        };
        assert_eq!(liquidation_incentive(&mild).unwrap(), 3);
    }

    #[test]
    fn excessive_repay_below_half_liability_is_rejected() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 50, wad(1))
            .with_balance(a.collateral, a.borrower, wad(190));

        let result = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral],
            &a.collateral,
            wad(45),
        );
        assert_eq!(result, Err(VaultError::RepayAssetsExceeded));

        let quote = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral],
            &a.collateral,
            wad(40),
        )
        .unwrap();
        assert_eq!(quote.incentive, 5);
        assert_eq!(
            quote.max_repay_value,
            U256::from(41_095_890_410_958_904_109u128)
        );
        assert_eq!(quote.seize_assets, wad(42));
    }

    #[test]
    fn bound_at_half_liability_lets_the_position_be_cleared() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 50, wad(1))
            .with_balance(a.collateral, a.borrower, wad(180));

        let quote = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral],
            &a.collateral,
            wad(60),
        )
        .unwrap();
        assert_eq!(quote.incentive, 10);
        assert_eq!(quote.max_repay_value, wad(50));
        assert!(quote.repay_value > quote.max_repay_value);
        assert_eq!(quote.seize_assets, wad(66));
    }

    #[test]
    fn healthy_account_cannot_be_liquidated() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 100, wad(1))
            .with_balance(a.collateral, a.borrower, wad(100));

        let result = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral],
            &a.collateral,
            wad(1),
        );
        assert_eq!(result, Err(VaultError::NoLiquidationOpportunity));
    }

    #[test]
    fn collateral_without_factor_is_never_seizable() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 100, wad(1))
            .with_collateral(a.other, 0, wad(1))
            .with_balance(a.collateral, a.borrower, wad(10))
            .with_balance(a.other, a.borrower, wad(1_000));

        let result = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral, a.other],
            &a.other,
            wad(1),
        );
        assert_eq!(result, Err(VaultError::CollateralDisabled));
        assert_eq!(market.quotes.get(), 0);
    }

    #[test]
    fn repay_above_debt_is_rejected() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 100, wad(1))
            .with_balance(a.collateral, a.borrower, wad(10));

        let result = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral],
            &a.collateral,
            wad(101),
        );
        assert_eq!(result, Err(VaultError::RepayAssetsExceeded));
    }

    #[test]
    fn dust_repay_seizing_nothing_is_rejected() {
        let a = accounts();
        // one whole collateral token is worth a million reference units
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 100, wad(1_000_000))
            .with_balance(a.collateral, a.borrower, U256::from(50u64));

        let result = seize_amount(
            &market,
            &a.borrower,
            wad(1),
            &[a.collateral],
            &a.collateral,
            U256::one(),
        );
        assert_eq!(result, Err(VaultError::RepayAssetsInsufficient));
    }

    #[test]
    fn seize_respects_collateral_price() {
        let a = accounts();
        let market = FakeMarket::new(a.asset, a.reference)
            .with_collateral(a.collateral, 100, wad(4))
            .with_balance(a.collateral, a.borrower, wad(20));

        let quote = seize_amount(
            &market,
            &a.borrower,
            wad(100),
            &[a.collateral],
            &a.collateral,
            wad(10),
        )
        .unwrap();
        assert_eq!(quote.incentive, 20);
        assert_eq!(quote.seize_value, wad(12));
        assert_eq!(quote.seize_assets, wad(3));
    }
}
