//! Global interest accrual.
//!
//! Every outstanding loan grows by the same factor, so the vault only keeps
//! the total and a monotonically non-decreasing accumulator. An account's
//! live debt is recovered lazily from the ratio between the current
//! accumulator and the one recorded when its balance last changed.
//!
//! Each accrual rounds the total down once while an account's debt is
//! rounded down once from its own snapshot, so the total may lag the sum of
//! live debts by a few units but never leads it. Repayments saturate the
//! total at zero for that reason.

use {
    crate::{
        error::VaultError,
        math::{mul_div_floor, Decimal, Rate, TryAdd, TryMul},
        state::Obligation,
    },
    odra::casper_types::U256,
};

/// Interest bookkeeping of the vault
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterestState {
    /// Sum of all live principal, scaled to the accumulator below
    pub total_borrowed: U256,
    /// Cumulative growth since the vault was created
    pub interest_accumulator: Decimal,
    /// Second of the last applied accrual
    pub last_interest_update: u64,
    /// Per-second rate used by the next accrual
    pub interest_rate: Rate,
}

/// Accrued figures as of a given second
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accrual {
    /// Total borrowed including interest
    pub total_borrowed: U256,
    /// Accumulator value
    pub interest_accumulator: Decimal,
    /// Seconds covered by this accrual; zero means nothing changed
    pub elapsed: u64,
}

impl Accrual {
    /// True when the accrual moved time forward and must be persisted
    pub fn is_update(&self) -> bool {
        self.elapsed > 0
    }
}

impl InterestState {
    /// Fresh state: accumulator at one, no rate, no debt
    pub fn new(now: u64) -> Self {
        Self {
            total_borrowed: U256::zero(),
            interest_accumulator: Decimal::one(),
            last_interest_update: now,
            interest_rate: Rate::zero(),
        }
    }

    /// Return seconds elapsed since the last accrual
    pub fn seconds_elapsed(&self, now: u64) -> Result<u64, VaultError> {
        now.checked_sub(self.last_interest_update)
            .ok_or(VaultError::MathOverflow)
    }

    /// Compute the accrued figures without touching the state
    pub fn calculate(&self, now: u64) -> Result<Accrual, VaultError> {
        let elapsed = self.seconds_elapsed(now)?;
        if elapsed == 0 {
            return Ok(Accrual {
                total_borrowed: self.total_borrowed,
                interest_accumulator: self.interest_accumulator,
                elapsed,
            });
        }

        let growth = self.interest_rate.growth_factor()?.try_pow(elapsed)?;
        let interest_accumulator = self.interest_accumulator.try_mul(growth)?;
        let total_borrowed =
            interest_accumulator.try_rescale(self.total_borrowed, self.interest_accumulator)?;

        Ok(Accrual {
            total_borrowed,
            interest_accumulator,
            elapsed,
        })
    }

    /// Apply accrual up to `now`. Calling it twice in the same second is a no-op.
    pub fn accrue(&mut self, now: u64) -> Result<Accrual, VaultError> {
        let accrual = self.calculate(now)?;
        if accrual.is_update() {
            log::debug!(
                "accrued {}s: accumulator {} -> {}, total borrowed {} -> {}",
                accrual.elapsed,
                self.interest_accumulator,
                accrual.interest_accumulator,
                self.total_borrowed,
                accrual.total_borrowed
            );
            self.total_borrowed = accrual.total_borrowed;
            self.interest_accumulator = accrual.interest_accumulator;
            self.last_interest_update = now;
        }
        Ok(accrual)
    }

    /// Live debt of an obligation as of `now`, read only
    pub fn debt_of(&self, obligation: &Obligation, now: u64) -> Result<U256, VaultError> {
        if obligation.is_empty() {
            return Ok(U256::zero());
        }
        let accrual = self.calculate(now)?;
        obligation.debt(accrual.interest_accumulator)
    }

    /// Accrue, then add `assets` to the obligation and to the total
    pub fn increase_owed(
        &mut self,
        obligation: &mut Obligation,
        assets: U256,
        now: u64,
    ) -> Result<(), VaultError> {
        self.accrue(now)?;
        obligation.borrow(assets, self.interest_accumulator)?;
        self.total_borrowed = self.total_borrowed.try_add(assets)?;
        Ok(())
    }

    /// Accrue, then remove `assets` from the obligation and from the total.
    /// The total saturates at zero since it may lag the live debts.
    pub fn decrease_owed(
        &mut self,
        obligation: &mut Obligation,
        assets: U256,
        now: u64,
    ) -> Result<(), VaultError> {
        self.accrue(now)?;
        obligation.repay(assets, self.interest_accumulator)?;
        self.total_borrowed = self.total_borrowed.saturating_sub(assets);
        Ok(())
    }

    /// Borrowed share of the pool, scaled to the full `u32` range. An empty
    /// pool has zero utilisation.
    pub fn utilisation(&self, cash: U256) -> Result<u32, VaultError> {
        let pool_assets = cash.try_add(self.total_borrowed)?;
        if pool_assets.is_zero() {
            return Ok(0);
        }
        let scaled = mul_div_floor(self.total_borrowed, U256::from(u32::MAX), pool_assets)?;
        Ok(scaled.as_u32())
    }

    /// Store the rate returned by the interest rate model
    pub fn update_rate(&mut self, rate: Rate) {
        self.interest_rate = rate;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::TryDiv;

    const YEAR: u64 = 86_400 * 365;

    fn ten_percent() -> Rate {
        Rate::from_percent(10).try_div(YEAR).unwrap()
    }

    fn wad(units: u64) -> U256 {
        U256::from(units) * U256::exp10(18)
    }

    #[test]
    fn same_second_accrual_is_a_noop() {
        let mut state = InterestState::new(1_000);
        state.update_rate(ten_percent());
        let mut obligation = Obligation::default();
        state.increase_owed(&mut obligation, wad(10), 1_000).unwrap();

        let before = state.clone();
        let accrual = state.accrue(1_000).unwrap();
        assert!(!accrual.is_update());
        assert_eq!(state, before);
    }

    #[test]
    fn zero_rate_keeps_everything_unchanged() {
        let mut state = InterestState::new(0);
        let mut obligation = Obligation::default();
        state.increase_owed(&mut obligation, wad(10), 0).unwrap();

        let accrual = state.accrue(YEAR).unwrap();
        assert!(accrual.is_update());
        assert_eq!(state.interest_accumulator, Decimal::one());
        assert_eq!(state.total_borrowed, wad(10));
        assert_eq!(state.last_interest_update, YEAR);
    }

    #[test]
    fn accumulator_never_decreases() {
        let mut state = InterestState::new(0);
        state.update_rate(ten_percent());
        let mut previous = state.interest_accumulator;
        for now in [1, 2, 60, 3_600, 86_400, YEAR] {
            state.accrue(now).unwrap();
            assert!(state.interest_accumulator >= previous);
            previous = state.interest_accumulator;
        }
    }

    #[test]
    fn one_year_at_ten_percent() {
        let mut state = InterestState::new(0);
        state.update_rate(ten_percent());
        let mut obligation = Obligation::default();
        state.increase_owed(&mut obligation, wad(35), 0).unwrap();

        let expected = wad(35) + U256::from(3_680_982_126_514_837_395u128);
        assert_eq!(state.debt_of(&obligation, YEAR).unwrap(), expected);

        // reading did not accrue
        assert_eq!(state.interest_accumulator, Decimal::one());

        state.accrue(YEAR).unwrap();
        assert_eq!(state.total_borrowed, expected);
        assert_eq!(state.debt_of(&obligation, YEAR).unwrap(), expected);
    }

    #[test]
    fn debt_grows_only_from_the_snapshot() {
        let mut state = InterestState::new(0);
        state.update_rate(ten_percent());
        state.accrue(YEAR).unwrap();

        let mut late = Obligation::default();
        state.increase_owed(&mut late, wad(35), YEAR).unwrap();
        assert_eq!(late.snapshot_accumulator, state.interest_accumulator);
        assert_eq!(state.debt_of(&late, YEAR).unwrap(), wad(35));
    }

    #[test]
    fn empty_obligation_has_no_debt() {
        let state = InterestState::new(0);
        assert_eq!(state.debt_of(&Obligation::default(), YEAR).unwrap(), U256::zero());
    }

    #[test]
    fn utilisation_of_empty_pool_is_zero() {
        let state = InterestState::new(0);
        assert_eq!(state.utilisation(U256::zero()).unwrap(), 0);
    }

    #[test]
    fn utilisation_is_scaled_to_u32() {
        let mut state = InterestState::new(0);
        let mut obligation = Obligation::default();
        state.increase_owed(&mut obligation, wad(50), 0).unwrap();
        assert_eq!(state.utilisation(wad(50)).unwrap(), u32::MAX / 2);
        assert_eq!(state.utilisation(U256::zero()).unwrap(), u32::MAX);
    }

    #[test]
    fn full_repay_after_many_accruals_clears_the_total() {
        for owed in [U256::from(1_000_003u64), wad(1) + U256::from(7u64)] {
            let mut state = InterestState::new(0);
            state.update_rate(ten_percent());
            let mut obligation = Obligation::default();
            state.increase_owed(&mut obligation, owed, 0).unwrap();

            let mut now = 0;
            for _ in 0..200 {
                now += 3_601;
                state.accrue(now).unwrap();
            }

            let debt = state.debt_of(&obligation, now).unwrap();
            assert!(debt >= state.total_borrowed);
            assert_eq!(state.decrease_owed(&mut obligation, debt, now), Ok(()));
            assert!(obligation.is_empty());
            assert_eq!(state.total_borrowed, U256::zero());
        }
    }

    #[test]
    fn time_going_backwards_is_rejected() {
        let state = InterestState::new(10);
        assert_eq!(state.calculate(9), Err(VaultError::MathOverflow));
    }
}
