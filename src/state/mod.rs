//! Vault state and the pure engines operating on it

pub mod interest;
pub mod liquidation;
pub mod market_config;
pub mod obligation;
pub mod status;
pub mod valuation;

pub use interest::*;
pub use liquidation::*;
pub use market_config::*;
pub use obligation::*;
pub use status::*;
pub use valuation::*;

/// Collateral factors are percentages of the oracle value
pub const COLLATERAL_FACTOR_SCALE: u8 = 100;

/// Liquidation incentive cap, in percent of the repaid value
pub const MAX_LIQUIDATION_INCENTIVE: u64 = 20;

/// Health factor (in percent) a liquidation may restore the violator to
pub const TARGET_HEALTH_FACTOR: u64 = 125;

/// Number of seconds per year
pub const SECONDS_PER_YEAR: u64 = 31_536_000; // 365 * 24 * 60 * 60

/// Odra block time is expressed in milliseconds
pub const MILLIS_PER_SECOND: u64 = 1_000;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn incentive_cap_keeps_target_denominator_positive() {
        let worst = COLLATERAL_FACTOR_SCALE as u64 * (100 + MAX_LIQUIDATION_INCENTIVE) / 100;
        assert!(worst < TARGET_HEALTH_FACTOR);
    }
}
