//! Interest rate model interface and a fixed-rate implementation

use {
    crate::{
        error::VaultError,
        math::{Rate, TryDiv},
        state::SECONDS_PER_YEAR,
    },
    odra::{casper_types::U256, prelude::*},
};

/// Rate source consulted by the vault after every status check
#[odra::external_contract]
pub trait InterestRateModel {
    /// Per-second rate, ray scaled, for a utilisation scaled to the `u32` range
    fn compute_interest_rate(&mut self, vault: Address, asset: Address, utilisation: u32) -> U256;
}

/// Model ignoring utilisation: a nominal yearly percentage spread evenly
/// over the seconds of a year
#[odra::module]
pub struct MockIrm {
    owner: Var<Address>,
    yearly_percent: Var<u8>,
}

#[odra::module]
impl MockIrm {
    pub fn init(&mut self, yearly_percent: u8) {
        self.owner.set(self.env().caller());
        self.yearly_percent.set(yearly_percent);
    }

    pub fn set_yearly_percent(&mut self, yearly_percent: u8) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(VaultError::Unauthorized);
        }
        self.yearly_percent.set(yearly_percent);
    }

    pub fn yearly_percent(&self) -> u8 {
        self.yearly_percent.get_or_default()
    }

    pub fn compute_interest_rate(&mut self, vault: Address, asset: Address, utilisation: u32) -> U256 {
        log::debug!("rate for {:?} ({:?}) at utilisation {}", vault, asset, utilisation);
        Rate::from_percent(self.yearly_percent())
            .try_div(SECONDS_PER_YEAR)
            .unwrap_or_else(|error| self.env().revert(error))
            .to_scaled_val()
    }
}
