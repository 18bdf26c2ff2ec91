#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

//! A borrowable vault for the casper blockchain: interest accrual, oracle
//! valuation and liquidation on top of a minimal share ledger.

extern crate alloc;

pub mod controller;
pub mod error;
pub mod events;
pub mod irm;
pub mod math;
pub mod oracle;
pub mod processor;
pub mod state;
pub mod token;
