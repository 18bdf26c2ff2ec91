//! Error types

use core::fmt;
use odra::prelude::OdraError;

/// Errors reported by the vault. Every error aborts the whole call.
#[odra::odra_error]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultError {
    // 0
    MathOverflow = 0,
    Unauthorized = 1,
    InvalidCollateralFactor = 2,
    ControllerDisabled = 3,
    NotController = 4,

    // 5
    SelfLiquidation = 5,
    ViolatorStatusCheckDeferred = 6,
    NoLiquidationOpportunity = 7,
    RepayAssetsInsufficient = 8,
    RepayAssetsExceeded = 9,

    // 10
    CollateralDisabled = 10,
    VaultStatusCheckDeferred = 11,
    AccountUnhealthy = 12,
    OutstandingDebt = 13,
    SelfDebtPull = 14,

    // 15
    ZeroAssets = 15,
    ZeroShares = 16,
    InsufficientBalance = 17,
    InsufficientCash = 18,
    InsufficientAllowance = 19,

    // 20
    SupplyCapExceeded = 20,
    BorrowCapExceeded = 21,
    SnapshotNotTaken = 22,
    PriceNotAvailable = 23,
    NotInitialized = 24,
}

impl VaultError {
    /// Human readable description
    pub fn message(&self) -> &str {
        match self {
            VaultError::MathOverflow => "Math operation overflow",
            VaultError::Unauthorized => "Caller is not the vault owner",
            VaultError::InvalidCollateralFactor => "Collateral factor must be within [0, 100]",
            VaultError::ControllerDisabled => "Vault is not enabled as the account controller",
            VaultError::NotController => "Caller is not the account controller",
            VaultError::SelfLiquidation => "Liquidator cannot liquidate itself",
            VaultError::ViolatorStatusCheckDeferred => "Violator account status check is deferred",
            VaultError::NoLiquidationOpportunity => "Cannot liquidate a healthy account",
            VaultError::RepayAssetsInsufficient => "Repay amount too small to seize collateral",
            VaultError::RepayAssetsExceeded => "Repay amount exceeds the allowed amount",
            VaultError::CollateralDisabled => "Collateral is not recognized or not enabled",
            VaultError::VaultStatusCheckDeferred => "Vault status check is deferred",
            VaultError::AccountUnhealthy => "Account liability exceeds its collateral value",
            VaultError::OutstandingDebt => "Account still has outstanding debt",
            VaultError::SelfDebtPull => "Account cannot pull its own debt",
            VaultError::ZeroAssets => "Asset amount must not be zero",
            VaultError::ZeroShares => "Share amount must not be zero",
            VaultError::InsufficientBalance => "Insufficient balance",
            VaultError::InsufficientCash => "Insufficient cash held by the vault",
            VaultError::InsufficientAllowance => "Insufficient allowance",
            VaultError::SupplyCapExceeded => "Supply cap exceeded",
            VaultError::BorrowCapExceeded => "Borrow cap exceeded",
            VaultError::SnapshotNotTaken => "Vault snapshot was not taken",
            VaultError::PriceNotAvailable => "Oracle has no price for the pair",
            VaultError::NotInitialized => "Configuration value was never set",
        }
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
