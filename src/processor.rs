//! Borrowable vault contract.
//!
//! Every mutating entry point follows the same shape: accrue interest and
//! snapshot the vault, mutate, then check the account and the vault either
//! right away or at the end of the controller's batch.

use {
    crate::{
        controller::AccountControllerContractRef,
        error::VaultError,
        events::{
            Borrow, CollateralFactorSet, ConfigUpdated, Deposit, InterestAccrued, Liquidate,
            Repay, Transfer, VaultStatusChecked, Withdraw,
        },
        irm::InterestRateModelContractRef,
        math::{mul_div_ceil, mul_div_floor, Decimal, Rate, TryAdd, TrySub},
        oracle::PriceOracleContractRef,
        state::{
            check_account, check_caps, seize_amount, valuate, CheckOutcome, InterestState,
            Market, MarketConfig, Obligation, SnapshotTaken, StatusCheck, Valuation,
            VaultSnapshot, MILLIS_PER_SECOND,
        },
        token::Cep18ContractRef,
    },
    odra::{casper_types::U256, prelude::*, ContractRef},
};

#[odra::module(events = [
    Deposit,
    Withdraw,
    Borrow,
    Repay,
    Transfer,
    Liquidate,
    InterestAccrued,
    CollateralFactorSet,
    ConfigUpdated,
    VaultStatusChecked
])]
pub struct BorrowableVault {
    config: SubModule<MarketConfig>,
    asset: Var<Address>,
    asset_decimals: Var<u8>,
    controller: Var<Address>,

    // Share ledger
    total_shares: Var<U256>,
    balances: Mapping<Address, U256>,
    cash: Var<U256>,

    // Debt
    owed: Mapping<Address, U256>,
    user_accumulator: Mapping<Address, Decimal>,
    total_borrowed: Var<U256>,
    interest_accumulator: Var<Decimal>,
    last_interest_update: Var<u64>,
    interest_rate: Var<Rate>,

    pending_snapshot: Var<Option<VaultSnapshot>>,
}

#[odra::module]
impl BorrowableVault {
    // ===========================================================================
    // CONSTRUCTOR
    // ===========================================================================

    /// Lend `asset` under `controller`, priced by `oracle` in `reference_asset`
    pub fn init(
        &mut self,
        asset: Address,
        controller: Address,
        irm: Address,
        oracle: Address,
        reference_asset: Address,
    ) {
        let owner = self.env().caller();
        self.config.init(owner, irm, oracle, reference_asset);

        let decimals = Cep18ContractRef::new(self.env(), asset).decimals();
        self.asset.set(asset);
        self.asset_decimals.set(decimals);
        self.controller.set(controller);

        self.total_shares.set(U256::zero());
        self.cash.set(U256::zero());
        self.store_interest(&InterestState::new(self.now()));
        self.pending_snapshot.set(None);
    }

    // ===========================================================================
    // SHARES
    // ===========================================================================

    /// Supply `assets` and credit `receiver` with the minted shares
    #[odra(non_reentrant)]
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        let snapshot = self.begin_operation();
        let sender = self.env().caller();
        if assets.is_zero() {
            self.env().revert(VaultError::ZeroAssets);
        }

        let shares = self.convert_to_shares(assets);
        if shares.is_zero() {
            self.env().revert(VaultError::ZeroShares);
        }

        self.pull_assets(sender, assets);
        self.mint_shares(receiver, shares);
        self.env().emit_event(Deposit {
            sender,
            owner: receiver,
            assets,
            shares,
        });

        self.end_operation(snapshot, None);
        shares
    }

    /// Burn enough of `owner`'s shares to send `assets` to `receiver`
    #[odra(non_reentrant)]
    pub fn withdraw(&mut self, assets: U256, receiver: Address, owner: Address) -> U256 {
        let snapshot = self.begin_operation();
        self.require_caller(owner);
        if assets.is_zero() {
            self.env().revert(VaultError::ZeroAssets);
        }

        let shares = self.to_shares(assets, true);
        self.burn_shares(owner, shares);
        self.send_assets(receiver, assets);
        self.emit_withdraw(receiver, owner, assets, shares);

        self.end_operation(snapshot, Some(owner));
        shares
    }

    /// Burn `shares` of `owner` and send what they are worth to `receiver`
    #[odra(non_reentrant)]
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        let snapshot = self.begin_operation();
        self.require_caller(owner);
        if shares.is_zero() {
            self.env().revert(VaultError::ZeroShares);
        }

        let assets = self.convert_to_assets(shares);
        if assets.is_zero() {
            self.env().revert(VaultError::ZeroAssets);
        }

        self.burn_shares(owner, shares);
        self.send_assets(receiver, assets);
        self.emit_withdraw(receiver, owner, assets, shares);

        self.end_operation(snapshot, Some(owner));
        assets
    }

    // ===========================================================================
    // BORROWING
    // ===========================================================================

    #[odra(non_reentrant)]
    pub fn borrow(&mut self, assets: U256, receiver: Address) {
        let snapshot = self.begin_operation();
        let borrower = self.env().caller();
        self.require_controller_enabled(borrower);
        if assets.is_zero() {
            self.env().revert(VaultError::ZeroAssets);
        }

        self.increase_owed(borrower, assets);
        self.send_assets(receiver, assets);

        self.end_operation(snapshot, Some(borrower));
    }

    /// Repay `assets` of `receiver`'s debt from the caller's funds
    #[odra(non_reentrant)]
    pub fn repay(&mut self, assets: U256, receiver: Address) {
        let snapshot = self.begin_operation();
        let sender = self.env().caller();
        self.require_controller_enabled(receiver);
        if assets.is_zero() {
            self.env().revert(VaultError::ZeroAssets);
        }

        self.pull_assets(sender, assets);
        self.decrease_owed(receiver, assets);

        self.end_operation(snapshot, None);
    }

    /// Take over `assets` of `from`'s debt
    #[odra(non_reentrant)]
    pub fn pull_debt(&mut self, from: Address, assets: U256) {
        let snapshot = self.begin_operation();
        let account = self.env().caller();
        if account == from {
            self.env().revert(VaultError::SelfDebtPull);
        }
        self.require_controller_enabled(account);
        if assets.is_zero() {
            self.env().revert(VaultError::ZeroAssets);
        }

        self.decrease_owed(from, assets);
        self.increase_owed(account, assets);

        self.end_operation(snapshot, Some(account));
    }

    /// Release the caller from this vault's control once it owes nothing
    #[odra(non_reentrant)]
    pub fn disable_controller(&mut self) {
        let account = self.env().caller();
        if !self.debt_of(account).is_zero() {
            self.env().revert(VaultError::OutstandingDebt);
        }
        self.controller_ref().disable_controller(account);
    }

    // ===========================================================================
    // LIQUIDATION
    // ===========================================================================

    /// Repay `repay_assets` of `violator`'s debt by taking it over, and seize
    /// `collateral` worth the repaid value plus the liquidation incentive.
    #[odra(non_reentrant)]
    pub fn liquidate(&mut self, violator: Address, collateral: Address, repay_assets: U256) {
        let snapshot = self.begin_operation();
        let liquidator = self.env().caller();

        if violator == liquidator {
            self.env().revert(VaultError::SelfLiquidation);
        }
        if repay_assets.is_zero() {
            self.env().revert(VaultError::RepayAssetsInsufficient);
        }

        let controller = self.controller_ref();
        if controller.is_account_status_check_deferred(violator) {
            self.env().revert(VaultError::ViolatorStatusCheckDeferred);
        }
        self.require_controller_enabled(violator);
        self.require_controller_enabled(liquidator);

        let collaterals = controller.get_collaterals(violator);
        let liability_assets = self.debt_of(violator);
        let quote = self.or_revert(seize_amount(
            &self.market(),
            &violator,
            liability_assets,
            &collaterals,
            &collateral,
            repay_assets,
        ));

        self.decrease_owed(violator, repay_assets);
        self.increase_owed(liquidator, repay_assets);

        if collateral == self.env().self_address() {
            if !controller.is_collateral_enabled(violator, collateral) {
                self.env().revert(VaultError::CollateralDisabled);
            }
            self.transfer_shares(violator, liquidator, quote.seize_assets);
        } else {
            let mut controller = self.controller_ref();
            controller.control_collateral(collateral, violator, liquidator, quote.seize_assets);
            // the violator may stay unhealthy after a partial liquidation
            controller.forgive_account_status_check(violator);
        }

        self.env().emit_event(Liquidate {
            liquidator,
            violator,
            collateral,
            repay_assets,
            seize_assets: quote.seize_assets,
        });

        self.end_operation(snapshot, Some(liquidator));
    }

    // ===========================================================================
    // STATUS CHECK CALLBACKS
    // ===========================================================================

    /// Deferred account check, called by the controller at the end of a batch
    #[odra(non_reentrant)]
    pub fn check_account_status(&mut self, account: Address, collaterals: Vec<Address>) {
        self.require_controller_caller();
        self.run_account_check(account, &collaterals);
    }

    /// Deferred vault check, called by the controller at the end of a batch
    #[odra(non_reentrant)]
    pub fn check_vault_status(&mut self) {
        self.require_controller_caller();
        let mut check = StatusCheck::load(self.pending_snapshot.get_or_default());
        let snapshot = self.or_revert(check.complete());
        self.pending_snapshot.set(check.pending());
        self.run_vault_check(snapshot);
    }

    // ===========================================================================
    // VIEWS
    // ===========================================================================

    pub fn asset(&self) -> Address {
        self.asset.get_or_revert_with(VaultError::NotInitialized)
    }

    pub fn controller(&self) -> Address {
        self.controller.get_or_revert_with(VaultError::NotInitialized)
    }

    pub fn decimals(&self) -> u8 {
        self.asset_decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_shares.get_or_default()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or_default()
    }

    /// Assets held by the vault and available to lend or withdraw
    pub fn cash(&self) -> U256 {
        self.cash.get_or_default()
    }

    /// Cash plus live borrows
    pub fn total_assets(&self) -> U256 {
        self.or_revert(self.cash().try_add(self.total_borrowed()))
    }

    pub fn convert_to_shares(&self, assets: U256) -> U256 {
        self.to_shares(assets, false)
    }

    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        self.or_revert(self.shares_to_assets(shares))
    }

    pub fn max_withdraw(&self, owner: Address) -> U256 {
        self.convert_to_assets(self.balance_of(owner)).min(self.cash())
    }

    /// Live debt of `account`
    pub fn debt_of(&self, account: Address) -> U256 {
        self.or_revert(self.interest().debt_of(&self.obligation(&account), self.now()))
    }

    /// Live total borrowed
    pub fn total_borrowed(&self) -> U256 {
        self.or_revert(self.interest().calculate(self.now())).total_borrowed
    }

    /// Live accumulator, ray scaled
    pub fn interest_accumulator(&self) -> U256 {
        self.or_revert(self.interest().calculate(self.now()))
            .interest_accumulator
            .to_scaled_val()
    }

    /// Current per-second rate, ray scaled. Unavailable while a status check
    /// is pending since the rate is only settled by that check.
    pub fn get_interest_rate(&self) -> U256 {
        if self.is_check_pending() {
            self.env().revert(VaultError::VaultStatusCheckDeferred);
        }
        self.interest_rate.get_or_default().to_scaled_val()
    }

    pub fn is_check_pending(&self) -> bool {
        self.pending_snapshot.get_or_default().is_some()
    }

    /// Full valuation of `account` over its enabled collaterals
    pub fn account_valuation(&self, account: Address) -> Valuation {
        let collaterals = self.controller_ref().get_collaterals(account);
        self.or_revert(valuate(
            &self.market(),
            &account,
            self.debt_of(account),
            &collaterals,
            false,
        ))
    }

    // ===========================================================================
    // CONFIGURATION
    // ===========================================================================

    pub fn set_irm(&mut self, irm: Address) {
        self.config.set_irm(irm);
    }

    pub fn set_oracle(&mut self, oracle: Address) {
        self.config.set_oracle(oracle);
    }

    pub fn set_reference_asset(&mut self, reference_asset: Address) {
        self.config.set_reference_asset(reference_asset);
    }

    pub fn set_collateral_factor(&mut self, asset: Address, collateral_factor: u8) {
        self.config.set_collateral_factor(asset, collateral_factor);
    }

    pub fn set_supply_cap(&mut self, supply_cap: U256) {
        self.config.set_supply_cap(supply_cap);
    }

    pub fn set_borrow_cap(&mut self, borrow_cap: U256) {
        self.config.set_borrow_cap(borrow_cap);
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.config.transfer_ownership(new_owner);
    }

    pub fn owner(&self) -> Address {
        self.config.owner()
    }

    pub fn irm(&self) -> Address {
        self.config.irm()
    }

    pub fn oracle(&self) -> Address {
        self.config.oracle()
    }

    pub fn reference_asset(&self) -> Address {
        self.config.reference_asset()
    }

    pub fn get_collateral_factor(&self, asset: Address) -> u8 {
        self.config.collateral_factor(asset)
    }

    pub fn supply_cap(&self) -> U256 {
        self.config.supply_cap()
    }

    pub fn borrow_cap(&self) -> U256 {
        self.config.borrow_cap()
    }

    // ===========================================================================
    // INTERNAL: STATUS CHECK PROTOCOL
    // ===========================================================================

    /// Accrue and snapshot. Only the first operation of a batch snapshots.
    fn begin_operation(&mut self) -> SnapshotTaken {
        self.accrue_interest();
        let current = self.vault_snapshot();
        let mut check = StatusCheck::load(self.pending_snapshot.get_or_default());
        let snapshot = check.begin(current);
        self.pending_snapshot.set(check.pending());
        snapshot
    }

    /// Check now, or hand the checks to the controller when it defers them
    fn end_operation(&mut self, snapshot: SnapshotTaken, account: Option<Address>) {
        let mut controller = self.controller_ref();
        let deferred = controller.are_checks_deferred();
        let mut check = StatusCheck::load(self.pending_snapshot.get_or_default());

        match check.end(snapshot, deferred) {
            CheckOutcome::Deferred => {
                self.pending_snapshot.set(check.pending());
                controller.require_account_and_vault_status_check(account);
            }
            CheckOutcome::Now(snapshot) => {
                self.pending_snapshot.set(None);
                if let Some(account) = account {
                    let collaterals = controller.get_collaterals(account);
                    self.run_account_check(account, &collaterals);
                }
                self.run_vault_check(snapshot);
            }
        }
    }

    fn run_account_check(&self, account: Address, collaterals: &[Address]) {
        let liability_assets = self.debt_of(account);
        self.or_revert(check_account(
            &self.market(),
            &account,
            liability_assets,
            collaterals,
        ));
    }

    /// Settle the interest rate for the new utilisation, then enforce caps
    fn run_vault_check(&mut self, snapshot: VaultSnapshot) {
        let mut state = self.accrue_interest();
        let utilisation = self.or_revert(state.utilisation(self.cash()));
        let rate = InterestRateModelContractRef::new(self.env(), self.config.irm())
            .compute_interest_rate(self.env().self_address(), self.asset(), utilisation);
        state.update_rate(Rate::from_scaled_val(rate));
        self.store_interest(&state);

        let current = self.vault_snapshot();
        self.or_revert(check_caps(
            &snapshot,
            &current,
            self.config.supply_cap(),
            self.config.borrow_cap(),
        ));

        log::info!(
            "vault check passed: supply {}, borrowed {}, utilisation {}, rate {}",
            current.total_supply_assets,
            current.total_borrowed,
            utilisation,
            state.interest_rate
        );
        self.env().emit_event(VaultStatusChecked {
            total_supply_assets: current.total_supply_assets,
            total_borrowed: current.total_borrowed,
            interest_rate: rate,
        });
    }

    fn vault_snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            total_supply_assets: self.total_assets(),
            total_borrowed: self.total_borrowed(),
        }
    }

    // ===========================================================================
    // INTERNAL: INTEREST AND DEBT
    // ===========================================================================

    fn now(&self) -> u64 {
        self.env().get_block_time() / MILLIS_PER_SECOND
    }

    fn interest(&self) -> InterestState {
        InterestState {
            total_borrowed: self.total_borrowed.get_or_default(),
            interest_accumulator: self.interest_accumulator.get_or_default(),
            last_interest_update: self.last_interest_update.get_or_default(),
            interest_rate: self.interest_rate.get_or_default(),
        }
    }

    fn store_interest(&mut self, state: &InterestState) {
        self.total_borrowed.set(state.total_borrowed);
        self.interest_accumulator.set(state.interest_accumulator);
        self.last_interest_update.set(state.last_interest_update);
        self.interest_rate.set(state.interest_rate);
    }

    fn accrue_interest(&mut self) -> InterestState {
        let mut state = self.interest();
        let accrual = self.or_revert(state.accrue(self.now()));
        if accrual.is_update() {
            self.store_interest(&state);
            self.env().emit_event(InterestAccrued {
                interest_accumulator: accrual.interest_accumulator.to_scaled_val(),
                total_borrowed: accrual.total_borrowed,
                elapsed: accrual.elapsed,
            });
        }
        state
    }

    fn obligation(&self, account: &Address) -> Obligation {
        Obligation::new(
            self.owed.get(account).unwrap_or_default(),
            self.user_accumulator.get(account).unwrap_or_default(),
        )
    }

    fn store_obligation(&mut self, account: &Address, obligation: &Obligation) {
        self.owed.set(account, obligation.owed);
        self.user_accumulator
            .set(account, obligation.snapshot_accumulator);
    }

    fn increase_owed(&mut self, account: Address, assets: U256) {
        let mut state = self.interest();
        let mut obligation = self.obligation(&account);
        self.or_revert(state.increase_owed(&mut obligation, assets, self.now()));
        self.store_interest(&state);
        self.store_obligation(&account, &obligation);
        self.env().emit_event(Borrow { account, assets });
    }

    fn decrease_owed(&mut self, account: Address, assets: U256) {
        let mut state = self.interest();
        let mut obligation = self.obligation(&account);
        self.or_revert(state.decrease_owed(&mut obligation, assets, self.now()));
        self.store_interest(&state);
        self.store_obligation(&account, &obligation);
        self.env().emit_event(Repay { account, assets });
    }

    // ===========================================================================
    // INTERNAL: SHARES AND CASH
    // ===========================================================================

    fn to_shares(&self, assets: U256, round_up: bool) -> U256 {
        let supply = self.total_supply();
        if supply.is_zero() {
            return assets;
        }
        let total_assets = self.total_assets();
        let shares = if round_up {
            mul_div_ceil(assets, supply, total_assets)
        } else {
            mul_div_floor(assets, supply, total_assets)
        };
        self.or_revert(shares)
    }

    fn shares_to_assets(&self, shares: U256) -> Result<U256, VaultError> {
        let supply = self.total_supply();
        if supply.is_zero() {
            return Ok(shares);
        }
        let total_assets = self.cash().try_add(self.total_borrowed())?;
        mul_div_floor(shares, total_assets, supply)
    }

    fn mint_shares(&mut self, account: Address, shares: U256) {
        let supply = self.or_revert(self.total_supply().try_add(shares));
        let balance = self.or_revert(self.balance_of(account).try_add(shares));
        self.total_shares.set(supply);
        self.balances.set(&account, balance);
    }

    fn burn_shares(&mut self, account: Address, shares: U256) {
        let balance = self.balance_of(account);
        if balance < shares {
            self.env().revert(VaultError::InsufficientBalance);
        }
        let supply = self.or_revert(self.total_supply().try_sub(shares));
        self.total_shares.set(supply);
        self.balances.set(&account, balance - shares);
    }

    fn transfer_shares(&mut self, from: Address, to: Address, shares: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < shares {
            self.env().revert(VaultError::InsufficientBalance);
        }
        self.balances.set(&from, from_balance - shares);
        let to_balance = self.or_revert(self.balance_of(to).try_add(shares));
        self.balances.set(&to, to_balance);
        self.env().emit_event(Transfer { from, to, shares });
    }

    fn pull_assets(&mut self, from: Address, assets: U256) {
        let vault = self.env().self_address();
        Cep18ContractRef::new(self.env(), self.asset()).transfer_from(from, vault, assets);
        let cash = self.or_revert(self.cash().try_add(assets));
        self.cash.set(cash);
    }

    fn send_assets(&mut self, to: Address, assets: U256) {
        let cash = self.cash();
        if cash < assets {
            self.env().revert(VaultError::InsufficientCash);
        }
        self.cash.set(cash - assets);
        Cep18ContractRef::new(self.env(), self.asset()).transfer(to, assets);
    }

    fn emit_withdraw(&self, receiver: Address, owner: Address, assets: U256, shares: U256) {
        self.env().emit_event(Withdraw {
            sender: self.env().caller(),
            receiver,
            owner,
            assets,
            shares,
        });
    }

    // ===========================================================================
    // INTERNAL: ACCESS
    // ===========================================================================

    fn controller_ref(&self) -> AccountControllerContractRef {
        AccountControllerContractRef::new(self.env(), self.controller())
    }

    fn require_caller(&self, account: Address) {
        if self.env().caller() != account {
            self.env().revert(VaultError::Unauthorized);
        }
    }

    fn require_controller_caller(&self) {
        if self.env().caller() != self.controller() {
            self.env().revert(VaultError::NotController);
        }
    }

    fn require_controller_enabled(&self, account: Address) {
        let vault = self.env().self_address();
        if !self.controller_ref().is_controller_enabled(account, vault) {
            self.env().revert(VaultError::ControllerDisabled);
        }
    }

    fn market(&self) -> VaultMarket<'_> {
        VaultMarket { vault: self }
    }

    fn or_revert<T>(&self, result: Result<T, VaultError>) -> T {
        result.unwrap_or_else(|error| self.env().revert(error))
    }
}

/// Prices and balances as the vault sees them. The vault's own shares are
/// valued through the assets they redeem for.
struct VaultMarket<'a> {
    vault: &'a BorrowableVault,
}

impl VaultMarket<'_> {
    fn is_vault(&self, asset: &Address) -> bool {
        *asset == self.vault.env().self_address()
    }
}

impl Market for VaultMarket<'_> {
    fn asset(&self) -> Address {
        self.vault.asset()
    }

    fn reference_asset(&self) -> Address {
        self.vault.config.reference_asset()
    }

    fn collateral_factor(&self, asset: &Address) -> u8 {
        self.vault.config.collateral_factor(*asset)
    }

    fn balance_of(&self, asset: &Address, account: &Address) -> Result<U256, VaultError> {
        if self.is_vault(asset) {
            return Ok(self.vault.balance_of(*account));
        }
        Ok(Cep18ContractRef::new(self.vault.env(), *asset).balance_of(*account))
    }

    fn decimals(&self, asset: &Address) -> Result<u8, VaultError> {
        if self.is_vault(asset) {
            return Ok(self.vault.decimals());
        }
        Ok(Cep18ContractRef::new(self.vault.env(), *asset).decimals())
    }

    fn quote(&self, amount: U256, base: &Address, quote: &Address) -> Result<U256, VaultError> {
        if self.is_vault(base) {
            let assets = self.vault.shares_to_assets(amount)?;
            return self.quote(assets, &self.asset(), quote);
        }
        let oracle = PriceOracleContractRef::new(self.vault.env(), self.vault.config.oracle());
        Ok(oracle.get_quote(amount, *base, *quote))
    }
}
