//! Deploys a borrowable vault with its collaborators and reads its state.

use odra::host::{HostEnv, NoArgs};
use odra::prelude::Addressable;

use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt, OdraCli,
};

use borrowable_vault::{
    controller::MockController,
    irm::{MockIrm, MockIrmInitArgs},
    oracle::MockPriceOracle,
    processor::{BorrowableVault, BorrowableVaultInitArgs},
    token::{MockToken, MockTokenInitArgs},
};

const GAS: u64 = 200_000_000_000;

/// Deploys the asset token, the oracle, the rate model, the controller and
/// the vault. The asset doubles as the reference asset.
pub struct VaultDeployScript;

impl DeployScript for VaultDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        println!("Deploying borrowable vault collaborators...");

        let asset = MockToken::load_or_deploy(env, MockTokenInitArgs { decimals: 18 }, container, GAS)?;
        let oracle = MockPriceOracle::load_or_deploy(env, NoArgs, container, GAS)?;
        let irm = MockIrm::load_or_deploy(env, MockIrmInitArgs { yearly_percent: 10 }, container, GAS)?;
        let controller = MockController::load_or_deploy(env, NoArgs, container, GAS)?;

        let vault = BorrowableVault::load_or_deploy(
            env,
            BorrowableVaultInitArgs {
                asset: asset.address().clone(),
                controller: controller.address().clone(),
                irm: irm.address().clone(),
                oracle: oracle.address().clone(),
                reference_asset: asset.address().clone(),
            },
            container,
            GAS,
        )?;

        println!("Vault deployed at: {:?}", vault.address());
        Ok(())
    }
}

/// Prints the vault configuration and its interest figures
pub struct VaultStatusScenario;

impl Scenario for VaultStatusScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let vault = container.contract_ref::<BorrowableVault>(env)?;

        println!("Owner:                {:?}", vault.owner());
        println!("Asset:                {:?}", vault.asset());
        println!("Reference asset:      {:?}", vault.reference_asset());
        println!("Total assets:         {}", vault.total_assets());
        println!("Total borrowed:       {}", vault.total_borrowed());
        println!("Interest accumulator: {}", vault.interest_accumulator());
        match vault.try_get_interest_rate() {
            Ok(rate) => println!("Interest rate:        {}", rate),
            Err(_) => println!("Interest rate:        pending status check"),
        }
        Ok(())
    }
}

impl ScenarioMetadata for VaultStatusScenario {
    const NAME: &'static str = "vault-status";
    const DESCRIPTION: &'static str = "Prints the vault configuration and interest state";
}

pub fn main() {
    OdraCli::new()
        .about("CLI tool for the borrowable vault")
        .deploy(VaultDeployScript)
        .contract::<MockToken>()
        .contract::<MockPriceOracle>()
        .contract::<MockIrm>()
        .contract::<MockController>()
        .contract::<BorrowableVault>()
        .scenario(VaultStatusScenario)
        .build()
        .run();
}
