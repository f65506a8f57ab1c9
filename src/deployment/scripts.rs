use clap::ValueEnum;
use ethers::types::Address;
use ethers::utils::to_checksum;
use tracing::{info, instrument};

use super::DeploymentContext;
use crate::report::ContractDeployment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Script {
    /// Deploys the `Miner` contract
    Miner,
    /// Deploys the `USDC` token contract
    Usdc,
}

impl Script {
    pub fn contract_name(self) -> &'static str {
        match self {
            Script::Miner => "Miner",
            Script::Usdc => "USDC",
        }
    }

    pub async fn run(
        self,
        context: &DeploymentContext,
    ) -> eyre::Result<ContractDeployment> {
        match self {
            Script::Miner => deploy_miner(context).await,
            Script::Usdc => deploy_usdc(context).await,
        }
    }
}

#[instrument(name = "deploy_miner", skip_all)]
pub async fn deploy_miner(
    context: &DeploymentContext,
) -> eyre::Result<ContractDeployment> {
    info!("Start Deploying");

    let miner = context.deploy_contract(Script::Miner.contract_name()).await?;

    announce(miner_deployed_message(miner.address));

    Ok(miner)
}

#[instrument(name = "deploy_usdc", skip_all)]
pub async fn deploy_usdc(
    context: &DeploymentContext,
) -> eyre::Result<ContractDeployment> {
    let usdc = context.deploy_contract(Script::Usdc.contract_name()).await?;

    announce(usdc_deployed_message(usdc.address));

    Ok(usdc)
}

fn miner_deployed_message(address: Address) -> String {
    format!(
        "The Miner Contract has been deployed to: {}",
        to_checksum(&address, None)
    )
}

fn usdc_deployed_message(address: Address) -> String {
    format!(
        "The USDC has been deployed to address: {}",
        to_checksum(&address, None)
    )
}

/// Logs `message` and repeats it on stdout, where scripts consuming the
/// output expect it regardless of `RUST_LOG`.
fn announce(message: String) {
    info!("{message}");
    println!("{message}");
}
