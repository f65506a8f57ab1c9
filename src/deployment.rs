use std::path::Path;

use ethers::types::Address;
use ethers::utils::to_checksum;
use tracing::{info, instrument};

use crate::compile;
use crate::config::Config;
use crate::types::NetworkName;

pub mod deployment_context;
pub mod scripts;

pub use self::deployment_context::DeploymentContext;
use self::scripts::Script;

/// Compiles the project, then runs `script` against the selected network.
#[instrument(skip(config, root))]
pub async fn run_deployment(
    config: &Config,
    network: Option<&NetworkName>,
    root: &Path,
    script: Script,
    verify: bool,
) -> eyre::Result<()> {
    compile::compile(config, root, false).await?;

    let context = DeploymentContext::connect(config, network, root).await?;

    let deployment = script.run(&context).await?;

    if verify {
        let spec = context.contract_spec(script.contract_name()).await?;

        context.forge_verify(spec, deployment.address)?.run().await?;

        info!(contract = script.contract_name(), "Verified");
    }

    Ok(())
}

#[instrument(skip(config, root))]
pub async fn run_verify(
    config: &Config,
    network: Option<&NetworkName>,
    root: &Path,
    contract: &str,
    address: Address,
) -> eyre::Result<()> {
    let context = DeploymentContext::connect(config, network, root).await?;

    let spec = context.contract_spec(contract).await?;

    context.forge_verify(spec, address)?.run().await?;

    info!(contract, address = %to_checksum(&address, None), "Verified");

    Ok(())
}
