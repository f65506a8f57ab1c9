use std::path::Path;

use tracing::{info, instrument};

use crate::abi_exporter;
use crate::config::Config;
use crate::forge_utils::ForgeBuild;

/// Builds the project with the configured solc and, when
/// `abi_exporter.run_on_compile` is set, exports the ABIs.
#[instrument(skip_all)]
pub async fn compile(
    config: &Config,
    root: &Path,
    force: bool,
) -> eyre::Result<()> {
    ForgeBuild::new(root)
        .with_solc_version(config.solidity.clone())
        .with_sources(root.join(&config.paths.sources))
        .with_artifacts(root.join(&config.paths.artifacts))
        .with_force(force)
        .run()
        .await?;

    info!(solc = %config.solidity, "Compiled");

    if config.abi_exporter.run_on_compile {
        export_abi(config, root).await?;
    }

    Ok(())
}

pub async fn export_abi(config: &Config, root: &Path) -> eyre::Result<()> {
    abi_exporter::export(
        &config.abi_exporter,
        root.join(&config.paths.artifacts),
        root,
    )
    .await?;

    Ok(())
}
