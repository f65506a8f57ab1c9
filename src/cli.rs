use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ethers::types::Address;

pub mod private_key;

pub use private_key::PrivateKey;

use crate::deployment::scripts::Script;
use crate::types::NetworkName;

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case", version, about)]
pub struct Args {
    /// Path to the toolchain configuration file (YAML or TOML)
    #[clap(short, long, env = "DEPLOYER_CONFIG", default_value = "deployer.yml")]
    pub config: PathBuf,

    /// Network to target, defaults to `default_network` from the config
    #[clap(short, long, env = "DEPLOYER_NETWORK")]
    pub network: Option<NetworkName>,

    /// Project root containing the contract sources
    #[clap(short, long, env = "DEPLOYER_ROOT", default_value = ".")]
    pub root: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Compile the contracts with the configured solc version
    Compile {
        /// Ignore the build cache and recompile everything
        #[clap(long)]
        force: bool,
    },

    /// Write contract ABIs from the existing build artifacts
    ExportAbi,

    /// Compile and run a deployment script
    Deploy {
        /// The deployment script to run
        script: Script,

        /// Submit the deployed contract for source verification
        #[clap(long)]
        verify: bool,
    },

    /// Submit an already deployed contract for source verification
    Verify {
        /// Contract name as it appears in the build artifacts
        contract: String,

        address: Address,
    },

    /// List the configured networks
    Networks,
}
