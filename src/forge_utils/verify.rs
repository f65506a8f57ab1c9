use std::ffi::OsString;
use std::path::PathBuf;

use ethers::types::Address;
use eyre::ContextCompat;
use tracing::{info, instrument};

use super::{run_checked, ContractSpec};
use crate::types::SolidityVersion;

pub struct ForgeVerify {
    spec: ContractSpec,
    address: Address,
    root: Option<PathBuf>,
    chain: Option<u64>,
    etherscan_api_key: Option<String>,
    compiler_version: Option<SolidityVersion>,
}

impl ForgeVerify {
    pub fn new(spec: ContractSpec, address: Address) -> Self {
        Self {
            spec,
            address,
            root: None,
            chain: None,
            etherscan_api_key: None,
            compiler_version: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_chain(mut self, chain: u64) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_etherscan_api_key(
        mut self,
        etherscan_api_key: impl ToString,
    ) -> Self {
        self.etherscan_api_key = Some(etherscan_api_key.to_string());
        self
    }

    pub fn with_compiler_version(
        mut self,
        compiler_version: SolidityVersion,
    ) -> Self {
        self.compiler_version = Some(compiler_version);
        self
    }

    pub fn args(&self) -> eyre::Result<Vec<OsString>> {
        let mut args: Vec<OsString> =
            vec!["verify-contract".into(), "--watch".into()];

        let root = self.root.as_ref().context("Missing root")?;

        args.push("--root".into());
        args.push(root.clone().into());

        let chain = self.chain.as_ref().context("Missing chain")?;

        args.push("--chain".into());
        args.push(chain.to_string().into());

        let etherscan_api_key = self
            .etherscan_api_key
            .as_ref()
            .context("Missing etherscan api key")?;

        args.push("--etherscan-api-key".into());
        args.push(etherscan_api_key.into());

        if let Some(compiler_version) = &self.compiler_version {
            args.push("--compiler-version".into());
            args.push(format!("v{compiler_version}").into());
        }

        args.push(format!("{:?}", self.address).into());
        args.push(self.spec.to_string().into());

        Ok(args)
    }

    #[instrument(name = "forge_verify", skip_all)]
    pub async fn run(&self) -> eyre::Result<()> {
        let mut cmd = tokio::process::Command::new("forge");
        cmd.args(self.args()?);

        info!(address = ?self.address, contract = %self.spec, "Verifying contract");

        run_checked("forge verify-contract", &mut cmd).await?;

        Ok(())
    }
}
