use std::path::{Path, PathBuf};
use std::sync::Arc;

use ethers::contract::ContractFactory;
use ethers::prelude::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer, Wallet};
use ethers::types::Address;
use eyre::{Context, ContextCompat};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::artifacts;
use crate::config::Config;
use crate::forge_utils::{ContractSpec, ForgeVerify};
use crate::report::{ContractDeployment, Report};
use crate::types::{NetworkName, SolidityVersion};

pub type RpcSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

#[derive(Debug)]
pub struct DeploymentContext {
    pub root: PathBuf,
    pub artifacts_dir: PathBuf,
    pub network: NetworkName,
    pub chain_id: u64,
    pub confirmations: usize,
    pub legacy: bool,
    pub signer: Arc<RpcSigner>,
    pub etherscan_api_key: Option<String>,
    pub solc_version: SolidityVersion,
    pub report: Mutex<Report>,
}

impl DeploymentContext {
    /// Connects to the selected network and loads its deployment report.
    #[instrument(name = "connect", skip(config, root))]
    pub async fn connect(
        config: &Config,
        network: Option<&NetworkName>,
        root: impl AsRef<Path>,
    ) -> eyre::Result<Self> {
        let root = root.as_ref().to_owned();
        let (network, network_config) = config.network(network)?;

        let rpc_url = network_config.rpc_url()?;
        let provider = Provider::<Http>::try_from(rpc_url.as_str())?;

        let chain_id = provider
            .get_chainid()
            .await
            .with_context(|| format!("Fetching chain id from {network}"))?
            .as_u64();

        if let Some(expected) = network_config.chain_id {
            if expected != chain_id {
                eyre::bail!(
                    "Network {network} is configured for chain {expected} but the endpoint reports {chain_id}"
                );
            }
        }

        let private_key = network_config.signer_key()?;
        let wallet = Wallet::from(private_key.key).with_chain_id(chain_id);

        info!(%network, chain_id, deployer = ?wallet.address(), "Connected");

        let signer = SignerMiddleware::new(provider, wallet);

        let report = Report::load_or_default(&root, &network, chain_id).await?;

        Ok(Self {
            artifacts_dir: root.join(&config.paths.artifacts),
            root,
            etherscan_api_key: config
                .etherscan_api_key(&network)
                .map(ToString::to_string),
            network,
            chain_id,
            confirmations: network_config.confirmations,
            legacy: network_config.legacy,
            signer: Arc::new(signer),
            solc_version: config.solidity.clone(),
            report: Mutex::new(report),
        })
    }

    /// `source:Name` for the artifact of `contract_name`, unambiguous on
    /// the verifier's command line.
    pub async fn contract_spec(
        &self,
        contract_name: &str,
    ) -> eyre::Result<ContractSpec> {
        let artifact =
            artifacts::find(&self.artifacts_dir, contract_name).await?;

        Ok(ContractSpec::path_name(
            artifact.source_name,
            artifact.contract_name,
        ))
    }

    /// Deploys `contract_name` from the build artifacts with no constructor
    /// arguments, waits for the receipt and records it in the report.
    #[instrument(skip(self))]
    pub async fn deploy_contract(
        &self,
        contract_name: &str,
    ) -> eyre::Result<ContractDeployment> {
        let artifact =
            artifacts::find(&self.artifacts_dir, contract_name).await?;

        let bytecode = artifact.bytecode()?;
        if bytecode.is_empty() {
            eyre::bail!(
                "{} has no bytecode, is it abstract or an interface?",
                artifact.fully_qualified_name()
            );
        }

        let factory =
            ContractFactory::new(artifact.abi.clone(), bytecode, self.signer.clone());

        let mut deployer = factory
            .deploy(())
            .context("Building deployment transaction")?
            .confirmations(self.confirmations);

        if self.legacy {
            deployer = deployer.legacy();
        }

        let (contract, receipt) = deployer
            .send_with_receipt()
            .await
            .with_context(|| format!("Deploying {contract_name}"))?;

        let deployment =
            ContractDeployment::from_receipt(contract.address(), &receipt);

        info!(
            contract = contract_name,
            address = ?deployment.address,
            tx = ?deployment.transaction_hash,
            "Deployed"
        );

        self.record(contract_name, deployment.clone()).await;

        Ok(deployment)
    }

    async fn record(&self, contract_name: &str, deployment: ContractDeployment) {
        self.report
            .lock()
            .await
            .record_and_save(&self.root, contract_name, deployment)
            .await;
    }

    pub fn forge_verify(
        &self,
        contract_spec: ContractSpec,
        address: Address,
    ) -> eyre::Result<ForgeVerify> {
        let etherscan_api_key = self.etherscan_api_key.as_ref().with_context(|| {
            format!("No etherscan api key configured for {}", self.network)
        })?;

        Ok(ForgeVerify::new(contract_spec, address)
            .with_root(&self.root)
            .with_chain(self.chain_id)
            .with_etherscan_api_key(etherscan_api_key)
            .with_compiler_version(self.solc_version.clone()))
    }
}

#[cfg(test)]
mod tests {
    use ethers::types::H256;

    use super::*;

    const KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn context(root: &Path) -> DeploymentContext {
        let provider = Provider::<Http>::try_from("http://127.0.0.1:8545").unwrap();
        let wallet = KEY.parse::<LocalWallet>().unwrap().with_chain_id(31337u64);

        DeploymentContext {
            root: root.to_owned(),
            artifacts_dir: root.join("out"),
            network: "local".into(),
            chain_id: 31337,
            confirmations: 1,
            legacy: false,
            signer: Arc::new(SignerMiddleware::new(provider, wallet)),
            etherscan_api_key: None,
            solc_version: "0.8.9".parse().unwrap(),
            report: Mutex::new(Report::new("local".into(), 31337)),
        }
    }

    fn deployment() -> ContractDeployment {
        ContractDeployment {
            address: Address::repeat_byte(1),
            deployer: Address::repeat_byte(2),
            transaction_hash: H256::repeat_byte(3),
            block_number: Some(1),
        }
    }

    #[tokio::test]
    async fn record_writes_the_report() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let context = context(dir.path());

        context.record("Miner", deployment()).await;

        assert!(Report::path(dir.path(), &"local".into()).exists());

        Ok(())
    }

    #[tokio::test]
    async fn unwritable_report_does_not_fail_the_deployment() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join("deployments"), "").await?;

        let context = context(dir.path());

        context.record("Miner", deployment()).await;

        let report = context.report.lock().await;
        assert_eq!(report.contracts.len(), 1);

        Ok(())
    }

    #[test]
    fn verify_requires_an_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(dir.path());

        let spec = ContractSpec::path_name("src/Miner.sol", "Miner");
        assert!(context.forge_verify(spec, Address::zero()).is_err());
    }
}
