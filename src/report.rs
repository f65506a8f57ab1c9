use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ethers::types::{Address, TransactionReceipt, H256};
use eyre::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::serde_utils;
use crate::types::{ContractName, NetworkName};

pub const REPORTS_DIR: &str = "deployments";

/// Addresses deployed to one network, persisted as
/// `deployments/<network>.yml` under the project root.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub network: NetworkName,
    pub chain_id: u64,

    #[serde(default)]
    pub contracts: BTreeMap<ContractName, ContractDeployment>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ContractDeployment {
    pub address: Address,
    pub deployer: Address,
    pub transaction_hash: H256,

    #[serde(default)]
    pub block_number: Option<u64>,
}

impl ContractDeployment {
    pub fn from_receipt(address: Address, receipt: &TransactionReceipt) -> Self {
        Self {
            address,
            deployer: receipt.from,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
        }
    }
}

impl Report {
    pub fn new(network: NetworkName, chain_id: u64) -> Self {
        Self {
            network,
            chain_id,
            contracts: BTreeMap::new(),
        }
    }

    pub fn path(root: impl AsRef<Path>, network: &NetworkName) -> PathBuf {
        root.as_ref()
            .join(REPORTS_DIR)
            .join(format!("{network}.yml"))
    }

    /// `deployments/<network>.<chain_id>.yml`, where a report is kept while
    /// the network points at another chain.
    pub fn backup_path(
        root: impl AsRef<Path>,
        network: &NetworkName,
        chain_id: u64,
    ) -> PathBuf {
        root.as_ref()
            .join(REPORTS_DIR)
            .join(format!("{network}.{chain_id}.yml"))
    }

    /// The existing report for `network`, or an empty one.
    ///
    /// A report written for a different chain id is moved to its backup path
    /// and the backup for `chain_id`, if any, is picked up instead.
    pub async fn load_or_default(
        root: impl AsRef<Path>,
        network: &NetworkName,
        chain_id: u64,
    ) -> eyre::Result<Self> {
        let root = root.as_ref();
        let path = Self::path(root, network);

        if !path.exists() {
            return Ok(Self::new(network.clone(), chain_id));
        }

        let report: Report = serde_utils::read_deserialize(&path).await?;

        if report.chain_id == chain_id {
            return Ok(report);
        }

        let backup = Self::backup_path(root, network, report.chain_id);
        tokio::fs::rename(&path, &backup).await.with_context(|| {
            format!("Moving {} to {}", path.display(), backup.display())
        })?;

        warn!(
            backup = %backup.display(),
            previous = report.chain_id,
            current = chain_id,
            "Chain id changed, previous report moved aside"
        );

        let restored = Self::backup_path(root, network, chain_id);
        if restored.exists() {
            let report: Report = serde_utils::read_deserialize(&restored).await?;

            if report.chain_id == chain_id {
                return Ok(report);
            }
        }

        Ok(Self::new(network.clone(), chain_id))
    }

    pub fn record(
        &mut self,
        contract: impl Into<ContractName>,
        deployment: ContractDeployment,
    ) -> Option<ContractDeployment> {
        self.contracts.insert(contract.into(), deployment)
    }

    pub async fn save(&self, root: impl AsRef<Path>) -> eyre::Result<PathBuf> {
        let path = Self::path(root, &self.network);

        serde_utils::write_serialize(&path, self).await?;

        Ok(path)
    }

    /// Records `deployment` and writes the report. The contract already
    /// exists on chain at this point, so a failed write is only logged.
    pub async fn record_and_save(
        &mut self,
        root: impl AsRef<Path>,
        contract: impl Into<ContractName>,
        deployment: ContractDeployment,
    ) -> Option<PathBuf> {
        self.record(contract, deployment);

        match self.save(root).await {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(
                    network = %self.network,
                    "Failed to save the deployment report: {err:?}"
                );
                None
            }
        }
    }
}
