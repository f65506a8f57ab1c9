use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use eyre::{Context, ContextCompat};
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::cli::PrivateKey;
use crate::serde_utils;
use crate::types::{NetworkName, SolidityVersion};

pub mod interpolate;

pub const MAX_SPACING: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub default_network: Option<NetworkName>,

    #[serde(default)]
    pub networks: BTreeMap<NetworkName, NetworkConfig>,

    #[serde(default)]
    pub etherscan: EtherscanConfig,

    pub solidity: SolidityVersion,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub abi_exporter: AbiExporterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub url: String,

    /// Signing keys, the first one deploys
    pub accounts: Vec<String>,

    /// When set, the endpoint must report this chain id
    #[serde(default)]
    pub chain_id: Option<u64>,

    /// Send pre EIP-1559 transactions
    #[serde(default)]
    pub legacy: bool,

    #[serde(default = "default_confirmations")]
    pub confirmations: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtherscanConfig {
    #[serde(default)]
    pub api_key: Option<ApiKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiKey {
    Single(String),
    PerNetwork(BTreeMap<NetworkName, String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_sources")]
    pub sources: PathBuf,

    #[serde(default = "default_artifacts")]
    pub artifacts: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiExporterConfig {
    #[serde(default = "default_abi_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub run_on_compile: bool,

    /// Remove the output directory before writing
    #[serde(default)]
    pub clear: bool,

    /// Write every ABI directly into `path` instead of mirroring sources
    #[serde(default)]
    pub flat: bool,

    /// Regexes over `Source.sol:Contract`, empty means everything
    #[serde(default)]
    pub only: Vec<String>,

    #[serde(default)]
    pub except: Vec<String>,

    #[serde(default = "default_spacing")]
    pub spacing: usize,

    /// Emit human-readable signatures instead of JSON fragments
    #[serde(default)]
    pub pretty: bool,
}

fn default_sources() -> PathBuf {
    PathBuf::from("src")
}

fn default_artifacts() -> PathBuf {
    PathBuf::from("out")
}

fn default_abi_path() -> PathBuf {
    PathBuf::from("./abi")
}

fn default_spacing() -> usize {
    2
}

fn default_confirmations() -> usize {
    1
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            artifacts: default_artifacts(),
        }
    }
}

impl Default for AbiExporterConfig {
    fn default() -> Self {
        Self {
            path: default_abi_path(),
            run_on_compile: false,
            clear: false,
            flat: false,
            only: vec![],
            except: vec![],
            spacing: default_spacing(),
            pretty: false,
        }
    }
}

impl ApiKey {
    pub fn for_network(&self, network: &NetworkName) -> Option<&str> {
        match self {
            ApiKey::Single(key) => Some(key.as_str()),
            ApiKey::PerNetwork(keys) => keys.get(network).map(String::as_str),
        }
    }
}

impl AbiExporterConfig {
    pub fn only_patterns(&self) -> eyre::Result<Vec<Regex>> {
        compile_patterns(&self.only)
    }

    pub fn except_patterns(&self) -> eyre::Result<Vec<Regex>> {
        compile_patterns(&self.except)
    }

    /// `path` must name a directory strictly inside the project root, since
    /// `clear` removes it wholesale.
    pub fn validate_path(&self) -> eyre::Result<()> {
        let mut depth = 0usize;

        for component in self.path.components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir => eyre::bail!(
                    "abi_exporter.path {} leaves the project root",
                    self.path.display()
                ),
                Component::RootDir | Component::Prefix(_) => eyre::bail!(
                    "abi_exporter.path {} must be relative to the project root",
                    self.path.display()
                ),
            }
        }

        if depth == 0 {
            eyre::bail!(
                "abi_exporter.path {:?} resolves to the project root",
                self.path.display().to_string()
            );
        }

        Ok(())
    }
}

fn compile_patterns(patterns: &[String]) -> eyre::Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .with_context(|| format!("Invalid pattern {pattern:?}"))
        })
        .collect()
}

impl NetworkConfig {
    pub fn rpc_url(&self) -> eyre::Result<Url> {
        Url::parse(&self.url)
            .with_context(|| format!("Invalid RPC url {:?}", self.url))
    }

    pub fn signer_key(&self) -> eyre::Result<PrivateKey> {
        self.accounts
            .first()
            .context("Network has no accounts")?
            .parse()
            .context("Parsing signer key")
    }
}

impl Config {
    /// Reads the config file at `path` with `${VAR}` references resolved
    /// against the process environment, then validates the result.
    pub async fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Reading from {}", path.display()))?;

        let content = interpolate::interpolate_env(&content)
            .with_context(|| format!("Resolving {}", path.display()))?;

        let config: Config = serde_utils::deserialize_str(path, &content)?;

        config
            .validate()
            .with_context(|| format!("Validating {}", path.display()))?;

        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        for (name, network) in &self.networks {
            if network.url.trim().is_empty() {
                eyre::bail!("Network {name} has an empty url");
            }

            network
                .rpc_url()
                .with_context(|| format!("Network {name}"))?;

            if network.accounts.is_empty() {
                eyre::bail!("Network {name} has no accounts");
            }

            for (idx, account) in network.accounts.iter().enumerate() {
                account.parse::<PrivateKey>().with_context(|| {
                    format!("Network {name} account #{idx} is not a valid key")
                })?;
            }
        }

        if let Some(default_network) = &self.default_network {
            if !self.networks.contains_key(default_network) {
                eyre::bail!(
                    "Default network {default_network} is not configured"
                );
            }
        }

        if self.abi_exporter.spacing > MAX_SPACING {
            eyre::bail!(
                "abi_exporter.spacing must be at most {MAX_SPACING}, got {}",
                self.abi_exporter.spacing
            );
        }

        self.abi_exporter.validate_path()?;
        self.abi_exporter.only_patterns()?;
        self.abi_exporter.except_patterns()?;

        Ok(())
    }

    /// Picks the network to target: the explicit name, then
    /// `default_network`, then the only configured network.
    pub fn network(
        &self,
        name: Option<&NetworkName>,
    ) -> eyre::Result<(NetworkName, &NetworkConfig)> {
        let name = match name.or(self.default_network.as_ref()) {
            Some(name) => name.clone(),
            None if self.networks.len() == 1 => self
                .networks
                .keys()
                .next()
                .cloned()
                .context("No networks configured")?,
            None if self.networks.is_empty() => {
                eyre::bail!("No networks configured")
            }
            None => eyre::bail!(
                "Multiple networks configured, select one with --network or default_network"
            ),
        };

        let network = self
            .networks
            .get(&name)
            .with_context(|| format!("Unknown network {name}"))?;

        Ok((name, network))
    }

    pub fn etherscan_api_key(&self, network: &NetworkName) -> Option<&str> {
        self.etherscan.api_key.as_ref()?.for_network(network)
    }
}
