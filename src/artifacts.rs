//! Compiled contract artifacts as laid out by `forge build`:
//! `<artifacts>/<Source>.sol/<Contract>.json`.

use std::path::Path;

use ethers::abi::Abi;
use ethers::types::Bytes;
use eyre::{Context, ContextCompat};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    /// The ABI exactly as the compiler emitted it
    pub raw_abi: Vec<serde_json::Value>,
    pub abi: Abi,
    bytecode: String,
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    abi: Vec<serde_json::Value>,
    #[serde(default)]
    bytecode: Option<RawBytecode>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawBytecode {
    object: String,
}

impl Artifact {
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Creation bytecode, empty for interfaces and abstract contracts.
    pub fn bytecode(&self) -> eyre::Result<Bytes> {
        let object = self.bytecode.trim();
        let object = object.strip_prefix("0x").unwrap_or(object);

        if object.contains("__") {
            eyre::bail!(
                "{} has unlinked library references",
                self.fully_qualified_name()
            );
        }

        let bytes = hex::decode(object).with_context(|| {
            format!("Decoding bytecode of {}", self.fully_qualified_name())
        })?;

        Ok(bytes.into())
    }

    pub fn parse(path: &Path, content: &str) -> eyre::Result<Self> {
        let raw: RawArtifact = serde_json::from_str(content)
            .with_context(|| format!("Parsing {}", path.display()))?;

        let file_contract_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.split('.').next())
            .context("Artifact file has no name")?
            .to_string();

        let compilation_target = raw
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.pointer("/settings/compilationTarget"))
            .and_then(|target| target.as_object())
            .and_then(|target| target.iter().next())
            .and_then(|(source, name)| {
                Some((source.clone(), name.as_str()?.to_string()))
            });

        let (source_name, contract_name) = match compilation_target {
            Some(target) => target,
            None => {
                let source_name = path
                    .parent()
                    .and_then(|parent| parent.file_name())
                    .and_then(|name| name.to_str())
                    .context("Artifact is not inside a source directory")?
                    .to_string();

                (source_name, file_contract_name)
            }
        };

        let abi: Abi = serde_json::from_value(serde_json::Value::Array(
            raw.abi.clone(),
        ))
        .with_context(|| format!("Parsing ABI of {}", path.display()))?;

        Ok(Self {
            contract_name,
            source_name,
            raw_abi: raw.abi,
            abi,
            bytecode: raw.bytecode.map(|b| b.object).unwrap_or_default(),
        })
    }
}

/// Every artifact under `artifacts_dir`, sorted by fully qualified name.
pub async fn load_all(artifacts_dir: impl AsRef<Path>) -> eyre::Result<Vec<Artifact>> {
    let artifacts_dir = artifacts_dir.as_ref();

    let mut dirs = tokio::fs::read_dir(artifacts_dir).await.with_context(|| {
        format!(
            "Reading artifacts from {}, has the project been compiled?",
            artifacts_dir.display()
        )
    })?;

    let mut artifacts = vec![];

    while let Some(entry) = dirs.next_entry().await? {
        let dir = entry.path();

        if !entry.file_type().await?.is_dir() || !is_source_dir(&dir) {
            continue;
        }

        let mut files = tokio::fs::read_dir(&dir).await?;

        while let Some(file) = files.next_entry().await? {
            let path = file.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Reading {}", path.display()))?;

            let artifact = Artifact::parse(&path, &content)?;

            debug!(name = %artifact.fully_qualified_name(), "Found artifact");

            artifacts.push(artifact);
        }
    }

    artifacts.sort_by_key(|artifact| artifact.fully_qualified_name());

    Ok(artifacts)
}

fn is_source_dir(dir: &Path) -> bool {
    dir.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(".sol") || name.ends_with(".vy"))
        .unwrap_or(false)
}

/// The single artifact named `contract_name`.
pub async fn find(
    artifacts_dir: impl AsRef<Path>,
    contract_name: &str,
) -> eyre::Result<Artifact> {
    let mut matches: Vec<_> = load_all(artifacts_dir)
        .await?
        .into_iter()
        .filter(|artifact| artifact.contract_name == contract_name)
        .collect();

    match matches.len() {
        0 => eyre::bail!("Artifact for {contract_name} not found"),
        1 => Ok(matches.remove(0)),
        _ => {
            let candidates: Vec<_> = matches
                .iter()
                .map(|artifact| artifact.fully_qualified_name())
                .collect();

            eyre::bail!(
                "Ambiguous contract name {contract_name}, candidates: {}",
                candidates.join(", ")
            )
        }
    }
}
