use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use eyre::Context;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, instrument};

use crate::artifacts::{self, Artifact};
use crate::config::AbiExporterConfig;

pub mod human_readable;

/// Writes the ABIs of the artifacts in `artifacts_dir` according to
/// `config`, relative to `root`. Returns the written paths.
#[instrument(name = "export_abi", skip_all)]
pub async fn export(
    config: &AbiExporterConfig,
    artifacts_dir: impl AsRef<Path>,
    root: impl AsRef<Path>,
) -> eyre::Result<Vec<PathBuf>> {
    config.validate_path()?;

    let output_dir = root.as_ref().join(&config.path);
    let artifacts = artifacts::load_all(artifacts_dir).await?;

    let outputs = plan(config, &artifacts, &output_dir)?;

    if config.clear && tokio::fs::try_exists(&output_dir).await? {
        debug!(path = %output_dir.display(), "Clearing ABI directory");
        tokio::fs::remove_dir_all(&output_dir)
            .await
            .with_context(|| format!("Clearing {}", output_dir.display()))?;
    }

    let writes = outputs.iter().map(|(path, artifact)| async move {
        let content = render(config, artifact)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Writing to {}", path.display()))?;

        debug!(path = %path.display(), "Wrote ABI");

        eyre::Ok(path.clone())
    });

    let written = futures::future::try_join_all(writes).await?;

    info!(
        count = written.len(),
        path = %output_dir.display(),
        "Exported ABIs"
    );

    Ok(written)
}

/// Maps each selected artifact to its destination file.
fn plan<'a>(
    config: &AbiExporterConfig,
    artifacts: &'a [Artifact],
    output_dir: &Path,
) -> eyre::Result<BTreeMap<PathBuf, &'a Artifact>> {
    let only = config.only_patterns()?;
    let except = config.except_patterns()?;

    let mut outputs: BTreeMap<PathBuf, &Artifact> = BTreeMap::new();

    for artifact in artifacts {
        let name = artifact.fully_qualified_name();

        if !only.is_empty() && !only.iter().any(|re| re.is_match(&name)) {
            continue;
        }

        if except.iter().any(|re| re.is_match(&name)) {
            continue;
        }

        if artifact.raw_abi.is_empty() {
            continue;
        }

        let file_name = format!("{}.json", artifact.contract_name);
        let destination = if config.flat {
            output_dir.join(file_name)
        } else {
            output_dir.join(&artifact.source_name).join(file_name)
        };

        if let Some(previous) = outputs.insert(destination.clone(), artifact) {
            eyre::bail!(
                "duplicate output destination {}: {} and {}",
                destination.display(),
                previous.fully_qualified_name(),
                name
            );
        }
    }

    Ok(outputs)
}

fn render(
    config: &AbiExporterConfig,
    artifact: &Artifact,
) -> eyre::Result<Vec<u8>> {
    if config.pretty {
        let lines = human_readable::format_abi(&artifact.raw_abi)?;
        to_json(&lines, config.spacing)
    } else {
        to_json(&artifact.raw_abi, config.spacing)
    }
}

/// JSON with `spacing` spaces of indentation, compact when zero.
fn to_json<T: Serialize>(value: &T, spacing: usize) -> eyre::Result<Vec<u8>> {
    if spacing == 0 {
        return Ok(serde_json::to_vec(value)?);
    }

    let indent = " ".repeat(spacing);
    let mut buf = vec![];
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut buf,
        PrettyFormatter::with_indent(indent.as_bytes()),
    );

    value.serialize(&mut serializer)?;

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::artifacts::test_utils::{write_artifact, TRANSFER_ABI};

    const MINER_ABI: &str = r#"[
        { "type": "function", "name": "mine", "inputs": [], "outputs": [], "stateMutability": "nonpayable" }
    ]"#;

    async fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        write_artifact(&out, "src/USDC.sol", "USDC", TRANSFER_ABI, "0x").await;
        write_artifact(&out, "src/Miner.sol", "Miner", MINER_ABI, "0x").await;
        write_artifact(&out, "src/IMiner.sol", "IEmpty", "[]", "0x").await;

        dir
    }

    fn config() -> AbiExporterConfig {
        AbiExporterConfig {
            path: PathBuf::from("./abi"),
            ..Default::default()
        }
    }

    fn relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        let mut paths: Vec<_> = paths
            .iter()
            .map(|p| {
                p.strip_prefix(root.join("./abi"))
                    .unwrap()
                    .display()
                    .to_string()
            })
            .collect();
        paths.sort();
        paths
    }

    #[tokio::test]
    async fn nested_export_mirrors_sources_and_skips_empty() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        let written = export(&config(), root.join("out"), root).await?;

        assert_eq!(
            relative(root, &written),
            ["src/Miner.sol/Miner.json", "src/USDC.sol/USDC.json"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn flat_export_with_only_filter() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        let config = AbiExporterConfig {
            flat: true,
            only: vec![":USDC$".to_string()],
            ..config()
        };

        let written = export(&config, root.join("out"), root).await?;

        assert_eq!(relative(root, &written), ["USDC.json"]);

        Ok(())
    }

    #[tokio::test]
    async fn except_filter() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        let config = AbiExporterConfig {
            flat: true,
            except: vec!["USDC".to_string()],
            ..config()
        };

        let written = export(&config, root.join("out"), root).await?;

        assert_eq!(relative(root, &written), ["Miner.json"]);

        Ok(())
    }

    #[tokio::test]
    async fn flat_export_rejects_duplicate_names() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        write_artifact(&root.join("out"), "src/v2/Miner2.sol", "Miner", MINER_ABI, "0x")
            .await;

        let config = AbiExporterConfig {
            flat: true,
            ..config()
        };

        let err = export(&config, root.join("out"), root).await.unwrap_err();

        assert!(err.to_string().contains("duplicate output destination"));
        assert!(!root.join("abi").exists());

        Ok(())
    }

    #[tokio::test]
    async fn clear_removes_stale_files() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        tokio::fs::create_dir_all(root.join("abi")).await?;
        tokio::fs::write(root.join("abi/Stale.json"), "[]").await?;

        let config = AbiExporterConfig {
            flat: true,
            clear: true,
            ..config()
        };

        export(&config, root.join("out"), root).await?;

        assert!(!root.join("abi/Stale.json").exists());
        assert!(root.join("abi/Miner.json").exists());

        Ok(())
    }

    #[tokio::test]
    async fn clear_refuses_to_remove_the_project_root() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        tokio::fs::create_dir_all(root.join("contracts")).await?;
        tokio::fs::write(root.join("contracts/Miner.sol"), "contract Miner {}")
            .await?;

        for path in [".", "../abi"] {
            let config = AbiExporterConfig {
                path: PathBuf::from(path),
                flat: true,
                clear: true,
                ..config()
            };

            assert!(export(&config, root.join("out"), root).await.is_err());
        }

        assert!(root.join("contracts/Miner.sol").exists());
        assert!(root.join("out/Miner.sol/Miner.json").exists());

        Ok(())
    }

    #[tokio::test]
    async fn pretty_output_with_spacing() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        let config = AbiExporterConfig {
            flat: true,
            pretty: true,
            spacing: 4,
            only: vec!["Miner".to_string()],
            ..config()
        };

        export(&config, root.join("out"), root).await?;

        let content =
            tokio::fs::read_to_string(root.join("abi/Miner.json")).await?;

        assert_eq!(
            content,
            indoc! {r#"
                [
                    "function mine()"
                ]"#}
        );

        Ok(())
    }

    #[tokio::test]
    async fn zero_spacing_is_compact() -> eyre::Result<()> {
        let dir = setup().await;
        let root = dir.path();

        let config = AbiExporterConfig {
            flat: true,
            spacing: 0,
            only: vec!["Miner".to_string()],
            ..config()
        };

        export(&config, root.join("out"), root).await?;

        let content =
            tokio::fs::read_to_string(root.join("abi/Miner.json")).await?;

        assert!(!content.contains('\n'));

        let abi: Vec<serde_json::Value> = serde_json::from_str(&content)?;
        assert_eq!(abi[0]["name"], "mine");

        Ok(())
    }
}
