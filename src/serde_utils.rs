use std::path::Path;

use eyre::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// YAML unless the extension says otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Format::Toml,
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

pub fn deserialize_str<T>(path: impl AsRef<Path>, content: &str) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let value = match Format::from_path(path) {
        Format::Yaml => serde_yaml::from_str(content)
            .with_context(|| format!("Parsing {}", path.display()))?,
        Format::Toml => toml::from_str(content)
            .with_context(|| format!("Parsing {}", path.display()))?,
        Format::Json => serde_json::from_str(content)
            .with_context(|| format!("Parsing {}", path.display()))?,
    };

    Ok(value)
}

pub async fn read_deserialize<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading from {}", path.display()))?;

    deserialize_str(path, &content)
}

pub async fn write_serialize<T>(
    path: impl AsRef<Path>,
    value: T,
) -> eyre::Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();

    let content = match Format::from_path(path) {
        Format::Yaml => serde_yaml::to_string(&value)
            .with_context(|| format!("Serializing {}", path.display()))?,
        Format::Toml => toml::to_string_pretty(&value)
            .with_context(|| format!("Serializing {}", path.display()))?,
        Format::Json => serde_json::to_string_pretty(&value)
            .with_context(|| format!("Serializing {}", path.display()))?,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Creating {}", parent.display()))?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Writing to {}", path.display()))?;

    Ok(())
}
