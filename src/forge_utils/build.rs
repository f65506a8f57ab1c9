use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::run_checked;
use crate::types::SolidityVersion;

#[derive(Debug)]
pub struct ForgeBuild {
    root: PathBuf,
    solc_version: Option<SolidityVersion>,
    sources: Option<PathBuf>,
    artifacts: Option<PathBuf>,
    force: bool,
}

impl ForgeBuild {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_owned(),
            solc_version: None,
            sources: None,
            artifacts: None,
            force: false,
        }
    }

    pub fn with_solc_version(mut self, solc_version: SolidityVersion) -> Self {
        self.solc_version = Some(solc_version);
        self
    }

    pub fn with_sources(mut self, sources: impl AsRef<Path>) -> Self {
        self.sources = Some(sources.as_ref().to_owned());
        self
    }

    pub fn with_artifacts(mut self, artifacts: impl AsRef<Path>) -> Self {
        self.artifacts = Some(artifacts.as_ref().to_owned());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["build".into()];

        args.push("--root".into());
        args.push(self.root.clone().into());

        if let Some(solc_version) = &self.solc_version {
            args.push("--use".into());
            args.push(solc_version.to_string().into());
        }

        if let Some(sources) = &self.sources {
            args.push("--contracts".into());
            args.push(sources.clone().into());
        }

        if let Some(artifacts) = &self.artifacts {
            args.push("--out".into());
            args.push(artifacts.clone().into());
        }

        if self.force {
            args.push("--force".into());
        }

        args
    }

    #[instrument(name = "forge_build", skip_all)]
    pub async fn run(&self) -> eyre::Result<()> {
        let mut cmd = tokio::process::Command::new("forge");
        cmd.args(self.args());

        info!("Compiling with {cmd:?}");

        run_checked("forge build", &mut cmd).await?;

        Ok(())
    }
}
