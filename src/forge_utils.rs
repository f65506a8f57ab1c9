pub mod build;
pub mod common;
pub mod verify;

pub use self::build::ForgeBuild;
pub use self::common::ContractSpec;
pub use self::verify::ForgeVerify;

/// Runs `cmd` and turns a non-zero exit into an error carrying stderr.
pub(crate) async fn run_checked(
    name: &str,
    cmd: &mut tokio::process::Command,
) -> eyre::Result<std::process::Output> {
    let output = cmd.output().await.map_err(|err| {
        eyre::eyre!("failed to spawn `{name}`, is foundry installed? {err}")
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        eyre::bail!("{name} failed: {}{}", stderr.trim(), stdout.trim());
    }

    Ok(output)
}
