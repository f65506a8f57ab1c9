use clap::Parser;
use cli::{Args, Command};
use config::Config;
use indicatif::ProgressStyle;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub mod abi_exporter;
pub mod artifacts;
pub mod forge_utils;
pub mod serde_utils;

mod cli;
mod compile;
mod config;
mod deployment;
mod report;
mod types;

async fn start() -> eyre::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config).await?;
    let network = args.network.as_ref();

    match args.command {
        Command::Compile { force } => {
            compile::compile(&config, &args.root, force).await?
        }
        Command::ExportAbi => compile::export_abi(&config, &args.root).await?,
        Command::Deploy { script, verify } => {
            deployment::run_deployment(
                &config, network, &args.root, script, verify,
            )
            .await?
        }
        Command::Verify { contract, address } => {
            deployment::run_verify(
                &config, network, &args.root, &contract, address,
            )
            .await?
        }
        Command::Networks => print_networks(&config),
    }

    Ok(())
}

fn print_networks(config: &Config) {
    for (name, network) in &config.networks {
        let is_default = config.default_network.as_ref() == Some(name);
        let host = network
            .rpc_url()
            .ok()
            .and_then(|url| url.host_str().map(ToString::to_string))
            .unwrap_or_default();

        println!(
            "{name}{} {host} accounts={} chain_id={}",
            if is_default { " (default)" } else { "" },
            network.accounts.len(),
            network
                .chain_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "any".to_string()),
        );
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Before argument parsing, so `.env` also feeds the `env` fallbacks.
    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new().with_progress_style(
        ProgressStyle::with_template(
            "{span_child_prefix}{spinner:.green} {span_name}{{{span_fields}}} {wide_msg}",
        )?,
    );

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    match start().await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!("{:?}", err);
            std::process::exit(1)
        }
    }
}
