//! secad — the SECA mock daemon.
//!
//! Serves the `seca.workspace` and `seca.storage` providers from memory,
//! with simulated provisioning delays.
//!
//! # Usage
//!
//! ```text
//! secad serve --config secad.toml --listen 127.0.0.1:8080
//! secad config > secad.toml
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use seca_core::SecadConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,secad=debug,seca=debug";

#[derive(Parser)]
#[command(name = "secad", about = "SECA mock daemon")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the mock API server.
    Serve {
        /// Path to a secad.toml file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address, overriding `[server] listen`.
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Print the effective configuration as TOML.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve { config, listen } => {
            let mut config = load_config(config)?;
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            serve(config).await
        }
        Command::Config { config } => {
            print!("{}", load_config(config)?.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<SecadConfig> {
    match path {
        Some(path) => {
            let config = SecadConfig::from_file(&path)?;
            info!(path = ?path, "configuration loaded");
            Ok(config)
        }
        None => Ok(SecadConfig::default()),
    }
}

async fn serve(config: SecadConfig) -> anyhow::Result<()> {
    info!(
        region = %config.lifecycle.region,
        creating_delay = ?config.lifecycle.creating_delay,
        create_active_delay = ?config.lifecycle.create_active_delay,
        update_active_delay = ?config.lifecycle.update_active_delay,
        "SECA mock starting"
    );

    let cloud = Arc::new(seca_lifecycle::MockCloud::new(&config)?);
    let router = seca_api::build_router(cloud);

    let addr = config.server.listen;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("SECA mock stopped");
    Ok(())
}
