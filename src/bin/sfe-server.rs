use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sfe_core::{CodingMode, ServerConfig};
use sfe_transport::SfeServer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Shannon-Fano-Elias coding server", long_about = None)]
struct Cli {
    /// Port to listen on
    port: u16,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-session scheduling: `sequential` or `pipelined`
    #[arg(long)]
    mode: Option<CodingMode>,

    /// Bound every socket read/write to this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.port = cli.port;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(mode) = cli.mode {
        config.coding_mode = mode;
    }
    if cli.timeout_ms.is_some() {
        config.io_timeout_ms = cli.timeout_ms;
    }

    let server = SfeServer::bind(config).await.context("starting server")?;

    tokio::select! {
        served = server.serve() => served.context("accepting connections")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
