use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sfe_core::{analyze, order, ClientConfig};
use sfe_transport::{read_input_line, render_table, SfeClient};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Shannon-Fano-Elias coding client; reads one line from stdin",
    long_about = None
)]
struct Cli {
    /// Coordinator host name
    hostname: String,

    /// Coordinator port
    port: u16,

    /// TOML configuration file; arguments override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bound every socket read/write to this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };
    config.host = cli.hostname;
    config.port = cli.port;
    if cli.timeout_ms.is_some() {
        config.io_timeout_ms = cli.timeout_ms;
    }

    let text = read_input_line(std::io::stdin().lock(), config.max_input_bytes)
        .context("reading standard input")?;
    let table = analyze(&text);
    let ordered = order(table.records());
    tracing::info!(
        bytes = table.total_len(),
        symbols = ordered.len(),
        "frequency analysis complete"
    );

    let client = SfeClient::connect(&config).await?;
    let replies = client.encode_all(&ordered).await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&render_table(&ordered, &replies))?;
    stdout.flush()?;
    Ok(())
}
