use std::io::Write;

use sfe_core::{analyze, order, ClientConfig, ServerConfig};
use sfe_transport::{render_table, SfeClient, SfeServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Coordinator and client in one process, over loopback.
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;

    let server = SfeServer::bind(config).await?;
    let addr = server.local_addr()?;
    tokio::spawn(server.serve());

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "abracadabra".to_string());
    let ordered = order(analyze(text.as_bytes()).records());

    let client_config = ClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        ..ClientConfig::default()
    };
    let replies = SfeClient::connect(&client_config)
        .await?
        .encode_all(&ordered)
        .await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&render_table(&ordered, &replies))?;
    stdout.flush()?;
    Ok(())
}
