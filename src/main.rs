//! Duat Casino server binary.

use clap::Parser;
use duat_casino::api::{handlers::AppState, server::ApiServer};
use duat_casino::config::CasinoConfig;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "duat-casino")]
#[command(about = "Duat Casino game server", long_about = None)]
struct Args {
    /// Configuration file (TOML); defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Allowed CORS origins (comma-separated, use * for all; overrides config)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CasinoConfig::load(path)?,
        None => CasinoConfig::default(),
    };

    // CLI flags win over the file.
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(origins) = args.cors_origins {
        config.server.allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(timeout) = args.timeout {
        config.server.request_timeout_secs = timeout;
    }
    config.validate()?;

    let state = Arc::new(AppState::new(&config));
    let server = ApiServer::new(config, state);
    server.run().await?;

    Ok(())
}
