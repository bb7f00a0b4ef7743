//! Delve Web Server
//!
//! HTTP front end for the deep research pipeline.

use clap::Parser;
use delve_web::{init_logging, DelveServerBuilder, WebConfig};
use std::path::PathBuf;
use tracing::info;

/// Delve Web Server - fact-grounded research reports over HTTP
#[derive(Parser)]
#[command(name = "delve-web")]
#[command(about = "HTTP API for the Delve research pipeline")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides DELVE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides DELVE_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Pipeline configuration file (overrides DELVE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var(
            "RUST_LOG",
            format!(
                "delve_web={level},delve_research={level},delve_generation={level},tower_http=debug",
                level = args.log_level
            ),
        );
    }
    init_logging();

    let mut config = WebConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(path) = args.config {
        config.config_path = Some(path);
    }

    info!("🔧 Building Delve Web Server v{}", env!("CARGO_PKG_VERSION"));
    let server = DelveServerBuilder::from_config(config).build()?;

    server.start().await?;
    Ok(())
}
