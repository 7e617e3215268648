//! RPC gateway entry point.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use rpc_gateway::config::{load_config, GatewayConfig};
use rpc_gateway::http::HttpServer;
use rpc_gateway::observability;

#[derive(Parser)]
#[command(name = "rpc-gateway")]
#[command(about = "Gating proxy in front of a JSON-RPC node", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_found = cli.config.exists();
    let config = if config_found {
        load_config(&cli.config)?
    } else {
        GatewayConfig::default()
    };

    observability::logging::init_tracing(&config.observability.log_level);

    if !config_found {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_route = %config.api.route,
        upstream = %config.upstream.url,
        requests_limit = config.rate_limit.requests_limit,
        window_secs = config.rate_limit.window_secs,
        users = config.users.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
