//! Serve the demo handler graph over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use handler_router::config::{apply_overrides, load_config, Overrides, ServerConfig};
use handler_router::demo::{self, UserStore};
use handler_router::lifecycle::{wait_for_signal, Shutdown};
use handler_router::observability::{init_logging, init_metrics};
use handler_router::HttpServer;

#[derive(Parser)]
#[command(name = "handler-router")]
#[command(about = "Route HTTP requests through a graph of handlers", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `observability.log_level`.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    let config = apply_overrides(
        config,
        Overrides {
            bind_address: cli.bind,
            log_level: cli.log_level,
        },
    )?;

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        conversion_faults = ?config.routing.conversion_faults,
        "handler-router starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let store = Arc::new(UserStore::seeded());
    let server = HttpServer::new(config, demo::graph(store));

    let shutdown = Shutdown::new();
    let mut serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut serving => {
            result??;
            return Ok(());
        }
        _ = wait_for_signal() => {
            shutdown.trigger();
            serving.await??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
