//! Deferred content server.
//!
//! Starts listening immediately and answers every request through a
//! [`DeferredHandler`](deferred_handler::DeferredHandler) whose backing router
//! is built from a content file once that file appears.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use deferred_handler::config::{resolve_config, Overrides};
use deferred_handler::http::HttpServer;
use deferred_handler::lifecycle::{signals, Shutdown};
use deferred_handler::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "deferred-handler")]
#[command(about = "Serve a file over HTTP, queueing requests until it exists", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the content file path.
    #[arg(long)]
    content: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(
        cli.config.as_deref(),
        Overrides {
            bind_address: cli.bind,
            content_path: cli.content,
        },
    )?;

    logging::init(&config.observability.log_level);

    tracing::info!("deferred-handler v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        retry_after_ms = config.deferred.retry_after_ms,
        timeout_after_ms = config.deferred.timeout_after_ms,
        give_up_after_secs = ?config.deferred.give_up_after_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_ctrl_c(shutdown.clone()));

    let server = HttpServer::new(config, &shutdown);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
