//! Traced users server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ access log ─▶ timeout ─▶ panic guard
//!                                                              │
//!                                                              ▼
//!                                               toolset middleware (create / release)
//!                                                              │
//!                                                              ▼
//!                                     http:<route> span ─▶ userService_<Op> span
//!                                                              │
//!                                                              ▼
//!                                                  userDatabase_<Op> span ─▶ store
//! ```
//!
//! Every request gets its own tracer and meter from the process-wide trace
//! pipeline. The pipeline is built once at startup and shut down once at exit.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use traced_users::config::{resolve_config, Overrides};
use traced_users::http::HttpServer;
use traced_users::lifecycle::{self, Shutdown};
use traced_users::observability::{logging, metrics, Telemetry};
use traced_users::service::{compose, BcryptHasher};
use traced_users::storage::MemoryUserStore;

#[derive(Debug, Parser)]
#[command(name = "traced-users", version, about = "Users API with per-request tracing")]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let overrides = Overrides {
        bind_address: args.bind,
    };
    let config = resolve_config(args.config.as_deref(), overrides)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "traced-users starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        exporter = ?config.observability.exporter,
        "Configuration loaded"
    );

    let telemetry = Arc::new(Telemetry::install(&config.observability)?);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let hasher = BcryptHasher::new(config.passwords.bcrypt_cost);
    let users = compose(MemoryUserStore::new(), Arc::new(hasher));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, telemetry.clone(), users);
    let serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    lifecycle::trigger_on_signal(&shutdown).await;
    serving.await??;

    telemetry.shutdown()?;
    tracing::info!("Shutdown complete");
    Ok(())
}
