//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, access log, timeout, panic guard, toolset)
//! - Bind server to listener and stop on the shutdown signal
//!
//! # Middleware order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → Timeout → CatchPanic → ToolSet → routes
//! ```
//! The toolset sits innermost so a timeout or a caught panic drops or unwinds
//! its response future, which releases the toolset.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::middleware::ToolSetLayer;
use crate::http::request::UuidRequestId;
use crate::http::users;
use crate::observability::pipeline::ToolSetProvider;
use crate::service::UserServiceArc;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: UserServiceArc,
}

/// HTTP server for the users API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn ToolSetProvider>,
        users: UserServiceArc,
    ) -> Self {
        let router = Self::build_router(&config, provider, AppState { users });
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(
        config: &AppConfig,
        provider: Arc<dyn ToolSetProvider>,
        state: AppState,
    ) -> Router {
        let toolsets = ToolSetLayer::new(provider, config.observability.meter_name.as_str());

        Router::new()
            .route("/", get(hello))
            .merge(users::routes())
            .with_state(state)
            .layer(toolsets)
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn hello() -> &'static str {
    "Hello World!"
}
