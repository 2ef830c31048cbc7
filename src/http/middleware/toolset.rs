//! Request lifecycle middleware.
//!
//! # State Machine
//! ```text
//! IDLE ──create_toolset──▶ TOOLS_CREATED ──inner.call──▶ DELEGATED
//!                                                         │
//!        response / error / panic / cancellation          ▼
//!                                                   TOOLS_RELEASED
//! ```
//!
//! # Design Decisions
//! - Release lives in a guard owned by the response future, so every exit
//!   path (including unwinding and a dropped future) releases exactly once
//! - A provider failure is a broken deployment, not a bad request: it panics
//!   instead of producing a response

use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Instant;

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use opentelemetry::Context;
use tower::{Layer, Service};

use crate::http::request::request_id;
use crate::observability::context::ToolSetContextExt;
use crate::observability::metrics;
use crate::observability::pipeline::ToolSetProvider;
use crate::observability::toolset::ToolSet;

/// Attaches a fresh toolset to every request.
#[derive(Clone)]
pub struct ToolSetLayer {
    provider: Arc<dyn ToolSetProvider>,
    meter_name: Arc<str>,
}

impl ToolSetLayer {
    pub fn new(provider: Arc<dyn ToolSetProvider>, meter_name: impl Into<Arc<str>>) -> Self {
        Self {
            provider,
            meter_name: meter_name.into(),
        }
    }
}

impl<S> Layer<S> for ToolSetLayer {
    type Service = ToolSetService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ToolSetService {
            inner,
            provider: self.provider.clone(),
            meter_name: self.meter_name.clone(),
        }
    }
}

/// Service produced by [`ToolSetLayer`].
#[derive(Clone)]
pub struct ToolSetService<S> {
    inner: S,
    provider: Arc<dyn ToolSetProvider>,
    meter_name: Arc<str>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ToolSetService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ReqBody: 'static,
    ResBody: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let request_id = request_id(&request);
        let parent = request
            .extensions()
            .get::<Context>()
            .cloned()
            .unwrap_or_else(Context::new);

        let tools = match self.provider.create_toolset(&parent, &self.meter_name) {
            Ok(tools) => Arc::new(tools),
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "Failed to create request toolset"
                );
                panic!("toolset creation failed: {e}");
            }
        };
        tracing::trace!(request_id = %request_id, "Request toolset created");

        request
            .extensions_mut()
            .insert(parent.with_toolset(tools.clone()));
        let release = ReleaseGuard { tools, request_id };

        let method = request.method().to_string();
        let start = Instant::now();
        let future = self.inner.call(request);

        Box::pin(async move {
            let release = release;
            let result = future.await;
            if let Ok(response) = &result {
                metrics::record_request(&method, response.status().as_u16(), start);
            }
            drop(release);
            result
        })
    }
}

/// Releases the request toolset when dropped.
struct ReleaseGuard {
    tools: Arc<ToolSet>,
    request_id: String,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if self.tools.release() {
            tracing::trace!(request_id = %self.request_id, "Request toolset released");
        }
    }
}
