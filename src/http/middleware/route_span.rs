//! Per-route transport spans.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::Context;

use crate::decorator::SpanGuard;
use crate::observability::tracer::SpanStatus;

/// Wrap a handler in a span named by the middleware state.
///
/// Install with `handler.layer(from_fn_with_state("http:get_users", route_span))`.
/// A 5xx response closes the span with error status.
pub async fn route_span(
    State(name): State<&'static str>,
    mut request: Request,
    next: Next,
) -> Response {
    let parent = request
        .extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_else(Context::new);

    let span = SpanGuard::start(&parent, name);
    request.extensions_mut().insert(span.context().clone());

    let response = next.run(request).await;
    let status = if response.status().is_server_error() {
        SpanStatus::Error
    } else {
        SpanStatus::Ok
    };
    span.finish_with(status);
    response
}
