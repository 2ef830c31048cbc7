//! Span creation.
//!
//! # Responsibilities
//! - Define the seam decorators use to open spans
//! - Back it with an OpenTelemetry SDK tracer in production
//!
//! # Design Decisions
//! - Starting a span returns the child context the delegate runs under
//! - Ending consumes the span, so it cannot be ended twice

use std::borrow::Cow;
use std::fmt;

use opentelemetry::trace::{Status, TraceContextExt, Tracer as _};
use opentelemetry::Context;
use opentelemetry_sdk::trace::SdkTracer;

/// How a span finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    Ok,
    Error,
}

impl SpanStatus {
    /// Status for a completed call.
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            SpanStatus::Ok
        } else {
            SpanStatus::Error
        }
    }
}

/// Factory for spans, scoped to one instrumentation name.
pub trait Tracer: Send + Sync {
    /// Start `name` as a child of the span carried by `parent`, if any.
    ///
    /// Returns the derived context carrying the new span and the span itself.
    fn start(&self, name: Cow<'static, str>, parent: &Context) -> (Context, Box<dyn ActiveSpan>);
}

/// An open span.
pub trait ActiveSpan: Send + Sync {
    fn end(self: Box<Self>, status: SpanStatus);
}

/// [`Tracer`] backed by the OpenTelemetry SDK.
pub struct OtelTracer {
    inner: SdkTracer,
}

impl OtelTracer {
    pub fn new(inner: SdkTracer) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for OtelTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtelTracer").finish_non_exhaustive()
    }
}

impl Tracer for OtelTracer {
    fn start(&self, name: Cow<'static, str>, parent: &Context) -> (Context, Box<dyn ActiveSpan>) {
        let span = self.inner.start_with_context(name, parent);
        let cx = parent.with_span(span);
        (cx.clone(), Box::new(OtelSpan { cx }))
    }
}

struct OtelSpan {
    cx: Context,
}

impl ActiveSpan for OtelSpan {
    fn end(self: Box<Self>, status: SpanStatus) {
        let span = self.cx.span();
        match status {
            SpanStatus::Ok => span.set_status(Status::Ok),
            SpanStatus::Error => span.set_status(Status::error("operation failed")),
        }
        span.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};

    #[test]
    fn status_follows_result() {
        assert_eq!(SpanStatus::of::<_, ()>(&Ok(1)), SpanStatus::Ok);
        assert_eq!(SpanStatus::of::<(), _>(&Err("boom")), SpanStatus::Error);
    }

    #[test]
    fn otel_spans_nest_and_export() {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let tracer = OtelTracer::new(provider.tracer("tracer-test"));

        let (outer_cx, outer) = tracer.start("outer".into(), &Context::new());
        let (_, inner) = tracer.start("inner".into(), &outer_cx);
        inner.end(SpanStatus::Error);
        outer.end(SpanStatus::Ok);

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].name, "inner");
        assert_eq!(spans[1].name, "outer");
        assert_eq!(spans[0].parent_span_id, spans[1].span_context.span_id());
        assert_eq!(spans[1].status, Status::Ok);
        assert!(matches!(spans[0].status, Status::Error { .. }));
    }
}
