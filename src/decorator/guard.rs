//! Scoped span acquisition.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use opentelemetry::Context;

use crate::observability::context::ToolSetContextExt;
use crate::observability::toolset::ToolSet;
use crate::observability::tracer::{ActiveSpan, SpanStatus};

/// Span that stays open for the guard's lifetime.
///
/// [`SpanGuard::finish`] closes it with the call's status. A guard dropped
/// without finishing (panic unwinding or a cancelled future) closes the span
/// with [`SpanStatus::Error`].
pub struct SpanGuard {
    context: Context,
    span: Option<Box<dyn ActiveSpan>>,
    name: Cow<'static, str>,
    tools: Arc<ToolSet>,
    started: Instant,
}

impl SpanGuard {
    /// Open `name` on the tracer of the toolset carried by `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` carries no toolset.
    #[track_caller]
    pub fn start(parent: &Context, name: impl Into<Cow<'static, str>>) -> Self {
        let tools = parent.toolset();
        let name = name.into();
        let (context, span) = tools.tracer().start(name.clone(), parent);
        Self {
            context,
            span: Some(span),
            name,
            tools,
            started: Instant::now(),
        }
    }

    /// Child context carrying this span. Pass it to the delegate.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the span with the status of `result`.
    pub fn finish<T, E>(mut self, result: &Result<T, E>) {
        self.end(SpanStatus::of(result));
    }

    /// Close the span with an explicit status.
    pub fn finish_with(mut self, status: SpanStatus) {
        self.end(status);
    }

    fn end(&mut self, status: SpanStatus) {
        if let Some(span) = self.span.take() {
            span.end(status);
            self.tools
                .meter()
                .record_span_duration(&self.name, self.started.elapsed());
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if self.span.is_some() {
            tracing::debug!(span = %self.name, "Span closed without completing");
            self.end(SpanStatus::Error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::recording::{RecordingProvider, SpanEvent};
    use crate::observability::ToolSetProvider;

    fn context(provider: &RecordingProvider) -> Context {
        let tools = provider.create_toolset(&Context::new(), "guard").unwrap();
        Context::new().with_toolset(Arc::new(tools))
    }

    #[test]
    fn finish_records_status() {
        let provider = RecordingProvider::default();
        let cx = context(&provider);

        let guard = SpanGuard::start(&cx, "ok");
        guard.finish::<_, ()>(&Ok(()));
        let guard = SpanGuard::start(&cx, "failed");
        guard.finish::<(), _>(&Err("nope"));

        let tracer = provider.tracer();
        assert_eq!(tracer.status_of("ok"), Some(SpanStatus::Ok));
        assert_eq!(tracer.status_of("failed"), Some(SpanStatus::Error));
        assert_eq!(tracer.started(), 2);
        assert_eq!(tracer.ended(), 2);
    }

    #[test]
    fn drop_closes_once() {
        let provider = RecordingProvider::default();
        let cx = context(&provider);

        drop(SpanGuard::start(&cx, "abandoned"));

        assert_eq!(
            provider.tracer().events().last(),
            Some(&SpanEvent::Ended {
                id: 1,
                name: "abandoned".into(),
                status: SpanStatus::Error,
            })
        );
        assert_eq!(provider.tracer().ended(), 1);
    }

    #[test]
    fn unwinding_closes_span() {
        let provider = RecordingProvider::default();
        let cx = context(&provider);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = SpanGuard::start(&cx, "panicking");
            panic!("delegate blew up");
        }));

        assert!(result.is_err());
        assert_eq!(provider.tracer().status_of("panicking"), Some(SpanStatus::Error));
    }

    #[test]
    fn child_context_keeps_toolset() {
        let provider = RecordingProvider::default();
        let cx = context(&provider);
        let guard = SpanGuard::start(&cx, "outer");
        assert!(Arc::ptr_eq(&guard.context().toolset(), &cx.toolset()));
        assert_eq!(guard.name(), "outer");
    }
}
