//! Request-scoped toolset carrier.
//!
//! The toolset travels on an [`opentelemetry::Context`] under one reserved key,
//! the private [`ToolSetEntry`] type. The request middleware is the only writer;
//! every layer below it reads. Deriving a context never touches its parent.

use std::sync::Arc;

use opentelemetry::Context;

use crate::observability::toolset::ToolSet;

/// Reserved context key for the request toolset.
#[derive(Debug, Clone)]
struct ToolSetEntry(Arc<ToolSet>);

/// Toolset access on a request context.
pub trait ToolSetContextExt {
    /// Derive a context carrying `tools`.
    fn with_toolset(&self, tools: Arc<ToolSet>) -> Self;

    /// The toolset this context carries.
    ///
    /// # Panics
    ///
    /// Panics if no toolset was attached. That means the request never passed
    /// through the toolset middleware, which is a wiring bug rather than a
    /// request failure.
    ///
    /// Also panics if the toolset was already released, in every build
    /// profile. A context that outlives its request (for example one moved
    /// into a detached task) must not open spans on a finished request.
    fn toolset(&self) -> Arc<ToolSet>;

    /// The toolset, if one was attached.
    fn try_toolset(&self) -> Option<Arc<ToolSet>>;
}

impl ToolSetContextExt for Context {
    fn with_toolset(&self, tools: Arc<ToolSet>) -> Self {
        self.with_value(ToolSetEntry(tools))
    }

    #[track_caller]
    fn toolset(&self) -> Arc<ToolSet> {
        match self.try_toolset() {
            Some(tools) if tools.is_released() => {
                panic!("toolset used after release: the request owning this context has finished")
            }
            Some(tools) => tools,
            None => panic!("missing toolset: context was not prepared by the toolset middleware"),
        }
    }

    fn try_toolset(&self) -> Option<Arc<ToolSet>> {
        self.get::<ToolSetEntry>().map(|entry| entry.0.clone())
    }
}
