//! Per-request observability toolset.
//!
//! # Responsibilities
//! - Bundle the tracer and meter handles a request uses
//! - Own the release function that hands exporter resources back
//! - Guarantee the release function runs at most once
//!
//! # Design Decisions
//! - Shared as `Arc<ToolSet>`; every field is read-only after construction
//! - Release is a take-once slot, the lock is never held while it runs

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::observability::tracer::Tracer;

type ReleaseFn = Box<dyn FnOnce() + Send + 'static>;

/// Tracer, meter and release function for a single request.
pub struct ToolSet {
    tracer: Arc<dyn Tracer>,
    meter: Meter,
    release: Mutex<Option<ReleaseFn>>,
    released: AtomicBool,
}

impl ToolSet {
    /// Create a toolset. `release` runs on the first call to [`ToolSet::release`].
    pub fn new(
        tracer: Arc<dyn Tracer>,
        meter: Meter,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            tracer,
            meter,
            release: Mutex::new(Some(Box::new(release))),
            released: AtomicBool::new(false),
        }
    }

    pub fn tracer(&self) -> &dyn Tracer {
        self.tracer.as_ref()
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    /// Run the release function.
    ///
    /// Returns `true` if this call ran it, `false` if it had already run.
    pub fn release(&self) -> bool {
        let release = self
            .release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match release {
            Some(release) => {
                self.released.store(true, Ordering::SeqCst);
                release();
                true
            }
            None => false,
        }
    }

    /// Whether the release function has run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("meter", &self.meter)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

/// Named handle onto the process metrics recorder.
///
/// Every instrument created through a meter carries a `meter` label with its name.
#[derive(Debug, Clone)]
pub struct Meter {
    name: Arc<str>,
}

impl Meter {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Counter scoped to this meter.
    pub fn counter(&self, name: &'static str) -> metrics::Counter {
        metrics::counter!(name, "meter" => self.name.to_string())
    }

    /// Record how long a span stayed open.
    pub fn record_span_duration(&self, span: &str, elapsed: Duration) {
        metrics::histogram!(
            "decorated_call_duration_seconds",
            "meter" => self.name.to_string(),
            "span" => span.to_string()
        )
        .record(elapsed.as_secs_f64());
    }
}
