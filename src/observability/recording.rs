//! In-process span sink.
//!
//! Records span start/end events in memory instead of exporting them. Used by
//! the test suites to check span names, nesting and counts, and handy for
//! local debugging where no exporter is wanted.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use opentelemetry::Context;

use crate::observability::pipeline::{TelemetryError, ToolSetProvider};
use crate::observability::toolset::{Meter, ToolSet};
use crate::observability::tracer::{ActiveSpan, SpanStatus, Tracer};

/// One recorded tracer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanEvent {
    Started {
        id: u64,
        parent: Option<u64>,
        name: String,
    },
    Ended {
        id: u64,
        name: String,
        status: SpanStatus,
    },
}

/// Context value marking the recorded span that is currently active.
#[derive(Debug, Clone, Copy)]
struct RecordedSpanId(u64);

#[derive(Debug, Default)]
struct Journal {
    next_id: AtomicU64,
    events: Mutex<Vec<SpanEvent>>,
}

impl Journal {
    fn push(&self, event: SpanEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// [`Tracer`] that keeps every start and end event.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    journal: Arc<Journal>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events in the order they happened.
    pub fn events(&self) -> Vec<SpanEvent> {
        self.journal
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn started(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SpanEvent::Started { .. }))
            .count()
    }

    pub fn ended(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SpanEvent::Ended { .. }))
            .count()
    }

    /// Names of started spans, in start order.
    pub fn started_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SpanEvent::Started { name, .. } => Some(name),
                SpanEvent::Ended { .. } => None,
            })
            .collect()
    }

    /// Names of ended spans, in end order.
    pub fn ended_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SpanEvent::Ended { name, .. } => Some(name),
                SpanEvent::Started { .. } => None,
            })
            .collect()
    }

    /// End status of the first span called `name`.
    pub fn status_of(&self, name: &str) -> Option<SpanStatus> {
        self.events().into_iter().find_map(|e| match e {
            SpanEvent::Ended {
                name: ended,
                status,
                ..
            } if ended == name => Some(status),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.journal
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Tracer for RecordingTracer {
    fn start(&self, name: Cow<'static, str>, parent: &Context) -> (Context, Box<dyn ActiveSpan>) {
        let id = self.journal.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let name = name.into_owned();
        self.journal.push(SpanEvent::Started {
            id,
            parent: parent.get::<RecordedSpanId>().map(|p| p.0),
            name: name.clone(),
        });

        let span = RecordedSpan {
            id,
            name,
            journal: self.journal.clone(),
        };
        (parent.with_value(RecordedSpanId(id)), Box::new(span))
    }
}

struct RecordedSpan {
    id: u64,
    name: String,
    journal: Arc<Journal>,
}

impl ActiveSpan for RecordedSpan {
    fn end(self: Box<Self>, status: SpanStatus) {
        let RecordedSpan { id, name, journal } = *self;
        journal.push(SpanEvent::Ended { id, name, status });
    }
}

/// [`ToolSetProvider`] handing out toolsets built on one [`RecordingTracer`].
///
/// Counts how many toolsets were created and released.
#[derive(Debug, Clone, Default)]
pub struct RecordingProvider {
    tracer: RecordingTracer,
    created: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl RecordingProvider {
    pub fn new(tracer: RecordingTracer) -> Self {
        Self {
            tracer,
            ..Self::default()
        }
    }

    pub fn tracer(&self) -> &RecordingTracer {
        &self.tracer
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ToolSetProvider for RecordingProvider {
    fn create_toolset(&self, _cx: &Context, name: &str) -> Result<ToolSet, TelemetryError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let released = self.released.clone();
        Ok(ToolSet::new(
            Arc::new(self.tracer.clone()),
            Meter::new(name),
            move || {
                released.fetch_add(1, Ordering::SeqCst);
            },
        ))
    }
}
