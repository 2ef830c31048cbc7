//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! process start
//!     → pipeline.rs (Telemetry::install, exporter + tracer provider)
//!
//! per request
//!     → pipeline.rs (ToolSetProvider::create_toolset)
//!     → toolset.rs (tracer + meter + release)
//!     → context.rs (toolset attached to the request Context)
//!     → tracer.rs (spans opened by decorators at every layer)
//!     → toolset release when the request completes
//!
//! process exit
//!     → pipeline.rs (Telemetry::shutdown)
//! ```
//!
//! # Design Decisions
//! - Observability is load-bearing: pipeline failures stop startup
//! - The toolset is request-private; the pipeline is the only shared piece
//! - recording.rs keeps spans in memory for tests and local debugging

pub mod context;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod recording;
pub mod toolset;
pub mod tracer;

pub use context::ToolSetContextExt;
pub use pipeline::{Telemetry, TelemetryError, ToolSetProvider};
pub use toolset::{Meter, ToolSet};
pub use tracer::{ActiveSpan, OtelTracer, SpanStatus, Tracer};
