//! Tracing decorators.
//!
//! # Data Flow
//! ```text
//! caller (ctx)
//!     → Spanned::op (layer prefix)
//!         → guard.rs: toolset from ctx, span "<layer>_<Op>" opened
//!         → next.op(child ctx)            ← business logic, unaware of tracing
//!         → span closed (ok / error / dropped)
//!     ← result returned untouched
//! ```
//!
//! # Design Decisions
//! - Composition, not inheritance: a decorator holds its delegate in a field
//! - One generic decorator is reused by every layer, configured by prefix
//! - Closing happens in `Drop` as a fallback, so panics and cancellation
//!   still end the span

pub mod guard;
pub mod operations;
pub mod spanned;

pub use guard::SpanGuard;
pub use operations::Operations;
pub use spanned::{SpanNames, Spanned};
