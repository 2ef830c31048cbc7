//! HTTP middleware.
//!
//! - toolset.rs: per-request toolset lifecycle (tower layer)
//! - route_span.rs: span around an individual route handler

pub mod route_span;
pub mod toolset;

pub use route_span::route_span;
pub use toolset::{ToolSetLayer, ToolSetService};
