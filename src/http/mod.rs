//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request id, request context)
//!     → middleware/toolset.rs (per-request toolset, released on every exit)
//!     → users.rs (route span, decorated user service)
//!     → error.rs (map failures to JSON responses)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod server;
pub mod users;

pub use error::ApiError;
pub use request::{RequestContext, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
