//! Per-request tracing for a layered users API.

pub mod config;
pub mod decorator;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod service;
pub mod storage;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
