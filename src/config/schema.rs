//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files. Every
//! section has defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the users server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Password hashing settings.
    pub passwords: PasswordConfig,

    /// Logging, tracing and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3333").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3333".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Password hashing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// bcrypt work factor (4..=31).
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 12 }
    }
}

/// Where finished spans go.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExporterKind {
    /// Pretty-printed to standard output as each span ends.
    #[default]
    Stdout,
    /// Spans are recorded but not exported.
    None,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// `service.name` resource attribute.
    pub service_name: String,

    /// `service.version` resource attribute.
    pub service_version: String,

    /// Instrumentation scope of every request tracer.
    pub instrumentation_name: String,

    pub instrumentation_version: String,

    /// Meter name given to each request toolset.
    pub meter_name: String,

    /// Span exporter.
    pub exporter: ExporterKind,

    /// Flush pending spans whenever a request toolset is released.
    pub flush_on_release: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            service_name: "otel-example".to_string(),
            service_version: "0.0.1".to_string(),
            instrumentation_name: "traced-users".to_string(),
            instrumentation_version: env!("CARGO_PKG_VERSION").to_string(),
            meter_name: "demo-otels".to_string(),
            exporter: ExporterKind::Stdout,
            flush_on_release: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
