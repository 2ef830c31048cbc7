//! Trace export pipeline and toolset provisioning.
//!
//! # Responsibilities
//! - Build the process-wide tracer provider once at startup
//! - Hand every request a toolset derived from it
//! - Tear the pipeline down once at process exit
//!
//! # Design Decisions
//! - Fail fast: a pipeline that cannot be built stops the process
//! - The provider is injected as a handle, nothing is registered globally
//! - Releasing a toolset never shuts the shared provider down

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{Context, InstrumentationScope, KeyValue};
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ExporterKind, ObservabilityConfig};
use crate::observability::context::ToolSetContextExt;
use crate::observability::metrics;
use crate::observability::toolset::{Meter, ToolSet};
use crate::observability::tracer::OtelTracer;

/// Errors raised while building or tearing down the trace pipeline.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Observability settings cannot produce a pipeline.
    #[error("invalid telemetry configuration: {0}")]
    InvalidConfig(String),

    /// The SDK rejected an operation on the provider.
    #[error("trace pipeline error: {0}")]
    Pipeline(#[from] OTelSdkError),
}

/// Source of per-request toolsets.
pub trait ToolSetProvider: Send + Sync {
    /// Create the toolset for one request. `name` names its meter.
    fn create_toolset(&self, cx: &Context, name: &str) -> Result<ToolSet, TelemetryError>;
}

/// Process-wide trace pipeline.
#[derive(Debug)]
pub struct Telemetry {
    provider: SdkTracerProvider,
    scope: InstrumentationScope,
    flush_on_release: bool,
}

impl Telemetry {
    /// Build the pipeline described by `config`.
    pub fn install(config: &ObservabilityConfig) -> Result<Self, TelemetryError> {
        if config.service_name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "service_name must not be empty".to_string(),
            ));
        }
        if config.instrumentation_name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "instrumentation_name must not be empty".to_string(),
            ));
        }

        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .with_attribute(KeyValue::new("service.version", config.service_version.clone()))
            .build();

        let builder = SdkTracerProvider::builder().with_resource(resource);
        let provider = match config.exporter {
            ExporterKind::Stdout => builder
                .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
                .build(),
            ExporterKind::None => builder.build(),
        };

        let scope = InstrumentationScope::builder(config.instrumentation_name.clone())
            .with_version(config.instrumentation_version.clone())
            .build();

        tracing::info!(
            service = %config.service_name,
            exporter = ?config.exporter,
            "Trace pipeline installed"
        );

        Ok(Self {
            provider,
            scope,
            flush_on_release: config.flush_on_release,
        })
    }

    /// Flush and stop the pipeline. Call once, after the server stopped.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        self.provider.shutdown()?;
        tracing::info!("Trace pipeline shut down");
        Ok(())
    }
}

impl ToolSetProvider for Telemetry {
    fn create_toolset(&self, cx: &Context, name: &str) -> Result<ToolSet, TelemetryError> {
        if cx.try_toolset().is_some() {
            tracing::warn!(meter = name, "Context already carries a toolset, shadowing it");
        }

        let tracer = OtelTracer::new(self.provider.tracer_with_scope(self.scope.clone()));
        let provider = self.provider.clone();
        let flush = self.flush_on_release;

        metrics::record_toolset_created();
        Ok(ToolSet::new(Arc::new(tracer), Meter::new(name), move || {
            if flush {
                if let Err(e) = provider.force_flush() {
                    tracing::warn!(error = %e, "Failed to flush spans on toolset release");
                }
            }
            metrics::record_toolset_released();
        }))
    }
}
