//! Request-scoped inputs.
//!
//! # Responsibilities
//! - Generate a UUID v4 request id for every inbound request
//! - Hand handlers the request's observability context
//!
//! # Design Decisions
//! - Request id is assigned before any other middleware so every log line
//!   and toolset can carry it
//! - A handler reached without the toolset middleware still receives a
//!   context; the first decorator it calls fails loudly on it

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderValue, Request};
use opentelemetry::Context;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// Request id of `request`, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// The request's observability context.
///
/// Carries the request toolset and the innermost active span.
#[derive(Debug, Clone)]
pub struct RequestContext(pub Context);

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Context>()
                .cloned()
                .unwrap_or_else(Context::new),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn request_ids_are_uuids() {
        let request = Request::new(Body::empty());
        let mut make = UuidRequestId;
        let first = make.make_request_id(&request).unwrap();
        let second = make.make_request_id(&request).unwrap();

        let first = first.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(first).is_ok());
        assert_ne!(first, second.header_value().to_str().unwrap());
    }

    #[test]
    fn missing_request_id_reads_unknown() {
        let request = Request::new(Body::empty());
        assert_eq!(request_id(&request), "unknown");
    }

    #[tokio::test]
    async fn extractor_reads_context_extension() {
        let (mut parts, _) = Request::new(Body::empty()).into_parts();
        let RequestContext(cx) = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(cx.get::<u8>().is_none());

        parts.extensions.insert(Context::new().with_value(7u8));
        let RequestContext(cx) = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(cx.get::<u8>(), Some(&7));
    }
}
