//! Span-producing decorator over [`Operations`].

use async_trait::async_trait;
use opentelemetry::Context;

use crate::decorator::guard::SpanGuard;
use crate::decorator::operations::Operations;

/// Operation part of each span name a [`Spanned`] layer emits.
///
/// These names end up on dashboards, so a layer keeps them fixed once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanNames {
    pub get_all: &'static str,
    pub get_by_id: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

impl SpanNames {
    /// Entity-agnostic names.
    pub const GENERIC: Self = Self {
        get_all: "GetAll",
        get_by_id: "GetByID",
        create: "Create",
        update: "Update",
        delete: "Delete",
    };
}

impl Default for SpanNames {
    fn default() -> Self {
        Self::GENERIC
    }
}

/// Wraps an [`Operations`] implementation and opens one span per call.
///
/// Spans are named `<layer>_<operation>`, for example `userService_CreateUser`.
/// Results and errors from the wrapped implementation are returned untouched.
#[derive(Debug, Clone)]
pub struct Spanned<S> {
    layer: &'static str,
    names: SpanNames,
    next: S,
}

impl<S> Spanned<S> {
    /// Decorate `next` using [`SpanNames::GENERIC`].
    pub fn new(layer: &'static str, next: S) -> Self {
        Self::with_names(layer, SpanNames::GENERIC, next)
    }

    pub fn with_names(layer: &'static str, names: SpanNames, next: S) -> Self {
        Self { layer, names, next }
    }

    pub fn layer(&self) -> &'static str {
        self.layer
    }

    pub fn names(&self) -> &SpanNames {
        &self.names
    }

    /// The wrapped implementation.
    pub fn inner(&self) -> &S {
        &self.next
    }

    fn span_name(&self, operation: &str) -> String {
        format!("{}_{}", self.layer, operation)
    }
}

#[async_trait]
impl<S> Operations for Spanned<S>
where
    S: Operations,
{
    type Id = S::Id;
    type Entity = S::Entity;
    type Create = S::Create;
    type Update = S::Update;
    type Error = S::Error;

    async fn get_all(&self, cx: &Context) -> Result<Vec<Self::Entity>, Self::Error> {
        let span = SpanGuard::start(cx, self.span_name(self.names.get_all));
        let result = self.next.get_all(span.context()).await;
        span.finish(&result);
        result
    }

    async fn get_by_id(&self, cx: &Context, id: Self::Id) -> Result<Self::Entity, Self::Error> {
        let span = SpanGuard::start(cx, self.span_name(self.names.get_by_id));
        let result = self.next.get_by_id(span.context(), id).await;
        span.finish(&result);
        result
    }

    async fn create(&self, cx: &Context, request: Self::Create) -> Result<Self::Id, Self::Error> {
        let span = SpanGuard::start(cx, self.span_name(self.names.create));
        let result = self.next.create(span.context(), request).await;
        span.finish(&result);
        result
    }

    async fn update(
        &self,
        cx: &Context,
        id: Self::Id,
        request: Self::Update,
    ) -> Result<(), Self::Error> {
        let span = SpanGuard::start(cx, self.span_name(self.names.update));
        let result = self.next.update(span.context(), id, request).await;
        span.finish(&result);
        result
    }

    async fn delete(&self, cx: &Context, id: Self::Id) -> Result<(), Self::Error> {
        let span = SpanGuard::start(cx, self.span_name(self.names.delete));
        let result = self.next.delete(span.context(), id).await;
        span.finish(&result);
        result
    }
}
