//! Abstract CRUD operation set.

use async_trait::async_trait;
use opentelemetry::Context;

/// Operations every layer exposes to the layer above it.
///
/// The context is threaded through each call so decorators can find the
/// request toolset and parent their spans correctly.
#[async_trait]
pub trait Operations: Send + Sync {
    /// Identifier of a stored entity.
    type Id: Send + 'static;
    /// Entity returned by reads.
    type Entity: Send + 'static;
    /// Input of `create`.
    type Create: Send + 'static;
    /// Input of `update`.
    type Update: Send + 'static;
    type Error: Send + 'static;

    async fn get_all(&self, cx: &Context) -> Result<Vec<Self::Entity>, Self::Error>;

    async fn get_by_id(&self, cx: &Context, id: Self::Id) -> Result<Self::Entity, Self::Error>;

    async fn create(&self, cx: &Context, request: Self::Create) -> Result<Self::Id, Self::Error>;

    async fn update(
        &self,
        cx: &Context,
        id: Self::Id,
        request: Self::Update,
    ) -> Result<(), Self::Error>;

    async fn delete(&self, cx: &Context, id: Self::Id) -> Result<(), Self::Error>;
}
