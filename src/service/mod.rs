//! User service layer.
//!
//! # Data Flow
//! ```text
//! transport
//!     → Spanned("userService")         span userService_<Op>User(s)
//!     → UserService                     validation, password hashing, mapping
//!     → Spanned("userDatabase")        span userDatabase_<Op>User(s)
//!     → MemoryUserStore
//! ```
//!
//! # Design Decisions
//! - Composition is fixed at construction time by [`compose`]
//! - The service is generic over any storage speaking the record types, so the
//!   decorated and plain stores are interchangeable

use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry::Context;
use serde::Serialize;
use thiserror::Error;

use crate::decorator::{Operations, SpanNames, Spanned};
use crate::storage::{NewUserRecord, StoreError, UserRecord, UserRecordUpdate, STORAGE_LAYER};

pub mod password;

pub use password::{BcryptHasher, PasswordHasher};

/// Span prefix of the service layer.
pub const SERVICE_LAYER: &str = "userService";

/// Operation names shared by both user layers, e.g. `userService_CreateUser`.
pub const USER_SPAN_NAMES: SpanNames = SpanNames {
    get_all: "GetUsers",
    get_by_id: "GetUserByID",
    create: "CreateUser",
    update: "UpdateUser",
    delete: "DeleteUser",
};

/// A user as the service exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub password: String,
}

/// Replacement values for a user.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub name: String,
    pub password: String,
}

/// Errors returned by the user service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Storage the user service can sit on.
pub trait UserStorage:
    Operations<
    Id = i64,
    Entity = UserRecord,
    Create = NewUserRecord,
    Update = UserRecordUpdate,
    Error = StoreError,
>
{
}

impl<T> UserStorage for T where
    T: Operations<
        Id = i64,
        Entity = UserRecord,
        Create = NewUserRecord,
        Update = UserRecordUpdate,
        Error = StoreError,
    >
{
}

/// Service contract seen by the transport.
pub type UserServiceArc = Arc<
    dyn Operations<
            Id = i64,
            Entity = User,
            Create = CreateUser,
            Update = UpdateUser,
            Error = ServiceError,
        > + Send
        + Sync,
>;

/// Business logic over user storage.
pub struct UserService<S> {
    store: S,
    hasher: Arc<dyn PasswordHasher>,
}

impl<S: UserStorage> UserService<S> {
    pub fn new(store: S, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    fn validate_name(name: &str) -> Result<(), ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: UserStorage> Operations for UserService<S> {
    type Id = i64;
    type Entity = User;
    type Create = CreateUser;
    type Update = UpdateUser;
    type Error = ServiceError;

    async fn get_all(&self, cx: &Context) -> Result<Vec<User>, ServiceError> {
        let records = self.store.get_all(cx).await?;
        Ok(records.into_iter().map(User::from).collect())
    }

    async fn get_by_id(&self, cx: &Context, id: i64) -> Result<User, ServiceError> {
        Ok(self.store.get_by_id(cx, id).await?.into())
    }

    async fn create(&self, cx: &Context, request: CreateUser) -> Result<i64, ServiceError> {
        Self::validate_name(&request.name)?;
        let password_hash = self.hasher.hash(&request.password)?;
        let id = self
            .store
            .create(
                cx,
                NewUserRecord {
                    name: request.name,
                    password_hash,
                },
            )
            .await?;
        Ok(id)
    }

    async fn update(&self, cx: &Context, id: i64, request: UpdateUser) -> Result<(), ServiceError> {
        Self::validate_name(&request.name)?;
        let password_hash = self.hasher.hash(&request.password)?;
        self.store
            .update(
                cx,
                id,
                UserRecordUpdate {
                    name: request.name,
                    password_hash,
                },
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, cx: &Context, id: i64) -> Result<(), ServiceError> {
        self.store.delete(cx, id).await?;
        Ok(())
    }
}

/// Wire storage and service together, each behind its own span decorator.
pub fn compose<S: UserStorage + 'static>(
    store: S,
    hasher: Arc<dyn PasswordHasher>,
) -> UserServiceArc {
    let storage = Spanned::with_names(STORAGE_LAYER, USER_SPAN_NAMES, store);
    let service = UserService::new(storage, hasher);
    Arc::new(Spanned::with_names(SERVICE_LAYER, USER_SPAN_NAMES, service))
}
