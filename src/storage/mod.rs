//! User persistence.
//!
//! # Responsibilities
//! - Define the stored user record and its write requests
//! - Provide the concrete data-access implementation the storage
//!   decorator wraps
//!
//! # Design Decisions
//! - Storage speaks the generic [`Operations`](crate::decorator::Operations)
//!   contract with its own entity types
//! - Only the in-memory backend ships; queries and schema live behind it

use std::time::SystemTime;

use thiserror::Error;

pub mod memory;

pub use memory::MemoryUserStore;

/// Span prefix of the storage layer.
pub const STORAGE_LAYER: &str = "userDatabase";

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub password_hash: String,
    pub created_on: SystemTime,
    pub last_edited: SystemTime,
}

/// Fields for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub password_hash: String,
}

/// Replacement fields for an existing user.
#[derive(Debug, Clone)]
pub struct UserRecordUpdate {
    pub name: String,
    pub password_hash: String,
}

/// Errors returned by user storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("database failed to get user {0}")]
    NotFound(i64),

    #[error("database failed to create user: {0}")]
    Create(String),
}
