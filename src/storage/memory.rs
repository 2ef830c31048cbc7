//! In-memory user storage.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use dashmap::DashMap;
use opentelemetry::Context;

use crate::decorator::Operations;
use crate::storage::{NewUserRecord, StoreError, UserRecord, UserRecordUpdate};

/// Concurrent map of users keyed by id.
///
/// Ids are handed out from 1 upwards and never reused.
#[derive(Debug, Clone)]
pub struct MemoryUserStore {
    users: Arc<DashMap<i64, UserRecord>>,
    next_id: Arc<AtomicI64>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl Operations for MemoryUserStore {
    type Id = i64;
    type Entity = UserRecord;
    type Create = NewUserRecord;
    type Update = UserRecordUpdate;
    type Error = StoreError;

    async fn get_all(&self, _cx: &Context) -> Result<Vec<UserRecord>, StoreError> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|r| r.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_by_id(&self, _cx: &Context, id: i64) -> Result<UserRecord, StoreError> {
        self.users
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, _cx: &Context, request: NewUserRecord) -> Result<i64, StoreError> {
        if request.name.is_empty() {
            return Err(StoreError::Create("name is empty".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = SystemTime::now();
        self.users.insert(
            id,
            UserRecord {
                id,
                name: request.name,
                password_hash: request.password_hash,
                created_on: now,
                last_edited: now,
            },
        );
        tracing::debug!(user_id = id, "User stored");
        Ok(id)
    }

    async fn update(
        &self,
        _cx: &Context,
        id: i64,
        request: UserRecordUpdate,
    ) -> Result<(), StoreError> {
        let mut user = self.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.name = request.name;
        user.password_hash = request.password_hash;
        user.last_edited = SystemTime::now();
        Ok(())
    }

    async fn delete(&self, _cx: &Context, id: i64) -> Result<(), StoreError> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
