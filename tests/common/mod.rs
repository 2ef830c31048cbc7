//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use opentelemetry::Context;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use traced_users::config::AppConfig;
use traced_users::decorator::{Operations, Spanned};
use traced_users::http::{AppState, HttpServer};
use traced_users::observability::recording::RecordingProvider;
use traced_users::service::{
    compose, BcryptHasher, CreateUser, ServiceError, UpdateUser, User, SERVICE_LAYER,
    USER_SPAN_NAMES,
};
use traced_users::storage::MemoryUserStore;

/// Lowest bcrypt cost, so tests stay fast.
pub fn fast_hasher() -> BcryptHasher {
    BcryptHasher::new(BcryptHasher::MIN_COST)
}

/// Fully layered app over an in-memory store, recording every span.
pub fn app() -> (Router, RecordingProvider) {
    let provider = RecordingProvider::default();
    let users = compose(MemoryUserStore::new(), Arc::new(fast_hasher()));
    let server = HttpServer::new(AppConfig::default(), Arc::new(provider.clone()), users);
    (server.router(), provider)
}

/// Fully layered app whose user service panics on every call.
pub fn panicking_app() -> (Router, RecordingProvider) {
    let provider = RecordingProvider::default();
    let state = AppState {
        users: Arc::new(Spanned::with_names(SERVICE_LAYER, USER_SPAN_NAMES, PanickingUsers)),
    };
    let router = HttpServer::build_router(&AppConfig::default(), Arc::new(provider.clone()), state);
    (router, provider)
}

/// Serve the app on an ephemeral port. Send on the returned channel to stop.
pub async fn spawn_server() -> (SocketAddr, RecordingProvider, broadcast::Sender<()>) {
    let provider = RecordingProvider::default();
    let users = compose(MemoryUserStore::new(), Arc::new(fast_hasher()));
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = broadcast::channel(1);
    let server = HttpServer::new(config, Arc::new(provider.clone()), users);
    tokio::spawn(server.run(listener, rx));

    (addr, provider, tx)
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

struct PanickingUsers;

#[async_trait]
impl Operations for PanickingUsers {
    type Id = i64;
    type Entity = User;
    type Create = CreateUser;
    type Update = UpdateUser;
    type Error = ServiceError;

    async fn get_all(&self, _cx: &Context) -> Result<Vec<User>, ServiceError> {
        panic!("user listing exploded");
    }

    async fn get_by_id(&self, _cx: &Context, _id: i64) -> Result<User, ServiceError> {
        panic!("user lookup exploded");
    }

    async fn create(&self, _cx: &Context, _request: CreateUser) -> Result<i64, ServiceError> {
        panic!("user creation exploded");
    }

    async fn update(
        &self,
        _cx: &Context,
        _id: i64,
        _request: UpdateUser,
    ) -> Result<(), ServiceError> {
        panic!("user update exploded");
    }

    async fn delete(&self, _cx: &Context, _id: i64) -> Result<(), ServiceError> {
        panic!("user deletion exploded");
    }
}
