//! User routes.
//!
//! Parses path and body input, calls the decorated user service and maps
//! results to JSON. Each handler runs inside its own `http:*` span.

use axum::extract::{Path, State};
use axum::handler::Handler;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::middleware::route_span;
use crate::http::request::RequestContext;
use crate::http::server::AppState;
use crate::observability::ToolSetContextExt;
use crate::service::{CreateUser, UpdateUser, User};

/// Body of create and update requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserBody {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreatedUser {
    pub id: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users.layer(from_fn_with_state("http:get_users", route_span)))
                .post(create_user.layer(from_fn_with_state("http:post_users", route_span))),
        )
        .route(
            "/users/{id}",
            get(get_user.layer(from_fn_with_state("http:get_user_by_id", route_span)))
                .put(update_user.layer(from_fn_with_state("http:put_user", route_span)))
                .delete(delete_user.layer(from_fn_with_state("http:delete_user", route_span))),
        )
}

/// Ids are positive integers.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId),
    }
}

async fn list_users(
    State(state): State<AppState>,
    RequestContext(cx): RequestContext,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.get_all(&cx).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    RequestContext(cx): RequestContext,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id)?;
    let user = state.users.get_by_id(&cx, id).await?;
    Ok(Json(user))
}

async fn create_user(
    State(state): State<AppState>,
    RequestContext(cx): RequestContext,
    Json(body): Json<UserBody>,
) -> Result<Json<CreatedUser>, ApiError> {
    let id = state
        .users
        .create(
            &cx,
            CreateUser {
                name: body.name,
                password: body.password,
            },
        )
        .await?;
    cx.toolset().meter().counter("users_created_total").increment(1);
    tracing::info!(user_id = id, "User created");
    Ok(Json(CreatedUser { id }))
}

async fn update_user(
    State(state): State<AppState>,
    RequestContext(cx): RequestContext,
    Path(id): Path<String>,
    Json(body): Json<UserBody>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state
        .users
        .update(
            &cx,
            id,
            UpdateUser {
                name: body.name,
                password: body.password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    State(state): State<AppState>,
    RequestContext(cx): RequestContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.users.delete(&cx, id).await?;
    cx.toolset().meter().counter("users_deleted_total").increment(1);
    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
