//! End-to-end request handling through the full middleware stack.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use traced_users::observability::recording::SpanEvent;
use traced_users::observability::SpanStatus;

use common::{app, json_body, panicking_app, request};

#[tokio::test]
async fn list_nests_spans_across_layers() {
    let (app, provider) = app();

    let response = app
        .oneshot(request(Method::GET, "/users", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));

    assert_eq!(
        provider.tracer().events(),
        vec![
            SpanEvent::Started {
                id: 1,
                parent: None,
                name: "http:get_users".into(),
            },
            SpanEvent::Started {
                id: 2,
                parent: Some(1),
                name: "userService_GetUsers".into(),
            },
            SpanEvent::Started {
                id: 3,
                parent: Some(2),
                name: "userDatabase_GetUsers".into(),
            },
            SpanEvent::Ended {
                id: 3,
                name: "userDatabase_GetUsers".into(),
                status: SpanStatus::Ok,
            },
            SpanEvent::Ended {
                id: 2,
                name: "userService_GetUsers".into(),
                status: SpanStatus::Ok,
            },
            SpanEvent::Ended {
                id: 1,
                name: "http:get_users".into(),
                status: SpanStatus::Ok,
            },
        ]
    );
    assert_eq!(provider.created(), 1);
    assert_eq!(provider.released(), 1);
}

#[tokio::test]
async fn create_uses_user_span_names() {
    let (app, provider) = app();

    let response = app
        .oneshot(request(
            Method::POST,
            "/users",
            Some(json!({ "name": "carol", "password": "pw" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        provider.tracer().started_names(),
        vec!["http:post_users", "userService_CreateUser", "userDatabase_CreateUser"]
    );
}

#[tokio::test]
async fn crud_round_trip_releases_one_toolset_per_request() {
    let (app, provider) = app();

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/users",
            Some(json!({ "name": "alice", "password": "pw" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    assert_eq!(created, json!({ "id": 1 }));

    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            "/users/1",
            Some(json!({ "name": "alicia", "password": "pw2" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/users/1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "id": 1, "name": "alicia" }));

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, "/users/1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(provider.created(), 4);
    assert_eq!(provider.released(), 4);
    let tracer = provider.tracer();
    assert_eq!(tracer.started(), tracer.ended());
    assert_eq!(
        tracer.started_names(),
        vec![
            "http:post_users",
            "userService_CreateUser",
            "userDatabase_CreateUser",
            "http:put_user",
            "userService_UpdateUser",
            "userDatabase_UpdateUser",
            "http:get_user_by_id",
            "userService_GetUserByID",
            "userDatabase_GetUserByID",
            "http:delete_user",
            "userService_DeleteUser",
            "userDatabase_DeleteUser",
        ]
    );
}

#[tokio::test]
async fn unknown_user_is_404_with_error_spans() {
    let (app, provider) = app();

    let response = app
        .oneshot(request(Method::GET, "/users/42", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "message": "no user found with id 42" })
    );

    let tracer = provider.tracer();
    assert_eq!(tracer.status_of("userDatabase_GetUserByID"), Some(SpanStatus::Error));
    assert_eq!(tracer.status_of("userService_GetUserByID"), Some(SpanStatus::Error));
    // A 4xx is a handled outcome at the transport.
    assert_eq!(tracer.status_of("http:get_user_by_id"), Some(SpanStatus::Ok));
    assert_eq!(provider.released(), 1);
}

#[tokio::test]
async fn invalid_id_never_reaches_the_service() {
    let (app, provider) = app();

    let response = app
        .oneshot(request(Method::DELETE, "/users/abc", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.tracer().started_names(), vec!["http:delete_user"]);
    assert_eq!(provider.released(), 1);
}

#[tokio::test]
async fn validation_failure_is_400() {
    let (app, provider) = app();

    let response = app
        .oneshot(request(
            Method::POST,
            "/users",
            Some(json!({ "name": "", "password": "pw" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        provider.tracer().started_names(),
        vec!["http:post_users", "userService_CreateUser"]
    );
}

#[tokio::test]
async fn panic_becomes_500_and_releases_once() {
    let (app, provider) = panicking_app();

    let response = app
        .oneshot(request(Method::GET, "/users", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(provider.created(), 1);
    assert_eq!(provider.released(), 1);

    let tracer = provider.tracer();
    assert_eq!(tracer.started(), tracer.ended());
    assert_eq!(tracer.ended_names(), vec!["userService_GetUsers", "http:get_users"]);
    assert_eq!(tracer.status_of("userService_GetUsers"), Some(SpanStatus::Error));
    assert_eq!(tracer.status_of("http:get_users"), Some(SpanStatus::Error));
}

#[tokio::test]
async fn concurrent_requests_each_get_a_toolset() {
    let (app, provider) = app();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                app.oneshot(request(
                    Method::POST,
                    "/users",
                    Some(json!({ "name": format!("user-{i}"), "password": "pw" })),
                ))
                .await
                .unwrap()
                .status()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(provider.created(), 8);
    assert_eq!(provider.released(), 8);
    assert_eq!(provider.tracer().started(), 24);
    assert_eq!(provider.tracer().ended(), 24);
}
