//! HTTP API tests driving the router without binding a socket.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::setup;
use dotoday::adapters::http::{ErrorResponse, GoalResponse, GoalsHttpConfig, GoalsHttpServer, USER_ID_HEADER};
use dotoday::services::GoalPolicy;

async fn router() -> Router {
    router_with(GoalPolicy::default()).await
}

async fn router_with(policy: GoalPolicy) -> Router {
    let ctx = setup(policy).await;
    GoalsHttpServer::new(ctx.service, GoalsHttpConfig::default()).router()
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn create(app: &Router, user: &str, body: Value) -> GoalResponse {
    let (status, bytes) = send(app, request("POST", "/api/v1/goals", Some(user), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = router().await;
    let (status, bytes) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"OK");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let app = router().await;
    let (status, bytes) = send(&app, request("GET", "/api/v1/goals", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err.code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_create_then_complete_twice() {
    let app = router().await;
    let goal = create(&app, "alice", json!({ "title": "Stretch" })).await;
    assert_eq!(goal.owner_id, "alice");
    assert_eq!(goal.state, "active");
    assert_eq!(goal.current_streak, 0);

    let uri = format!("/api/v1/goals/{}/complete", goal.id);
    let (status, bytes) = send(&app, request("POST", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    let receipt: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(receipt["current_streak"], 1);
    assert_eq!(receipt["completion"]["count"], 1);

    let (status, bytes) = send(&app, request("POST", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err.code, "CONFLICT");
    assert_eq!(err.error, "already completed today");
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let app = router().await;
    let (status, bytes) = send(
        &app,
        request("POST", "/api/v1/goals", Some("alice"), Some(json!({ "title": "  " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_foreign_user_is_forbidden() {
    let app = router().await;
    let goal = create(&app, "alice", json!({ "title": "Private" })).await;

    let (status, _) = send(
        &app,
        request("GET", &format!("/api/v1/goals/{}", goal.id), Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        request("POST", &format!("/api/v1/goals/{}/complete", goal.id), Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_concealed_private_goal_looks_missing() {
    let app = router_with(GoalPolicy {
        conceal_private_goals: true,
        ..GoalPolicy::default()
    })
    .await;
    let goal = create(&app, "alice", json!({ "title": "Private" })).await;

    let (status, _) = send(
        &app,
        request("GET", &format!("/api/v1/goals/{}/streak", goal.id), Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_goal_is_not_found() {
    let app = router().await;
    let uri = format!("/api/v1/goals/{}", uuid::Uuid::new_v4());
    let (status, bytes) = send(&app, request("GET", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err.code, "NOT_FOUND");
}

#[tokio::test]
async fn test_public_goal_is_readable_by_others() {
    let app = router().await;
    let goal = create(&app, "alice", json!({ "title": "Run", "is_public": true })).await;

    let (status, bytes) = send(&app, request("GET", "/api/v1/goals/public?limit=10", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let goals: Vec<GoalResponse> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, goal.id);

    let (status, _) = send(
        &app,
        request("GET", &format!("/api/v1/goals/{}/graph?days=7", goal.id), Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_graph_has_window_plus_one_points() {
    let app = router().await;
    let goal = create(&app, "alice", json!({ "title": "Run" })).await;
    send(
        &app,
        request("POST", &format!("/api/v1/goals/{}/complete", goal.id), Some("alice"), None),
    )
    .await;

    let (status, bytes) = send(
        &app,
        request("GET", &format!("/api/v1/goals/{}/graph?days=7", goal.id), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let points: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(points.len(), 8);
    assert_eq!(points[7]["completions"], 1);
    assert!(points[..7].iter().all(|p| p["completions"] == 0));
}

#[tokio::test]
async fn test_archive_delete_and_stats() {
    let app = router().await;
    let keep = create(&app, "alice", json!({ "title": "Keep" })).await;
    let gone = create(&app, "alice", json!({ "title": "Gone" })).await;

    send(
        &app,
        request("POST", &format!("/api/v1/goals/{}/complete", keep.id), Some("alice"), None),
    )
    .await;

    let (status, bytes) = send(
        &app,
        request("POST", &format!("/api/v1/goals/{}/archive", keep.id), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let archived: GoalResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(archived.state, "archived");

    let (status, _) = send(
        &app,
        request("POST", &format!("/api/v1/goals/{}/archive", keep.id), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/v1/goals/{}", gone.id), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, bytes) = send(&app, request("GET", "/api/v1/users/me/stats", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let stats: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(stats["total_goals"], 1);
    assert_eq!(stats["active_goals"], 0);
    assert_eq!(stats["total_completions"], 1);
}

#[tokio::test]
async fn test_update_and_recompute() {
    let app = router().await;
    let goal = create(&app, "alice", json!({ "title": "Old" })).await;

    let (status, bytes) = send(
        &app,
        request(
            "PUT",
            &format!("/api/v1/goals/{}", goal.id),
            Some("alice"),
            Some(json!({ "title": "New" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: GoalResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(updated.title, "New");

    let (status, bytes) = send(
        &app,
        request(
            "POST",
            &format!("/api/v1/goals/{}/streak/recompute", goal.id),
            Some("alice"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["current_streak"], 0);
}

#[tokio::test]
async fn test_graph_window_over_maximum_is_rejected() {
    let app = router().await;
    let goal = create(&app, "alice", json!({ "title": "Run", "is_public": true })).await;

    for days in ["3661", "4294967295"] {
        let (status, bytes) = send(
            &app,
            request(
                "GET",
                &format!("/api/v1/goals/{}/graph?days={days}", goal.id),
                Some("bob"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }
}
