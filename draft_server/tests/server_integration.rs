//! Integration tests for the draft HTTP API.
//!
//! Requests are driven through the router with `oneshot`; no socket is bound.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use draft_engine::{DraftManager, ManagerConfig, StaticCatalog};
use draft_server::api::{AppState, create_router, request_id::REQUEST_ID_HEADER};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

/// Standard turn order as (team, action_type)
const STANDARD_ORDER: [(&str, &str); 16] = [
    ("blue", "ban"),
    ("red", "ban"),
    ("blue", "ban"),
    ("red", "ban"),
    ("blue", "ban"),
    ("red", "ban"),
    ("blue", "pick"),
    ("red", "pick"),
    ("red", "pick"),
    ("blue", "pick"),
    ("blue", "pick"),
    ("red", "pick"),
    ("red", "pick"),
    ("blue", "pick"),
    ("blue", "pick"),
    ("red", "pick"),
];

fn create_test_server() -> axum::Router {
    let catalog = Arc::new(StaticCatalog::sample().unwrap());
    let manager = DraftManager::with_catalog(ManagerConfig::default(), catalog);

    create_router(AppState {
        manager: Arc::new(manager),
    })
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn create_session(app: &axum::Router, body: Value) -> String {
    let (status, body) = post(app, "/api/v1/draft/session", body).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

async fn act(
    app: &axum::Router,
    session_id: &str,
    champion_id: u32,
    action_type: &str,
    team: &str,
) -> (StatusCode, Value) {
    post(
        app,
        &format!("/api/v1/draft/session/{session_id}/action"),
        json!({ "champion_id": champion_id, "action_type": action_type, "team": team }),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_server();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn test_create_session_defaults_to_standard() {
    let app = create_test_server();

    let (status, body) = post(&app, "/api/v1/draft/session", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let session = &body["session"];
    assert_eq!(session["format"], "standard");
    assert_eq!(session["phase"], "ban_round1");
    assert_eq!(session["is_completed"], false);
    assert_eq!(session["next_turn"], json!({ "team": "blue", "kind": "ban" }));
    assert_eq!(session["blue"]["bans_remaining"], 3);
    assert_eq!(session["actions"], json!([]));
}

#[tokio::test]
async fn test_submit_action_advances_turn() {
    let app = create_test_server();
    let session_id = create_session(&app, json!({ "format": "tournament" })).await;

    let (status, action) = act(&app, &session_id, 7, "ban", "blue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(action["order"], 1);
    assert_eq!(action["champion"], 7);

    let (status, session) = get(&app, &format!("/api/v1/draft/session/{session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["next_turn"], json!({ "team": "red", "kind": "ban" }));
    assert_eq!(session["blue"]["bans"], json!([7]));
    assert_eq!(session["blue"]["bans_remaining"], 4);
}

#[tokio::test]
async fn test_rule_rejections_are_conflicts() {
    let app = create_test_server();
    let session_id = create_session(&app, json!({})).await;

    let (status, body) = act(&app, &session_id, 1, "ban", "red").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "turn_order");

    let (status, _) = act(&app, &session_id, 1, "ban", "blue").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = act(&app, &session_id, 1, "ban", "red").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "champion_unavailable");

    // Rejections leave no trace in the log
    let (_, session) = get(&app, &format!("/api/v1/draft/session/{session_id}")).await;
    assert_eq!(session["actions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_completed_draft_rejects_actions() {
    let app = create_test_server();
    let session_id = create_session(&app, json!({})).await;

    for (i, (team, kind)) in STANDARD_ORDER.iter().enumerate() {
        let (status, _) = act(&app, &session_id, i as u32 + 1, kind, team).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, session) = get(&app, &format!("/api/v1/draft/session/{session_id}")).await;
    assert_eq!(session["phase"], "completed");
    assert_eq!(session["next_turn"], Value::Null);
    assert_eq!(session["blue"]["picks"].as_array().unwrap().len(), 5);

    let (status, body) = act(&app, &session_id, 30, "pick", "blue").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "draft_completed");

    let (status, body) = get(
        &app,
        &format!("/api/v1/draft/session/{session_id}/suggestions?team=red"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "draft_completed");
}

#[tokio::test]
async fn test_unknown_and_malformed_sessions() {
    let app = create_test_server();

    let (status, body) = get(
        &app,
        "/api/v1/draft/session/6f1c1a52-3a44-4d57-9a53-0e7b2d3c9b10",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "session_not_found");

    let (status, body) = get(&app, "/api/v1/draft/session/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_invalid_requests() {
    let app = create_test_server();
    let session_id = create_session(&app, json!({})).await;

    let (status, body) = get(
        &app,
        &format!("/api/v1/draft/session/{session_id}/analysis?team=green"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");

    let (status, body) = post(
        &app,
        &format!("/api/v1/draft/session/{session_id}/action"),
        json!({ "champion_id": 3, "action_type": "steal", "team": "blue" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_request");

    let roster: Vec<String> = (0..6).map(|i| format!("player{i}")).collect();
    let (status, body) = post(
        &app,
        "/api/v1/draft/session",
        json!({ "blue_team": roster }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_roster");
}

#[tokio::test]
async fn test_suggestions_analysis_and_prediction() {
    let app = create_test_server();
    let session_id = create_session(&app, json!({})).await;

    let (status, suggestions) = get(
        &app,
        &format!("/api/v1/draft/session/{session_id}/suggestions?team=blue"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = suggestions.as_array().unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 5);
    for (i, suggestion) in suggestions.iter().enumerate() {
        assert_eq!(suggestion["rank"], i + 1);
        assert_eq!(suggestion["action_kind"], "ban");
    }

    let (status, composition) = get(
        &app,
        &format!("/api/v1/draft/session/{session_id}/analysis?team=red"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(composition["team"], "red");
    assert_eq!(composition["missing_roles"].as_array().unwrap().len(), 5);

    let (status, prediction) = get(
        &app,
        &format!("/api/v1/draft/session/{session_id}/prediction"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let blue = prediction["blue_win_rate"].as_f64().unwrap();
    let red = prediction["red_win_rate"].as_f64().unwrap();
    assert!((blue + red - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_list_sessions() {
    let app = create_test_server();
    create_session(&app, json!({})).await;
    create_session(&app, json!({ "format": "tournament" })).await;

    let (status, sessions) = get(&app, "/api/v1/draft/sessions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions.as_array().unwrap().len(), 2);

    let (_, health) = get(&app, "/health").await;
    assert_eq!(health["sessions"], 2);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_server();

    let response = app
        .oneshot(
            Request::get("/health")
                .header(REQUEST_ID_HEADER, "draft-trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "draft-trace-42"
    );
}
