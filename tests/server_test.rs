//! REST route tests, run in-process against the router.

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{Prompt, ScriptedTransport, cautious_players, client};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use twenty_questions::{GameServer, LlmErrorKind, SessionStore};

fn router(transport: &Arc<ScriptedTransport>) -> Router {
    let (client, _) = client(transport);
    GameServer::new(SessionStore::new(client)).router()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: &Router, first: &str, second: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/games",
        Some(json!({ "player1_type": first, "player2_type": second })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check() {
    let app = router(&ScriptedTransport::new());
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn human_game_over_http() {
    let app = router(&ScriptedTransport::new());
    let id = create(&app, "human", "human").await;

    let (status, body) = send(&app, "GET", &format!("/api/games/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "waiting_for_object");
    assert_eq!(body["max_questions"], 20);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/games/{}/object", id),
        Some(json!({ "object": "kite" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "object_set");
    assert_eq!(body["game"]["secret_object"], Value::Null);

    let action = format!("/api/games/{}/action", id);
    let (status, body) = send(
        &app,
        "POST",
        &action,
        Some(json!({ "action_type": "ask_question", "content": "Does it fly?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "question_pending");
    assert_eq!(body["game"]["pending_question"], "Does it fly?");

    let (status, body) = send(
        &app,
        "POST",
        &action,
        Some(json!({ "action_type": "answer_question", "content": "perhaps" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid answer"));

    let (status, body) = send(
        &app,
        "POST",
        &action,
        Some(json!({ "action_type": "answer_question", "content": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["answer"], "yes");
    assert_eq!(body["game"]["question_count"], 1);

    let (status, body) = send(
        &app,
        "POST",
        &action,
        Some(json!({ "action_type": "make_guess", "content": "KITE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["correct"], true);
    assert_eq!(body["game"]["status"], "won");
    assert_eq!(body["game"]["winner"], "Player 2");
    assert_eq!(body["game"]["secret_object"], "kite");
    assert_eq!(body["game"]["history"][0]["question"], "Does it fly?");

    let (status, _) = send(
        &app,
        "POST",
        &action,
        Some(json!({ "action_type": "make_guess", "content": "kite" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn automated_turns_over_http() {
    let app = router(&cautious_players("kite"));
    let id = create(&app, "llm", "llm").await;

    let (status, body) = send(&app, "GET", &format!("/api/games/{}/next", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "question_answered");
    assert_eq!(body["outcome"]["answer"], "no");
    assert_eq!(body["game"]["question_count"], 1);
}

#[tokio::test]
async fn default_players_are_llm_then_human() {
    let transport = ScriptedTransport::new().default_reply(Prompt::Secret, "kite");
    let app = router(&transport);

    let (status, body) = send(&app, "POST", "/api/games", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["player1_type"], "llm");
    assert_eq!(body["player2_type"], "human");
    assert_eq!(body["phase"], "waiting_for_question");
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let app = router(&ScriptedTransport::new());
    let (status, body) = send(&app, "GET", "/api/games/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));

    let (status, _) = send(&app, "GET", "/api/games/nope/next", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reasoning_failure_on_create_is_bad_gateway() {
    let transport =
        ScriptedTransport::new().push(Prompt::Secret, Err(LlmErrorKind::Configuration));
    let app = router(&transport);

    let (status, body) = send(
        &app,
        "POST",
        "/api/games",
        Some(json!({ "player1_type": "llm", "player2_type": "human" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("Reasoning service"));
}

#[tokio::test]
async fn malformed_create_body_is_bad_request() {
    let app = router(&ScriptedTransport::new());
    let (status, _) = send(
        &app,
        "POST",
        "/api/games",
        Some(json!({ "player1_type": "robot" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
