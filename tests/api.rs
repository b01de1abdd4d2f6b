//! End-to-end API tests
//!
//! Drives the real router over the in-memory store with `oneshot` requests,
//! covering the full register → request → accept → converse flow plus the
//! auth and validation failure paths.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use xfchat::routes::create_router;
use xfchat::secrets::{FixedSecretProvider, SecretCache};
use xfchat::server::config::Config;
use xfchat::server::state::AppState;
use xfchat::store::memory::MemoryStore;

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let secrets = Arc::new(SecretCache::new(
        Arc::new(FixedSecretProvider::new("integration-secret")),
        Duration::from_secs(300),
    ));
    let state = AppState::new(store.clone(), store, secrets, Config::default());
    create_router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register a user the way a client would: hash locally, send the hash.
async fn register(app: &Router, user: &str, password: &str) -> String {
    // Minimum bcrypt cost keeps the suite fast
    let hash = bcrypt::hash(password, 4).unwrap();
    let (status, body) = send(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "user": user, "hashedPassword": hash })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {} failed: {}", user, body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, _body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/nonsense", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_register_and_login_round_trip() {
    let app = app();
    register(&app, "alice", "password-alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "user": "alice", "password": "password-alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_failures() {
    let app = app();
    register(&app, "alice", "password-alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "user": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "user": "nobody", "password": "password" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_registration_is_conflict() {
    let app = app();
    register(&app, "alice", "password-alice").await;

    let hash = bcrypt::hash("other-password", 4).unwrap();
    let (status, body) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "user": "alice", "hashedPassword": hash })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();

    let (status, _body) = send(&app, "GET", "/api/alice/contacts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _body) =
        send(&app, "GET", "/api/alice/contacts", Some("not.a.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_identity_mismatch_is_forbidden() {
    let app = app();
    let alice = register(&app, "alice", "pw-alice").await;
    register(&app, "bob", "pw-bob").await;

    // Alice's token driving bob's side of the handshake
    let (status, _body) = send(
        &app,
        "POST",
        "/api/bob/contacts/requests/send/alice",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_contact_request_validation() {
    let app = app();
    let alice = register(&app, "alice", "pw-alice").await;

    // Self request
    let (status, _body) = send(
        &app,
        "POST",
        "/api/alice/contacts/requests/send/alice",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown target
    let (status, _body) = send(
        &app,
        "POST",
        "/api/alice/contacts/requests/send/ghost",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_contact_handshake_scenario() {
    let app = app();
    let alice = register(&app, "alice", "pw-alice").await;
    let bob = register(&app, "bob", "pw-bob").await;

    // Alice requests bob
    let (status, body) = send(
        &app,
        "POST",
        "/api/alice/contacts/requests/send/bob",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // A second identical request conflicts
    let (status, _body) = send(
        &app,
        "POST",
        "/api/alice/contacts/requests/send/bob",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Request visible on both sides
    let (status, body) = send(
        &app,
        "GET",
        "/api/bob/contacts/pending-requests",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contactRequests"], json!(["alice"]));

    let (_status, body) = send(
        &app,
        "GET",
        "/api/alice/contacts/sent-requests",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["sentRequests"], json!(["bob"]));

    // Bob accepts: conversation created
    let (status, body) = send(
        &app,
        "POST",
        "/api/bob/contacts/requests/accept/alice",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let conversation_id = body["conversationId"].as_str().unwrap().to_string();

    // Accept retried: same conversation, not a new one
    let (status, body) = send(
        &app,
        "POST",
        "/api/bob/contacts/requests/accept/alice",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversationId"].as_str().unwrap(), conversation_id);

    // Mutual contacts, requests cleared
    let (_status, body) = send(&app, "GET", "/api/bob/contacts", Some(&bob), None).await;
    assert_eq!(body["contacts"], json!(["alice"]));
    let (_status, body) = send(&app, "GET", "/api/alice/contacts", Some(&alice), None).await;
    assert_eq!(body["contacts"], json!(["bob"]));
    let (_status, body) = send(
        &app,
        "GET",
        "/api/bob/contacts/pending-requests",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["contactRequests"], json!([]));

    // The conversation exists with both participants and zero messages
    let uri = format!("/api/conversation/{}", conversation_id);
    let (status, body) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation"]["participants"]["alice"], true);
    assert_eq!(body["conversation"]["participants"]["bob"], true);
    assert_eq!(body["conversation"]["messages"], json!([]));
}

#[tokio::test]
async fn test_decline_flow() {
    let app = app();
    let alice = register(&app, "alice", "pw-alice").await;
    let bob = register(&app, "bob", "pw-bob").await;

    let (status, _body) = send(
        &app,
        "POST",
        "/api/alice/contacts/requests/send/bob",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) = send(
        &app,
        "POST",
        "/api/bob/contacts/requests/decline/alice",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Request gone from both sides, no contacts created
    let (_status, body) = send(
        &app,
        "GET",
        "/api/bob/contacts/pending-requests",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["contactRequests"], json!([]));
    let (_status, body) = send(
        &app,
        "GET",
        "/api/alice/contacts/sent-requests",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["sentRequests"], json!([]));
    let (_status, body) = send(&app, "GET", "/api/bob/contacts", Some(&bob), None).await;
    assert_eq!(body["contacts"], json!([]));

    // Declining again: nothing pending anymore
    let (status, _body) = send(
        &app,
        "POST",
        "/api/bob/contacts/requests/decline/alice",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Register alice and bob, run the handshake, return their tokens and the
/// conversation id.
async fn handshake(app: &Router) -> (String, String, String) {
    let alice = register(app, "alice", "pw-alice").await;
    let bob = register(app, "bob", "pw-bob").await;

    let (status, _body) = send(
        app,
        "POST",
        "/api/alice/contacts/requests/send/bob",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/api/bob/contacts/requests/accept/alice",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let conversation_id = body["conversationId"].as_str().unwrap().to_string();

    (alice, bob, conversation_id)
}

#[tokio::test]
async fn test_message_send_and_read_flow() {
    let app = app();
    let (alice, bob, conversation_id) = handshake(&app).await;

    // Alice sends a message
    let (status, body) = send(
        &app,
        "PUT",
        "/api/message",
        Some(&alice),
        Some(json!({
            "conversationId": conversation_id,
            "message": { "sender": "alice", "body": "hi bob" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["sender"], "alice");
    assert_eq!(body["message"]["body"], "hi bob");

    // Bob replies and marks everything read in the same call
    let (status, _body) = send(
        &app,
        "PUT",
        "/api/message",
        Some(&bob),
        Some(json!({
            "conversationId": conversation_id,
            "message": { "sender": "bob", "body": "hi alice" },
            "updateRead": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/conversation/{}", conversation_id);
    let (_status, body) = send(&app, "GET", &uri, Some(&alice), None).await;
    let messages = body["conversation"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    // Bob's read marker covers both messages, including his own
    assert_eq!(messages[0]["readBy"]["bob"], true);
    assert_eq!(messages[1]["readBy"]["bob"], true);
    assert!(messages[0]["readBy"].get("alice").is_none());
}

#[tokio::test]
async fn test_message_put_failure_paths() {
    let app = app();
    let (alice, _bob, conversation_id) = handshake(&app).await;
    let carol = register(&app, "carol", "pw-carol").await;

    // Neither message nor updateRead
    let (status, _body) = send(
        &app,
        "PUT",
        "/api/message",
        Some(&alice),
        Some(json!({ "conversationId": conversation_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Forged sender
    let (status, _body) = send(
        &app,
        "PUT",
        "/api/message",
        Some(&alice),
        Some(json!({
            "conversationId": conversation_id,
            "message": { "sender": "bob", "body": "impersonation" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Carol is authenticated but not a participant
    let (status, _body) = send(
        &app,
        "PUT",
        "/api/message",
        Some(&carol),
        Some(json!({
            "conversationId": conversation_id,
            "message": { "sender": "carol", "body": "let me in" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown conversation
    let (status, _body) = send(
        &app,
        "PUT",
        "/api/message",
        Some(&alice),
        Some(json!({
            "conversationId": uuid::Uuid::new_v4(),
            "message": { "sender": "alice", "body": "hello?" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_typing_flow() {
    let app = app();
    let (alice, bob, conversation_id) = handshake(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/typing",
        Some(&alice),
        Some(json!({
            "conversationId": conversation_id,
            "user": "alice",
            "typing": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let uri = format!("/api/conversation/{}", conversation_id);
    let (_status, body) = send(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(body["conversation"]["typing"]["alice"], true);

    // Setting someone else's flag is forbidden
    let (status, _body) = send(
        &app,
        "PUT",
        "/api/typing",
        Some(&alice),
        Some(json!({
            "conversationId": conversation_id,
            "user": "bob",
            "typing": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown conversation
    let (status, _body) = send(
        &app,
        "PUT",
        "/api/typing",
        Some(&alice),
        Some(json!({
            "conversationId": uuid::Uuid::new_v4(),
            "user": "alice",
            "typing": false,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_conversation_access_control() {
    let app = app();
    let (_alice, _bob, conversation_id) = handshake(&app).await;
    let carol = register(&app, "carol", "pw-carol").await;

    let uri = format!("/api/conversation/{}", conversation_id);
    let (status, _body) = send(&app, "GET", &uri, Some(&carol), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/conversation/{}", uuid::Uuid::new_v4());
    let (status, _body) = send(&app, "GET", &uri, Some(&carol), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
