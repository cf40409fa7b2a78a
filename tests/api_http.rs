// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/articles (no sources configured -> empty batch, no network)
// - POST /api/chat    (validation + "Not found" short-circuit)

use std::sync::Arc;

use serde_json::{json, Value as Json};
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use ai_news_digest::ai_adapter::{DisabledGenerator, MockGenerator};
use ai_news_digest::api::{self, AppState};
use ai_news_digest::ingest::summarize::Summarizer;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Router over zero sources and offline AI clients: every route stays local.
fn test_router() -> Router {
    let state = AppState::new(
        Vec::new(),
        Summarizer::new(Arc::new(DisabledGenerator)),
        Arc::new(MockGenerator {
            fixed: "mock chat answer".to_string(),
        }),
    );
    api::router(state)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn api_articles_with_no_sources_returns_empty_array() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/api/articles")
        .body(Body::empty())
        .expect("build GET /api/articles");

    let resp = app.oneshot(req).await.expect("oneshot /api/articles");
    assert!(resp.status().is_success());

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse articles json");
    assert!(v.is_array());
    assert_eq!(v.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn api_chat_rejects_blank_questions() {
    let app = test_router();

    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "question": "   " }).to_string()))
        .expect("build POST /api/chat");

    let resp = app.oneshot(req).await.expect("oneshot /api/chat");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse error json");
    assert!(v.get("error").is_some());
}

#[tokio::test]
async fn api_chat_with_empty_context_answers_not_found() {
    let app = test_router();

    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "question": "any gpt news today?" }).to_string(),
        ))
        .expect("build POST /api/chat");

    let resp = app.oneshot(req).await.expect("oneshot /api/chat");
    assert!(resp.status().is_success());

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse chat json");
    assert_eq!(v.get("answer").and_then(Json::as_str), Some("Not found"));
    assert!(v.get("id").is_some());
    assert!(v.get("timestamp").is_some());
    assert_eq!(
        v.get("question").and_then(Json::as_str),
        Some("any gpt news today?")
    );
}
