use std::sync::Arc;

use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ai_adapter::{self, DynTextGenerator};
use crate::chat::{self, ChatMessage};
use crate::config::{self, FeedSource};
use crate::digest::{DigestBatch, DigestStore};
use crate::ingest::summarize::Summarizer;
use crate::ingest::types::{Article, IngestMode};
use crate::ingest::{fetcher, reference_now, run_once};

#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<Vec<FeedSource>>,
    pub summarizer: Summarizer,
    pub chat: DynTextGenerator,
    pub store: Arc<DigestStore>,
}

impl AppState {
    pub fn new(sources: Vec<FeedSource>, summarizer: Summarizer, chat: DynTextGenerator) -> Self {
        Self {
            sources: Arc::new(sources),
            summarizer,
            chat,
            store: Arc::new(DigestStore::new()),
        }
    }

    /// Wire everything from the environment: configured sources plus AI
    /// clients that degrade to disabled when no credential is present.
    pub fn from_env() -> Self {
        let sources = config::load_sources_default().unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "sources config unreadable, using built-in feeds");
            config::built_in_sources()
        });
        Self::new(
            sources,
            Summarizer::new(ai_adapter::summary_client()),
            ai_adapter::chat_client(),
        )
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/articles", get(get_articles))
        .route("/api/triggered-articles", get(get_triggered_articles))
        .route("/api/chat", post(post_chat))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Alias so callers can use `api::router(state)` as well.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

/// ALL-mode ingest: fetch every enabled source, return the fresh batch and
/// remember it as the latest collection for the chat context.
async fn get_articles(State(state): State<AppState>) -> Json<Vec<Article>> {
    let fetchers = fetcher::build_fetchers(&state.sources);
    let articles = run_once(&fetchers, &state.summarizer, IngestMode::All).await;
    tracing::info!(articles = articles.len(), "served article batch");
    state.store.set_latest(articles.clone());
    Json(articles)
}

/// Digest-mode ingest (previous calendar day, with most-recent fallback),
/// stored as the last triggered batch.
async fn get_triggered_articles(State(state): State<AppState>) -> Json<Vec<Article>> {
    let fetchers = fetcher::build_fetchers(&state.sources);
    let articles = run_once(&fetchers, &state.summarizer, IngestMode::PreviousDayOnly).await;
    tracing::info!(articles = articles.len(), "served triggered batch");
    state.store.set_digest(DigestBatch {
        articles: articles.clone(),
        triggered_at: reference_now(),
    });
    Json(articles)
}

#[derive(serde::Deserialize)]
struct ChatReq {
    question: String,
}

#[derive(serde::Serialize)]
struct ApiError {
    error: String,
}

async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatReq>,
) -> Result<Json<ChatMessage>, (StatusCode, Json<ApiError>)> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Question is required".to_string(),
            }),
        ));
    }

    let context = state.store.chat_context();
    let message = chat::answer_question(&state.chat, question, &context).await;
    Ok(Json(message))
}
