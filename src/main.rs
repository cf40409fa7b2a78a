//! AI News Digest — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, the metrics
//! recorder, and the daily digest scheduler.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_news_digest::api::{self, AppState};
use ai_news_digest::ingest::scheduler::{spawn_daily_digest, DigestSchedulerCfg};
use ai_news_digest::metrics::Metrics;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - NEWS_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("NEWS_DEV_LOG").ok().is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ingest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This provides
    // GEMINI_API_KEY / OPENAI_API_KEY / NEWS_SOURCES_PATH for the adapters.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let metrics = Metrics::init();

    let state = AppState::from_env();

    // Background daily digest in the reference time zone.
    let _scheduler = spawn_daily_digest(
        DigestSchedulerCfg::default(),
        state.sources.as_ref().clone(),
        state.summarizer.clone(),
        state.store.clone(),
    );

    let router = api::create_router(state).merge(metrics.router());

    Ok(router.into())
}
