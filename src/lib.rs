// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod ai_adapter;
pub mod api;
pub mod chat;
pub mod config;
pub mod digest;
pub mod ingest;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState};
pub use crate::config::FeedSource;
pub use crate::ingest::types::{Article, FeedFetch, IngestMode, RawItem};
