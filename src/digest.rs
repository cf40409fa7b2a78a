//! digest.rs — in-memory holder for the most recent batches.
//!
//! Single-writer, mutex-guarded, and deliberately not durable: a process
//! restart starts with empty state and the next ingest refills it.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset};

use crate::ingest::types::Article;

/// One triggered (previous-day) batch and when it was produced.
#[derive(Debug, Clone)]
pub struct DigestBatch {
    pub articles: Vec<Article>,
    pub triggered_at: DateTime<FixedOffset>,
}

#[derive(Debug, Default)]
pub struct DigestStore {
    latest: Mutex<Vec<Article>>,
    digest: Mutex<Option<DigestBatch>>,
}

impl DigestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the most recent ALL-mode batch.
    pub fn set_latest(&self, articles: Vec<Article>) {
        let mut g = self.latest.lock().expect("latest mutex poisoned");
        *g = articles;
    }

    pub fn latest(&self) -> Vec<Article> {
        self.latest.lock().expect("latest mutex poisoned").clone()
    }

    /// Record the most recent digest batch.
    pub fn set_digest(&self, batch: DigestBatch) {
        let mut g = self.digest.lock().expect("digest mutex poisoned");
        *g = Some(batch);
    }

    pub fn last_digest(&self) -> Option<DigestBatch> {
        self.digest.lock().expect("digest mutex poisoned").clone()
    }

    /// Grounding context for the chat: the most recent ALL-mode batch merged
    /// with the last digest, deduplicated by link (latest batch wins).
    pub fn chat_context(&self) -> Vec<Article> {
        let mut out = self.latest();
        let mut seen: std::collections::HashSet<String> =
            out.iter().map(|a| a.link.clone()).collect();
        if let Some(d) = self.last_digest() {
            for a in d.articles {
                if seen.insert(a.link.clone()) {
                    out.push(a);
                }
            }
        }
        out
    }
}
