// src/ingest/fetcher.rs
//
// HTTP feed fetcher. One fetcher per configured source; a failure is the
// source's problem alone and surfaces as an error the orchestrator absorbs.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::config::FeedSource;
use crate::ingest::types::FeedFetch;

const USER_AGENT: &str = "ai-news-digest/0.1 (compatible; RSS Reader)";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(4);
// Bounds pipeline latency per source; no retries within a run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared client for all sources of one process.
pub fn feed_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("reqwest client")
}

pub struct HttpFetcher {
    client: reqwest::Client,
    source: FeedSource,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, source: FeedSource) -> Self {
        Self { client, source }
    }
}

#[async_trait::async_trait]
impl FeedFetch for HttpFetcher {
    async fn fetch(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.source.feed_url)
            .send()
            .await
            .with_context(|| format!("fetching feed for {}", self.source.name))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!(
                "feed {} returned HTTP {}",
                self.source.name,
                status
            ));
        }

        resp.text()
            .await
            .with_context(|| format!("reading feed body for {}", self.source.name))
    }

    fn source(&self) -> &str {
        &self.source.name
    }
}

/// Build fetchers for the enabled sources, preserving config order
/// (dedup is first-seen-wins in this order).
pub fn build_fetchers(sources: &[FeedSource]) -> Vec<Box<dyn FeedFetch>> {
    let client = feed_http_client();
    sources
        .iter()
        .filter(|s| s.enabled)
        .map(|s| Box::new(HttpFetcher::new(client.clone(), s.clone())) as Box<dyn FeedFetch>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sources_get_no_fetcher() {
        let sources = vec![
            FeedSource {
                name: "On".into(),
                feed_url: "https://example.com/a.xml".into(),
                enabled: true,
            },
            FeedSource {
                name: "Off".into(),
                feed_url: "https://example.com/b.xml".into(),
                enabled: false,
            },
        ];
        let fetchers = build_fetchers(&sources);
        assert_eq!(fetchers.len(), 1);
        assert_eq!(fetchers[0].source(), "On");
    }
}
