// tests/digest_mode.rs
//
// Previous-day digest behavior over the full pipeline: only yesterday's
// articles survive the filter, and the fallback serves recent items when
// yesterday is empty.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;

use ai_news_digest::ai_adapter::DisabledGenerator;
use ai_news_digest::ingest::summarize::Summarizer;
use ai_news_digest::ingest::types::{FeedFetch, IngestMode};
use ai_news_digest::ingest::{reference_now, run_once, DIGEST_FALLBACK_RECENT};

struct FixtureFetcher {
    name: &'static str,
    body: String,
}

#[async_trait]
impl FeedFetch for FixtureFetcher {
    async fn fetch(&self) -> Result<String> {
        Ok(self.body.clone())
    }
    fn source(&self) -> &str {
        self.name
    }
}

fn rss_with_offsets(day_offsets: &[i64]) -> String {
    let now = reference_now();
    let mut xml = String::from("<rss><channel>");
    for (i, off) in day_offsets.iter().enumerate() {
        let dt = now - Duration::days(*off);
        xml.push_str(&format!(
            "<item><title>Item {i} (offset {off})</title>\
             <link>https://digest.example.com/{i}</link>\
             <pubDate>{}</pubDate></item>",
            dt.to_rfc2822()
        ));
    }
    xml.push_str("</channel></rss>");
    xml
}

fn no_summaries() -> Summarizer {
    Summarizer::new(Arc::new(DisabledGenerator))
}

#[tokio::test]
async fn digest_keeps_only_yesterdays_articles() {
    // Offsets in days from now: today, yesterday, yesterday, a week ago.
    let fetchers: Vec<Box<dyn FeedFetch>> = vec![Box::new(FixtureFetcher {
        name: "AI Wire",
        body: rss_with_offsets(&[0, 1, 1, 7]),
    })];

    let articles = run_once(&fetchers, &no_summaries(), IngestMode::PreviousDayOnly).await;
    assert_eq!(articles.len(), 2);
    for a in &articles {
        assert!(a.title.contains("offset 1"));
    }
}

#[tokio::test]
async fn digest_falls_back_to_recent_when_yesterday_is_empty() {
    let fetchers: Vec<Box<dyn FeedFetch>> = vec![Box::new(FixtureFetcher {
        name: "AI Wire",
        body: rss_with_offsets(&[3, 5, 9]),
    })];

    let articles = run_once(&fetchers, &no_summaries(), IngestMode::PreviousDayOnly).await;
    assert!(!articles.is_empty(), "fallback must not serve an empty list");
    assert!(articles.len() <= DIGEST_FALLBACK_RECENT);
    // Most recent first.
    assert!(articles[0].title.contains("offset 3"));
}

#[tokio::test]
async fn digest_of_empty_feeds_is_empty() {
    let fetchers: Vec<Box<dyn FeedFetch>> = vec![Box::new(FixtureFetcher {
        name: "AI Wire",
        body: "<rss><channel></channel></rss>".to_string(),
    })];

    let articles = run_once(&fetchers, &no_summaries(), IngestMode::PreviousDayOnly).await;
    assert!(articles.is_empty());
}
