// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One feed entry as extracted by the parser. Fields are already
/// clean text (CDATA unwrapped, tags stripped, entities decoded).
/// Lives only for the duration of one document parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Source-native date text, e.g. RFC 2822. Parsed later by the normalizer.
    pub pub_date: Option<String>,
    pub image_reference: Option<String>,
}

/// Normalized, pre-summary article shape: canonical timestamp resolved,
/// source attached, not yet classified or summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArticle {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub source: String,
}

/// Canonical output unit. `pub_date` serializes as an RFC 3339 string in the
/// fixed UTC+5:30 offset; field names follow the web client's contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "pubDate", skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub categories: Vec<String>,
}

/// Ingestion mode: full batch, or only articles published on the previous
/// calendar day (digest trigger).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    All,
    PreviousDayOnly,
}

/// Boundary for retrieving one source's raw feed document. Real traffic goes
/// through the HTTP fetcher; tests inject fixture implementations.
#[async_trait::async_trait]
pub trait FeedFetch: Send + Sync {
    /// Fetch the raw feed document body.
    async fn fetch(&self) -> Result<String>;
    /// Display name of the source, used for attribution and logs.
    fn source(&self) -> &str;
}
