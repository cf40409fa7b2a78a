// src/ingest/normalize.rs
//
// Normalizer: RawItem + source name -> PendingArticle with the publish
// timestamp resolved into the fixed reference time zone (UTC+5:30).
// All downstream date comparisons (digest day filter, sorting) operate
// on this canonical instant, never on the source-native text.

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;

use crate::ingest::types::{PendingArticle, RawItem};

/// Reference time zone for canonical timestamps: UTC+5:30.
pub static REFERENCE_TZ: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("valid fixed offset"));

/// Parse a source-native date string. Feeds overwhelmingly use RFC 2822
/// (`pubDate`) or RFC 3339 (Atom `published`/`updated`); anything else
/// yields `None` — a time is never fabricated.
pub fn parse_pub_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&*REFERENCE_TZ))
}

/// Attach the source and resolve optional fields. Empty strings collapse
/// to `None` so consumers can rely on `Option` rather than sentinel values.
pub fn normalize(item: RawItem, source: &str) -> PendingArticle {
    let pub_date = item.pub_date.as_deref().and_then(parse_pub_date);
    if pub_date.is_none() {
        if let Some(raw) = item.pub_date.as_deref() {
            tracing::debug!(source, raw, "unparsable publish date, leaving absent");
        }
    }

    PendingArticle {
        title: item.title,
        link: item.link,
        description: none_if_empty(item.description),
        image_url: item.image_reference.and_then(none_if_empty),
        pub_date,
        source: source.to_string(),
    }
}

fn none_if_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
