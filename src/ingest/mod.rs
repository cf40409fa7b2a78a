// src/ingest/mod.rs
//
// Ingestion orchestrator: fetch -> parse -> normalize -> dedup ->
// (previous-day filter) -> classify -> summarize -> aggregate.
// Per-source and per-item failures degrade to smaller output; only an
// unexpected internal fault can abort a run.

pub mod classify;
pub mod fetcher;
pub mod normalize;
pub mod parser;
pub mod scheduler;
pub mod summarize;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use metrics::{counter, gauge, histogram};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::ingest::normalize::REFERENCE_TZ;
use crate::ingest::summarize::Summarizer;
use crate::ingest::types::{Article, FeedFetch, IngestMode, PendingArticle};

/// Raw aggregation cap applied before summarization.
pub const RAW_BATCH_CAP: usize = 30;
/// Size of the list returned to callers, both modes.
pub const DISPLAY_CAP: usize = 20;
/// Digest fallback: most recent items served when no article matches
/// the previous calendar day.
pub const DIGEST_FALLBACK_RECENT: usize = 10;
/// Upper bound on concurrent outbound summarization calls.
pub const MAX_CONCURRENT_SUMMARIES: usize = 4;

/// Current wall-clock time in the fixed reference zone (UTC+5:30).
pub fn reference_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&REFERENCE_TZ)
}

/// The calendar day before `now`, in the reference zone.
pub fn previous_day(now: DateTime<FixedOffset>) -> NaiveDate {
    let today = now.date_naive();
    today.pred_opt().unwrap_or(today)
}

/// Run one ingestion pass over the given fetchers and return the final
/// article collection for `mode`. Infallible by design: expected failures
/// (transport, parse, summarization) shrink the output instead.
pub async fn run_once(
    fetchers: &[Box<dyn FeedFetch>],
    summarizer: &Summarizer,
    mode: IngestMode,
) -> Vec<Article> {
    crate::metrics::describe_all();
    counter!("ingest_runs_total").increment(1);

    let candidates = collect_candidates(fetchers).await;
    let mut selected = select_candidates(candidates, mode, reference_now());

    // Sort and cap before summarization so discarded items never cost a call.
    sort_newest_first(&mut selected, |c| c.pub_date);
    selected.truncate(RAW_BATCH_CAP);

    let mut articles = enrich(selected, summarizer).await;
    sort_newest_first(&mut articles, |a| a.pub_date);
    articles.truncate(DISPLAY_CAP);

    counter!("ingest_kept_total").increment(articles.len() as u64);
    gauge!("ingest_last_run_ts").set(Utc::now().timestamp().max(0) as f64);

    articles
}

/// Fetch and parse every source in configured order, normalize, and drop
/// links already seen in this run (first-seen source wins).
async fn collect_candidates(fetchers: &[Box<dyn FeedFetch>]) -> Vec<PendingArticle> {
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for f in fetchers {
        let body = match f.fetch().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = ?e, source = f.source(), "source fetch failed");
                counter!("ingest_source_errors_total").increment(1);
                continue;
            }
        };

        let t0 = std::time::Instant::now();
        let items = parser::parse_feed(&body);
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_items_total").increment(items.len() as u64);
        tracing::debug!(source = f.source(), items = items.len(), "feed parsed");

        for item in items {
            let pending = normalize::normalize(item, f.source());
            if !seen_links.insert(pending.link.clone()) {
                counter!("ingest_dedup_total").increment(1);
                continue;
            }
            out.push(pending);
        }
    }

    out
}

/// Apply the mode filter. Digest mode keeps only articles published on the
/// previous calendar day; when nothing matches, it falls back to the most
/// recent candidates so a scheduled trigger never serves an empty page
/// while articles exist.
pub fn select_candidates(
    mut candidates: Vec<PendingArticle>,
    mode: IngestMode,
    now: DateTime<FixedOffset>,
) -> Vec<PendingArticle> {
    match mode {
        IngestMode::All => candidates,
        IngestMode::PreviousDayOnly => {
            let target = previous_day(now);
            let matching: Vec<PendingArticle> = candidates
                .iter()
                .filter(|c| c.pub_date.is_some_and(|d| d.date_naive() == target))
                .cloned()
                .collect();
            if matching.is_empty() {
                tracing::info!(
                    candidates = candidates.len(),
                    "no previous-day articles, serving most recent instead"
                );
                sort_newest_first(&mut candidates, |c| c.pub_date);
                candidates.truncate(DIGEST_FALLBACK_RECENT);
                candidates
            } else {
                matching
            }
        }
    }
}

/// Classify and summarize the selected candidates. Summaries fan out with
/// bounded concurrency; results land in index-addressed slots so completion
/// order never leaks into the final ordering, and one failed task only
/// costs its own summary.
async fn enrich(pending: Vec<PendingArticle>, summarizer: &Summarizer) -> Vec<Article> {
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_SUMMARIES));
    let mut tasks = JoinSet::new();

    for (idx, p) in pending.iter().enumerate() {
        let semaphore = semaphore.clone();
        let summarizer = summarizer.clone();
        let title = p.title.clone();
        let description = p.description.clone().unwrap_or_default();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            (idx, summarizer.summarize(&title, &description).await)
        });
    }

    let mut summaries: Vec<Option<String>> = vec![None; pending.len()];
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok((idx, summary)) => summaries[idx] = summary,
            Err(e) => tracing::warn!(error = ?e, "summarization task failed"),
        }
    }

    pending
        .into_iter()
        .zip(summaries)
        .map(|(p, summary)| {
            let categories =
                classify::categorize(&p.title, p.description.as_deref().unwrap_or_default());
            Article {
                id: uuid::Uuid::new_v4().to_string(),
                title: p.title,
                link: p.link,
                description: p.description,
                image_url: p.image_url,
                pub_date: p.pub_date,
                source: p.source,
                summary,
                categories,
            }
        })
        .collect()
}

/// Stable descending sort by publish date. Undated items rank below dated
/// ones and keep their relative order; the comparison is a total order so
/// the sort is deterministic.
pub fn sort_newest_first<T>(
    items: &mut [T],
    date: impl Fn(&T) -> Option<DateTime<FixedOffset>>,
) {
    items.sort_by_key(|it| std::cmp::Reverse(date(it)));
}
