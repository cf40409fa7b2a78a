use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::ingest::summarize::SUMMARY_WORD_BUDGET;

/// One-time registration of every series this service emits, so they show
/// up on /metrics with help text even before the first increment.
pub fn describe_all() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_runs_total", "Ingestion runs started.");
        describe_counter!("ingest_items_total", "Items parsed from feed documents.");
        describe_counter!("ingest_kept_total", "Articles returned to callers.");
        describe_counter!("ingest_dedup_total", "Items dropped by link deduplication.");
        describe_counter!(
            "ingest_rejected_total",
            "Parsed entries dropped for missing title/link."
        );
        describe_counter!("ingest_source_errors_total", "Source fetch failures.");
        describe_counter!("summaries_generated_total", "Summaries produced by the LLM.");
        describe_counter!(
            "summaries_missing_total",
            "Items that proceeded without a summary."
        );
        describe_counter!("digest_runs_total", "Scheduled digest runs completed.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when ingestion last ran.");
        describe_gauge!(
            "ingest_summary_word_budget",
            "Configured word budget per summary."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and pre-register the series.
    pub fn init() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_all();
        gauge!("ingest_summary_word_budget").set(SUMMARY_WORD_BUDGET as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
