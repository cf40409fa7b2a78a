// src/ingest/scheduler.rs
//
// Daily digest trigger: a background task that checks the wall clock in the
// reference zone once a minute and runs one previous-day ingest when the
// configured HH:MM is reached, at most once per calendar day.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use metrics::counter;
use tokio::task::JoinHandle;

use crate::config::FeedSource;
use crate::digest::{DigestBatch, DigestStore};
use crate::ingest::summarize::Summarizer;
use crate::ingest::types::IngestMode;
use crate::ingest::{fetcher, reference_now, run_once};

const ENV_TRIGGER_TIME: &str = "NEWS_TRIGGER_TIME";
const DEFAULT_TRIGGER_TIME: &str = "06:00";

#[derive(Clone, Debug)]
pub struct DigestSchedulerCfg {
    /// Wall-clock trigger in the reference zone, "HH:MM".
    pub trigger_time: String,
    pub check_interval_secs: u64,
}

impl Default for DigestSchedulerCfg {
    fn default() -> Self {
        Self {
            trigger_time: std::env::var(ENV_TRIGGER_TIME)
                .unwrap_or_else(|_| DEFAULT_TRIGGER_TIME.to_string()),
            check_interval_secs: 60,
        }
    }
}

/// Spawn the daily digest scheduler. The task owns its "last triggered day"
/// marker; after a restart the same day can trigger once more.
pub fn spawn_daily_digest(
    cfg: DigestSchedulerCfg,
    sources: Vec<FeedSource>,
    summarizer: Summarizer,
    store: Arc<DigestStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(cfg.check_interval_secs));
        let mut last_triggered: Option<NaiveDate> = None;

        loop {
            ticker.tick().await;
            let now = reference_now();

            if !should_trigger(&cfg.trigger_time, now.time(), now.date_naive(), last_triggered) {
                continue;
            }

            tracing::info!(trigger = %cfg.trigger_time, "running scheduled digest ingest");
            let fetchers = fetcher::build_fetchers(&sources);
            let articles = run_once(&fetchers, &summarizer, IngestMode::PreviousDayOnly).await;

            counter!("digest_runs_total").increment(1);
            tracing::info!(articles = articles.len(), "scheduled digest stored");
            store.set_digest(DigestBatch {
                articles,
                triggered_at: now,
            });
            last_triggered = Some(now.date_naive());
        }
    })
}

/// True from the trigger time onward, at most once per day. Comparing
/// instants rather than matching the exact minute means a tick delayed
/// past the trigger minute (a slow previous run) still fires.
fn should_trigger(
    trigger_time: &str,
    now: NaiveTime,
    today: NaiveDate,
    last_triggered: Option<NaiveDate>,
) -> bool {
    let Some(trigger) = parse_hhmm(trigger_time) else {
        return false;
    };
    now >= trigger && last_triggered != Some(today)
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn triggers_once_per_day_from_the_configured_minute() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert!(should_trigger("06:00", t("06:00"), today, None));
        assert!(!should_trigger("06:00", t("05:59"), today, None));
        assert!(!should_trigger("06:00", t("06:00"), today, Some(today)));

        let yesterday = today.pred_opt().unwrap();
        assert!(should_trigger("06:00", t("06:00"), today, Some(yesterday)));
    }

    #[test]
    fn a_tick_delayed_past_the_trigger_minute_still_fires() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        // A slow run can push the next check well past 06:00.
        assert!(should_trigger("06:00", t("06:03"), today, None));
        // But never twice on the same day.
        assert!(!should_trigger("06:00", t("06:03"), today, Some(today)));
    }

    #[test]
    fn unparsable_trigger_times_never_fire() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert!(!should_trigger("six o'clock", t("06:00"), today, None));
    }
}
