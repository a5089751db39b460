// src/pipeline.rs
//! Batch pipeline: cache housekeeping, per-item decisions in input order,
//! accept/reject partition and batch statistics.

use std::collections::BTreeMap;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::info;

use crate::decision::{FilterVerdict, ReasonCode};
use crate::dedup::lookback_start;
use crate::item::{CandidateItem, RecentWindowItem};
use crate::reducer::VolumeReducer;
use crate::store::ArticleStore;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("volume_reducer_items_total", "Items submitted for filtering.");
        describe_counter!("volume_reducer_accepted_total", "Items passed downstream.");
        describe_counter!("volume_reducer_filtered_total", "Items rejected by any check.");
        describe_counter!(
            "volume_reducer_reason_total",
            "Rejection reasons by code (one item may carry several)."
        );
        describe_gauge!("volume_reducer_cache_size", "Exact signatures currently cached.");
        describe_counter!(
            "volume_reducer_cache_resets_total",
            "Full cache resets and per-entry eviction passes."
        );
        describe_histogram!("volume_reducer_batch_ms", "Batch filtering time in milliseconds.");
        describe_counter!(
            "volume_reducer_malformed_total",
            "Webhook entries dropped as malformed."
        );
    });
}

/// Counts for one batch. Reason counts are non-exclusive: one rejected item
/// may bump several, so their sum can exceed `total_filtered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchStatistics {
    pub total_input: usize,
    pub total_filtered: usize,
    pub processed: usize,
    pub by_reason: BTreeMap<ReasonCode, usize>,
}

impl Default for BatchStatistics {
    fn default() -> Self {
        Self {
            total_input: 0,
            total_filtered: 0,
            processed: 0,
            by_reason: ReasonCode::ALL.iter().map(|r| (*r, 0)).collect(),
        }
    }
}

impl BatchStatistics {
    pub fn record(&mut self, verdict: &FilterVerdict) {
        self.total_input += 1;
        if verdict.accept {
            self.processed += 1;
            return;
        }
        self.total_filtered += 1;
        for r in &verdict.reasons {
            *self.by_reason.entry(*r).or_insert(0) += 1;
        }
    }

    pub fn count(&self, reason: ReasonCode) -> usize {
        self.by_reason.get(&reason).copied().unwrap_or(0)
    }

    /// `total_filtered / total_input * 100`, 0 for an empty batch.
    pub fn reduction_percentage(&self) -> f64 {
        if self.total_input == 0 {
            return 0.0;
        }
        self.total_filtered as f64 / self.total_input as f64 * 100.0
    }

    /// Reasons that fired at least once.
    pub fn non_zero_reasons(&self) -> BTreeMap<ReasonCode, usize> {
        self.by_reason
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(r, n)| (*r, *n))
            .collect()
    }
}

/// Decide every item in input order. Returns one verdict per item.
///
/// Dry-run reducers are evaluated the same way but leave the metric series alone.
pub fn evaluate_batch(
    reducer: &VolumeReducer,
    items: &[CandidateItem],
    window: &[RecentWindowItem],
    lookback_days: i64,
) -> (Vec<FilterVerdict>, BatchStatistics) {
    ensure_metrics_described();
    let started = Instant::now();
    let dry_run = reducer.is_dry_run();

    reducer.cache().reset_if_stale();
    let prepared = reducer.prepare_window(window, lookback_days);

    let mut stats = BatchStatistics::default();
    let mut verdicts = Vec::with_capacity(items.len());
    for item in items {
        let verdict = reducer.decide_prepared(item, &prepared);
        if !verdict.accept {
            info!(
                target: "pipeline",
                id = %item.id,
                title = %item.short_title(),
                reasons = %verdict.reasons_joined(),
                dry_run,
                "filtered out"
            );
            if !dry_run {
                for r in &verdict.reasons {
                    counter!("volume_reducer_reason_total", "reason" => r.as_str()).increment(1);
                }
            }
        }
        stats.record(&verdict);
        verdicts.push(verdict);
    }

    if !dry_run {
        counter!("volume_reducer_items_total").increment(stats.total_input as u64);
        counter!("volume_reducer_accepted_total").increment(stats.processed as u64);
        counter!("volume_reducer_filtered_total").increment(stats.total_filtered as u64);
        histogram!("volume_reducer_batch_ms").record(started.elapsed().as_secs_f64() * 1000.0);
    }

    info!(
        target: "pipeline",
        input = stats.total_input,
        filtered = stats.total_filtered,
        processed = stats.processed,
        window = prepared.len(),
        dry_run,
        "volume reduction {:.1}%",
        stats.reduction_percentage()
    );
    (verdicts, stats)
}

/// Filter a batch, returning the accepted items in input order plus stats.
pub fn filter_batch(
    reducer: &VolumeReducer,
    items: Vec<CandidateItem>,
    window: &[RecentWindowItem],
    lookback_days: i64,
) -> (Vec<CandidateItem>, BatchStatistics) {
    let (verdicts, stats) = evaluate_batch(reducer, &items, window, lookback_days);
    let accepted = items
        .into_iter()
        .zip(verdicts)
        .filter(|(_, v)| v.accept)
        .map(|(item, _)| item)
        .collect();
    (accepted, stats)
}

/// Fetch the lookback window from `store`, then filter.
pub async fn run_batch(
    reducer: &VolumeReducer,
    store: &dyn ArticleStore,
    items: Vec<CandidateItem>,
    lookback_days: i64,
) -> anyhow::Result<(Vec<CandidateItem>, BatchStatistics)> {
    let since = lookback_start(reducer.clock().now(), lookback_days);
    let window = store.recent_window(since).await?;
    Ok(filter_batch(reducer, items, &window, lookback_days))
}
