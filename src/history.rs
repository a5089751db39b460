//! history.rs: in-memory session ledger of batch outcomes for the stats endpoint.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::pipeline::BatchStatistics;

/// Batch records kept in memory.
pub const RECENT_BATCHES_CAP: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    pub timestamp: DateTime<Utc>,
    pub input: usize,
    pub filtered: usize,
    pub processed: usize,
    /// Rounded to one decimal.
    pub reduction_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionTotals {
    pub total_input: usize,
    pub total_filtered: usize,
    pub total_processed: usize,
    pub reduction_percentage: f64,
}

#[derive(Debug, Default)]
struct Inner {
    total: usize,
    filtered: usize,
    processed: usize,
    recent: Vec<BatchRecord>,
}

#[derive(Debug, Default)]
pub struct SessionHistory {
    inner: Mutex<Inner>,
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, stats: &BatchStatistics, at: DateTime<Utc>) {
        let entry = BatchRecord {
            timestamp: at,
            input: stats.total_input,
            filtered: stats.total_filtered,
            processed: stats.processed,
            reduction_pct: round1(stats.reduction_percentage()),
        };

        let mut g = self.inner.lock();
        g.total += stats.total_input;
        g.filtered += stats.total_filtered;
        g.processed += stats.processed;
        g.recent.push(entry);
        if g.recent.len() > RECENT_BATCHES_CAP {
            let excess = g.recent.len() - RECENT_BATCHES_CAP;
            g.recent.drain(0..excess);
        }
    }

    pub fn totals(&self) -> SessionTotals {
        let g = self.inner.lock();
        let pct = if g.total > 0 {
            g.filtered as f64 / g.total as f64 * 100.0
        } else {
            0.0
        };
        SessionTotals {
            total_input: g.total,
            total_filtered: g.filtered,
            total_processed: g.processed,
            reduction_percentage: round1(pct),
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<BatchRecord> {
        let g = self.inner.lock();
        let start = g.recent.len().saturating_sub(n);
        g.recent[start..].to_vec()
    }
}
