// src/reducer.rs
//! Decision aggregator: runs every classifier plus the duplicate detector over
//! one item and merges the triggered reasons into a single verdict.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration as StdDuration, SystemTime};

use chrono::Duration;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::RecentContentCache;
use crate::classify::Classifiers;
use crate::clock::{Clock, SystemClock};
use crate::config::FilterConfig;
use crate::decision::{FilterVerdict, ReasonCode};
use crate::dedup::{lookback_duration, DuplicateDetector, PreparedWindow};
use crate::error::Result;
use crate::item::{CandidateItem, RecentWindowItem};

pub const ENV_HOT_RELOAD: &str = "VOLUME_REDUCER_HOT_RELOAD";

/// Point-in-time view of the active filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteringStats {
    pub cache_size: usize,
    pub similarity_threshold: f64,
    pub min_content_length: usize,
    pub lookback_days: i64,
    pub wire_patterns: usize,
    pub pr_patterns: usize,
    pub low_value_patterns: usize,
    pub url_patterns: usize,
}

#[derive(Debug, Clone)]
pub struct VolumeReducer {
    config: FilterConfig,
    classifiers: Classifiers,
    detector: DuplicateDetector,
}

impl VolumeReducer {
    /// Reducer on the system clock with a fresh cache.
    pub fn new(config: FilterConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: FilterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let ttl_secs = i64::try_from(config.cache_ttl_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        let cache = Arc::new(RecentContentCache::new(
            Duration::seconds(ttl_secs),
            config.cache_expiry,
            clock,
        ));
        Self::with_cache(config, cache)
    }

    /// Reducer sharing an existing cache (and its clock).
    pub fn with_cache(config: FilterConfig, cache: Arc<RecentContentCache>) -> Result<Self> {
        let classifiers = Classifiers::compile(&config)?;
        let detector = DuplicateDetector::new(
            cache,
            config.similarity_threshold,
            config.similarity_metric,
        );
        Ok(Self {
            config,
            classifiers,
            detector,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RecentContentCache> {
        self.detector.cache()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.cache().clock()
    }

    /// True for copies made by [`dry_run_copy`](Self::dry_run_copy).
    pub fn is_dry_run(&self) -> bool {
        !self.cache().is_instrumented()
    }

    /// Filter the window down to items created within `lookback_days` of now.
    pub fn prepare_window(&self, window: &[RecentWindowItem], lookback_days: i64) -> PreparedWindow {
        PreparedWindow::prepare(window, self.clock().now(), lookback_duration(lookback_days))
    }

    /// Verdict for one item against a raw window, using the configured lookback.
    pub fn decide(&self, item: &CandidateItem, window: &[RecentWindowItem]) -> FilterVerdict {
        let prepared = self.prepare_window(window, self.config.lookback_days);
        self.decide_prepared(item, &prepared)
    }

    /// Reasons are reported in a fixed order: low-value, wire, promotional,
    /// duplicate, url. Every check runs even after an earlier one triggered.
    pub fn decide_prepared(&self, item: &CandidateItem, window: &PreparedWindow) -> FilterVerdict {
        let title = item.title.as_str();
        let body = item.body.as_str();
        let mut reasons = Vec::new();

        if self.classifiers.low_value.classify(title, body) {
            reasons.push(ReasonCode::LowValueContent);
        }
        if self.classifiers.wire.classify(title, body) {
            reasons.push(ReasonCode::WireService);
        }
        if self.classifiers.promotional.classify(title, body) {
            reasons.push(ReasonCode::PrContent);
        }
        if let Some(dup) = self.detector.detect_prepared(title, body, window) {
            reasons.push(dup);
        }
        if self.classifiers.url.classify(&item.url) {
            reasons.push(ReasonCode::FilteredUrl);
        }

        FilterVerdict::from_reasons(reasons)
    }

    pub fn filtering_stats(&self) -> FilteringStats {
        FilteringStats {
            cache_size: self.cache().len(),
            similarity_threshold: self.config.similarity_threshold,
            min_content_length: self.config.min_content_length,
            lookback_days: self.config.lookback_days,
            wire_patterns: self.classifiers.wire.patterns().len(),
            pr_patterns: self.classifiers.promotional.patterns().len(),
            low_value_patterns: self.classifiers.low_value.patterns().len(),
            url_patterns: self.classifiers.url.patterns().len(),
        }
    }

    /// Same classifiers, scratch copy of the cache. Decisions on the copy never
    /// touch the live cache or the live metric series.
    pub fn dry_run_copy(&self) -> Self {
        let scratch = Arc::new(self.cache().snapshot());
        Self {
            config: self.config.clone(),
            classifiers: self.classifiers.clone(),
            detector: DuplicateDetector::new(
                scratch,
                self.config.similarity_threshold,
                self.config.similarity_metric,
            ),
        }
    }
}

/// Shared, swappable reducer. Readers take a cheap `Arc` clone so a reload
/// never blocks an in-flight batch.
#[derive(Debug, Clone)]
pub struct ReducerHandle {
    inner: Arc<RwLock<Arc<VolumeReducer>>>,
}

impl ReducerHandle {
    pub fn new(reducer: VolumeReducer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(reducer))),
        }
    }

    pub fn current(&self) -> Arc<VolumeReducer> {
        self.inner.read().clone()
    }

    /// Recompile from `config`, keeping the live cache. On a bad pattern the
    /// old reducer stays in place. Cache TTL and expiry changes only take
    /// effect on restart.
    pub fn reload(&self, config: FilterConfig) -> Result<()> {
        let cache = self.current().cache().clone();
        let ignored = cache_settings_ignored(&cache, &config);
        if !ignored.is_empty() {
            warn!(
                target: "reducer",
                fields = ?ignored,
                live_ttl_secs = cache.ttl().num_seconds(),
                live_expiry = ?cache.expiry(),
                "cache settings changed; keeping the live cache until restart"
            );
        }
        let fresh = VolumeReducer::with_cache(config, cache)?;
        *self.inner.write() = Arc::new(fresh);
        Ok(())
    }
}

/// Cache fields in `config` that differ from the live cache.
fn cache_settings_ignored(cache: &RecentContentCache, config: &FilterConfig) -> Vec<&'static str> {
    let mut out = Vec::new();
    let ttl_secs = u64::try_from(cache.ttl().num_seconds()).unwrap_or(0);
    if ttl_secs != config.cache_ttl_secs {
        out.push("cache_ttl_secs");
    }
    if cache.expiry() != config.cache_expiry {
        out.push("cache_expiry");
    }
    out
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// A file that appears after startup counts as a change.
fn mtime_moved(prev: Option<SystemTime>, now: SystemTime) -> bool {
    match prev {
        None => true,
        Some(prev) => now > prev,
    }
}

fn hot_reload_enabled() -> bool {
    std::env::var(ENV_HOT_RELOAD)
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Poll `path` every 2s and reload the handle when its mtime moves forward.
/// No-op unless `VOLUME_REDUCER_HOT_RELOAD=1`.
pub fn start_hot_reload_thread(handle: ReducerHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }
    info!(target: "reducer", path = %path.display(), "config hot reload enabled");

    thread::spawn(move || {
        let poll = StdDuration::from_secs(2);
        let mut last_mtime = modified_at(&path);

        loop {
            if let Some(mtime) = modified_at(&path) {
                let changed = mtime_moved(last_mtime, mtime);
                last_mtime = Some(mtime);
                if changed {
                    match FilterConfig::from_path(&path) {
                        Ok(cfg) => match handle.reload(cfg.with_env_overrides()) {
                            Ok(()) => info!(target: "reducer", "reloaded filter config"),
                            Err(e) => warn!(target: "reducer", error = %e, "reload rejected"),
                        },
                        Err(e) => warn!(target: "reducer", error = ?e, "reload failed"),
                    }
                }
            }
            thread::sleep(poll);
        }
    });
}
