// src/dedup.rs
//! Two-tier duplicate detection: exact signature against the recent-content
//! cache, then fuzzy signature and text similarity against the lookback window.
//!
//! Policy, first match wins:
//! 1. exact signature already cached            → `DuplicateExact`
//! 2. fuzzy signature equals a window item's    → `DuplicateFuzzy`
//! 3. similarity ratio ≥ threshold vs a window item → `DuplicateSimilar`
//!
//! Otherwise the exact signature is cached and the item is not a duplicate.
//!
//! Scaling: step 2 is a hash lookup, step 3 is linear in the window size and
//! quadratic in the compared text length (capped at title + 500 body chars).
//! Fine for days of a moderate feed, not for years.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::cache::RecentContentCache;
use crate::decision::ReasonCode;
use crate::item::RecentWindowItem;
use crate::normalize::{normalize, prefix_chars};
use crate::signature::{exact_signature, fuzzy_signature, Digest128, FUZZY_BODY_CHARS};
use crate::similarity::SimilarityMetric;

/// Normalized `title + " " + first 500 body chars`, the text similarity compares.
pub fn comparison_text(title: &str, body: &str) -> String {
    normalize(&format!("{} {}", title, prefix_chars(body, FUZZY_BODY_CHARS)))
}

/// `days` as a duration, saturating instead of panicking on huge values.
/// Negative counts are treated as zero.
pub fn lookback_duration(days: i64) -> Duration {
    Duration::try_days(days.max(0)).unwrap_or(Duration::MAX)
}

/// Oldest timestamp still inside a `days` lookback from `now`. Saturates at
/// the earliest representable instant.
pub fn lookback_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now.checked_sub_signed(lookback_duration(days))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Window items that are within the lookback, pre-digested once per batch.
#[derive(Debug, Clone, Default)]
pub struct PreparedWindow {
    fuzzy: HashSet<Digest128>,
    texts: Vec<String>,
    skipped_old: usize,
}

impl PreparedWindow {
    /// Keep items whose age (`now - created_at`) is within `lookback`.
    /// Items stamped in the future count as fresh.
    pub fn prepare(items: &[RecentWindowItem], now: DateTime<Utc>, lookback: Duration) -> Self {
        let mut out = Self::default();
        for it in items {
            if now - it.created_at > lookback {
                out.skipped_old += 1;
                continue;
            }
            out.fuzzy.insert(fuzzy_signature(&it.title, &it.body));
            out.texts.push(comparison_text(&it.title, &it.body));
        }
        out
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of items inside the lookback.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Number of supplied items that were older than the lookback.
    pub fn skipped_old(&self) -> usize {
        self.skipped_old
    }

    fn has_fuzzy(&self, sig: &Digest128) -> bool {
        self.fuzzy.contains(sig)
    }

    fn texts(&self) -> &[String] {
        &self.texts
    }
}

#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    cache: Arc<RecentContentCache>,
    similarity_threshold: f64,
    metric: SimilarityMetric,
}

impl DuplicateDetector {
    pub fn new(
        cache: Arc<RecentContentCache>,
        similarity_threshold: f64,
        metric: SimilarityMetric,
    ) -> Self {
        Self {
            cache,
            similarity_threshold,
            metric,
        }
    }

    pub fn cache(&self) -> &Arc<RecentContentCache> {
        &self.cache
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Check one item against the cache and a raw window, using the cache's clock
    /// as "now" for the lookback.
    pub fn detect(
        &self,
        title: &str,
        body: &str,
        window: &[RecentWindowItem],
        lookback: Duration,
    ) -> Option<ReasonCode> {
        let prepared = PreparedWindow::prepare(window, self.cache.clock().now(), lookback);
        self.detect_prepared(title, body, &prepared)
    }

    /// Same as [`detect`](Self::detect) with the window already prepared.
    pub fn detect_prepared(
        &self,
        title: &str,
        body: &str,
        window: &PreparedWindow,
    ) -> Option<ReasonCode> {
        let exact = exact_signature(title, body);
        if self.cache.contains(&exact) {
            return Some(ReasonCode::DuplicateExact);
        }

        if !window.is_empty() {
            if window.has_fuzzy(&fuzzy_signature(title, body)) {
                return Some(ReasonCode::DuplicateFuzzy);
            }

            let current = comparison_text(title, body);
            for (idx, other) in window.texts().iter().enumerate() {
                let ratio = self.metric.ratio(&current, other);
                if ratio >= self.similarity_threshold {
                    debug!(target: "dedup", ratio, window_idx = idx, "high similarity");
                    return Some(ReasonCode::DuplicateSimilar);
                }
            }
        }

        // A concurrent batch may have cached the same signature since the lookup.
        if !self.cache.insert(exact) {
            return Some(ReasonCode::DuplicateExact);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheExpiry;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    const BODY: &str = "The city council approved a new transit plan on Tuesday that expands \
        bus routes across the northern districts, adds protected bike lanes near schools, \
        and funds late night service for shift workers starting next spring.";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap()
    }

    fn detector() -> DuplicateDetector {
        let clock = Arc::new(ManualClock::new(now()));
        let cache = Arc::new(RecentContentCache::new(
            Duration::hours(24),
            CacheExpiry::FullReset,
            clock,
        ));
        DuplicateDetector::new(cache, 0.8, SimilarityMetric::RatcliffObershelp)
    }

    #[test]
    fn first_sighting_is_cached_second_is_exact() {
        let d = detector();
        let w = Duration::days(7);
        assert_eq!(d.detect("Transit plan approved", BODY, &[], w), None);
        assert_eq!(
            d.detect("Transit plan approved", BODY, &[], w),
            Some(ReasonCode::DuplicateExact)
        );
        // punctuation/case noise still hits the exact tier
        assert_eq!(
            d.detect("TRANSIT PLAN APPROVED!", BODY, &[], w),
            Some(ReasonCode::DuplicateExact)
        );
    }

    #[test]
    fn reordered_keywords_are_fuzzy_duplicates() {
        let d = detector();
        let window = vec![RecentWindowItem::new(
            "Council backs transit plan",
            "Transit plan backed by council",
            now() - Duration::days(1),
        )];
        assert_eq!(
            d.detect("Transit plan: council backs it", "Council backed the transit plan", &window, Duration::days(7)),
            Some(ReasonCode::DuplicateFuzzy)
        );
    }

    #[test]
    fn fuzzy_match_wins_over_similarity() {
        let d = detector();
        let window = vec![RecentWindowItem::new("Transit plan approved", BODY, now())];
        // identical keywords → fuzzy tier, even though similarity is 1.0
        assert_eq!(
            d.detect("Transit plan approved", BODY, &window, Duration::days(7)),
            Some(ReasonCode::DuplicateFuzzy)
        );
    }

    #[test]
    fn similar_text_within_lookback() {
        let d = detector();
        let reworded = BODY.replace("across", "throughout");
        let window = vec![RecentWindowItem::new(
            "Transit plan approved",
            reworded,
            now() - Duration::days(2),
        )];
        assert_eq!(
            d.detect("Transit plan approved", BODY, &window, Duration::days(7)),
            Some(ReasonCode::DuplicateSimilar)
        );
    }

    #[test]
    fn old_window_items_are_ignored() {
        let d = detector();
        let reworded = BODY.replace("across", "throughout");
        let window = vec![RecentWindowItem::new(
            "Transit plan approved",
            reworded,
            now() - Duration::days(10),
        )];
        assert_eq!(
            d.detect("Transit plan approved", BODY, &window, Duration::days(7)),
            None
        );
    }

    #[test]
    fn prepared_window_counts_skipped_items() {
        let items = vec![
            RecentWindowItem::new("a", "b", now() - Duration::days(1)),
            RecentWindowItem::new("c", "d", now() - Duration::days(8)),
            RecentWindowItem::new("e", "f", now() + Duration::hours(1)),
        ];
        let p = PreparedWindow::prepare(&items, now(), Duration::days(7));
        assert_eq!(p.len(), 2);
        assert_eq!(p.skipped_old(), 1);
    }

    #[test]
    fn keywordless_items_collide_on_fuzzy_tier() {
        let d = detector();
        let window = vec![RecentWindowItem::new("!!", "...", now())];
        // both keyword sets are empty, so the fuzzy digests agree
        assert_eq!(
            d.detect("x y", "", &window, Duration::days(7)),
            Some(ReasonCode::DuplicateFuzzy)
        );
    }

    #[test]
    fn empty_window_still_checks_cache() {
        let d = detector();
        assert_eq!(d.detect("a", "an the", &[], Duration::days(7)), None);
        assert_eq!(
            d.detect("A!", "the an", &[], Duration::days(7)),
            Some(ReasonCode::DuplicateExact)
        );
    }

    #[test]
    fn lookback_saturates_on_huge_day_counts() {
        assert_eq!(lookback_duration(7), Duration::days(7));
        assert_eq!(lookback_duration(-3), Duration::zero());
        assert_eq!(lookback_duration(i64::MAX), Duration::MAX);
        assert_eq!(lookback_start(now(), 1), now() - Duration::days(1));
        assert_eq!(lookback_start(now(), i64::MAX), DateTime::<Utc>::MIN_UTC);

        let items = vec![RecentWindowItem::new("a", "b", DateTime::<Utc>::MIN_UTC)];
        let p = PreparedWindow::prepare(&items, now(), lookback_duration(i64::MAX));
        assert_eq!(p.len(), 1);
    }
}
