// src/config.rs
//! Filter configuration: thresholds, cache policy and the tunable pattern lists.
//!
//! Sources, in order:
//! 1) `$VOLUME_REDUCER_CONFIG_PATH` (must exist if set)
//! 2) `config/volume_reducer.toml`
//! 3) built-in defaults
//!
//! Then env overrides for the two knobs operators touch most
//! (`VOLUME_REDUCER_SIMILARITY_THRESHOLD`, `VOLUME_REDUCER_MIN_CONTENT_LENGTH`).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::CacheExpiry;
use crate::similarity::SimilarityMetric;

pub const DEFAULT_CONFIG_PATH: &str = "config/volume_reducer.toml";
pub const ENV_CONFIG_PATH: &str = "VOLUME_REDUCER_CONFIG_PATH";
pub const ENV_SIMILARITY_THRESHOLD: &str = "VOLUME_REDUCER_SIMILARITY_THRESHOLD";
pub const ENV_MIN_CONTENT_LENGTH: &str = "VOLUME_REDUCER_MIN_CONTENT_LENGTH";

pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
/// Longest lookback a config may ask for (about ten years).
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Similarity ratio at or above which an item counts as similar content.
    pub similarity_threshold: f64,
    pub similarity_metric: SimilarityMetric,
    /// Bodies shorter than this (after trimming, in chars) are low value.
    pub min_content_length: usize,
    /// Unique-word share below which a body counts as repetitive filler.
    pub min_unique_word_ratio: f64,
    /// More byline markers than this means syndicated copy.
    pub max_bylines: usize,
    /// More corporate-suffix mentions than this means promotional copy.
    pub max_company_mentions: usize,
    pub lookback_days: i64,
    pub cache_ttl_secs: u64,
    pub cache_expiry: CacheExpiry,
    pub patterns: PatternConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            similarity_metric: SimilarityMetric::default(),
            min_content_length: 150,
            min_unique_word_ratio: 0.3,
            max_bylines: 2,
            max_company_mentions: 5,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            cache_ttl_secs: 24 * 3600,
            cache_expiry: CacheExpiry::default(),
            patterns: PatternConfig::default(),
        }
    }
}

/// Case-insensitive regex lists, evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub wire_service: Vec<String>,
    pub promotional: Vec<String>,
    pub low_value: Vec<String>,
    pub filtered_url: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            wire_service: owned(&[
                r"\(Reuters\)",
                r"\(AP\)",
                r"\(AFP\)",
                r"\(Bloomberg\)",
                r"Press Trust of India",
                r"PTI\s*-",
                r"ANI\s*-",
                r"IANS\s*-",
                r"UNI\s*-",
                r"\(IANS\)",
                r"\(PTI\)",
                r"News agencies",
                r"Wire services",
                r"Courtesy:.*Reuters",
                r"Source:.*AP\s",
            ]),
            promotional: owned(&[
                r"press release",
                r"FOR IMMEDIATE RELEASE",
                r"Business Wire",
                r"PR Newswire",
                r"PRWeb",
                r"Contact:.*@.*\.",
                r"About [A-Z][a-zA-Z\s]*:",
                r"For more information.*visit",
                r"Media Contact:",
                r"Disclaimer:.*investment",
                r"This is a sponsored",
                r"Paid advertisement",
            ]),
            low_value: owned(&[
                r"^Live updates:",
                r"^Breaking:.*\.$",
                r"More details to follow",
                r"This is a developing story",
                r"Story will be updated",
                r"^\w+\s+\w+\s*-\s*$",
                r"No additional details",
                r"Developing\.\.\.",
            ]),
            filtered_url: owned(&[
                r"/press-release/",
                r"/pr/",
                r"/advertisement/",
                r"/sponsored/",
                r"/jobs/",
                r"/careers/",
                r"/obituary/",
                r"/weather/",
                r"/sports-scores/",
                r"/stock-prices/",
            ]),
        }
    }
}

impl FilterConfig {
    /// Parse from a TOML string. Missing keys fall back to defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: FilterConfig = toml::from_str(s).context("parsing volume reducer config")?;
        Ok(cfg.sanitized())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading volume reducer config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Path the default loader would read, if any.
    pub fn resolve_path() -> Result<Option<PathBuf>> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Ok(Some(pb));
            }
            return Err(anyhow!(
                "{} points to non-existent path {}",
                ENV_CONFIG_PATH,
                pb.display()
            ));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Ok(Some(default));
        }
        Ok(None)
    }

    /// Env path → default path → built-in defaults, then env overrides.
    pub fn load_default() -> Result<Self> {
        let cfg = match Self::resolve_path()? {
            Some(p) => Self::from_path(&p)?,
            None => Self::default(),
        };
        Ok(cfg.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(t) = parse_env::<f64>(ENV_SIMILARITY_THRESHOLD) {
            self.similarity_threshold = t;
        }
        if let Some(n) = parse_env::<usize>(ENV_MIN_CONTENT_LENGTH) {
            self.min_content_length = n;
        }
        self.sanitized()
    }

    /// Clamp out-of-range values instead of rejecting the whole file.
    pub fn sanitized(mut self) -> Self {
        if !self.similarity_threshold.is_finite() {
            self.similarity_threshold = Self::default().similarity_threshold;
        }
        self.similarity_threshold = self.similarity_threshold.clamp(0.0, 1.0);
        if !self.min_unique_word_ratio.is_finite() {
            self.min_unique_word_ratio = Self::default().min_unique_word_ratio;
        }
        self.min_unique_word_ratio = self.min_unique_word_ratio.clamp(0.0, 1.0);
        self.lookback_days = self.lookback_days.clamp(1, MAX_LOOKBACK_DAYS);
        if self.cache_ttl_secs == 0 {
            self.cache_ttl_secs = 1;
        }
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = FilterConfig::from_toml_str(
            r#"
similarity_threshold = 0.9
cache_expiry = "per_entry"

[patterns]
filtered_url = ["/promo/"]
"#,
        )
        .unwrap();
        assert!((cfg.similarity_threshold - 0.9).abs() < 1e-9);
        assert_eq!(cfg.cache_expiry, CacheExpiry::PerEntry);
        assert_eq!(cfg.patterns.filtered_url, vec!["/promo/".to_string()]);
        // untouched sets keep their defaults
        assert_eq!(
            cfg.patterns.wire_service,
            PatternConfig::default().wire_service
        );
        assert_eq!(cfg.min_content_length, 150);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = FilterConfig::from_toml_str(
            r#"
similarity_threshold = 3.5
min_unique_word_ratio = -1.0
lookback_days = 0
cache_ttl_secs = 0
"#,
        )
        .unwrap();
        assert_eq!(cfg.similarity_threshold, 1.0);
        assert_eq!(cfg.min_unique_word_ratio, 0.0);
        assert_eq!(cfg.lookback_days, 1);
        assert_eq!(cfg.cache_ttl_secs, 1);

        let cfg = FilterConfig::from_toml_str("lookback_days = 100000000000000000").unwrap();
        assert_eq!(cfg.lookback_days, MAX_LOOKBACK_DAYS);
    }

    #[test]
    fn unknown_metric_is_an_error() {
        assert!(FilterConfig::from_toml_str(r#"similarity_metric = "cosine""#).is_err());
    }

    #[test]
    fn default_pattern_counts() {
        let p = PatternConfig::default();
        assert_eq!(p.wire_service.len(), 15);
        assert_eq!(p.promotional.len(), 12);
        assert_eq!(p.low_value.len(), 8);
        assert_eq!(p.filtered_url.len(), 10);
    }
}
