// src/classify/mod.rs
//! Stateless rule classifiers over raw item text and URL.
//!
//! Each classifier owns an ordered list of case-insensitive patterns plus an
//! optional counting heuristic. Matching short-circuits on the first hit.
//! All classifiers are total: any string in, a bool out.

pub mod low_value;
pub mod promotional;
pub mod url;
pub mod wire;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::config::FilterConfig;
use crate::error::{Error, Result};

pub use low_value::LowValueClassifier;
pub use promotional::PromotionalClassifier;
pub use url::UrlClassifier;
pub use wire::WireServiceClassifier;

/// Named, compiled, ordered pattern list.
#[derive(Debug, Clone)]
pub struct PatternSet {
    name: &'static str,
    compiled: Vec<(String, Regex)>,
}

impl PatternSet {
    /// Compile `patterns` case-insensitively. Fails on the first bad pattern.
    pub fn compile(name: &'static str, patterns: &[String]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (p.clone(), re))
                    .map_err(|source| Error::InvalidPattern {
                        set: name,
                        pattern: p.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { name, compiled })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Source text of the first pattern that matches `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let hit = self
            .compiled
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(p, _)| p.as_str());
        if let Some(p) = hit {
            debug!(target: "classify", set = self.name, pattern = p, "pattern hit");
        }
        hit
    }
}

/// `title + " " + body`, the text every content classifier reads.
pub(crate) fn full_text(title: &str, body: &str) -> String {
    let mut s = String::with_capacity(title.len() + body.len() + 1);
    s.push_str(title);
    s.push(' ');
    s.push_str(body);
    s
}

/// The four classifiers, compiled from one config.
#[derive(Debug, Clone)]
pub struct Classifiers {
    pub low_value: LowValueClassifier,
    pub wire: WireServiceClassifier,
    pub promotional: PromotionalClassifier,
    pub url: UrlClassifier,
}

impl Classifiers {
    pub fn compile(cfg: &FilterConfig) -> Result<Self> {
        Ok(Self {
            low_value: LowValueClassifier::new(
                PatternSet::compile("low_value", &cfg.patterns.low_value)?,
                cfg.min_content_length,
                cfg.min_unique_word_ratio,
            ),
            wire: WireServiceClassifier::new(
                PatternSet::compile("wire_service", &cfg.patterns.wire_service)?,
                cfg.max_bylines,
            ),
            promotional: PromotionalClassifier::new(
                PatternSet::compile("promotional", &cfg.patterns.promotional)?,
                cfg.max_company_mentions,
            ),
            url: UrlClassifier::new(PatternSet::compile(
                "filtered_url",
                &cfg.patterns.filtered_url,
            )?),
        })
    }
}
