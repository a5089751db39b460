// src/classify/promotional.rs
//! Press-release and promotional boilerplate detection.

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::debug;

use super::{full_text, PatternSet};

fn company_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Z][a-zA-Z]*\s+(?:Inc|Corp|Ltd|LLC|Co)\b").expect("company regex")
    })
}

#[derive(Debug, Clone)]
pub struct PromotionalClassifier {
    patterns: PatternSet,
    max_company_mentions: usize,
}

impl PromotionalClassifier {
    pub fn new(patterns: PatternSet, max_company_mentions: usize) -> Self {
        Self {
            patterns,
            max_company_mentions,
        }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// PR boilerplate anywhere in title + body, or more than
    /// `max_company_mentions` corporate-suffix mentions in the body.
    pub fn classify(&self, title: &str, body: &str) -> bool {
        if self.patterns.first_match(&full_text(title, body)).is_some() {
            return true;
        }

        let mentions = company_re().find_iter(body).count();
        if mentions > self.max_company_mentions {
            debug!(target: "classify", mentions, "excessive company mentions (promotional)");
            return true;
        }
        false
    }
}
