// src/classify/low_value.rs
//! Low-value content: too short, live-blog/breaking stubs, or repetitive filler.

use std::collections::HashSet;

use tracing::debug;

use super::{full_text, PatternSet};

#[derive(Debug, Clone)]
pub struct LowValueClassifier {
    patterns: PatternSet,
    min_content_length: usize,
    min_unique_word_ratio: f64,
}

impl LowValueClassifier {
    pub fn new(patterns: PatternSet, min_content_length: usize, min_unique_word_ratio: f64) -> Self {
        Self {
            patterns,
            min_content_length,
            min_unique_word_ratio,
        }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn min_content_length(&self) -> usize {
        self.min_content_length
    }

    pub fn classify(&self, title: &str, body: &str) -> bool {
        if body.trim().chars().count() < self.min_content_length {
            debug!(target: "classify", "content too short");
            return true;
        }

        if self.patterns.first_match(&full_text(title, body)).is_some() {
            return true;
        }

        if self.is_repetitive(body) {
            debug!(target: "classify", "excessive repetition");
            return true;
        }
        false
    }

    /// `|unique words| < ratio * |words|`, words split on whitespace.
    fn is_repetitive(&self, body: &str) -> bool {
        let words: Vec<&str> = body.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        (unique.len() as f64) < (words.len() as f64) * self.min_unique_word_ratio
    }
}
