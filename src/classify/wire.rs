// src/classify/wire.rs
//! Wire-service (syndicated agency copy) detection.

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::debug;

use super::{full_text, PatternSet};

fn byline_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\b(By|Reporter|Correspondent):").expect("byline regex"))
}

#[derive(Debug, Clone)]
pub struct WireServiceClassifier {
    patterns: PatternSet,
    max_bylines: usize,
}

impl WireServiceClassifier {
    pub fn new(patterns: PatternSet, max_bylines: usize) -> Self {
        Self {
            patterns,
            max_bylines,
        }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Agency bylines/parentheticals, or more than `max_bylines` byline markers
    /// (the same story carried with several outlets' credits).
    pub fn classify(&self, title: &str, body: &str) -> bool {
        let text = full_text(title, body);
        if self.patterns.first_match(&text).is_some() {
            return true;
        }

        let bylines = byline_re().find_iter(&text).count();
        if bylines > self.max_bylines {
            debug!(target: "classify", bylines, "multiple bylines (syndicated)");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifiers;
    use crate::config::FilterConfig;

    fn wire() -> WireServiceClassifier {
        Classifiers::compile(&FilterConfig::default()).unwrap().wire
    }

    #[test]
    fn agency_parenthetical_in_title_or_body() {
        let w = wire();
        assert!(w.classify("Markets rally (Reuters)", ""));
        assert!(w.classify("Markets rally", "NEW YORK (ap) - Stocks rose on Monday."));
        assert!(w.classify("Floods in Assam", "GUWAHATI, PTI - Rivers breached banks."));
    }

    #[test]
    fn byline_count_above_threshold() {
        let w = wire();
        let three = "By: Ann Lee. Reporter: Bo Chan. Correspondent: Cy Diaz.";
        assert!(w.classify("Council vote", three));
        let two = "By: Ann Lee. Reporter: Bo Chan.";
        assert!(!w.classify("Council vote", two));
    }

    #[test]
    fn byline_markers_are_case_sensitive() {
        let w = wire();
        let lower = "by: a. reporter: b. correspondent: c. by: d.";
        assert!(!w.classify("Council vote", lower));
    }

    #[test]
    fn plain_local_story_passes() {
        let w = wire();
        assert!(!w.classify(
            "Library extends weekend hours",
            "The central library will stay open until nine on Saturdays."
        ));
    }
}
