// src/decision.rs
//! Verdict shapes: reason codes and the per-item accept/reject verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an item was rejected. One item may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    LowValueContent,
    WireService,
    PrContent,
    DuplicateExact,
    DuplicateFuzzy,
    DuplicateSimilar,
    FilteredUrl,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 7] = [
        ReasonCode::LowValueContent,
        ReasonCode::WireService,
        ReasonCode::PrContent,
        ReasonCode::DuplicateExact,
        ReasonCode::DuplicateFuzzy,
        ReasonCode::DuplicateSimilar,
        ReasonCode::FilteredUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowValueContent => "low_value_content",
            Self::WireService => "wire_service",
            Self::PrContent => "pr_content",
            Self::DuplicateExact => "duplicate_exact",
            Self::DuplicateFuzzy => "duplicate_fuzzy",
            Self::DuplicateSimilar => "duplicate_similar",
            Self::FilteredUrl => "filtered_url",
        }
    }

    pub fn is_duplicate(self) -> bool {
        matches!(
            self,
            Self::DuplicateExact | Self::DuplicateFuzzy | Self::DuplicateSimilar
        )
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accept/reject outcome for one item. `reasons` is empty iff `accept`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterVerdict {
    pub accept: bool,
    pub reasons: Vec<ReasonCode>,
}

impl FilterVerdict {
    pub fn from_reasons(reasons: Vec<ReasonCode>) -> Self {
        Self {
            accept: reasons.is_empty(),
            reasons,
        }
    }

    pub fn accepted() -> Self {
        Self::from_reasons(Vec::new())
    }

    pub fn has(&self, reason: ReasonCode) -> bool {
        self.reasons.contains(&reason)
    }

    /// "low_value_content, wire_service" style summary for logs.
    pub fn reasons_joined(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
