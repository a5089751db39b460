//! Error types for the volume reducer.
//!
//! The filtering core itself never fails: classifiers, signatures, similarity
//! and the batch pipeline are total. Errors only exist at the edges, where
//! webhook payloads are turned into candidate items and where pattern lists
//! from configuration are compiled.

use thiserror::Error;

/// Coarse category of an [`Error`], stable enough for API clients and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedInput,
    InvalidPattern,
}

#[derive(Error, Debug)]
pub enum Error {
    /// Webhook payload or entry that cannot become a `CandidateItem`.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A configured pattern failed to compile.
    #[error("invalid {set} pattern `{pattern}`: {source}")]
    InvalidPattern {
        set: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
