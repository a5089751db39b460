// src/item.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One incoming news item, as handed to the filter by the webhook boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    /// May be empty; never absent.
    #[serde(default)]
    pub body: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    /// Source feed label, e.g. "Reuters World".
    #[serde(default)]
    pub feed: String,
}

impl CandidateItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            url: url.into(),
            published_at: Utc::now(),
            feed: String::new(),
        }
    }

    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = at;
        self
    }

    pub fn from_feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = feed.into();
        self
    }

    /// Title prefix for log lines (never the body).
    pub fn short_title(&self) -> String {
        crate::normalize::prefix_chars(&self.title, 60).to_string()
    }
}

/// A previously accepted item, supplied by the article store for
/// fuzzy/similarity comparison. Read-only to the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentWindowItem {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl RecentWindowItem {
    pub fn new(title: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            created_at,
        }
    }

    /// Stores often hand out naive timestamps; those are taken as UTC.
    pub fn from_naive_utc(
        title: impl Into<String>,
        body: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self::new(title, body, created_at.and_utc())
    }
}
