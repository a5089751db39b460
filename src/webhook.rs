// src/webhook.rs
//! Miniflux webhook boundary: payload → candidate items.
//!
//! Malformed entries are dropped here with `ErrorKind::MalformedInput` and never
//! reach the filter. A payload with neither `entries` nor `entry` is an empty batch.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::item::CandidateItem;

#[derive(Debug, Clone, Deserialize)]
pub struct MinifluxFeed {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinifluxEntry {
    pub id: i64,
    #[serde(default)]
    pub feed_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub feed: Option<MinifluxFeed>,
}

impl MinifluxEntry {
    /// Validate and convert. Title and an http(s) URL are required; a missing
    /// body becomes empty, a missing publish time becomes "now".
    pub fn into_candidate(self) -> Result<CandidateItem> {
        let title = self.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(Error::malformed(format!("entry {}: missing title", self.id)));
        }
        let url = self.url.unwrap_or_default();
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::malformed(format!("entry {}: missing url", self.id)));
        }
        let lowered = url.to_ascii_lowercase();
        if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
            return Err(Error::malformed(format!(
                "entry {}: url is not http(s): {}",
                self.id, url
            )));
        }

        let feed = self
            .feed
            .map(|f| f.title)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Unknown Feed".to_string());

        Ok(CandidateItem {
            id: self.id.to_string(),
            title,
            body: self.content.unwrap_or_default(),
            url: url.to_string(),
            published_at: self.published_at.unwrap_or_else(Utc::now),
            feed,
        })
    }
}

/// Raw envelope; entries stay untyped so one bad entry doesn't sink the batch.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    entries: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    entry: Option<serde_json::Value>,
}

#[derive(Debug, Default)]
pub struct ParsedPayload {
    pub event_type: String,
    pub items: Vec<CandidateItem>,
    pub rejected: Vec<Error>,
}

impl ParsedPayload {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.rejected.is_empty()
    }
}

/// Parse a webhook body. Fails only when the envelope itself isn't JSON of
/// the expected shape; bad entries land in `rejected`.
pub fn parse_payload(body: &[u8]) -> Result<ParsedPayload> {
    let env: Envelope = serde_json::from_slice(body)
        .map_err(|e| Error::malformed(format!("webhook payload: {e}")))?;

    let raw = match (env.entries, env.entry) {
        (Some(list), _) if !list.is_empty() => list,
        (_, Some(one)) if !one.is_null() => vec![one],
        _ => Vec::new(),
    };

    let mut out = ParsedPayload {
        event_type: env.event_type.unwrap_or_else(|| "unknown".to_string()),
        ..ParsedPayload::default()
    };
    info!(target: "webhook", event_type = %out.event_type, entries = raw.len(), "received webhook");

    for value in raw {
        let parsed = serde_json::from_value::<MinifluxEntry>(value)
            .map_err(|e| Error::malformed(format!("entry: {e}")))
            .and_then(MinifluxEntry::into_candidate);
        match parsed {
            Ok(item) => out.items.push(item),
            Err(e) => {
                warn!(target: "webhook", error = %e, "dropping malformed entry");
                out.rejected.push(e);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn single_entry_form() {
        let p = parse_payload(
            br#"{"event_type":"new_entries","entry":{"id":5,"feed_id":2,"title":"Hello",
                "url":"https://news.example/a","published_at":"2025-03-01T10:00:00Z",
                "feed":{"title":"Example Wire"}}}"#,
        )
        .unwrap();
        assert_eq!(p.event_type, "new_entries");
        assert_eq!(p.items.len(), 1);
        let it = &p.items[0];
        assert_eq!(it.id, "5");
        assert_eq!(it.body, "");
        assert_eq!(it.feed, "Example Wire");
        assert_eq!(it.published_at.to_rfc3339(), "2025-03-01T10:00:00+00:00");
    }

    #[test]
    fn list_form_drops_bad_entries() {
        let p = parse_payload(
            br#"{"event_type":"new_entries","entries":[
                {"id":1,"title":"ok","url":"http://a.example/x","content":"body"},
                {"id":2,"title":"  ","url":"https://a.example/y"},
                {"id":3,"title":"no url"},
                {"id":4,"title":"ftp","url":"ftp://a.example/z"},
                {"title":"no id","url":"https://a.example/w"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(p.items.len(), 1);
        assert_eq!(p.items[0].feed, "Unknown Feed");
        assert_eq!(p.rejected.len(), 4);
        assert!(p.rejected.iter().all(|e| e.kind() == ErrorKind::MalformedInput));
    }

    #[test]
    fn neither_form_is_empty_batch() {
        let p = parse_payload(br#"{"event_type":"save_entry"}"#).unwrap();
        assert!(p.is_empty());
        let p = parse_payload(br#"{"event_type":"x","entries":[],"entry":null}"#).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn garbage_is_malformed() {
        let e = parse_payload(b"not json").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::MalformedInput);
    }
}
