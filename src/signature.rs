// src/signature.rs
//! Content signatures: an exact digest of the normalized title + body prefix,
//! and a fuzzy digest of a capped, sorted keyword set.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::OnceCell;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::normalize::{normalize, prefix_chars};

/// Body characters that feed the exact signature.
pub const EXACT_BODY_CHARS: usize = 1000;
/// Body characters scanned for fuzzy keywords.
pub const FUZZY_BODY_CHARS: usize = 500;
/// Keywords kept in a fuzzy signature.
pub const FUZZY_MAX_KEYWORDS: usize = 10;

/// Opaque 128-bit digest (SHA-256 truncated to its first 16 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest128([u8; 16]);

impl Digest128 {
    pub fn of(bytes: &[u8]) -> Self {
        let full = Sha256::digest(bytes);
        let mut out = [0u8; 16];
        out.copy_from_slice(&full[..16]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        use std::fmt::Write as _;
        let mut s = String::with_capacity(32);
        for b in self.0 {
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl fmt::Debug for Digest128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest128({})", self.to_hex())
    }
}

impl fmt::Display for Digest128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl serde::Serialize for Digest128 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Exact + fuzzy signature pair for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ContentSignature {
    pub exact: Digest128,
    pub fuzzy: Digest128,
}

impl ContentSignature {
    pub fn of(title: &str, body: &str) -> Self {
        Self {
            exact: exact_signature(title, body),
            fuzzy: fuzzy_signature(title, body),
        }
    }
}

/// Digest of `normalize(title) | normalize(first 1000 chars of body)`.
pub fn exact_signature(title: &str, body: &str) -> Digest128 {
    let combined = format!(
        "{}|{}",
        normalize(title),
        normalize(prefix_chars(body, EXACT_BODY_CHARS))
    );
    Digest128::of(combined.as_bytes())
}

fn keyword_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Za-z]{4,}\b").expect("keyword regex"))
}

/// Sorted, deduplicated keywords (alphabetic, 4+ letters, case-folded) from the
/// title and the first 500 body characters, capped at ten.
pub fn fuzzy_keywords(title: &str, body: &str) -> Vec<String> {
    let mut words: BTreeSet<String> = BTreeSet::new();
    for src in [title, prefix_chars(body, FUZZY_BODY_CHARS)] {
        let lowered = src.to_lowercase();
        for m in keyword_re().find_iter(&lowered) {
            words.insert(m.as_str().to_string());
        }
    }
    words.into_iter().take(FUZZY_MAX_KEYWORDS).collect()
}

/// Digest of the capped keyword set; wording and word order don't matter.
pub fn fuzzy_signature(title: &str, body: &str) -> Digest128 {
    Digest128::of(fuzzy_keywords(title, body).join("|").as_bytes())
}
