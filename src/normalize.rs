// src/normalize.rs
//! Text normalization used for signatures and similarity comparison.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Stop-words dropped before comparison.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

fn non_word() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("non-word regex"))
}

/// Normalize text for comparison: lowercase, strip every non-word character,
/// drop stop-words and collapse whitespace runs to single spaces.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    // Lowercase first so case folding can't reintroduce punctuation afterwards.
    let lowered = text.to_lowercase();
    let stripped = non_word().replace_all(&lowered, "");

    stripped
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `n` characters of `s` (char-based, never splits a code point).
pub fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
    }

    #[test]
    fn strips_punctuation_and_stop_words() {
        assert_eq!(
            normalize("The Fed, and the   markets: a RALLY!"),
            "fed markets rally"
        );
    }

    #[test]
    fn stop_words_only_match_whole_tokens() {
        // "another" contains "an", "theory" contains "the"
        assert_eq!(normalize("another theory"), "another theory");
    }

    #[test]
    fn underscores_and_digits_are_word_chars() {
        assert_eq!(normalize("Q3_2025 results: +4.5%"), "q3_2025 results 45");
    }

    #[test]
    fn is_idempotent() {
        for s in [
            "Markets rally (Reuters) -- the Dow jumps 2%",
            "  Ünïcödé   TEXT, with   the punctuation...  ",
            "a an the",
            "İstanbul and the Bosphorus",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn prefix_is_char_based() {
        assert_eq!(prefix_chars("čšžabc", 3), "čšž");
        assert_eq!(prefix_chars("ab", 10), "ab");
        assert_eq!(prefix_chars("", 5), "");
    }
}
