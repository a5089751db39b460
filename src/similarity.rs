// src/similarity.rs
//! Text similarity in [0.0, 1.0].
//!
//! Default metric is Ratcliff/Obershelp ("gestalt pattern matching"):
//! find the longest common substring, recurse on the unmatched pieces to the
//! left and right, and report `2 * matched / (len(a) + len(b))`.
//! Normalized Levenshtein is available as an alternative.
//!
//! There is no "autojunk" heuristic: frequent characters in long texts are
//! matched like any other, so ratios for texts of 200+ chars can come out
//! higher than a matcher that junks popular characters would report.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    RatcliffObershelp,
    Levenshtein,
}

impl SimilarityMetric {
    /// Similarity of two already-normalized strings. Two empty strings score 0.0.
    pub fn ratio(self, a: &str, b: &str) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 0.0;
        }
        match self {
            Self::RatcliffObershelp => ratcliff_obershelp(a, b),
            Self::Levenshtein => strsim::normalized_levenshtein(a, b),
        }
    }
}

/// Ratcliff/Obershelp ratio over characters.
pub fn ratcliff_obershelp(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Total length of matching blocks. Iterative to keep stack depth flat.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0usize;
    let mut todo = vec![(0usize, a.len(), 0usize, b.len())];

    while let Some((alo, ahi, blo, bhi)) = todo.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            todo.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            todo.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`.
/// Ties resolve to the earliest start in `a`, then in `b`.
/// Returns `(start_a, start_b, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0usize);
    if width == 0 || ahi <= alo {
        return best;
    }

    // prev[jj] = length of the common suffix ending at a[i-1], b[blo+jj]
    let mut prev = vec![0usize; width];
    let mut curr = vec![0usize; width];

    for i in alo..ahi {
        for jj in 0..width {
            let j = blo + jj;
            curr[jj] = if a[i] == b[j] {
                let k = if jj > 0 { prev[jj - 1] + 1 } else { 1 };
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
                k
            } else {
                0
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
