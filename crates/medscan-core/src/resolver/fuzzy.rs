//! Token-sort fuzzy matching.
//!
//! Both strings are reduced to their token-sort key and compared with the
//! indel ratio `2 * LCS / (len_a + len_b)`, scaled to 0-100.

use super::normalizer::token_sort_key;

/// Best candidate found by [`FuzzyMatcher::best_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch<'c> {
    pub candidate: &'c str,
    pub score: u8,
}

/// Word-order-insensitive string matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Token-sort ratio of two raw strings (0-100).
    pub fn score(&self, a: &str, b: &str) -> u8 {
        ratio(&token_sort_key(a), &token_sort_key(b))
    }

    /// Highest-scoring candidate; ties keep the first one seen.
    pub fn best_match<'c, I>(&self, query: &str, candidates: I) -> Option<FuzzyMatch<'c>>
    where
        I: IntoIterator<Item = &'c str>,
    {
        let query_key = token_sort_key(query);
        best_of(
            candidates
                .into_iter()
                .map(|c| (c, ratio(&query_key, &token_sort_key(c)))),
        )
    }

    /// Like [`best_match`](Self::best_match), over candidates whose token-sort
    /// keys were computed ahead of time. Items are `(candidate, key)`.
    pub fn best_match_keyed<'c, I>(&self, query: &str, candidates: I) -> Option<FuzzyMatch<'c>>
    where
        I: IntoIterator<Item = (&'c str, &'c str)>,
    {
        let query_key = token_sort_key(query);
        best_of(
            candidates
                .into_iter()
                .map(|(c, key)| (c, ratio(&query_key, key))),
        )
    }
}

fn best_of<'c>(scored: impl Iterator<Item = (&'c str, u8)>) -> Option<FuzzyMatch<'c>> {
    let mut best: Option<FuzzyMatch<'c>> = None;
    for (candidate, score) in scored {
        match best {
            Some(current) if score <= current.score => {}
            _ => best = Some(FuzzyMatch { candidate, score }),
        }
        if score == 100 {
            break;
        }
    }
    best
}

/// Indel similarity of two already-processed strings, rounded half to even.
///
/// Empty input on either side scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    let lcs = lcs_len(&a, &b);
    let similarity = (2 * lcs) as f64 / total as f64;
    (similarity * 100.0).round_ties_even() as u8
}

/// Length of the longest common subsequence, single-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0usize; short.len() + 1];

    for &x in long {
        let mut diagonal = 0;
        for (j, &y) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[short.len()]
}
