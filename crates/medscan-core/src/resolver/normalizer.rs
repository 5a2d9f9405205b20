//! Name normalization.
//!
//! Two forms are used:
//! - Lookup form (lowercase + trim), applied to table names and candidates alike.
//!   Exact and substring matching only work when both sides share it.
//! - Token-sort form, used by the fuzzy matcher: Latin-1 supplement dropped,
//!   other non-word characters folded to spaces, tokens sorted and joined by
//!   a single space.

/// Normalize a name for exact and substring lookup.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize an optional candidate; blank candidates count as absent.
pub fn normalize_candidate(candidate: Option<&str>) -> Option<String> {
    candidate
        .map(normalize_name)
        .filter(|c| !c.is_empty())
}

/// Reduce text to lowercase word characters separated by single spaces.
///
/// Characters in U+0080..=U+00FF are dropped. Any other character that is
/// not alphanumeric or `_` becomes a separator, so OCR dashes and curly
/// quotes split tokens.
pub fn process_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().filter(|c| !LATIN1_SUPPLEMENT.contains(c)) {
        if is_word_char(c) {
            folded.extend(c.to_lowercase());
        } else {
            folded.push(' ');
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

const LATIN1_SUPPLEMENT: std::ops::RangeInclusive<char> = '\u{80}'..='\u{ff}';

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Token-sort key: processed tokens sorted alphabetically.
pub fn token_sort_key(text: &str) -> String {
    let processed = process_text(text);
    let mut tokens: Vec<&str> = processed.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
