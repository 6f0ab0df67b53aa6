//! Odd/even name-length detection.

use sift_protocol::NameParity;

use super::QueryText;

const LENGTH_WORDS: &[&str] = &["letter", "character", "length"];

/// `odd`/`even` must appear as whole words, so "Todd" or "Steven" never
/// trigger a parity filter.
pub fn detect_parity(query: &QueryText<'_>) -> Option<NameParity> {
    let about_length = LENGTH_WORDS.iter().any(|w| query.contains(w)) || query.contains("name");
    if !about_length {
        return None;
    }
    if query.has_word("odd") {
        return Some(NameParity::Odd);
    }
    if query.has_word("even") {
        return Some(NameParity::Even);
    }
    None
}
