//! Bare-name queries ("Adam", "mary-jane") and the complex-query marker.

use super::{QueryText, single_letter, title_case};
use crate::vocab::{BARE_NAME_INDICATORS, COMPLEX_MARKERS};

const MAX_WORDS: usize = 4;
const MIN_CHARS: usize = 2;
const MAX_CHARS: usize = 40;

/// Title-cased name when the whole query looks like a person's name.
///
/// `original` is the trimmed query with its case preserved. A single letter
/// is returned upper-cased.
pub fn detect_bare_name(query: &QueryText<'_>, original: &str) -> Option<String> {
    if let Some(letter) = single_letter(original) {
        return Some(letter);
    }
    if query.has_any_word(BARE_NAME_INDICATORS) {
        return None;
    }
    if !(1..=MAX_WORDS).contains(&query.words.len()) {
        return None;
    }
    let chars = original.chars().count();
    if !(MIN_CHARS..=MAX_CHARS).contains(&chars) || !valid_name_chars(original) {
        return None;
    }
    Some(title_case(original))
}

/// Letters, apostrophes, hyphens and spaces, starting with a letter.
fn valid_name_chars(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphabetic() || matches!(c, '\'' | '-' | ' '))
}

/// True when the query needs more than keyword rules to understand.
pub fn is_complex(query: &QueryText<'_>) -> bool {
    COMPLEX_MARKERS.iter().any(|m| query.contains(m))
}
