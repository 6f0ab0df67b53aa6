//! Keyword detectors, one per filter dimension.
//!
//! Every detector is a pure function over a lowercased query. Where a
//! detector tries several phrasings, the phrasings live in a static
//! `&[Rule]` table and the first matching rule wins, so the table order is
//! the behavior.

pub mod bare_name;
pub mod gender;
pub mod name;
pub mod parity;
pub mod profile_pic;
pub mod sort;
pub mod unsupported;

pub use bare_name::{detect_bare_name, is_complex};
pub use gender::{GenderMatch, detect_gender};
pub use name::{NameContext, NameMatch, detect_name};
pub use parity::detect_parity;
pub use profile_pic::detect_profile_pic;
pub use sort::{SortChoice, detect_sort};
pub use unsupported::unsupported_warnings;

/// One named entry in an ordered detector table.
pub struct Rule<T, C = ()> {
    pub name: &'static str,
    pub matcher: fn(&QueryText<'_>, &C) -> Option<T>,
}

/// Run `rules` in order and return the first hit with the rule's name.
pub fn first_match<T, C>(
    rules: &[Rule<T, C>],
    query: &QueryText<'_>,
    ctx: &C,
) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find_map(|rule| (rule.matcher)(query, ctx).map(|hit| (rule.name, hit)))
}

/// A lowercased query split into whitespace tokens.
#[derive(Debug, Clone)]
pub struct QueryText<'a> {
    pub text: &'a str,
    pub words: Vec<&'a str>,
}

impl<'a> QueryText<'a> {
    /// `text` must already be lowercased.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            words: text.split_whitespace().collect(),
        }
    }

    /// Substring test.
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.words.contains(&word)
    }

    pub fn has_any_word(&self, words: &[&str]) -> bool {
        self.words.iter().any(|w| words.contains(w))
    }

    /// Index of the first occurrence of `word`.
    pub fn position(&self, word: &str) -> Option<usize> {
        self.words.iter().position(|w| *w == word)
    }

    /// True when the whitespace-token sequence of `phrase` occurs in the query.
    pub fn has_phrase(&self, phrase: &str) -> bool {
        self.phrase_end(phrase).is_some()
    }

    pub fn has_any_phrase(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has_phrase(p))
    }

    /// Index just past the first occurrence of `phrase`.
    pub fn phrase_end(&self, phrase: &str) -> Option<usize> {
        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() > self.words.len() {
            return None;
        }
        self.words
            .windows(tokens.len())
            .position(|window| window == tokens.as_slice())
            .map(|start| start + tokens.len())
    }

    /// Word at `index`, if any.
    pub fn word(&self, index: usize) -> Option<&'a str> {
        self.words.get(index).copied()
    }
}

/// Upper-cased letter when `word` is a single alphabetic character.
pub fn single_letter(word: &str) -> Option<String> {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Some(c.to_uppercase().collect()),
        _ => None,
    }
}

pub fn starts_alphabetic(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_alphabetic)
}

/// Capitalize each apostrophe-separated part: `o'brien` -> `O'Brien`.
pub fn capitalize_name(name: &str) -> String {
    name.split('\'')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("'")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Upper-case every letter that follows a non-letter, lower-case the rest:
/// `mary-jane o'brien` -> `Mary-Jane O'Brien`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_matching_is_token_based() {
        let q = QueryText::new("sort names a to z");
        assert!(q.has_phrase("a to z"));
        assert!(q.has_phrase("names"));
        assert!(!q.has_phrase("name"));
        assert_eq!(q.phrase_end("sort names"), Some(2));
        assert!(!q.has_phrase(""));
    }

    #[test]
    fn single_letter_detection() {
        assert_eq!(single_letter("j").as_deref(), Some("J"));
        assert!(single_letter("jo").is_none());
        assert!(single_letter("1").is_none());
        assert!(single_letter("").is_none());
    }

    #[test]
    fn name_capitalization() {
        assert_eq!(capitalize_name("o'brien"), "O'Brien");
        assert_eq!(capitalize_name("ADAM"), "Adam");
        assert_eq!(capitalize_name("mary-jane"), "Mary-jane");
        assert_eq!(title_case("mary-jane"), "Mary-Jane");
        assert_eq!(title_case("o'brien smith"), "O'Brien Smith");
    }

    #[test]
    fn first_match_reports_rule_name() {
        fn never(_: &QueryText<'_>, _: &()) -> Option<u8> {
            None
        }
        fn always(_: &QueryText<'_>, _: &()) -> Option<u8> {
            Some(7)
        }
        let rules: &[Rule<u8>] = &[
            Rule { name: "never", matcher: never },
            Rule { name: "always", matcher: always },
        ];
        let q = QueryText::new("anything");
        assert_eq!(first_match(rules, &q, &()), Some(("always", 7)));
    }
}
