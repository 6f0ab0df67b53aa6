//! Gender detection with Other > Female > Male priority.

use sift_protocol::Gender;

use super::{QueryText, Rule, first_match};
use crate::vocab::{FEMALE_TYPOS, FEMALE_WORDS, MALE_WORDS, NAME_PREFIXES};

pub const NON_BINARY_WARNING: &str = "Interpreted as 'non-binary'";
pub const FEMALE_TYPO_WARNING: &str = "Interpreted as 'female' (possible typo corrected)";

/// A detected gender plus an optional note about how it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenderMatch {
    pub gender: Gender,
    pub warning: Option<&'static str>,
}

impl GenderMatch {
    fn plain(gender: Gender) -> Self {
        Self {
            gender,
            warning: None,
        }
    }

    fn noted(gender: Gender, warning: &'static str) -> Self {
        Self {
            gender,
            warning: Some(warning),
        }
    }
}

/// "female" contains "male", so Female is tried before Male.
pub const GENDER_RULES: &[Rule<GenderMatch>] = &[
    Rule {
        name: "other",
        matcher: other,
    },
    Rule {
        name: "female",
        matcher: female,
    },
    Rule {
        name: "male",
        matcher: male,
    },
    Rule {
        name: "other_fallback",
        matcher: other_fallback,
    },
];

pub fn detect_gender(query: &QueryText<'_>) -> Option<GenderMatch> {
    first_match(GENDER_RULES, query, &()).map(|(_, hit)| hit)
}

/// "named female" is a name search, not a gender filter.
fn used_as_name(q: &QueryText<'_>, word: &str) -> bool {
    q.position(word)
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| q.word(i))
        .is_some_and(|prev| NAME_PREFIXES.contains(&prev))
}

fn other(q: &QueryText<'_>, _: &()) -> Option<GenderMatch> {
    let explicit = ["other gender", "other-gender", "non-binary", "non binary", "nonbinary"];
    if explicit.iter().any(|p| q.contains(p)) {
        return Some(GenderMatch::plain(Gender::Other));
    }
    q.has_word("nb")
        .then_some(GenderMatch::noted(Gender::Other, NON_BINARY_WARNING))
}

fn female(q: &QueryText<'_>, _: &()) -> Option<GenderMatch> {
    if used_as_name(q, "female") {
        return None;
    }
    if q.has_any_word(FEMALE_WORDS) || q.contains("female") {
        return Some(GenderMatch::plain(Gender::Female));
    }
    let typo = FEMALE_TYPOS.iter().any(|t| q.contains(t));
    (typo && !q.has_word("male")).then_some(GenderMatch::noted(Gender::Female, FEMALE_TYPO_WARNING))
}

fn male(q: &QueryText<'_>, _: &()) -> Option<GenderMatch> {
    if used_as_name(q, "male") {
        return None;
    }
    q.has_any_word(MALE_WORDS)
        .then_some(GenderMatch::plain(Gender::Male))
}

fn other_fallback(q: &QueryText<'_>, _: &()) -> Option<GenderMatch> {
    if used_as_name(q, "other") {
        return None;
    }
    let context = q.contains("gender") || q.contains("user");
    (q.has_word("other") && context).then_some(GenderMatch::plain(Gender::Other))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender(text: &str) -> Option<Gender> {
        detect_gender(&QueryText::new(text)).map(|m| m.gender)
    }

    #[test]
    fn basic_genders() {
        assert_eq!(gender("female users"), Some(Gender::Female));
        assert_eq!(gender("male users"), Some(Gender::Male));
        assert_eq!(gender("other gender users"), Some(Gender::Other));
        assert_eq!(gender("show women"), Some(Gender::Female));
        assert_eq!(gender("show guys"), Some(Gender::Male));
    }

    #[test]
    fn female_checked_before_male() {
        assert_eq!(gender("male or female users"), Some(Gender::Female));
        assert_eq!(gender("females"), Some(Gender::Female));
    }

    #[test]
    fn non_binary_forms() {
        assert_eq!(gender("non-binary user"), Some(Gender::Other));
        assert_eq!(gender("nonbinary"), Some(Gender::Other));
        let nb = detect_gender(&QueryText::new("nb users")).unwrap();
        assert_eq!(nb.gender, Gender::Other);
        assert_eq!(nb.warning, Some(NON_BINARY_WARNING));
    }

    #[test]
    fn typo_tolerance() {
        let m = detect_gender(&QueryText::new("fmale users")).unwrap();
        assert_eq!(m.gender, Gender::Female);
        assert_eq!(m.warning, Some(FEMALE_TYPO_WARNING));
        // a real "male" word wins over a typo
        assert_eq!(gender("femal or male"), Some(Gender::Male));
    }

    #[test]
    fn gender_word_after_name_prefix_is_a_name() {
        assert_eq!(gender("named mary"), None);
        assert_eq!(gender("user named female"), None);
        assert_eq!(gender("user called male"), None);
    }

    #[test]
    fn other_needs_context() {
        assert_eq!(gender("other user"), Some(Gender::Other));
        assert_eq!(gender("other"), None);
    }

    #[test]
    fn whole_words_for_male() {
        assert_eq!(gender("manuel"), None);
        assert_eq!(gender("mentor"), None);
    }
}
