//! Warnings for query shapes the filter model cannot express.
//!
//! These never block other detectors; every matching rule contributes its
//! message, in table order.

use super::{QueryText, Rule};
use crate::vocab::{FEMALE_WORDS, IMAGE_WORDS, MALE_WORDS};

pub const NEGATION_WARNING: &str =
    "Negation/exclusion queries are not supported - showing matching results instead";
pub const GENDER_OR_WARNING: &str =
    "OR logic between genders is not supported - using first gender found";
pub const ENDS_WITH_WARNING: &str =
    "Ends-with filtering is not supported - use 'contains' or 'starts with' instead";
pub const EXACT_LENGTH_WARNING: &str =
    "Exact length filtering is not supported - only odd/even length is available";

pub const WARNING_RULES: &[Rule<&'static str>] = &[
    Rule {
        name: "negation",
        matcher: negation,
    },
    Rule {
        name: "gender_or",
        matcher: gender_or,
    },
    Rule {
        name: "ends_with",
        matcher: ends_with,
    },
    Rule {
        name: "exact_length",
        matcher: exact_length,
    },
];

/// All warnings that apply to `query`, in rule order.
pub fn unsupported_warnings(query: &QueryText<'_>) -> Vec<String> {
    WARNING_RULES
        .iter()
        .filter_map(|rule| (rule.matcher)(query, &()))
        .map(String::from)
        .collect()
}

/// "not" is fine when it negates a picture ("does not have a photo").
fn negation(q: &QueryText<'_>, _: &()) -> Option<&'static str> {
    let about_picture = q.contains("profile") || IMAGE_WORDS.iter().any(|w| q.contains(w));
    let excluded = q.has_any_word(&["except", "exclude"]);
    (excluded || (q.has_word("not") && !about_picture)).then_some(NEGATION_WARNING)
}

fn gender_or(q: &QueryText<'_>, _: &()) -> Option<&'static str> {
    let gendered = q.has_any_word(FEMALE_WORDS)
        || q.has_any_word(MALE_WORDS)
        || q.has_any_word(&["other", "non-binary"]);
    (q.has_word("or") && gendered).then_some(GENDER_OR_WARNING)
}

fn ends_with(q: &QueryText<'_>, _: &()) -> Option<&'static str> {
    (q.contains("ends with") || q.contains("end with")).then_some(ENDS_WITH_WARNING)
}

fn exact_length(q: &QueryText<'_>, _: &()) -> Option<&'static str> {
    let unit = q.has_any_word(&["letter", "letters", "char", "character", "characters"]);
    (q.has_word("exactly") && unit).then_some(EXACT_LENGTH_WARNING)
}
