//! Name search patterns.
//!
//! Ten matchers tried strictly in table order; the first hit wins. Several
//! consult the gender and profile-picture results, so this detector runs
//! after those two.

use sift_protocol::Gender;

use super::{QueryText, Rule, capitalize_name, first_match, single_letter, starts_alphabetic};
use crate::vocab::{ARTICLES, COMMAND_WORDS, FILTER_WORDS, SORTING_WORDS};

const STARTS_WITH_PHRASES: &[&str] = &[
    "starts with",
    "starting with",
    "begins with",
    "beginning with",
    "begin with",
    "start with",
    "start at",
    "starting letter",
];

/// Skipped when looking for the letter after "with".
const LETTER_LEADERS: &[&str] = &["a", "an", "the", "letter"];

const NAMED_SKIP: &[&str] = &[
    "that", "is", "of", "which", "who", "a", "an", "the", "users", "user", "people", "all", "me",
];

/// First words that can never be the name in "X users".
const NAME_USERS_BLOCKLIST: &[&str] = &[
    "find", "show", "list", "get", "search", "display", "give", "fetch", "all", "the", "female",
    "male", "other", "newest", "oldest", "fmale", "femal", "femails", "femail",
];

const LEADING_FILTER_WORDS: &[&str] = &[
    "female", "male", "other", "newest", "oldest", "latest", "recent", "longest", "shortest",
    "with", "without", "no",
];

const NOT_A_LEADING_NAME: &[&str] = &[
    "female",
    "male",
    "other",
    "fmale",
    "femal",
    "newest",
    "oldest",
    "latest",
    "recent",
    "longest",
    "shortest",
    "alphabetical",
    "sorted",
];

const WITH_SKIP: &[&str] = &[
    "a", "an", "the", "that", "is", "of", "odd", "even", "profile", "pic", "picture", "photo",
    "avatar",
];

/// Results of the detectors a name matcher may consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameContext {
    pub gender: Option<Gender>,
    pub has_profile_pic: Option<bool>,
}

/// A name search term and whether it anchors at the start of the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    pub value: String,
    pub starts_with: bool,
}

impl NameMatch {
    fn prefix(value: String) -> Self {
        Self {
            value,
            starts_with: true,
        }
    }

    fn contains(value: String) -> Self {
        Self {
            value,
            starts_with: false,
        }
    }
}

pub const NAME_RULES: &[Rule<NameMatch, NameContext>] = &[
    Rule {
        name: "letter_before_names",
        matcher: letter_before_names,
    },
    Rule {
        name: "starts_with",
        matcher: starts_with,
    },
    Rule {
        name: "letter_in_name",
        matcher: letter_in_name,
    },
    Rule {
        name: "containing",
        matcher: containing,
    },
    Rule {
        name: "name_like",
        matcher: name_like,
    },
    Rule {
        name: "named",
        matcher: named,
    },
    Rule {
        name: "show_name_filter",
        matcher: show_name_filter,
    },
    Rule {
        name: "name_users",
        matcher: name_users,
    },
    Rule {
        name: "leading_name",
        matcher: leading_name,
    },
    Rule {
        name: "with_name",
        matcher: with_name,
    },
];

pub fn detect_name(query: &QueryText<'_>, ctx: &NameContext) -> Option<NameMatch> {
    first_match(NAME_RULES, query, ctx).map(|(rule, hit)| {
        tracing::trace!(rule, name = %hit.value, starts_with = hit.starts_with, "name pattern matched");
        hit
    })
}

/// First word after any of `keywords` that is not in `skip` and starts
/// with a letter.
fn word_after<'a>(q: &QueryText<'a>, keywords: &[&str], skip: &[&str]) -> Option<&'a str> {
    q.words.iter().enumerate().find_map(|(i, w)| {
        if !keywords.contains(w) {
            return None;
        }
        let next = q.word(i + 1)?;
        (!skip.contains(&next) && starts_alphabetic(next)).then_some(next)
    })
}

/// "show j names"
fn letter_before_names(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    let idx = q.position("names")?;
    let prev = q.word(idx.checked_sub(1)?)?;
    single_letter(prev).map(NameMatch::prefix)
}

/// "starting with j", "begins with letter j"
fn starts_with(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    STARTS_WITH_PHRASES
        .iter()
        .filter(|phrase| q.contains(phrase))
        .find_map(|phrase| letter_after_with(q).or_else(|| letter_after_phrase(q, phrase)))
        .map(NameMatch::prefix)
}

fn letter_after_with(q: &QueryText<'_>) -> Option<String> {
    q.words.iter().enumerate().find_map(|(i, w)| {
        if *w != "with" {
            return None;
        }
        let mut next = q.word(i + 1)?;
        if LETTER_LEADERS.contains(&next)
            && let Some(after) = q.word(i + 2)
        {
            next = after;
        }
        single_letter(next)
    })
}

fn letter_after_phrase(q: &QueryText<'_>, phrase: &str) -> Option<String> {
    let end = q.phrase_end(phrase)?;
    single_letter(q.word(end)?)
}

/// "letter j in name"
fn letter_in_name(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    let idx = q.position("letter")?;
    let letter = single_letter(q.word(idx + 1)?)?;
    let rest = &q.words[idx..];
    (rest.contains(&"name") || rest.contains(&"names")).then(|| NameMatch::contains(letter))
}

/// "containing j", "containing ann"
fn containing(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    let idx = q.position("containing")?;
    let next = q.word(idx + 1)?;
    if let Some(letter) = single_letter(next) {
        return Some(NameMatch::contains(letter));
    }
    (!ARTICLES.contains(&next)).then(|| NameMatch::contains(capitalize_name(next)))
}

/// "name like ann"
fn name_like(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    let idx = q.position("like")?;
    if idx == 0 || !q.words[..idx].contains(&"name") {
        return None;
    }
    let next = q.word(idx + 1)?;
    (!ARTICLES.contains(&next)).then(|| NameMatch::contains(capitalize_name(next)))
}

/// "named mary", "called mary"
fn named(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    let name = word_after(q, &["named", "called"], NAMED_SKIP)?;
    (!SORTING_WORDS.contains(&name)).then(|| NameMatch::contains(capitalize_name(name)))
}

/// "show mary female"
fn show_name_filter(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    if q.words.len() < 3 || !matches!(q.words[0], "show" | "find") {
        return None;
    }
    let candidate = q.words[1];
    let followed_by_filter = FILTER_WORDS.contains(&q.words[2]);
    (!FILTER_WORDS.contains(&candidate) && starts_alphabetic(candidate) && followed_by_filter)
        .then(|| NameMatch::contains(capitalize_name(candidate)))
}

/// "mary users"
fn name_users(q: &QueryText<'_>, _: &NameContext) -> Option<NameMatch> {
    if q.words.len() < 2 || !matches!(q.words.last(), Some(&"users" | &"user")) {
        return None;
    }
    let candidate = q.words[0];
    (!NAME_USERS_BLOCKLIST.contains(&candidate) && starts_alphabetic(candidate))
        .then(|| NameMatch::contains(capitalize_name(candidate)))
}

/// "mary with picture", or "mary ..." once a gender is known
fn leading_name(q: &QueryText<'_>, ctx: &NameContext) -> Option<NameMatch> {
    if q.words.len() < 2 {
        return None;
    }
    let first = q.words[0];
    if NOT_A_LEADING_NAME.contains(&first)
        || COMMAND_WORDS.contains(&first)
        || !starts_alphabetic(first)
    {
        return None;
    }
    (LEADING_FILTER_WORDS.contains(&q.words[1]) || ctx.gender.is_some())
        .then(|| NameMatch::contains(capitalize_name(first)))
}

/// "female with ann", only when no picture filter claims the "with"
fn with_name(q: &QueryText<'_>, ctx: &NameContext) -> Option<NameMatch> {
    if ctx.gender.is_none() || ctx.has_profile_pic.is_some() {
        return None;
    }
    word_after(q, &["with"], WITH_SKIP).map(|name| NameMatch::contains(capitalize_name(name)))
}
