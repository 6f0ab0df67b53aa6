//! Sort preference detection.

use sift_protocol::{SortField, SortOrder};

use super::{QueryText, Rule, first_match};

const LONGEST_WORDS: &[&str] = &["longest", "long", "biggest", "big", "most characters"];
const SHORTEST_WORDS: &[&str] = &["shortest", "short", "smallest", "small", "fewest", "least"];
const NEWEST_WORDS: &[&str] = &["newest", "most recent", "recently created", "latest", "recent"];
const OLDEST_WORDS: &[&str] = &["oldest", "first created", "earliest"];
const ALPHA_ASC_WORDS: &[&str] = &["alphabetical", "a-z", "a to z"];
const ALPHA_DESC_WORDS: &[&str] = &["reverse alphabetical", "z-a", "z to a"];
const SORT_VERBS: &[&str] = &["sort", "sorted", "order", "ordered"];

/// A detected sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortChoice {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortChoice {
    fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// Tried in order; the first rule that matches decides the sort.
pub const SORT_RULES: &[Rule<SortChoice>] = &[
    Rule {
        name: "length",
        matcher: length_sort,
    },
    Rule {
        name: "date",
        matcher: date_sort,
    },
    Rule {
        name: "alphabetical",
        matcher: alphabetical_sort,
    },
    Rule {
        name: "explicit",
        matcher: explicit_sort,
    },
];

pub fn detect_sort(query: &QueryText<'_>) -> Option<SortChoice> {
    first_match(SORT_RULES, query, &()).map(|(rule, choice)| {
        tracing::trace!(rule, field = %choice.field, order = %choice.order, "sort detected");
        choice
    })
}

fn mentions_username(q: &QueryText<'_>) -> bool {
    q.contains("username")
}

fn mentions_name(q: &QueryText<'_>) -> bool {
    q.contains("name")
}

fn length_sort(q: &QueryText<'_>, _: &()) -> Option<SortChoice> {
    let has_username = mentions_username(q);
    if !(has_username || mentions_name(q) || q.has_word("first")) {
        return None;
    }
    let field = if has_username {
        SortField::UsernameLength
    } else {
        SortField::NameLength
    };

    if q.has_any_phrase(LONGEST_WORDS) {
        return Some(SortChoice::new(field, SortOrder::Desc));
    }
    if q.has_any_phrase(SHORTEST_WORDS) {
        return Some(SortChoice::new(field, SortOrder::Asc));
    }
    None
}

fn date_sort(q: &QueryText<'_>, _: &()) -> Option<SortChoice> {
    if q.has_any_phrase(NEWEST_WORDS) || q.contains("signups") {
        return Some(SortChoice::new(SortField::CreatedAt, SortOrder::Desc));
    }
    if q.has_any_phrase(OLDEST_WORDS) {
        return Some(SortChoice::new(SortField::CreatedAt, SortOrder::Asc));
    }
    None
}

fn alphabetical_sort(q: &QueryText<'_>, _: &()) -> Option<SortChoice> {
    let field = if mentions_username(q) {
        SortField::Username
    } else {
        SortField::Name
    };
    if q.has_any_phrase(ALPHA_DESC_WORDS) {
        return Some(SortChoice::new(field, SortOrder::Desc));
    }
    if q.has_any_phrase(ALPHA_ASC_WORDS) {
        return Some(SortChoice::new(field, SortOrder::Asc));
    }
    None
}

/// "sort by X" / "ordered by X".
fn explicit_sort(q: &QueryText<'_>, _: &()) -> Option<SortChoice> {
    if !q.has_any_word(SORT_VERBS) {
        return None;
    }
    let by = q.position("by")?;
    match q.word(by + 1)? {
        "username" | "usernames" => Some(SortChoice::new(SortField::Username, SortOrder::Asc)),
        "name" | "names" => Some(SortChoice::new(SortField::Name, SortOrder::Asc)),
        "date" | "created" | "time" => {
            Some(SortChoice::new(SortField::CreatedAt, SortOrder::Desc))
        }
        _ => None,
    }
}
