//! Word tables shared by the detectors, the heuristic parser and the AI
//! sanitizer.

pub const FEMALE_WORDS: &[&str] = &["female", "woman", "women", "lady", "ladies"];
pub const MALE_WORDS: &[&str] = &["male", "guy", "guys", "man", "men"];
pub const FEMALE_TYPOS: &[&str] = &["fmale", "femal", "femails", "femail"];

/// Words that turn a following gender word into a name.
pub const NAME_PREFIXES: &[&str] = &["named", "called", "name"];

pub const IMAGE_WORDS: &[&str] = &["pic", "picture", "photo", "image", "avatar"];

/// Words that end a "show X ..." or "X ..." name phrase.
pub const FILTER_WORDS: &[&str] = &[
    "female", "male", "other", "newest", "oldest", "latest", "recent", "longest", "shortest",
    "with", "without", "no", "user", "users",
];

pub const COMMAND_WORDS: &[&str] = &[
    "find", "show", "list", "get", "search", "display", "give", "fetch", "all", "the", "users",
    "user", "people", "person", "names", "name",
];

pub const ARTICLES: &[&str] = &["a", "an", "the", "that", "is"];

/// Words rejected as the target of "named X".
pub const SORTING_WORDS: &[&str] = &["oldest", "newest", "longest", "shortest", "with", "without"];

/// Any of these means the query is not a bare name.
pub const BARE_NAME_INDICATORS: &[&str] = &[
    "find", "show", "list", "get", "search", "display", "give", "fetch", "user", "users",
    "people", "person", "all", "every", "with", "without", "who", "whose", "where", "that",
    "which", "the", "and", "or", "not", "longest", "shortest", "oldest", "newest", "first",
    "last", "name", "named", "called", "username", "picture", "photo", "profile",
    "alphabetical", "alphabetically", "sorted", "sort", "order", "ordered", "a-z", "z-a",
    "ascending", "descending", "female", "male", "other", "non-binary", "nonbinary",
];

/// Substrings that mark a query as too complex for the keyword rules.
pub const COMPLEX_MARKERS: &[&str] = &[
    "whose", "rhyme", "longer", "shorter", "exactly", "more", "less", "three", "two",
    "contains", "ends", "birthdate", "birthday", "age", "registered", "password",
];

/// Tokens that can never be a name search term.
const RESERVED_NAME_TOKENS: &[&str] = &[
    // gender words and typos
    "male", "female", "other", "fmale", "femal", "femails", "femail", "non-binary",
    "nonbinary", "nb", "woman", "women", "lady", "ladies", "man", "men", "guy", "guys",
    // command words
    "find", "show", "list", "get", "search", "display", "fetch", "user", "users", "people",
    "person", "name", "names",
    // sort words
    "newest", "oldest", "longest", "shortest", "alphabetical", "sorted", "recent", "latest",
    "first", "last", "order", "ends",
    // profile words
    "profile", "picture", "photo", "avatar", "pic", "with", "without",
    // placeholders
    "all", "null", "none", "",
];

/// Case-insensitive check against the reserved-token list.
pub fn is_reserved_name(candidate: &str) -> bool {
    let lower = candidate.trim().to_lowercase();
    RESERVED_NAME_TOKENS.contains(&lower.as_str())
}
