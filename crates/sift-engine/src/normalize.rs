//! Query normalizer.
//!
//! Canonicalizes free text so that trivially different phrasings share one
//! cache key and so the keyword detectors see a small, predictable
//! vocabulary. Each pass runs the same ordered steps:
//!
//! 1. lowercase, trim, collapse whitespace, keep only the first line
//! 2. expand abbreviations and contractions (`w/o`, `pic`, `don't`)
//! 3. replace sort and gender synonyms with canonical terms
//! 4. rewrite a leading command verb to `show`
//! 5. fold plurals and phrase variants (`users` -> `user`, `called` -> `named`)
//! 6. drop filler words, keeping one-letter words that carry a search letter
//!
//! Passes repeat until the text stops changing, so `normalize` is idempotent.
//! After the first pass every rewrite either shortens the text or turns a
//! token into a canonical one that no rule matches again, so the loop ends.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

struct Rewrite {
    pattern: Regex,
    replacement: &'static str,
}

impl Rewrite {
    /// Whole-word (or whole-phrase) replacement.
    fn word(from: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(&format!(r"\b{}\b", regex::escape(from))).unwrap(),
            replacement,
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, NoExpand(self.replacement))
            .into_owned()
    }
}

fn apply_all(rules: &[Rewrite], text: &str) -> String {
    let mut out = text.to_string();
    for rule in rules {
        out = rule.apply(&out);
    }
    collapse_whitespace(&out)
}

static ABBREVIATIONS: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        Rewrite::word("w/out", "without"),
        Rewrite::word("w/o", "without"),
        // `w/` is followed by a space or a word, so no trailing boundary
        Rewrite {
            pattern: Regex::new(r"\bw/\s*").unwrap(),
            replacement: "with ",
        },
        Rewrite::word("pfp", "profile picture"),
        Rewrite::word("pics", "pictures"),
        Rewrite::word("pic", "picture"),
        Rewrite::word("imgs", "images"),
        Rewrite::word("img", "image"),
        Rewrite::word("don't", "do not"),
        Rewrite::word("doesn't", "does not"),
        Rewrite::word("didn't", "did not"),
        Rewrite::word("haven't", "have not"),
        Rewrite::word("hasn't", "has not"),
        Rewrite::word("isn't", "is not"),
        Rewrite::word("aren't", "are not"),
        Rewrite::word("can't", "cannot"),
        Rewrite::word("won't", "will not"),
    ]
});

// Longer gender forms come first; whole-word matching keeps "women" from
// being rewritten by the "men" rule.
static SYNONYMS: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        Rewrite::word("alphabetically", "alphabetical"),
        Rewrite::word("lengthiest", "longest"),
        Rewrite::word("briefest", "shortest"),
        Rewrite::word("gentlemen", "male"),
        Rewrite::word("gentleman", "male"),
        Rewrite::word("ladies", "female"),
        Rewrite::word("lady", "female"),
        Rewrite::word("women", "female"),
        Rewrite::word("woman", "female"),
        Rewrite::word("girls", "female"),
        Rewrite::word("girl", "female"),
        Rewrite::word("boys", "male"),
        Rewrite::word("boy", "male"),
        Rewrite::word("guys", "male"),
        Rewrite::word("guy", "male"),
        Rewrite::word("men", "male"),
        Rewrite::word("man", "male"),
        Rewrite::word("non binary", "non-binary"),
        Rewrite::word("nonbinary", "non-binary"),
        Rewrite::word("enby", "non-binary"),
    ]
});

/// Leading verbs rewritten to `show`, longest first.
const COMMAND_PREFIXES: &[&str] = &[
    "show me",
    "find me",
    "get me",
    "list me",
    "give me",
    "search for",
    "look for",
    "look up",
    "pull up",
    "display",
    "search",
    "fetch",
    "show",
    "find",
    "list",
    "give",
    "get",
];

static CONSOLIDATIONS: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        Rewrite::word("with the name", "named"),
        Rewrite::word("called", "named"),
        Rewrite::word("all the", "all"),
        Rewrite::word("in the", "in"),
        Rewrite::word("females", "female"),
        Rewrite::word("males", "male"),
        Rewrite::word("users", "user"),
        Rewrite::word("people", "user"),
        Rewrite::word("persons", "user"),
        Rewrite::word("person", "user"),
    ]
});

static FILLER_PHRASES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    ["could you", "can you", "would you", "will you", "please", "kindly"]
        .into_iter()
        .map(|p| Rewrite::word(p, ""))
        .collect()
});

const FILLER_WORDS: &[&str] = &["the", "a", "an", "my"];

/// Words after which a one-letter word is a search letter, not an article.
const LETTER_INTRODUCERS: &[&str] = &[
    "with",
    "letter",
    "containing",
    "initial",
    "start",
    "starts",
    "starting",
    "begin",
    "begins",
    "beginning",
    "to",
];

/// Canonicalize a query. Pure, deterministic and idempotent.
pub fn normalize(query: &str) -> String {
    let mut current = normalize_pass(query);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    tracing::trace!(query, normalized = %current, "normalized query");
    current
}

fn normalize_pass(text: &str) -> String {
    let text = canonical_case(text);
    let text = apply_all(&ABBREVIATIONS, &text);
    let text = apply_all(&SYNONYMS, &text);
    let text = rewrite_command_prefix(&text);
    let text = apply_all(&CONSOLIDATIONS, &text);
    strip_fillers(&text)
}

fn canonical_case(text: &str) -> String {
    let first_line = text.split(['\n', '\r']).next().unwrap_or_default();
    let lowered = first_line.replace('\u{2019}', "'").to_lowercase();
    let collapsed = collapse_whitespace(&lowered);
    collapsed
        .trim_end_matches(['?', '!', '.'])
        .trim_end()
        .to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn rewrite_command_prefix(text: &str) -> String {
    for prefix in COMMAND_PREFIXES {
        if text == *prefix {
            return "show".to_string();
        }
        if let Some(rest) = text.strip_prefix(prefix)
            && let Some(rest) = rest.strip_prefix(' ')
        {
            return format!("show {rest}");
        }
    }
    text.to_string()
}

/// Remove filler phrases until none is left; removing one can join the
/// halves of another ("could could you you").
fn strip_filler_phrases(text: &str) -> String {
    let mut current = apply_all(&FILLER_PHRASES, text);
    loop {
        let next = apply_all(&FILLER_PHRASES, &current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_fillers(text: &str) -> String {
    let text = strip_filler_phrases(text);
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(words.len());

    for (i, &word) in words.iter().enumerate() {
        if FILLER_WORDS.contains(&word) {
            if word.len() == 1 && keeps_letter(kept.last().copied(), words.get(i + 1).copied()) {
                kept.push(word);
            }
            continue;
        }
        kept.push(word);
    }

    kept.join(" ")
}

/// A one-letter filler survives at the end of the query, after a
/// letter-introducing word, or inside "a to z" / "a names".
fn keeps_letter(prev: Option<&str>, next: Option<&str>) -> bool {
    match next {
        None => true,
        Some("names" | "to") => true,
        Some(_) => prev.is_some_and(|p| LETTER_INTRODUCERS.contains(&p)),
    }
}
