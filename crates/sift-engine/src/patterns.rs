//! Exact-match table for the most common canonical queries.
//!
//! Checked before the heuristic parser. Keys are stored both as written and
//! in normalized form, so "Show me all the females!" hits "show all female".

use std::collections::HashMap;

use async_trait::async_trait;
use sift_protocol::{FilterSpec, Gender, ResolutionTier};

use crate::normalize::normalize;
use crate::tier::{QueryForms, QueryTier};

const FEMALE_QUERIES: &[&str] = &[
    "list all female",
    "show all female",
    "all female users",
    "female users",
    "show female",
    "all females",
    "list females",
];

const MALE_QUERIES: &[&str] = &[
    "list all male",
    "show all male",
    "all male users",
    "male users",
    "show male",
    "all males",
    "list males",
];

const OTHER_QUERIES: &[&str] = &["list all other", "show all other", "other users"];

const ALL_USERS_QUERIES: &[&str] = &["list all users", "show all users", "all users"];

/// Lookup table from canonical query text to its filter.
pub struct PatternTable {
    entries: HashMap<String, FilterSpec>,
}

impl PatternTable {
    pub fn new() -> Self {
        let groups: [(&[&str], FilterSpec); 4] = [
            (FEMALE_QUERIES, FilterSpec::with_gender(Gender::Female)),
            (MALE_QUERIES, FilterSpec::with_gender(Gender::Male)),
            (OTHER_QUERIES, FilterSpec::with_gender(Gender::Other)),
            (ALL_USERS_QUERIES, FilterSpec::default()),
        ];

        let mut entries = HashMap::new();
        for (queries, spec) in groups {
            for query in queries {
                entries.insert(query.to_string(), spec.clone());
                entries
                    .entry(normalize(query))
                    .or_insert_with(|| spec.clone());
            }
        }
        Self { entries }
    }

    /// Match the raw form (trimmed, lower-cased) first, then the normalized form.
    pub fn lookup(&self, query: &QueryForms<'_>) -> Option<&FilterSpec> {
        let raw = query.raw.trim().to_lowercase();
        self.entries
            .get(&raw)
            .or_else(|| self.entries.get(query.normalized))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryTier for PatternTable {
    async fn resolve(&self, query: &QueryForms<'_>) -> Option<FilterSpec> {
        self.lookup(query).cloned()
    }

    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(raw: &str) -> Option<FilterSpec> {
        let table = PatternTable::new();
        let normalized = normalize(raw);
        table.lookup(&QueryForms::new(raw, &normalized)).cloned()
    }

    #[test]
    fn raw_keys_match_case_insensitively() {
        assert_eq!(lookup("Female Users").unwrap().gender, Some(Gender::Female));
        assert_eq!(lookup("  list males ").unwrap().gender, Some(Gender::Male));
        assert_eq!(lookup("other users").unwrap().gender, Some(Gender::Other));
    }

    #[test]
    fn normalized_forms_match() {
        // "find me all the females" normalizes to "show all female"
        let spec = lookup("Find me all the females!").unwrap();
        assert_eq!(spec.gender, Some(Gender::Female));
    }

    #[test]
    fn all_users_is_empty_filter() {
        let spec = lookup("show all users").unwrap();
        assert!(spec.is_empty_filter());
        assert!(spec.query_understood);
    }

    #[test]
    fn unknown_query_misses() {
        assert!(lookup("female users named taylor").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn table_holds_normalized_keys() {
        let table = PatternTable::new();
        assert!(table.len() > 20);
        assert!(table.entries.contains_key("female user"));
    }

    #[tokio::test]
    async fn tier_reports_pattern() {
        let table = PatternTable::new();
        let forms = QueryForms::new("all males", "all male");
        assert!(table.resolve(&forms).await.is_some());
        assert_eq!(table.tier_name(), "pattern");
    }
}
