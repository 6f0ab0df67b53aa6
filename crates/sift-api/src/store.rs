//! In-memory record store with a small sample user table.
//!
//! Applies a `FilterSpec` the way a SQL backend would: gender equality,
//! case-insensitive `ILIKE` on the full name, parity of the space-stripped
//! name length, null/empty checks on the picture, one sort column, then
//! offset and limit.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sift_protocol::{
    FilterSpec, Gender, RecordStore, SearchPage, SortField, SortOrder, StoreError, UserRecord,
};

pub struct MemoryRecordStore {
    records: Vec<UserRecord>,
}

impl MemoryRecordStore {
    pub fn new(records: Vec<UserRecord>) -> Self {
        Self { records }
    }

    /// Store preloaded with sample users (development and tests).
    pub fn with_sample_data() -> Self {
        let rows: [(&str, &str, Gender, Option<&str>); 12] = [
            ("Taylor Swift", "tswift", Gender::Female, Some("/pics/1.png")),
            ("Adam Smith", "asmith", Gender::Male, None),
            ("Jordan Lee", "jlee", Gender::Other, Some("/pics/3.png")),
            ("Jane Doe", "janedoe", Gender::Female, Some("")),
            ("John O'Brien", "jobrien", Gender::Male, Some("/pics/5.png")),
            ("Mary-Jane Watson", "mjwatson", Gender::Female, None),
            ("Bob Stone", "bstone", Gender::Male, Some("/pics/7.png")),
            ("Alex Kim", "alexkim99", Gender::Other, None),
            ("Ann Taylor", "annt", Gender::Female, Some("/pics/9.png")),
            ("Sam Rivera", "samr", Gender::Male, None),
            ("Kate Bell", "kbell", Gender::Female, Some("/pics/11.png")),
            ("Zed Quinn", "zq", Gender::Male, Some("/pics/12.png")),
        ];

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, (name, username, gender, pic))| UserRecord {
                id: i as u64 + 1,
                full_name: name.to_string(),
                username: username.to_string(),
                gender,
                profile_pic: pic.map(String::from),
                created_at: DateTime::<Utc>::UNIX_EPOCH + Duration::days(19_800 + i as i64),
            })
            .collect();
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn matches(record: &UserRecord, filters: &FilterSpec) -> bool {
    if let Some(gender) = filters.gender
        && record.gender != gender
    {
        return false;
    }
    if let Some(needle) = &filters.name_substr {
        let name = record.full_name.to_lowercase();
        let needle = needle.to_lowercase();
        let hit = if filters.starts_with_mode {
            name.starts_with(&needle)
        } else {
            name.contains(&needle)
        };
        if !hit {
            return false;
        }
    }
    if let Some(parity) = filters.name_length_parity
        && record.name_length() % 2 != parity.remainder()
    {
        return false;
    }
    if let Some(wanted) = filters.has_profile_pic
        && record.has_profile_pic() != wanted
    {
        return false;
    }
    true
}

fn compare(a: &UserRecord, b: &UserRecord, field: SortField) -> Ordering {
    match field {
        SortField::NameLength => a.name_length().cmp(&b.name_length()),
        SortField::UsernameLength => a.username.chars().count().cmp(&b.username.chars().count()),
        SortField::Name => a.full_name.cmp(&b.full_name),
        SortField::Username => a.username.cmp(&b.username),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn query(
        &self,
        filters: &FilterSpec,
        limit: usize,
        skip: usize,
    ) -> Result<SearchPage, StoreError> {
        let mut hits: Vec<&UserRecord> =
            self.records.iter().filter(|r| matches(r, filters)).collect();

        if let Some(field) = filters.sort_by {
            hits.sort_by(|a, b| match filters.sort_order {
                SortOrder::Asc => compare(a, b, field),
                SortOrder::Desc => compare(b, a, field),
            });
        }

        let total_count = hits.len();
        let results = hits.into_iter().skip(skip).take(limit).cloned().collect();
        tracing::debug!(total_count, skip, limit, "memory store query");
        Ok(SearchPage {
            results,
            total_count,
        })
    }
}
