use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured filter extracted from a natural-language user search.
///
/// Unset fields serialize as `null`. Missing fields deserialize to their
/// defaults so older snapshot entries keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Gender to match exactly.
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Substring (or prefix, see `starts_with_mode`) of the display name.
    #[serde(default)]
    pub name_substr: Option<String>,
    /// Anchor `name_substr` at the start of the name.
    #[serde(default)]
    pub starts_with_mode: bool,
    /// Odd/even number of letters in the name (spaces excluded).
    #[serde(default)]
    pub name_length_parity: Option<NameParity>,
    /// `Some(true)` = has a picture, `Some(false)` = has none, `None` = don't filter.
    #[serde(default)]
    pub has_profile_pic: Option<bool>,
    /// Column to sort by.
    #[serde(default)]
    pub sort_by: Option<SortField>,
    /// Sort direction (defaults to descending).
    #[serde(default)]
    pub sort_order: SortOrder,
    /// False only when nothing meaningful was derived and warnings exist.
    #[serde(default = "default_query_understood")]
    pub query_understood: bool,
    /// Human-readable notes about unsupported or reinterpreted parts of the query.
    #[serde(default)]
    pub parse_warnings: Vec<String>,
}

fn default_query_understood() -> bool {
    true
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            gender: None,
            name_substr: None,
            starts_with_mode: false,
            name_length_parity: None,
            has_profile_pic: None,
            sort_by: None,
            sort_order: SortOrder::default(),
            query_understood: default_query_understood(),
            parse_warnings: Vec::new(),
        }
    }
}

impl FilterSpec {
    /// Filter matching a single gender, everything else unset.
    pub fn with_gender(gender: Gender) -> Self {
        Self {
            gender: Some(gender),
            ..Self::default()
        }
    }

    /// Result for a query that produced only warnings.
    pub fn not_understood(warnings: Vec<String>) -> Self {
        Self {
            query_understood: false,
            parse_warnings: warnings,
            ..Self::default()
        }
    }

    /// True when no filter dimension and no sort is set.
    pub fn is_empty_filter(&self) -> bool {
        self.gender.is_none()
            && self.name_substr.is_none()
            && self.name_length_parity.is_none()
            && self.has_profile_pic.is_none()
            && self.sort_by.is_none()
    }

    /// Human-readable description of the filters that will be applied.
    ///
    /// Returns `None` when nothing is applied.
    pub fn applied_filters(&self) -> Option<BTreeMap<&'static str, String>> {
        let mut applied = BTreeMap::new();

        if let Some(gender) = self.gender {
            applied.insert("gender", gender.to_string());
        }
        if let Some(name) = &self.name_substr {
            let key = if self.starts_with_mode {
                "name_starts_with"
            } else {
                "name_contains"
            };
            applied.insert(key, name.clone());
        }
        if let Some(parity) = self.name_length_parity {
            applied.insert("name_length", format!("{parity} number of letters"));
        }
        match self.has_profile_pic {
            Some(true) => {
                applied.insert("profile_picture", "has profile picture".into());
            }
            Some(false) => {
                applied.insert("profile_picture", "no profile picture".into());
            }
            None => {}
        }
        if let Some(field) = self.sort_by {
            applied.insert("sorted_by", sort_label(field, self.sort_order));
        }

        (!applied.is_empty()).then_some(applied)
    }
}

fn sort_label(field: SortField, order: SortOrder) -> String {
    let order_label = match (field, order) {
        (SortField::Name | SortField::Username, SortOrder::Desc) => "Z-A",
        (SortField::Name | SortField::Username, SortOrder::Asc) => "A-Z",
        (SortField::CreatedAt, SortOrder::Desc) => "newest first",
        (SortField::CreatedAt, SortOrder::Asc) => "oldest first",
        (_, SortOrder::Desc) => "longest first",
        (_, SortOrder::Asc) => "shortest first",
    };
    format!("{} ({order_label})", field.label())
}

/// Error returned when a string is not one of an enum's closed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Gender stored on a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownValue;

    /// Exact, case-sensitive match on `Male` / `Female` / `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownValue::new("gender", s))
    }
}

/// Parity of the number of letters in a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameParity {
    Odd,
    Even,
}

impl NameParity {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameParity::Odd => "odd",
            NameParity::Even => "even",
        }
    }

    /// Remainder of `len % 2` that satisfies this parity.
    pub fn remainder(&self) -> usize {
        match self {
            NameParity::Odd => 1,
            NameParity::Even => 0,
        }
    }
}

impl fmt::Display for NameParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NameParity {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "odd" => Ok(NameParity::Odd),
            "even" => Ok(NameParity::Even),
            other => Err(UnknownValue::new("name_length_parity", other)),
        }
    }
}

/// Column a result page can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    NameLength,
    UsernameLength,
    Name,
    Username,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::NameLength,
        SortField::UsernameLength,
        SortField::Name,
        SortField::Username,
        SortField::CreatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::NameLength => "name_length",
            SortField::UsernameLength => "username_length",
            SortField::Name => "name",
            SortField::Username => "username",
            SortField::CreatedAt => "created_at",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SortField::NameLength => "name length",
            SortField::UsernameLength => "username length",
            SortField::Name => "name",
            SortField::Username => "username",
            SortField::CreatedAt => "creation date",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownValue::new("sort_by", s))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(UnknownValue::new("sort_order", other)),
        }
    }
}
