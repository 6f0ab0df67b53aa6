//! Heuristic parser: combines the keyword detectors into a `FilterSpec`.
//!
//! Handles the common queries at zero cost. Returns `None` ("needs AI") when
//! nothing was detected and the query looks too complex for keyword rules.

use async_trait::async_trait;
use sift_protocol::{FilterSpec, ResolutionTier, SortOrder};

use crate::detectors::{
    NameContext, NameMatch, QueryText, detect_bare_name, detect_gender, detect_name,
    detect_parity, detect_profile_pic, detect_sort, is_complex, unsupported_warnings,
};
use crate::tier::{QueryForms, QueryTier};
use crate::vocab::is_reserved_name;

/// Deterministic keyword parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicParser;

impl HeuristicParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one form of a query. `None` means the query should escalate.
    pub fn parse(&self, query: &str) -> Option<FilterSpec> {
        let original = query.trim();
        let lower = original.to_lowercase();
        let q = QueryText::new(&lower);

        let mut warnings = unsupported_warnings(&q);
        let sort = detect_sort(&q);
        let has_profile_pic = detect_profile_pic(&q);
        let parity = detect_parity(&q);

        let gender_match = detect_gender(&q);
        if let Some(warning) = gender_match.and_then(|m| m.warning) {
            warnings.push(warning.to_string());
        }
        let gender = gender_match.map(|m| m.gender);

        let ctx = NameContext {
            gender,
            has_profile_pic,
        };
        let mut name = detect_name(&q, &ctx).filter(not_reserved);

        let no_filters =
            gender.is_none() && name.is_none() && parity.is_none() && has_profile_pic.is_none();
        if no_filters {
            name = detect_bare_name(&q, original)
                .map(|value| NameMatch {
                    value,
                    starts_with: false,
                })
                .filter(not_reserved);
        }

        for warning in &warnings {
            tracing::warn!(query = original, warning = %warning, "unsupported query pattern");
        }

        if no_filters && name.is_none() && is_complex(&q) {
            tracing::debug!(query = original, "complex query, escalating");
            return None;
        }

        if !no_filters || name.is_some() || sort.is_some() {
            let (name_substr, starts_with_mode) = match name {
                Some(m) => (Some(m.value), m.starts_with),
                None => (None, false),
            };
            return Some(FilterSpec {
                gender,
                name_substr,
                starts_with_mode,
                name_length_parity: parity,
                has_profile_pic,
                sort_by: sort.map(|s| s.field),
                sort_order: sort.map(|s| s.order).unwrap_or(SortOrder::Desc),
                query_understood: true,
                parse_warnings: warnings,
            });
        }

        if !warnings.is_empty() {
            return Some(FilterSpec::not_understood(warnings));
        }

        None
    }
}

fn not_reserved(m: &NameMatch) -> bool {
    if is_reserved_name(&m.value) {
        tracing::debug!(name = %m.value, "discarding reserved word as name");
        return false;
    }
    true
}

/// Heuristic tier: the normalized form first, then the raw form when
/// normalization changed the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTier {
    parser: HeuristicParser,
}

impl HeuristicTier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryTier for HeuristicTier {
    async fn resolve(&self, query: &QueryForms<'_>) -> Option<FilterSpec> {
        if let Some(spec) = self.parser.parse(query.normalized) {
            return Some(spec);
        }
        if query.normalization_changed() {
            tracing::debug!(query = query.raw, "normalized form unresolved, trying raw form");
            return self.parser.parse(query.raw);
        }
        None
    }

    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Heuristic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use sift_protocol::{Gender, NameParity, SortField};

    fn parse(query: &str) -> Option<FilterSpec> {
        HeuristicParser::new().parse(&normalize(query))
    }

    // ── Gender ───────────────────────────────────────────────────

    #[test]
    fn gender_precedence() {
        assert_eq!(parse("female users").unwrap().gender, Some(Gender::Female));
        assert_eq!(parse("male users").unwrap().gender, Some(Gender::Male));
        assert_eq!(parse("other gender users").unwrap().gender, Some(Gender::Other));
    }

    #[test]
    fn named_mary_has_no_gender() {
        let spec = parse("named Mary").unwrap();
        assert_eq!(spec.gender, None);
        assert_eq!(spec.name_substr.as_deref(), Some("Mary"));
    }

    #[test]
    fn gender_or_warns_but_resolves() {
        let spec = parse("male or female users").unwrap();
        assert_eq!(spec.gender, Some(Gender::Female));
        assert!(spec.query_understood);
        assert_eq!(spec.parse_warnings.len(), 1);
        assert!(spec.parse_warnings[0].starts_with("OR logic"));
    }

    #[test]
    fn typo_warning_is_collected() {
        let spec = parse("fmale users").unwrap();
        assert_eq!(spec.gender, Some(Gender::Female));
        assert!(spec.name_substr.is_none());
        assert!(spec.parse_warnings[0].contains("typo"));
    }

    // ── Names ────────────────────────────────────────────────────

    #[test]
    fn starts_with_letter() {
        let spec = parse("users starting with J").unwrap();
        assert_eq!(spec.name_substr.as_deref(), Some("J"));
        assert!(spec.starts_with_mode);
        assert_eq!(spec.gender, None);
    }

    #[test]
    fn bare_name() {
        let spec = parse("Adam").unwrap();
        assert_eq!(spec.name_substr.as_deref(), Some("Adam"));
        assert!(!spec.starts_with_mode);
    }

    #[test]
    fn bare_initial_is_contains() {
        let spec = parse("j").unwrap();
        assert_eq!(spec.name_substr.as_deref(), Some("J"));
        assert!(!spec.starts_with_mode);
    }

    #[test]
    fn find_adam_escalates() {
        assert!(parse("find Adam").is_none());
    }

    #[test]
    fn reserved_name_is_discarded() {
        // "X users" would take "alphabetical" as a name
        let spec = parse("alphabetical users").unwrap();
        assert!(spec.name_substr.is_none());
        assert_eq!(spec.sort_by, Some(SortField::Name));
    }

    #[test]
    fn female_named() {
        let spec = parse("show me female users called taylor").unwrap();
        assert_eq!(spec.gender, Some(Gender::Female));
        assert_eq!(spec.name_substr.as_deref(), Some("Taylor"));
    }

    // ── Sort, picture, parity ────────────────────────────────────

    #[test]
    fn sorts() {
        let spec = parse("longest username").unwrap();
        assert_eq!(spec.sort_by, Some(SortField::UsernameLength));
        assert_eq!(spec.sort_order, SortOrder::Desc);

        let spec = parse("shortest name").unwrap();
        assert_eq!(spec.sort_by, Some(SortField::NameLength));
        assert_eq!(spec.sort_order, SortOrder::Asc);
        assert!(spec.name_substr.is_none());
    }

    #[test]
    fn profile_picture() {
        assert_eq!(
            parse("users without profile picture").unwrap().has_profile_pic,
            Some(false)
        );
        assert_eq!(
            parse("users with profile picture").unwrap().has_profile_pic,
            Some(true)
        );
        let spec = parse("users who don't have a picture").unwrap();
        assert_eq!(spec.has_profile_pic, Some(false));
        assert!(spec.parse_warnings.is_empty());
    }

    #[test]
    fn parity_with_gender() {
        let spec = parse("female users with odd number of letters").unwrap();
        assert_eq!(spec.gender, Some(Gender::Female));
        assert_eq!(spec.name_length_parity, Some(NameParity::Odd));
        assert!(spec.name_substr.is_none());
    }

    // ── Escalation and warnings-only ─────────────────────────────

    #[test]
    fn complex_query_escalates() {
        assert!(parse("users whose name rhymes with bob").is_none());
    }

    #[test]
    fn warnings_only_is_not_understood() {
        let spec = parse("names that end with n").unwrap();
        assert!(!spec.query_understood);
        assert!(spec.is_empty_filter());
        assert_eq!(spec.parse_warnings.len(), 1);
    }

    #[test]
    fn nothing_detected_escalates() {
        assert!(parse("show everything interesting").is_none());
    }

    #[test]
    fn deterministic() {
        for query in ["female users named taylor", "longest username", "Adam"] {
            assert_eq!(parse(query), parse(query));
        }
    }

    // ── Tier ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn tier_falls_back_to_raw_form() {
        let tier = HeuristicTier::new();
        // normalized "show adam" misses; the raw form misses too
        let normalized = normalize("Find Adam");
        let forms = QueryForms::new("Find Adam", &normalized);
        assert!(forms.normalization_changed());
        assert!(tier.resolve(&forms).await.is_none());

        let normalized = normalize("Female users");
        let forms = QueryForms::new("Female users", &normalized);
        let spec = tier.resolve(&forms).await.unwrap();
        assert_eq!(spec.gender, Some(Gender::Female));
        assert_eq!(tier.tier(), ResolutionTier::Heuristic);
        assert_eq!(tier.tier_name(), "heuristic");
    }
}
