//! Filter predicates for tracking-source queries
//!
//! Mirrors the `[field, operator, value]` filter triples of the tracking
//! service. The resolver builds entity filters from reference paths and
//! appends the session-configured predicates to every query.

use crate::published_file::PublishedFile;
use serde::{Deserialize, Serialize};

/// Comparison operator for a filter predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Field equals value
    Is,
    /// Field does not equal value
    IsNot,
    /// Field is one of the values in a list
    In,
    /// String field contains value as a substring
    Contains,
}

/// One filter predicate applied to a tracking-source query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    /// Record field name
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Comparison value
    pub value: serde_json::Value,
}

impl FilterPredicate {
    /// Create a predicate
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, op: FilterOp, value: serde_json::Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Equality predicate
    #[inline]
    #[must_use]
    pub fn is(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOp::Is, value)
    }

    /// Inequality predicate
    #[inline]
    #[must_use]
    pub fn is_not(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOp::IsNot, value)
    }

    /// Membership predicate; `value` should be a JSON array
    #[inline]
    #[must_use]
    pub fn one_of(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOp::In, value)
    }

    /// Evaluate the predicate against a record
    ///
    /// A predicate over a field the record does not carry never matches
    /// (except `IsNot`, which matches vacuously).
    #[must_use]
    pub fn matches(&self, record: &PublishedFile) -> bool {
        let actual = record.field(&self.field);
        match self.op {
            FilterOp::Is => actual.as_ref() == Some(&self.value),
            FilterOp::IsNot => actual.as_ref() != Some(&self.value),
            FilterOp::In => match (&actual, self.value.as_array()) {
                (Some(actual), Some(candidates)) => candidates.contains(actual),
                _ => false,
            },
            FilterOp::Contains => match (&actual, self.value.as_str()) {
                (Some(serde_json::Value::String(actual)), Some(needle)) => actual.contains(needle),
                _ => false,
            },
        }
    }
}

/// Evaluate a conjunction of predicates against a record
#[inline]
#[must_use]
pub fn matches_all(filters: &[FilterPredicate], record: &PublishedFile) -> bool {
    filters.iter().all(|f| f.matches(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record() -> PublishedFile {
        PublishedFile::new(1, "bunny_geo", "Alembic Cache", 2, Utc::now(), "/p/v002.abc")
            .with_field("step", json!("anim"))
    }

    #[test]
    fn is_matches_fixed_column() {
        let f = FilterPredicate::is("entity_name", json!("bunny_geo"));
        assert!(f.matches(&record()));
        assert!(!FilterPredicate::is("entity_name", json!("other")).matches(&record()));
    }

    #[test]
    fn is_not_matches_missing_field_vacuously() {
        let f = FilterPredicate::is_not("missing", json!("x"));
        assert!(f.matches(&record()));
    }

    #[test]
    fn in_requires_array_value() {
        assert!(FilterPredicate::one_of("version", json!([1, 2, 3])).matches(&record()));
        assert!(!FilterPredicate::one_of("version", json!([4, 5])).matches(&record()));
        assert!(!FilterPredicate::one_of("version", json!(2)).matches(&record()));
    }

    #[test]
    fn contains_on_string_fields() {
        let f = FilterPredicate::new("path", FilterOp::Contains, json!("v002"));
        assert!(f.matches(&record()));
        let f = FilterPredicate::new("version", FilterOp::Contains, json!("2"));
        assert!(!f.matches(&record()));
    }

    #[test]
    fn matches_all_is_conjunction() {
        let filters = vec![
            FilterPredicate::is("entity_type", json!("Alembic Cache")),
            FilterPredicate::is("step", json!("anim")),
        ];
        assert!(matches_all(&filters, &record()));

        let filters = vec![
            FilterPredicate::is("entity_type", json!("Alembic Cache")),
            FilterPredicate::is("step", json!("light")),
        ];
        assert!(!matches_all(&filters, &record()));
    }
}
