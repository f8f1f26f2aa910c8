//! Published-file records
//!
//! A [`PublishedFile`] is one versioned artifact record returned by the
//! tracking source. Records for the same logical entity share
//! `entity_name` and `entity_type` and differ by `version`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One published-file record from the tracking source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedFile {
    /// Record identifier in the tracking source
    pub id: i64,
    /// Logical entity name (e.g. the asset or cache name)
    pub entity_name: String,
    /// Logical entity type (e.g. "Alembic Cache", "Rendered Image")
    pub entity_type: String,
    /// Version number; higher is newer
    pub version: i64,
    /// Creation timestamp in the tracking source
    pub created_at: DateTime<Utc>,
    /// Path on disk (or URI) of the published file
    pub path: String,
    /// Additional fields the source returns; used for grouping
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl PublishedFile {
    /// Create a new record
    #[inline]
    #[must_use]
    pub fn new(
        id: i64,
        entity_name: impl Into<String>,
        entity_type: impl Into<String>,
        version: i64,
        created_at: DateTime<Utc>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            entity_name: entity_name.into(),
            entity_type: entity_type.into(),
            version,
            created_at,
            path: path.into(),
            fields: BTreeMap::new(),
        }
    }

    /// With an additional field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Whether two records refer to the same stored publish
    ///
    /// Identity is the record id plus the version it carries; used for
    /// idempotent update checks.
    #[inline]
    #[must_use]
    pub fn is_same_record(&self, other: &PublishedFile) -> bool {
        self.id == other.id && self.version == other.version
    }

    /// Whether both records describe the same logical entity
    #[inline]
    #[must_use]
    pub fn same_entity(&self, other: &PublishedFile) -> bool {
        self.entity_name == other.entity_name && self.entity_type == other.entity_type
    }

    /// Look up a field by name, covering both the fixed columns and the
    /// free-form field bag
    #[must_use]
    pub fn field(&self, name: &str) -> Option<serde_json::Value> {
        match name {
            "id" => Some(serde_json::json!(self.id)),
            "entity_name" => Some(serde_json::json!(self.entity_name)),
            "entity_type" => Some(serde_json::json!(self.entity_type)),
            "version" => Some(serde_json::json!(self.version)),
            "path" => Some(serde_json::json!(self.path)),
            "created_at" => Some(serde_json::json!(self.created_at.to_rfc3339())),
            other => self.fields.get(other).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64, version: i64) -> PublishedFile {
        PublishedFile::new(
            id,
            "bunny_geo",
            "Alembic Cache",
            version,
            Utc::now(),
            format!("/publish/bunny_geo_v{version:03}.abc"),
        )
    }

    #[test]
    fn same_record_is_id_and_version() {
        let a = record(1, 2);
        let mut b = record(1, 2);
        b.path = "/elsewhere.abc".into();
        assert!(a.is_same_record(&b));
        assert!(!a.is_same_record(&record(1, 3)));
        assert!(!a.is_same_record(&record(2, 2)));
    }

    #[test]
    fn field_lookup_covers_fixed_and_free_form() {
        let rec = record(7, 4).with_field("step", json!("anim"));
        assert_eq!(rec.field("version"), Some(json!(4)));
        assert_eq!(rec.field("entity_name"), Some(json!("bunny_geo")));
        assert_eq!(rec.field("step"), Some(json!("anim")));
        assert_eq!(rec.field("missing"), None);
    }
}
