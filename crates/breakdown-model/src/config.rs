//! Breakdown session configuration
//!
//! Plain configuration consumed by the manager: grouping fields
//! (pass-through for presentation layers), global query filters, and the
//! resolution worker bound.

use crate::filters::FilterPredicate;
use serde::{Deserialize, Serialize};

/// Configuration for one breakdown session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownConfig {
    /// Ordered field names used to bucket items for display.
    /// Pass-through only; the core never interprets these.
    pub group_by_fields: Vec<String>,
    /// Predicates appended to every tracking-source query
    /// (e.g. restrict to published-file types relevant to the engine)
    pub filters: Vec<FilterPredicate>,
    /// Upper bound on concurrent per-reference resolutions during a scan
    pub max_concurrent_resolves: usize,
}

impl BreakdownConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With grouping fields
    #[inline]
    #[must_use]
    pub fn with_group_by_fields(mut self, fields: Vec<String>) -> Self {
        self.group_by_fields = fields;
        self
    }

    /// With an additional global query filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: FilterPredicate) -> Self {
        self.filters.push(filter);
        self
    }

    /// With resolution worker bound
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_resolves(mut self, max: usize) -> Self {
        self.max_concurrent_resolves = max.max(1);
        self
    }
}

impl Default for BreakdownConfig {
    fn default() -> Self {
        Self {
            group_by_fields: vec!["entity_type".to_string()],
            filters: Vec::new(),
            max_concurrent_resolves: 8,
        }
    }
}
