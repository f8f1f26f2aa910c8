//! Published-file resolver
//!
//! Turns one reference descriptor into tracked metadata: the record the
//! reference is currently bound to, the latest available record for the
//! same logical entity, and (on demand) the full version history.

use crate::rules::PathRules;
use crate::ResolveError;
use breakdown_hooks::TrackingSource;
use breakdown_model::{FilterPredicate, PublishedFile, ReferenceDescriptor};
use serde_json::json;
use std::cmp::Ordering;

/// Outcome of resolving one reference
///
/// All fields absent is the normal "untracked" outcome.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Record matching the version currently bound in the reference path
    pub sg_data: Option<PublishedFile>,
    /// Most recent record for the same logical entity, irrespective of
    /// which one is currently referenced
    pub latest: Option<PublishedFile>,
}

impl Resolution {
    /// Highest known version number, cached from `latest`
    #[inline]
    #[must_use]
    pub fn highest_version(&self) -> Option<i64> {
        self.latest.as_ref().map(|r| r.version)
    }
}

/// Resolver matching scene references against the tracking source
#[derive(Debug, Clone, Default)]
pub struct PublishedFileResolver {
    rules: PathRules,
    filters: Vec<FilterPredicate>,
}

impl PublishedFileResolver {
    /// Create a resolver with the given parsing rules
    #[inline]
    #[must_use]
    pub fn new(rules: PathRules) -> Self {
        Self {
            rules,
            filters: Vec::new(),
        }
    }

    /// With predicates appended to every query
    #[inline]
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<FilterPredicate>) -> Self {
        self.filters = filters;
        self
    }

    /// The parsing rules in use
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &PathRules {
        &self.rules
    }

    /// Resolve one reference against the tracking source
    ///
    /// # Errors
    /// [`ResolveError::UnparsablePath`] for malformed input;
    /// [`ResolveError::Source`] when the tracking source fails. An empty
    /// match set yields an empty [`Resolution`], not an error.
    pub async fn resolve(
        &self,
        source: &dyn TrackingSource,
        reference: &ReferenceDescriptor,
    ) -> Result<Resolution, ResolveError> {
        let parsed = self.rules.parse(&reference.path)?;
        let mut matches = source
            .find_published_files(&self.entity_filters(&parsed.entity_name, &parsed.entity_type))
            .await?;
        sort_newest_first(&mut matches);

        let latest = matches.first().cloned();
        let sg_data = parsed.version.and_then(|bound| {
            // newest-first order makes the first hit the tie-break winner
            matches.iter().find(|r| r.version == bound).cloned()
        });

        tracing::debug!(
            node = %reference.node_id,
            entity = %parsed.entity_name,
            bound = ?parsed.version,
            latest = ?latest.as_ref().map(|r| r.version),
            matches = matches.len(),
            "resolved reference"
        );

        Ok(Resolution { sg_data, latest })
    }

    /// Fetch the full version history for one reference, newest first
    ///
    /// # Errors
    /// Same failure modes as [`resolve`](Self::resolve).
    pub async fn fetch_history(
        &self,
        source: &dyn TrackingSource,
        reference: &ReferenceDescriptor,
    ) -> Result<Vec<PublishedFile>, ResolveError> {
        let parsed = self.rules.parse(&reference.path)?;
        let mut matches = source
            .find_published_files(&self.entity_filters(&parsed.entity_name, &parsed.entity_type))
            .await?;
        sort_newest_first(&mut matches);
        Ok(matches)
    }

    /// Entity filters plus the session-wide predicates
    fn entity_filters(&self, entity_name: &str, entity_type: &str) -> Vec<FilterPredicate> {
        let mut filters = vec![
            FilterPredicate::is("entity_name", json!(entity_name)),
            FilterPredicate::is("entity_type", json!(entity_type)),
        ];
        filters.extend(self.filters.iter().cloned());
        filters
    }
}

/// Recency ordering: version desc, then created_at desc, then id desc.
///
/// The id tail makes the order total even for records sharing version and
/// timestamp; tracking services allocate ids monotonically, so the
/// highest id approximates the most recently inserted record.
fn recency(a: &PublishedFile, b: &PublishedFile) -> Ordering {
    b.version
        .cmp(&a.version)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Sort records newest first (see [`recency`] for the exact order)
#[inline]
pub fn sort_newest_first(records: &mut [PublishedFile]) {
    records.sort_by(recency);
}

/// The latest record among `records` under the recency order
#[inline]
#[must_use]
pub fn latest_of(records: &[PublishedFile]) -> Option<&PublishedFile> {
    records.iter().min_by(|a, b| recency(a, b))
}
