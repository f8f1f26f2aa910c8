//! File items
//!
//! A [`FileItem`] wraps one reference descriptor together with its
//! resolved published-file record and the latest record known for the
//! same logical entity. Staleness is derived, never stored:
//! `OutOfDate` holds iff both records are present and the latest version
//! is strictly greater than the referenced one.
//!
//! Version history is fetched lazily on first access and cached for the
//! lifetime of the item; [`refresh_history`](FileItem::refresh_history)
//! refetches and may flip the item's status.

use crate::status::{validate_transition, ItemStatus, TransitionError};
use breakdown_hooks::TrackingSource;
use breakdown_model::{NodeId, PublishedFile, ReferenceDescriptor};
use breakdown_resolve::{PublishedFileResolver, Resolution, ResolveError};

/// One scene reference with its tracked metadata
#[derive(Debug, Clone)]
pub struct FileItem {
    reference: ReferenceDescriptor,
    sg_data: Option<PublishedFile>,
    latest: Option<PublishedFile>,
    history: Option<Vec<PublishedFile>>,
    status: ItemStatus,
    last_error: Option<String>,
}

impl FileItem {
    /// Create an item from a resolver outcome
    #[must_use]
    pub fn from_resolution(reference: ReferenceDescriptor, resolution: Resolution) -> Self {
        let mut item = Self {
            reference,
            sg_data: resolution.sg_data,
            latest: resolution.latest,
            history: None,
            status: ItemStatus::UpToDate,
            last_error: None,
        };
        item.recompute_status();
        item
    }

    /// Create an item whose reference matched nothing in the tracking
    /// source (or whose path could not be parsed)
    ///
    /// Untracked items are reported but cannot be updated; they are not
    /// errors.
    #[inline]
    #[must_use]
    pub fn untracked(reference: ReferenceDescriptor) -> Self {
        Self::from_resolution(reference, Resolution::default())
    }

    /// The owned reference descriptor
    #[inline]
    #[must_use]
    pub fn reference(&self) -> &ReferenceDescriptor {
        &self.reference
    }

    /// The reference's node id
    #[inline]
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.reference.node_id
    }

    /// The record the reference is currently bound to, if tracked
    #[inline]
    #[must_use]
    pub fn sg_data(&self) -> Option<&PublishedFile> {
        self.sg_data.as_ref()
    }

    /// The most recent record for the same logical entity
    #[inline]
    #[must_use]
    pub fn latest(&self) -> Option<&PublishedFile> {
        self.latest.as_ref()
    }

    /// Highest known version number, cached from the latest record
    #[inline]
    #[must_use]
    pub fn highest_version(&self) -> Option<i64> {
        self.latest.as_ref().map(|r| r.version)
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Whether the reference resolved to a published-file record
    #[inline]
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.sg_data.is_some()
    }

    /// Human-readable cause of the last failed update, kept for per-row
    /// display and retry
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Staleness, as a pure function of the records
    ///
    /// True iff the item is tracked, a latest record is known, and the
    /// latest version is strictly greater than the referenced one.
    #[inline]
    #[must_use]
    pub fn is_out_of_date(&self) -> bool {
        match (&self.sg_data, &self.latest) {
            (Some(current), Some(latest)) => latest.version > current.version,
            _ => false,
        }
    }

    /// Transition to a new status, validating against the state machine
    ///
    /// # Errors
    /// [`TransitionError`] for transitions the state machine forbids
    /// (e.g. locking an already locked item).
    pub fn set_status(&mut self, new_status: ItemStatus) -> Result<(), TransitionError> {
        validate_transition(self.status, new_status)?;
        self.status = new_status;
        Ok(())
    }

    /// Recompute the derived status from the staleness invariant
    ///
    /// Only meaningful for settled items; a locked item keeps its lock.
    pub(crate) fn recompute_status(&mut self) {
        if self.status == ItemStatus::Locked {
            return;
        }
        self.status = if self.is_out_of_date() {
            ItemStatus::OutOfDate
        } else {
            ItemStatus::UpToDate
        };
    }

    /// Record a successful update: the applied record becomes the bound
    /// one and the status settles per the invariant
    pub(crate) fn apply_update(&mut self, applied: PublishedFile) {
        self.sg_data = Some(applied);
        self.last_error = None;
        self.status = ItemStatus::UpToDate;
        self.recompute_status();
    }

    /// Record a failed update: `sg_data` is preserved, the cause kept
    pub(crate) fn record_failure(&mut self, cause: impl Into<String>) {
        self.last_error = Some(cause.into());
        self.status = ItemStatus::Error;
    }

    /// Release a lock whose update never ran (batch cancellation),
    /// settling back to the derived status
    pub(crate) fn unlock(&mut self) {
        if self.status == ItemStatus::Locked {
            self.status = ItemStatus::UpToDate;
            self.recompute_status();
        }
    }

    /// Version history for this item's entity, newest first
    ///
    /// Fetched on first access, then served from the per-item cache until
    /// [`refresh_history`](Self::refresh_history) invalidates it.
    ///
    /// # Errors
    /// Propagates resolver failures; the cache stays empty then.
    pub async fn history(
        &mut self,
        source: &dyn TrackingSource,
        resolver: &PublishedFileResolver,
    ) -> Result<&[PublishedFile], ResolveError> {
        if self.history.is_none() {
            let fetched = resolver.fetch_history(source, &self.reference).await?;
            self.history = Some(fetched);
        }
        Ok(self.history.as_deref().unwrap_or_default())
    }

    /// Refetch history, replacing the cache
    ///
    /// Side effect: the latest record is recomputed from the fresh
    /// history, which may flip the item's status.
    ///
    /// # Errors
    /// Propagates resolver failures; the previous cache is kept then.
    pub async fn refresh_history(
        &mut self,
        source: &dyn TrackingSource,
        resolver: &PublishedFileResolver,
    ) -> Result<&[PublishedFile], ResolveError> {
        let fetched = resolver.fetch_history(source, &self.reference).await?;
        self.latest = fetched.first().cloned();
        self.history = Some(fetched);
        self.recompute_status();
        Ok(self.history.as_deref().unwrap_or_default())
    }

    /// Whether the history cache is populated
    #[inline]
    #[must_use]
    pub fn has_cached_history(&self) -> bool {
        self.history.is_some()
    }
}
