//! Breakdown manager
//!
//! The central coordinator for one open scene/session. It owns the items
//! map (insertion order = scan order) and is the only context that
//! mutates it: per-item resolution and adapter calls run as independent
//! futures whose results are handed back here (single-writer rule).
//!
//! One instance per session, explicitly constructed and explicitly owned
//! by the caller; no implicit singleton.

use crate::dispatch::{self, CancelFlag};
use crate::error::{BreakdownError, ScanError, UpdateError};
use crate::file_item::FileItem;
use crate::status::ItemStatus;
use breakdown_hooks::{SceneAdapter, TrackingSource};
use breakdown_model::{
    BreakdownConfig, NodeId, PublishedFile, ReferenceDescriptor, ScanId, ScanScope,
};
use breakdown_resolve::{PathRules, PublishedFileResolver};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-item result of a batch update, keyed by node id so callers can map
/// failures back to specific items
#[derive(Debug)]
pub struct UpdateOutcome {
    /// The item the outcome belongs to
    pub node_id: NodeId,
    /// The item's individual result
    pub result: Result<(), UpdateError>,
}

impl UpdateOutcome {
    /// Whether this item's update succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Preparation outcome for one batch entry (coordinating-context phase)
enum Prep {
    /// Settled without touching the adapter
    Immediate(Result<(), UpdateError>),
    /// Item locked, adapter call pending with this target
    Locked(PublishedFile),
}

/// The breakdown coordinator for one open scene
pub struct BreakdownManager {
    adapter: Arc<dyn SceneAdapter>,
    source: Arc<dyn TrackingSource>,
    resolver: PublishedFileResolver,
    config: BreakdownConfig,
    items: IndexMap<NodeId, FileItem>,
    /// Serializes scene mutations for non-reentrant adapters
    scene_mutex: Mutex<()>,
    /// Advisory flag set by scene-change notifications, cleared by `scan`
    dirty: Arc<AtomicBool>,
}

impl BreakdownManager {
    /// Create a manager for one session
    #[must_use]
    pub fn new(
        adapter: Arc<dyn SceneAdapter>,
        source: Arc<dyn TrackingSource>,
        config: BreakdownConfig,
    ) -> Self {
        let resolver =
            PublishedFileResolver::new(PathRules::new()).with_filters(config.filters.clone());
        Self {
            adapter,
            source,
            resolver,
            config,
            items: IndexMap::new(),
            scene_mutex: Mutex::new(()),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// With engine-specific path parsing rules
    #[must_use]
    pub fn with_path_rules(mut self, rules: PathRules) -> Self {
        self.resolver =
            PublishedFileResolver::new(rules).with_filters(self.config.filters.clone());
        self
    }

    /// Ordered grouping fields for display; pass-through, no business logic
    #[inline]
    #[must_use]
    pub fn group_by_fields(&self) -> &[String] {
        &self.config.group_by_fields
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BreakdownConfig {
        &self.config
    }

    /// Items in scan order
    pub fn items(&self) -> impl Iterator<Item = &FileItem> {
        self.items.values()
    }

    /// The item for one node, if present in the current scan
    #[inline]
    #[must_use]
    pub fn item(&self, node_id: &NodeId) -> Option<&FileItem> {
        self.items.get(node_id)
    }

    /// Number of items from the last scan
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no scan has populated the session yet (or it scanned empty)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items with a newer published version available, in scan order
    pub fn out_of_date(&self) -> impl Iterator<Item = &FileItem> {
        self.items
            .values()
            .filter(|item| item.status() == ItemStatus::OutOfDate)
    }

    /// Scan the scene and rebuild the items map
    ///
    /// Not incremental: any prior items are discarded entirely once
    /// enumeration has succeeded, then the map is repopulated in scene
    /// order. Per-reference resolution runs concurrently, bounded by the
    /// configured worker limit; resolution failures record the item as
    /// untracked and continue.
    ///
    /// # Errors
    /// [`ScanError::Adapter`] when the scene adapter cannot enumerate
    /// (prior items stay intact); [`ScanError::Cancelled`] when the flag
    /// fires between per-item units (the map is left empty).
    pub async fn scan(
        &mut self,
        scope: ScanScope,
        cancel: &CancelFlag,
    ) -> Result<Vec<&FileItem>, ScanError> {
        let scan_id = ScanId::new();
        tracing::info!(%scan_id, ?scope, "scanning scene references");

        let raw_refs = self.adapter.enumerate_references(scope).await?;

        // A rescan fully replaces prior state
        self.items.clear();
        self.dirty.store(false, Ordering::Relaxed);
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut seen = HashSet::new();
        let mut descriptors = Vec::with_capacity(raw_refs.len());
        for raw in raw_refs {
            if !seen.insert(raw.node_id.clone()) {
                tracing::warn!(node = %raw.node_id, "duplicate node id in enumeration, keeping first");
                continue;
            }
            let mut descriptor =
                ReferenceDescriptor::new(raw.node_id, raw.node_type, raw.path);
            descriptor.extra_data = raw.extra_data;
            descriptors.push(descriptor);
        }

        let resolver = &self.resolver;
        let source = self.source.as_ref();
        let tasks: Vec<_> = descriptors
            .iter()
            .map(|descriptor| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    Some(resolver.resolve(source, descriptor).await)
                }
            })
            .collect();
        let results = dispatch::run_bounded(self.config.max_concurrent_resolves, tasks).await;

        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut unresolved = 0usize;
        for (descriptor, outcome) in descriptors.into_iter().zip(results) {
            let item = match outcome {
                Some(Ok(resolution)) => FileItem::from_resolution(descriptor, resolution),
                Some(Err(err)) => {
                    tracing::warn!(node = %descriptor.node_id, %err, "reference did not resolve, recording as untracked");
                    unresolved += 1;
                    FileItem::untracked(descriptor)
                }
                // skipped units only occur under cancellation, handled above
                None => FileItem::untracked(descriptor),
            };
            self.items.insert(item.node_id().clone(), item);
        }

        tracing::info!(
            %scan_id,
            total = self.items.len(),
            unresolved,
            out_of_date = self.out_of_date().count(),
            "scan complete"
        );
        Ok(self.items.values().collect())
    }

    /// Update one item to point at `target` (or its own latest record)
    ///
    /// Idempotent: a target identical to the currently bound record
    /// returns success immediately without invoking the adapter.
    ///
    /// # Errors
    /// [`UpdateError`] scoped to this item; on adapter failure the item
    /// settles in `Error` status with `sg_data` preserved and the cause
    /// kept for retry.
    pub async fn update_item(
        &mut self,
        node_id: &NodeId,
        target: Option<&PublishedFile>,
    ) -> Result<(), UpdateError> {
        let target = match self.prepare_update(node_id, target)? {
            None => return Ok(()), // already bound, no-op
            Some(target) => target,
        };

        let result = self.apply_with_scene_lock(node_id, &target).await;
        self.settle_update(node_id, target, result)
    }

    /// Batch update; each item's outcome is independent
    ///
    /// For items without an explicit `target`, the item's own latest
    /// record is used. The batch never aborts early and never rolls back:
    /// one bad reference must never block others from updating.
    /// Cancellation is honored between items; already-applied updates
    /// remain applied and items not yet attempted produce no outcome.
    pub async fn update_items(
        &mut self,
        node_ids: &[NodeId],
        target: Option<&PublishedFile>,
        cancel: &CancelFlag,
    ) -> Vec<UpdateOutcome> {
        tracing::info!(count = node_ids.len(), "batch update starting");
        let outcomes = if self.adapter.is_reentrant() {
            self.update_items_concurrent(node_ids, target, cancel).await
        } else {
            self.update_items_serial(node_ids, target, cancel).await
        };
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        tracing::info!(
            attempted = outcomes.len(),
            failed,
            "batch update finished"
        );
        outcomes
    }

    /// Version history for one item, newest first (lazily fetched, cached)
    ///
    /// # Errors
    /// [`BreakdownError::ItemNotFound`] for unknown nodes; resolver
    /// failures otherwise.
    pub async fn item_history(
        &mut self,
        node_id: &NodeId,
    ) -> Result<Vec<PublishedFile>, BreakdownError> {
        let resolver = self.resolver.clone();
        let source = Arc::clone(&self.source);
        let item = self
            .items
            .get_mut(node_id)
            .ok_or_else(|| BreakdownError::ItemNotFound(node_id.clone()))?;
        let history = item.history(source.as_ref(), &resolver).await?;
        Ok(history.to_vec())
    }

    /// Refetch one item's history and latest record; may flip its status
    ///
    /// # Errors
    /// Same failure modes as [`item_history`](Self::item_history).
    pub async fn refresh_item(&mut self, node_id: &NodeId) -> Result<ItemStatus, BreakdownError> {
        let resolver = self.resolver.clone();
        let source = Arc::clone(&self.source);
        let item = self
            .items
            .get_mut(node_id)
            .ok_or_else(|| BreakdownError::ItemNotFound(node_id.clone()))?;
        item.refresh_history(source.as_ref(), &resolver).await?;
        Ok(item.status())
    }

    /// Start forwarding the adapter's scene-change notifications into the
    /// session's advisory dirty flag
    ///
    /// Returns false when the engine has no notification mechanism. The
    /// core never rescans implicitly; callers poll
    /// [`is_scene_dirty`](Self::is_scene_dirty).
    pub fn attach_change_listener(&self) -> bool {
        let Some(mut rx) = self.adapter.watch_scene_changes() else {
            return false;
        };
        let dirty = Arc::clone(&self.dirty);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::debug!(?event, "scene change observed");
                dirty.store(true, Ordering::Relaxed);
            }
        });
        true
    }

    /// Whether the scene changed since the last scan (advisory)
    #[inline]
    #[must_use]
    pub fn is_scene_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    /// Coordinating-context phase of one update: structural checks,
    /// idempotency, effective target selection, and locking.
    ///
    /// `Ok(None)` means the target is already bound (no-op success).
    fn prepare_update(
        &mut self,
        node_id: &NodeId,
        target: Option<&PublishedFile>,
    ) -> Result<Option<PublishedFile>, UpdateError> {
        let item = self
            .items
            .get_mut(node_id)
            .ok_or_else(|| UpdateError::ItemNotFound(node_id.clone()))?;
        if !item.is_tracked() {
            return Err(UpdateError::Untracked(node_id.clone()));
        }
        let target = match target {
            Some(target) => target.clone(),
            None => item
                .latest()
                .cloned()
                .ok_or_else(|| UpdateError::NoTarget(node_id.clone()))?,
        };
        if item
            .sg_data()
            .map(|current| current.is_same_record(&target))
            .unwrap_or(false)
        {
            tracing::debug!(node = %node_id, version = target.version, "target already bound, no-op");
            return Ok(None);
        }
        item.set_status(ItemStatus::Locked)?;
        Ok(Some(target))
    }

    /// Adapter call for one item, serialized for non-reentrant adapters
    async fn apply_with_scene_lock(
        &self,
        node_id: &NodeId,
        target: &PublishedFile,
    ) -> Result<(), String> {
        let result = if self.adapter.is_reentrant() {
            self.adapter.update_reference(node_id, target).await
        } else {
            let _guard = self.scene_mutex.lock().await;
            self.adapter.update_reference(node_id, target).await
        };
        result.map_err(|e| e.to_string())
    }

    /// Coordinating-context phase after the adapter call: settle the item
    fn settle_update(
        &mut self,
        node_id: &NodeId,
        target: PublishedFile,
        result: Result<(), String>,
    ) -> Result<(), UpdateError> {
        let item = self
            .items
            .get_mut(node_id)
            .ok_or_else(|| UpdateError::ItemNotFound(node_id.clone()))?;
        match result {
            Ok(()) => {
                let version = target.version;
                item.apply_update(target);
                tracing::info!(node = %node_id, version, "reference updated");
                Ok(())
            }
            Err(cause) => {
                item.record_failure(cause.clone());
                tracing::warn!(node = %node_id, %cause, "reference update failed");
                Err(UpdateError::Adapter {
                    node: node_id.clone(),
                    cause,
                })
            }
        }
    }

    /// Sequential batch: one adapter mutation at a time
    async fn update_items_serial(
        &mut self,
        node_ids: &[NodeId],
        target: Option<&PublishedFile>,
        cancel: &CancelFlag,
    ) -> Vec<UpdateOutcome> {
        let mut outcomes = Vec::with_capacity(node_ids.len());
        for node_id in node_ids {
            if cancel.is_cancelled() {
                tracing::info!(
                    attempted = outcomes.len(),
                    remaining = node_ids.len() - outcomes.len(),
                    "batch update cancelled"
                );
                break;
            }
            let result = self.update_item(node_id, target).await;
            outcomes.push(UpdateOutcome {
                node_id: node_id.clone(),
                result,
            });
        }
        outcomes
    }

    /// Concurrent batch for reentrant adapters: lock in the coordinating
    /// context, fan the adapter calls out bounded, settle back here
    async fn update_items_concurrent(
        &mut self,
        node_ids: &[NodeId],
        target: Option<&PublishedFile>,
        cancel: &CancelFlag,
    ) -> Vec<UpdateOutcome> {
        let mut preps: Vec<(NodeId, Prep)> = Vec::with_capacity(node_ids.len());
        for node_id in node_ids {
            let prep = match self.prepare_update(node_id, target) {
                Ok(None) => Prep::Immediate(Ok(())),
                Ok(Some(target)) => Prep::Locked(target),
                Err(err) => Prep::Immediate(Err(err)),
            };
            preps.push((node_id.clone(), prep));
        }

        let tasks: Vec<_> = preps
            .iter()
            .filter_map(|(node_id, prep)| match prep {
                Prep::Immediate(_) => None,
                Prep::Locked(target) => {
                    let adapter = Arc::clone(&self.adapter);
                    let cancel = cancel.clone();
                    let node_id = node_id.clone();
                    let target = target.clone();
                    Some(async move {
                        if cancel.is_cancelled() {
                            return (node_id, None);
                        }
                        let result = adapter
                            .update_reference(&node_id, &target)
                            .await
                            .map_err(|e| e.to_string());
                        (node_id, Some(result))
                    })
                }
            })
            .collect();
        let applied: HashMap<NodeId, Option<Result<(), String>>> =
            dispatch::run_bounded(self.config.max_concurrent_resolves, tasks)
                .await
                .into_iter()
                .collect();

        let mut outcomes = Vec::with_capacity(preps.len());
        for (node_id, prep) in preps {
            match prep {
                Prep::Immediate(result) => outcomes.push(UpdateOutcome { node_id, result }),
                Prep::Locked(target) => match applied.get(&node_id).cloned().flatten() {
                    // skipped by cancellation: release the lock, no outcome
                    None => {
                        if let Some(item) = self.items.get_mut(&node_id) {
                            item.unlock();
                        }
                    }
                    Some(result) => {
                        let settled = self.settle_update(&node_id, target, result);
                        outcomes.push(UpdateOutcome {
                            node_id,
                            result: settled,
                        });
                    }
                },
            }
        }
        outcomes
    }
}

impl std::fmt::Debug for BreakdownManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakdownManager")
            .field("items", &self.items.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
