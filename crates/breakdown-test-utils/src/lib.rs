//! Testing utilities for the breakdown workspace
//!
//! Shared fixtures: an in-memory tracking source, a scripted scene
//! adapter with per-node failure injection, and published-file builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use breakdown_hooks::{
    AdapterError, RawReference, SceneAdapter, SceneChangeEvent, SourceError, TrackingSource,
};
use breakdown_model::filters::matches_all;
use breakdown_model::{FilterPredicate, NodeId, PublishedFile, ScanScope};
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Deterministic published-file record: `created_at` grows with version
/// and id, so recency ordering matches the obvious reading of fixtures.
pub fn published_file(id: i64, entity_name: &str, version: i64) -> PublishedFile {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    PublishedFile::new(
        id,
        entity_name,
        "Published File",
        version,
        base + Duration::days(version) + Duration::seconds(id),
        publish_path(entity_name, version),
    )
}

/// Path a published file of this name/version lands at
pub fn publish_path(entity_name: &str, version: i64) -> String {
    format!("/publish/{entity_name}_v{version:03}.abc")
}

/// Raw scene reference currently bound to `version` of `entity_name`
pub fn raw_reference(node: &str, entity_name: &str, version: i64) -> RawReference {
    RawReference::new(
        NodeId::from(node),
        "reference",
        publish_path(entity_name, version),
    )
}

/// In-memory tracking source evaluating filter predicates locally
#[derive(Debug, Default)]
pub struct MemoryTrackingSource {
    records: Mutex<Vec<PublishedFile>>,
    failing: AtomicBool,
    query_count: Mutex<usize>,
}

impl MemoryTrackingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<PublishedFile>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn push(&self, record: PublishedFile) {
        self.records.lock().push(record);
    }

    /// Make every subsequent query fail with a transport error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Number of queries served (including failed ones)
    pub fn query_count(&self) -> usize {
        *self.query_count.lock()
    }
}

#[async_trait]
impl TrackingSource for MemoryTrackingSource {
    async fn find_published_files(
        &self,
        filters: &[FilterPredicate],
    ) -> Result<Vec<PublishedFile>, SourceError> {
        *self.query_count.lock() += 1;
        if self.failing.load(Ordering::Relaxed) {
            return Err(SourceError::Unavailable("injected failure".to_string()));
        }
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| matches_all(filters, r))
            .cloned()
            .collect())
    }
}

/// Scripted scene adapter
///
/// Replays a fixed reference list, applies updates to its own state so a
/// rescan observes them, and fails updates for selected nodes.
#[derive(Debug, Default)]
pub struct ScriptedSceneAdapter {
    refs: Mutex<Vec<RawReference>>,
    no_scene: AtomicBool,
    reentrant: AtomicBool,
    failing_nodes: Mutex<HashSet<NodeId>>,
    applied: Mutex<Vec<(NodeId, PublishedFile)>>,
    change_tx: Mutex<Option<mpsc::Sender<SceneChangeEvent>>>,
}

impl ScriptedSceneAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_references(refs: Vec<RawReference>) -> Self {
        Self {
            refs: Mutex::new(refs),
            ..Self::default()
        }
    }

    pub fn set_references(&self, refs: Vec<RawReference>) {
        *self.refs.lock() = refs;
    }

    /// Simulate "no scene loaded"
    pub fn set_no_scene(&self, no_scene: bool) {
        self.no_scene.store(no_scene, Ordering::Relaxed);
    }

    /// Declare the adapter safe for concurrent scene mutation
    pub fn set_reentrant(&self, reentrant: bool) {
        self.reentrant.store(reentrant, Ordering::Relaxed);
    }

    /// Make updates of this node fail
    pub fn fail_update_for(&self, node: &str) {
        self.failing_nodes.lock().insert(NodeId::from(node));
    }

    /// Stop injecting update failures
    pub fn clear_update_failures(&self) {
        self.failing_nodes.lock().clear();
    }

    /// Updates the adapter actually performed, in call order
    pub fn applied_updates(&self) -> Vec<(NodeId, i64)> {
        self.applied
            .lock()
            .iter()
            .map(|(node, record)| (node.clone(), record.version))
            .collect()
    }

    /// Push a scene-change event to an attached watcher, if any
    pub fn emit_change(&self, event: SceneChangeEvent) -> bool {
        self.change_tx
            .lock()
            .as_ref()
            .map(|tx| tx.try_send(event).is_ok())
            .unwrap_or(false)
    }
}

#[async_trait]
impl SceneAdapter for ScriptedSceneAdapter {
    async fn enumerate_references(
        &self,
        _scope: ScanScope,
    ) -> Result<Vec<RawReference>, AdapterError> {
        if self.no_scene.load(Ordering::Relaxed) {
            return Err(AdapterError::NoScene);
        }
        Ok(self.refs.lock().clone())
    }

    async fn update_reference(
        &self,
        node_id: &NodeId,
        target: &PublishedFile,
    ) -> Result<(), AdapterError> {
        if self.failing_nodes.lock().contains(node_id) {
            return Err(AdapterError::Failed(format!(
                "scripted failure for {node_id}"
            )));
        }
        let mut refs = self.refs.lock();
        let Some(raw) = refs.iter_mut().find(|r| &r.node_id == node_id) else {
            return Err(AdapterError::NodeNotFound(node_id.clone()));
        };
        raw.path = target.path.clone();
        self.applied.lock().push((node_id.clone(), target.clone()));
        Ok(())
    }

    async fn resolve_path(&self, node_id: &NodeId) -> Result<String, AdapterError> {
        self.refs
            .lock()
            .iter()
            .find(|r| &r.node_id == node_id)
            .map(|r| r.path.clone())
            .ok_or_else(|| AdapterError::NodeNotFound(node_id.clone()))
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant.load(Ordering::Relaxed)
    }

    fn watch_scene_changes(&self) -> Option<mpsc::Receiver<SceneChangeEvent>> {
        let (tx, rx) = mpsc::channel(16);
        *self.change_tx.lock() = Some(tx);
        Some(rx)
    }
}
