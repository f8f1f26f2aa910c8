//! Scene adapter capability interface
//!
//! Engine-specific adapters implement [`SceneAdapter`] to expose three
//! capabilities: enumerate references, retarget a reference to a
//! different published file, and resolve a reference to a path string.
//! Adapters may additionally surface scene-change notifications.

use async_trait::async_trait;
use breakdown_model::{NodeId, PublishedFile, ScanScope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// One raw scene reference as reported by `enumerate_references`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReference {
    /// Handle addressing the reference in the scene
    pub node_id: NodeId,
    /// Kind of the referencing node, adapter-defined
    pub node_type: String,
    /// Path the reference currently points to
    pub path: String,
    /// Adapter-specific payload carried through to update calls
    pub extra_data: BTreeMap<String, serde_json::Value>,
}

impl RawReference {
    /// Create a raw reference
    #[inline]
    #[must_use]
    pub fn new(node_id: NodeId, node_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type: node_type.into(),
            path: path.into(),
            extra_data: BTreeMap::new(),
        }
    }

    /// With an extra-data entry
    #[inline]
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_data.insert(key.into(), value);
        self
    }
}

/// Notification that the scene contents changed outside the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneChangeEvent {
    /// A reference was added, removed, or repointed
    ReferencesChanged,
    /// A different scene was opened
    SceneOpened,
}

/// Scene adapter failures
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// No scene is loaded; enumeration is impossible
    #[error("no scene loaded")]
    NoScene,

    /// The addressed node does not exist in the scene
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The engine rejected the operation
    #[error("adapter operation failed: {0}")]
    Failed(String),
}

/// Engine-specific scene introspection and mutation capability
///
/// The core treats implementations as requiring external mutual
/// exclusion for mutating calls unless [`is_reentrant`] says otherwise.
///
/// [`is_reentrant`]: SceneAdapter::is_reentrant
#[async_trait]
pub trait SceneAdapter: Send + Sync {
    /// Enumerate scene references within `scope`
    ///
    /// # Errors
    /// Returns [`AdapterError::NoScene`] when there is nothing to scan;
    /// this is fatal to the scan call, not to the session.
    async fn enumerate_references(&self, scope: ScanScope)
        -> Result<Vec<RawReference>, AdapterError>;

    /// Repoint the reference at `node_id` to `target`
    ///
    /// # Errors
    /// Failures are scoped to this one reference; the caller decides
    /// whether siblings continue.
    async fn update_reference(
        &self,
        node_id: &NodeId,
        target: &PublishedFile,
    ) -> Result<(), AdapterError>;

    /// Resolve the reference at `node_id` to a filesystem/identifier string
    async fn resolve_path(&self, node_id: &NodeId) -> Result<String, AdapterError>;

    /// Whether concurrent `update_reference` calls against the same scene
    /// are safe. Defaults to `false`; the core serializes mutations then.
    fn is_reentrant(&self) -> bool {
        false
    }

    /// Subscribe to scene-change notifications, if the engine supports them
    ///
    /// Returns `None` for engines without a notification mechanism. The
    /// core only ever treats these events as advisory.
    fn watch_scene_changes(&self) -> Option<mpsc::Receiver<SceneChangeEvent>> {
        None
    }
}
