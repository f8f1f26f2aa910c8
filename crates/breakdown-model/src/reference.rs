//! Reference descriptors
//!
//! A [`ReferenceDescriptor`] captures one scene reference's identity and
//! resolution data as reported by the scene adapter. It is a pure value
//! type: created once per scan, never mutated afterwards.

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scene reference as enumerated by the scene adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDescriptor {
    /// Opaque handle addressing the reference in the scene
    pub node_id: NodeId,
    /// Adapter-declared kind of the referencing node (e.g. "reference", "file")
    pub node_type: String,
    /// Resolved filesystem or URI string the reference currently points to;
    /// may be templated/unresolved
    pub path: String,
    /// Adapter-specific metadata, opaque to the core
    pub extra_data: BTreeMap<String, serde_json::Value>,
}

impl ReferenceDescriptor {
    /// Create a new descriptor
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

/// Scope constraint for a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanScope {
    /// The currently loaded scene
    #[default]
    CurrentScene,
    /// A specific scene file, addressed by path
    ScenePath(String),
}

impl ScanScope {
    /// The scene path constraint, if any
    #[inline]
    #[must_use]
    pub fn scene_path(&self) -> Option<&str> {
        match self {
            Self::CurrentScene => None,
            Self::ScenePath(path) => Some(path),
        }
    }
}
