//! Error types for the breakdown core
//!
//! Taxonomy:
//! - [`ScanError`]: the adapter could not enumerate; fatal to that scan
//!   call, the scan yields nothing
//! - [`ResolveError`]: malformed reference path; that single item is
//!   recorded as unresolved, never fatal (re-exported from
//!   `breakdown-resolve`)
//! - [`UpdateError`]: one item's update failed; that item goes to
//!   `Error` status, the batch continues
//!
//! Nothing here is fatal to the process; every failure is scoped to the
//! operation that triggered it.

use crate::status::TransitionError;
use breakdown_hooks::AdapterError;
use breakdown_model::NodeId;

pub use breakdown_resolve::ResolveError;

/// Scan failures (fatal to one scan call)
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scene adapter could not enumerate references
    #[error("scene enumeration failed: {0}")]
    Adapter(#[from] AdapterError),

    /// The scan was cancelled between per-item units of work
    #[error("scan cancelled")]
    Cancelled,
}

/// Per-item update failures (the batch continues)
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// No item with this node id exists in the current scan
    #[error("no item for node: {0}")]
    ItemNotFound(NodeId),

    /// The item resolved to no published file; untracked items are
    /// reported but cannot be updated
    #[error("item is untracked and cannot be updated: {0}")]
    Untracked(NodeId),

    /// No target was given and the item knows no latest published file
    #[error("no target version known for node: {0}")]
    NoTarget(NodeId),

    /// The scene adapter rejected the update; carries the
    /// human-readable cause for per-row display and retry
    #[error("update of {node} failed: {cause}")]
    Adapter {
        /// The item whose update failed
        node: NodeId,
        /// Human-readable failure cause from the adapter
        cause: String,
    },

    /// Illegal item status transition
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl UpdateError {
    /// Whether a retry can reasonably succeed
    ///
    /// Adapter failures leave the item in `Error` status, which is
    /// retry-eligible indefinitely; the structural failures are not.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Adapter { .. })
    }
}

/// Umbrella error for breakdown operations
#[derive(Debug, thiserror::Error)]
pub enum BreakdownError {
    /// Scan failed
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Resolution failed
    #[error("resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Item update failed
    #[error("update failed: {0}")]
    Update(#[from] UpdateError),

    /// No item with this node id exists in the current scan
    #[error("no item for node: {0}")]
    ItemNotFound(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ItemStatus;

    #[test]
    fn update_error_display() {
        let err = UpdateError::Adapter {
            node: NodeId::from("xref1"),
            cause: "file locked by another process".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("xref1"));
        assert!(msg.contains("file locked"));
    }

    #[test]
    fn only_adapter_failures_are_retryable() {
        let adapter = UpdateError::Adapter {
            node: NodeId::from("n"),
            cause: "x".into(),
        };
        assert!(adapter.is_retryable());
        assert!(!UpdateError::Untracked(NodeId::from("n")).is_retryable());
        assert!(!UpdateError::ItemNotFound(NodeId::from("n")).is_retryable());
        assert!(!UpdateError::Transition(TransitionError {
            from: ItemStatus::Locked,
            to: ItemStatus::Locked,
        })
        .is_retryable());
    }

    #[test]
    fn scan_error_from_adapter() {
        let err: ScanError = breakdown_hooks::AdapterError::NoScene.into();
        assert!(err.to_string().contains("no scene loaded"));
    }
}
