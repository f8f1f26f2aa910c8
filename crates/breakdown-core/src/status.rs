//! File-item status machine
//!
//! Per item: `{UpToDate | OutOfDate}` at creation (derived from the
//! staleness invariant), `→ Locked` when an update starts,
//! `→ {UpToDate | OutOfDate | Error}` when it finishes. `Error` items are
//! retry-eligible indefinitely (they may return to `Locked`); there is no
//! terminal give-up state.

use serde::{Deserialize, Serialize};

/// Update status of one file item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    /// The referenced version is the latest known version (or the item
    /// is untracked and staleness cannot be established)
    UpToDate,
    /// A newer published version exists
    OutOfDate,
    /// An update is in progress
    Locked,
    /// The last update attempt failed; retry-eligible
    Error,
}

/// Illegal status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal status transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    /// Status before the attempted transition
    pub from: ItemStatus,
    /// Rejected target status
    pub to: ItemStatus,
}

/// Statuses reachable from `from` in one transition
#[must_use]
pub fn allowed_transitions(from: ItemStatus) -> Vec<ItemStatus> {
    use ItemStatus::*;
    match from {
        UpToDate | OutOfDate | Error => vec![Locked],
        Locked => vec![UpToDate, OutOfDate, Error],
    }
}

/// Validate a status transition
///
/// # Errors
/// [`TransitionError`] when `to` is not reachable from `from`.
pub fn validate_transition(from: ItemStatus, to: ItemStatus) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}
