//! Breakdown core: scene reference reconciliation
//!
//! The central coordinator that:
//! - Enumerates scene references through a pluggable scene adapter
//! - Resolves each reference to a published-file record
//! - Derives staleness by comparing version numbers
//! - Performs guarded, partial-failure-tolerant batch updates
//!
//! # Example
//!
//! ```rust,ignore
//! use breakdown_core::{BreakdownManager, CancelFlag};
//! use breakdown_model::{BreakdownConfig, ScanScope};
//!
//! # async fn example(adapter: std::sync::Arc<dyn breakdown_hooks::SceneAdapter>,
//! #                  source: std::sync::Arc<dyn breakdown_hooks::TrackingSource>)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let mut manager = BreakdownManager::new(adapter, source, BreakdownConfig::new());
//!
//! let cancel = CancelFlag::new();
//! manager.scan(ScanScope::CurrentScene, &cancel).await?;
//!
//! let stale: Vec<_> = manager.out_of_date().map(|i| i.node_id().clone()).collect();
//! for outcome in manager.update_items(&stale, None, &cancel).await {
//!     println!("{}: {:?}", outcome.node_id, outcome.result);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod dispatch;
pub mod error;
pub mod file_item;
pub mod manager;
pub mod status;

// Re-exports for convenience
pub use dispatch::CancelFlag;
pub use error::{BreakdownError, ResolveError, ScanError, UpdateError};
pub use file_item::FileItem;
pub use manager::{BreakdownManager, UpdateOutcome};
pub use status::{allowed_transitions, validate_transition, ItemStatus, TransitionError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the breakdown core
    pub use crate::{
        BreakdownError, BreakdownManager, CancelFlag, FileItem, ItemStatus, ScanError,
        UpdateError, UpdateOutcome,
    };
    pub use breakdown_model::prelude::*;
}
