//! Shared value types for the scene breakdown toolkit
//!
//! Defines the data model exchanged between the breakdown manager, the
//! published-file resolver, and the external capability interfaces:
//! - Node and scan identifiers
//! - Reference descriptors (one scene reference's identity)
//! - Published-file records from the tracking source
//! - Filter predicates applied to tracking queries
//! - Breakdown session configuration
//!
//! This crate carries no behavior beyond construction, accessors, and
//! filter evaluation; the reconciliation logic lives in `breakdown-core`.

#![warn(unreachable_pub)]

pub mod config;
pub mod filters;
pub mod ids;
pub mod published_file;
pub mod reference;

pub use config::BreakdownConfig;
pub use filters::{FilterOp, FilterPredicate};
pub use ids::{NodeId, ScanId};
pub use published_file::PublishedFile;
pub use reference::{ReferenceDescriptor, ScanScope};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the breakdown data model
    pub use crate::{
        BreakdownConfig, FilterOp, FilterPredicate, NodeId, PublishedFile, ReferenceDescriptor,
        ScanId, ScanScope,
    };
}
