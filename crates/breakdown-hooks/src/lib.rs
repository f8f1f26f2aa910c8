//! External capability interfaces for the scene breakdown toolkit
//!
//! The core is polymorphic over two collaborator seams:
//! - [`SceneAdapter`]: engine-specific scene introspection and mutation
//!   (one implementation per supported engine: Maya, Nuke, Houdini, ...)
//! - [`TrackingSource`]: read-only queries against the central
//!   asset-tracking service
//!
//! The core holds `Arc<dyn ...>` instances selected at startup by
//! configuration and never branches on engine identity internally.

#![warn(unreachable_pub)]

pub mod scene;
pub mod tracking;

pub use scene::{AdapterError, RawReference, SceneAdapter, SceneChangeEvent};
pub use tracking::{SourceError, TrackingSource};
