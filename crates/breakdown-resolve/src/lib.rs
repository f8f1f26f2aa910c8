//! Published-file resolution
//!
//! Matches raw scene-reference data against the tracking source:
//! - [`PathRules`] derive an entity name/type and a bound version token
//!   from a reference path (regex-driven, adapter/config supplied)
//! - [`PublishedFileResolver`] builds the tracking query, selects the
//!   currently-bound record and the latest record, and fetches version
//!   history
//!
//! Absence of a match is a normal empty result; only malformed input is
//! an error.

#![warn(unreachable_pub)]

pub mod resolver;
pub mod rules;

pub use resolver::{latest_of, sort_newest_first, PublishedFileResolver, Resolution};
pub use rules::{ParsedPath, PathRules};

use breakdown_hooks::SourceError;

/// Resolution failures
///
/// Only malformed input and tracking-source transport problems are
/// errors; an empty match set is a normal [`Resolution`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No entity name could be extracted from the reference path
    #[error("unparsable reference path: {0}")]
    UnparsablePath(String),

    /// The tracking source failed to answer the query
    #[error("tracking source error: {0}")]
    Source(#[from] SourceError),
}
