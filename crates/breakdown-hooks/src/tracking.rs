//! Tracking source capability interface
//!
//! Read-only query access to the central asset-tracking service. The core
//! never talks to the network itself; transport belongs to the
//! implementation behind this trait.

use async_trait::async_trait;
use breakdown_model::{FilterPredicate, PublishedFile};

/// Tracking source failures
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source rejected the query as malformed
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The source could not be reached or answered with a transport error
    #[error("tracking source unavailable: {0}")]
    Unavailable(String),
}

/// Read-only published-file query capability
#[async_trait]
pub trait TrackingSource: Send + Sync {
    /// Find published-file records matching every given predicate
    ///
    /// An empty result is a normal outcome, not an error.
    async fn find_published_files(
        &self,
        filters: &[FilterPredicate],
    ) -> Result<Vec<PublishedFile>, SourceError>;
}
