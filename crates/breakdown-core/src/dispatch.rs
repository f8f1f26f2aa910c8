//! Bounded dispatch and cooperative cancellation
//!
//! The core performs no blocking I/O inline with UI-thread-sensitive
//! code: per-item work is modeled as independent futures fanned out under
//! a concurrency bound, with results handed back to the coordinating
//! context (which alone mutates shared state).
//!
//! Cancellation is cooperative: a [`CancelFlag`] is checked between
//! per-item units of work, never mid-unit. An in-flight unit finishes or
//! fails cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Shared cooperative cancellation flag
///
/// Cheap to clone; all clones observe the same flag. Once cancelled it
/// stays cancelled; create a fresh flag per operation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, uncancelled flag
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run independent futures with at most `limit` in flight
///
/// Results come back in submission order regardless of completion order,
/// so callers can zip them against their inputs.
pub async fn run_bounded<T, F>(limit: usize, tasks: Vec<F>) -> Vec<T>
where
    F: std::future::Future<Output = T>,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    futures::future::join_all(tasks.into_iter().map(|task| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            // the semaphore is never closed; a failed acquire cannot occur
            let _permit = semaphore.acquire().await.ok();
            task.await
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared_across_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn run_bounded_preserves_submission_order() {
        // later tasks finish first; output order must still match input
        let tasks: Vec<_> = (0..8u64)
            .map(|i| async move {
                tokio::time::sleep(std::time::Duration::from_millis(8 - i)).await;
                i
            })
            .collect();
        let results = run_bounded(3, tasks).await;
        assert_eq!(results, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn run_bounded_respects_limit() {
        use std::sync::atomic::AtomicUsize;

        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        run_bounded(4, tasks).await;
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }
}
