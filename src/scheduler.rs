//! One-shot deferred task execution

use std::time::Duration;
use tracing::trace;

/// Runs one-shot tasks after a fixed delay on the tokio runtime.
///
/// Tasks are never coalesced or cancelled: scheduling the same logical
/// work twice runs it twice. Callers rely on tasks re-querying live state
/// when they fire, so duplicate or out-of-order firings converge to the
/// same result.
#[derive(Debug, Default)]
pub struct TaskScheduler;

impl TaskScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Run `task` after `delay`. Must be called from within a tokio
    /// runtime.
    pub fn schedule_after<F>(&self, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        trace!("Scheduling deferred task in {:?}", delay);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn task_fires_after_delay() {
        let scheduler = TaskScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        scheduler.schedule_after(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_tasks_both_run() {
        let scheduler = TaskScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let counter = fired.clone();
            scheduler.schedule_after(Duration::from_millis(10), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
