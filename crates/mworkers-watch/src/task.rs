//! Per-item work performed by the pool.

use crate::types::WorkItem;
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Work executed by a pool worker for each claimed item.
///
/// Implementations run outside the queue lock and must not panic; failures
/// are the task's own concern and are never reported back to the queue.
pub trait Task: Send + Sync + 'static {
    /// Process one item on behalf of worker `worker`.
    fn run(&self, worker: usize, item: &WorkItem);
}

impl<F> Task for F
where
    F: Fn(usize, &WorkItem) + Send + Sync + 'static,
{
    fn run(&self, worker: usize, item: &WorkItem) {
        self(worker, item)
    }
}

/// Placeholder task that holds the worker for a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct SleepTask {
    delay: Duration,
}

impl SleepTask {
    /// Create a task that sleeps for `delay` per item.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SleepTask {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Task for SleepTask {
    fn run(&self, worker: usize, item: &WorkItem) {
        trace!(worker, path = %item, delay_ms = self.delay.as_millis() as u64, "sleeping");
        thread::sleep(self.delay);
    }
}
