//! Dispatch loop feeding decoded notifications into the work queue.

use crate::config::PipelineConfig;
use crate::decoder::NotificationDecoder;
use crate::error::Result;
use crate::pool::WorkerPool;
use crate::queue::WorkQueue;
use crate::task::Task;
use crate::types::WorkItem;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a finished dispatch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Items pushed onto the queue
    pub queued: u64,
}

/// Pulls file identifiers from a decoder and enqueues them as work items.
pub struct Dispatcher<R> {
    decoder: NotificationDecoder<R>,
    queue: Arc<WorkQueue<WorkItem>>,
}

impl<R: Read> Dispatcher<R> {
    /// Create a dispatcher.
    pub fn new(decoder: NotificationDecoder<R>, queue: Arc<WorkQueue<WorkItem>>) -> Self {
        Self { decoder, queue }
    }

    /// Run until the decoder reports end of stream.
    ///
    /// The decoder, and with it the notification channel, is dropped on
    /// return. The queue is left open; workers keep waiting unless the caller
    /// closes it.
    pub fn run(self) -> Result<DispatchSummary> {
        let Self { mut decoder, queue } = self;
        let mut summary = DispatchSummary::default();

        while let Some(path) = decoder.next_path()? {
            let item = WorkItem::new(path);
            let label = item.to_string();
            queue.enqueue(item)?;
            debug!("queued {}", label);
            summary.queued += 1;
        }

        info!(queued = summary.queued, "notification stream ended");
        Ok(summary)
    }
}

/// A running queue and worker pool built from a [`PipelineConfig`].
pub struct Pipeline {
    queue: Arc<WorkQueue<WorkItem>>,
    pool: WorkerPool,
}

impl Pipeline {
    /// Validate `config`, create the queue and start the workers.
    pub fn start<T: Task>(config: &PipelineConfig, task: Arc<T>) -> Result<Self> {
        config.validate()?;
        let queue = Arc::new(WorkQueue::with_capacity(config.queue_capacity));
        let pool = WorkerPool::spawn(config.workers, Arc::clone(&queue), task)?;
        Ok(Self { queue, pool })
    }

    /// Shared handle to the work queue.
    pub fn queue(&self) -> &Arc<WorkQueue<WorkItem>> {
        &self.queue
    }

    /// Run a dispatcher over `reader` on the calling thread.
    pub fn dispatch<R: Read>(
        &self,
        reader: R,
        watch_dir: impl Into<PathBuf>,
    ) -> Result<DispatchSummary> {
        let decoder = NotificationDecoder::new(reader, watch_dir);
        Dispatcher::new(decoder, Arc::clone(&self.queue)).run()
    }

    /// Close the queue and wait for the workers to drain it.
    ///
    /// Returns the total number of items the workers completed.
    pub fn shutdown(self) -> u64 {
        debug!(pending = self.queue.len(), "draining work queue");
        self.queue.close();
        self.pool.join()
    }
}
