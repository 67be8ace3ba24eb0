//! Fixed-size pool of worker threads draining a [`WorkQueue`].

use crate::error::{Error, Result};
use crate::queue::WorkQueue;
use crate::task::Task;
use crate::types::WorkItem;
use std::io;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Lifecycle state of a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Blocked waiting for an item
    Idle,
    /// Holding a freshly popped item, about to run it
    Claiming,
    /// Running the task for an item
    Executing,
    /// Exited after the queue was closed and drained
    Stopped,
}

impl WorkerState {
    fn as_u8(self) -> u8 {
        match self {
            WorkerState::Idle => 0,
            WorkerState::Claiming => 1,
            WorkerState::Executing => 2,
            WorkerState::Stopped => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Idle,
            1 => WorkerState::Claiming,
            2 => WorkerState::Executing,
            _ => WorkerState::Stopped,
        }
    }
}

/// Snapshot of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    /// Worker index
    pub index: usize,
    /// Current state
    pub state: WorkerState,
    /// Items this worker has finished
    pub completed: u64,
}

type WorkerBody = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct WorkerSlot {
    state: AtomicU8,
    completed: AtomicU64,
}

impl WorkerSlot {
    fn set(&self, state: WorkerState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

/// N long-lived worker threads sharing one queue.
///
/// Workers only coordinate through the queue. Each loops forever claiming
/// the head item and running the task on it outside the queue lock; a worker
/// exits only once the queue is closed and empty.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    slots: Arc<[WorkerSlot]>,
}

impl WorkerPool {
    /// Start `workers` threads draining `queue` with `task`.
    ///
    /// If a thread cannot be started the queue is closed, so the workers that
    /// did start exit instead of waiting forever.
    pub fn spawn<T: Task>(
        workers: usize,
        queue: Arc<WorkQueue<WorkItem>>,
        task: Arc<T>,
    ) -> Result<Self> {
        Self::spawn_with(workers, queue, task, |name, body| {
            thread::Builder::new().name(name).spawn(body)
        })
    }

    fn spawn_with<T, S>(
        workers: usize,
        queue: Arc<WorkQueue<WorkItem>>,
        task: Arc<T>,
        mut spawner: S,
    ) -> Result<Self>
    where
        T: Task,
        S: FnMut(String, WorkerBody) -> io::Result<JoinHandle<()>>,
    {
        if workers == 0 {
            return Err(Error::Config("worker count must be at least 1".to_string()));
        }

        let slots: Arc<[WorkerSlot]> = (0..workers).map(|_| WorkerSlot::default()).collect();
        let mut handles = Vec::with_capacity(workers);

        for index in 0..workers {
            let body: WorkerBody = {
                let queue = Arc::clone(&queue);
                let task = Arc::clone(&task);
                let slots = Arc::clone(&slots);
                Box::new(move || run_worker(index, &queue, task.as_ref(), &slots[index]))
            };
            match spawner(format!("mworkers-worker-{}", index), body) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!(worker = index, "failed to spawn worker: {}", e);
                    queue.close();
                    return Err(Error::Spawn(e));
                }
            }
        }

        info!(workers, "worker pool started");
        Ok(Self { handles, slots })
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Current state and completion count of every worker.
    pub fn status(&self) -> Vec<WorkerStatus> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| WorkerStatus {
                index,
                state: WorkerState::from_u8(slot.state.load(Ordering::Acquire)),
                completed: slot.completed.load(Ordering::Relaxed),
            })
            .collect()
    }

    /// Total items finished across all workers.
    pub fn completed(&self) -> u64 {
        self.slots
            .iter()
            .map(|slot| slot.completed.load(Ordering::Relaxed))
            .sum()
    }

    /// Wait for every worker to exit and return the total items completed.
    ///
    /// Workers exit only after the queue is closed, so this blocks forever on
    /// a queue that is never closed.
    pub fn join(self) -> u64 {
        let Self { handles, slots } = self;
        for handle in handles {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
        let completed: u64 = slots
            .iter()
            .map(|slot| slot.completed.load(Ordering::Relaxed))
            .sum();
        debug!(completed, "worker pool joined");
        completed
    }
}

fn run_worker(index: usize, queue: &WorkQueue<WorkItem>, task: &dyn Task, slot: &WorkerSlot) {
    debug!(worker = index, "worker started");
    loop {
        slot.set(WorkerState::Idle);
        let Some(item) = queue.dequeue() else {
            break;
        };

        slot.set(WorkerState::Claiming);
        debug!("thread {} claimed {}", index, item);

        slot.set(WorkerState::Executing);
        task.run(index, &item);
        drop(item);
        slot.completed.fetch_add(1, Ordering::Relaxed);
    }
    slot.set(WorkerState::Stopped);
    debug!(worker = index, "worker exiting, queue closed");
}
