//! Blocking FIFO work queue shared between the dispatcher and the worker pool.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Monitor-style FIFO queue.
///
/// All queue state lives behind a single mutex; `enqueue` wakes one waiting
/// consumer and `dequeue` parks on a condition variable while the queue is
/// empty. The queue is unbounded unless built with [`WorkQueue::bounded`], in
/// which case producers block until a consumer frees a slot.
///
/// A queue is never closed unless [`WorkQueue::close`] is called. Closing
/// rejects further items, wakes every blocked thread, and lets consumers drain
/// what was already queued before `dequeue` starts returning `None`.
pub struct WorkQueue<T> {
    /// Guarded queue state
    state: Mutex<QueueState<T>>,
    /// Signalled when an item is pushed or the queue is closed
    not_empty: Condvar,
    /// Signalled when an item is popped from a bounded queue
    not_full: Condvar,
    /// Maximum depth, `None` for unbounded
    capacity: Option<usize>,
    /// Total items accepted
    enqueued: AtomicU64,
    /// Total items handed to consumers
    dequeued: AtomicU64,
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
    peak: usize,
}

impl<T> WorkQueue<T> {
    /// Create an unbounded queue.
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    /// Create a queue that holds at most `capacity` items.
    ///
    /// A capacity of zero is treated as one.
    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity.max(1)))
    }

    /// Create a queue with an optional capacity limit.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
                peak: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
        }
    }

    /// Append an item at the tail and wake one waiting consumer.
    ///
    /// Blocks only on lock contention, or while a bounded queue is full.
    /// Fails with [`Error::QueueClosed`] once the queue has been closed.
    pub fn enqueue(&self, item: T) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(capacity) = self.capacity {
            while state.items.len() >= capacity && !state.closed {
                trace!(capacity, "work queue full, producer waiting");
                self.not_full.wait(&mut state);
            }
        }
        if state.closed {
            return Err(Error::QueueClosed);
        }

        state.items.push_back(item);
        state.peak = state.peak.max(state.items.len());
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        drop(state);

        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the head item, blocking while the queue is empty.
    ///
    /// Returns `None` only after the queue is closed and fully drained.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.after_pop();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Remove the head item if one is available, without blocking.
    pub fn try_dequeue(&self) -> Option<T> {
        let item = self.state.lock().items.pop_front();
        if item.is_some() {
            self.after_pop();
        }
        item
    }

    fn after_pop(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
        if self.capacity.is_some() {
            self.not_full.notify_one();
        }
    }

    /// Close the queue. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);

        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of items waiting to be claimed.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether no items are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity limit, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Snapshot of queue counters.
    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            current_size: state.items.len(),
            capacity: self.capacity,
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dequeued: self.dequeued.load(Ordering::Relaxed),
            peak: state.peak,
        }
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Statistics for the work queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Current queue size
    pub current_size: usize,
    /// Maximum capacity, `None` when unbounded
    pub capacity: Option<usize>,
    /// Number of items accepted
    pub enqueued: u64,
    /// Number of items claimed by consumers
    pub dequeued: u64,
    /// Largest depth observed
    pub peak: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_dequeue_returns_items_in_insertion_order() {
        let queue = WorkQueue::unbounded();
        for i in 0..5 {
            queue.enqueue(i).unwrap();
        }

        let drained: Vec<i32> = (0..5).map(|_| queue.dequeue().unwrap()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_try_dequeue_on_empty_queue() {
        let queue: WorkQueue<u32> = WorkQueue::unbounded();
        assert_eq!(queue.try_dequeue(), None);

        queue.enqueue(7).unwrap();
        assert_eq!(queue.try_dequeue(), Some(7));
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn test_blocked_consumer_is_woken_by_enqueue() {
        let queue = Arc::new(WorkQueue::unbounded());
        let (tx, rx) = mpsc::channel();

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                tx.send(queue.dequeue()).unwrap();
            })
        };

        // Consumer should still be parked
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        queue.enqueue("a.txt".to_string()).unwrap();
        let got = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got.as_deref(), Some("a.txt"));
        consumer.join().unwrap();
    }

    #[test]
    fn test_close_wakes_blocked_consumers() {
        let queue: Arc<WorkQueue<u32>> = Arc::new(WorkQueue::unbounded());
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || queue.dequeue())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        queue.close();

        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), None);
        }
    }

    #[test]
    fn test_close_still_delivers_queued_items() {
        let queue = WorkQueue::unbounded();
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        queue.close();
        queue.close();

        assert!(matches!(queue.enqueue(3), Err(Error::QueueClosed)));
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_closed());
    }

    #[test]
    fn test_bounded_queue_blocks_producer_until_space() {
        let queue = Arc::new(WorkQueue::bounded(1));
        queue.enqueue(1).unwrap();

        let (tx, rx) = mpsc::channel();
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.enqueue(2).unwrap();
                tx.send(()).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.dequeue(), Some(1));
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        producer.join().unwrap();
        assert_eq!(queue.dequeue(), Some(2));
    }

    #[test]
    fn test_close_releases_blocked_producer() {
        let queue = Arc::new(WorkQueue::bounded(1));
        queue.enqueue(1).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(2))
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(matches!(producer.join().unwrap(), Err(Error::QueueClosed)));
    }

    #[test]
    fn test_stats_track_counts_and_peak() {
        let queue = WorkQueue::bounded(10);
        for i in 0..4 {
            queue.enqueue(i).unwrap();
        }
        queue.dequeue();

        let stats = queue.stats();
        assert_eq!(stats.current_size, 3);
        assert_eq!(stats.capacity, Some(10));
        assert_eq!(stats.enqueued, 4);
        assert_eq!(stats.dequeued, 1);
        assert_eq!(stats.peak, 4);
    }

    #[test]
    fn test_concurrent_consumers_claim_each_item_once() {
        let queue = Arc::new(WorkQueue::unbounded());
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut claimed = Vec::new();
                    while let Some(item) = queue.dequeue() {
                        claimed.push(item);
                    }
                    claimed
                })
            })
            .collect();

        for i in 0..1000u32 {
            queue.enqueue(i).unwrap();
        }
        queue.close();

        let mut seen = HashSet::new();
        let mut total = 0;
        for consumer in consumers {
            for item in consumer.join().unwrap() {
                assert!(seen.insert(item), "item {} claimed twice", item);
                total += 1;
            }
        }
        assert_eq!(total, 1000);
    }

    proptest! {
        #[test]
        fn prop_fifo_without_interleaved_dequeues(items in proptest::collection::vec(any::<u16>(), 0..64)) {
            let queue = WorkQueue::unbounded();
            for item in &items {
                queue.enqueue(*item).unwrap();
            }
            let drained: Vec<u16> = std::iter::from_fn(|| queue.try_dequeue()).collect();
            prop_assert_eq!(drained, items);
        }
    }
}
