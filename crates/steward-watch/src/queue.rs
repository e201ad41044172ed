//! Shared FIFO between the directory monitor thread and the control loop.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unbounded FIFO of pending work items.
///
/// Cloning is cheap and every clone refers to the same queue. Pushes come
/// from the monitor thread and startup reconciliation; the control loop takes
/// everything at once with [`drain_all`](Self::drain_all).
pub struct WorkQueue<T> {
    inner: Arc<Shared<T>>,
}

struct Shared<T> {
    items: Mutex<VecDeque<T>>,
    pushed: AtomicU64,
    drained: AtomicU64,
}

/// Counters describing queue activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Items currently waiting
    pub pending: usize,
    /// Items ever pushed
    pub pushed: u64,
    /// Items handed out by drains
    pub drained: u64,
}

impl<T> WorkQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                items: Mutex::new(VecDeque::new()),
                pushed: AtomicU64::new(0),
                drained: AtomicU64::new(0),
            }),
        }
    }

    /// Append an item.
    pub fn push(&self, item: T) {
        self.inner.items.lock().push_back(item);
        self.inner.pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove and return every queued item in arrival order.
    pub fn drain_all(&self) -> Vec<T> {
        let drained: Vec<T> = self.inner.items.lock().drain(..).collect();
        self.inner
            .drained
            .fetch_add(drained.len() as u64, Ordering::Relaxed);
        drained
    }

    /// Number of waiting items.
    pub fn len(&self) -> usize {
        self.inner.items.lock().len()
    }

    /// Check if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.len(),
            pushed: self.inner.pushed.load(Ordering::Relaxed),
            drained: self.inner.drained.load(Ordering::Relaxed),
        }
    }
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
