//! Frontier: admission set plus bounded task queue
//!
//! This module handles:
//! - Visit-once and page-budget admission through a single locked set
//! - A bounded FIFO of discovered tasks shared by every worker
//! - Pending-work tracking so the queue closes itself once it can never
//!   receive another task
//!
//! Enqueue never blocks. A full queue drops the task, which is safe because
//! admission, not queue capacity, bounds the number of visited pages.

use crate::crawler::types::CrawlTask;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

/// Shared crawl frontier
pub struct Frontier {
    /// Normalized keys ever admitted during this run
    visited: Mutex<HashSet<String>>,

    max_pages: usize,

    /// Taken (dropped) on close so receivers drain and then see `None`
    sender: Mutex<Option<mpsc::Sender<CrawlTask>>>,

    receiver: tokio::sync::Mutex<mpsc::Receiver<CrawlTask>>,

    /// Tasks queued or currently held by a worker
    pending: AtomicUsize,

    /// Cancelled by the run (deadline or caller)
    cancel: CancellationToken,

    /// Child of `cancel`; also fired when the frontier closes normally
    closed: CancellationToken,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_pages` - Maximum number of keys that will ever be admitted
    /// * `queue_capacity` - Maximum number of queued, not yet dequeued tasks
    /// * `cancel` - Run-level cancellation; once fired nothing is admitted,
    ///   enqueued or dequeued
    pub fn new(max_pages: usize, queue_capacity: usize, cancel: CancellationToken) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let closed = cancel.child_token();

        Self {
            visited: Mutex::new(HashSet::new()),
            max_pages,
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            pending: AtomicUsize::new(0),
            cancel,
            closed,
        }
    }

    /// Atomically admits a normalized key
    ///
    /// Returns false if the key was admitted before, the page budget is
    /// used up, or the run has been cancelled.
    pub fn try_admit(&self, key: &str) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        let mut visited = self.lock_visited();
        if visited.len() >= self.max_pages || visited.contains(key) {
            return false;
        }
        visited.insert(key.to_string())
    }

    /// Returns true if the key has already been admitted
    pub fn is_visited(&self, key: &str) -> bool {
        self.lock_visited().contains(key)
    }

    /// Returns true while more keys can still be admitted
    pub fn has_capacity(&self) -> bool {
        !self.cancel.is_cancelled() && self.lock_visited().len() < self.max_pages
    }

    /// Number of keys admitted so far
    pub fn admitted_count(&self) -> usize {
        self.lock_visited().len()
    }

    /// Queues a task without waiting
    ///
    /// Returns false if the task was dropped because the queue is full, the
    /// frontier is closed, or the run is cancelled.
    pub fn enqueue(&self, task: CrawlTask) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = sender.as_ref() else {
            return false;
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        match tx.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(task)) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                tracing::debug!("Task queue full, dropping {} (depth {})", task.url, task.depth);
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                false
            }
        }
    }

    /// Waits for the next task
    ///
    /// Returns `None` once the frontier is closed and drained, or as soon as
    /// the run is cancelled. Every `Some` must be followed by a call to
    /// [`Frontier::task_done`].
    pub async fn dequeue(&self) -> Option<CrawlTask> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let mut receiver = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            receiver = self.receiver.lock() => receiver,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            task = receiver.recv() => task,
        }
    }

    /// Marks a dequeued task as finished
    ///
    /// Children must be enqueued before their parent is marked done; when the
    /// last pending task finishes the frontier closes itself.
    pub fn task_done(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            tracing::debug!("No pending tasks left, closing frontier");
            self.close();
        }
    }

    /// Closes the queue; already queued tasks can still be drained
    pub fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once the frontier is closed or the run is cancelled
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    /// Tasks queued or in progress
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn lock_visited(&self) -> MutexGuard<'_, HashSet<String>> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
