//! # Completion barrier for outstanding invocations.
//!
//! A counter-based join primitive: the dispatcher enters the barrier before
//! each invocation is handed to an execution strategy and the returned
//! [`BarrierGuard`] leaves it when dropped, on every exit path (normal
//! return, failure, or the job being dropped without running).
//!
//! ## Architecture
//! ```text
//! dispatch ──► enter() ──► +1 ──► guard moved into job
//!                                      │
//!                          job runs / fails / is dropped
//!                                      │
//!                                  drop(guard) ──► -1 ──► 0? notify waiters
//!
//! wait()          ──► pending == 0 ? return : sleep until notified, re-check
//! wait_blocking() ──► same loop on a condvar, for callers without an executor
//! ```
//!
//! ## Rules
//! - The counter never goes below zero (every decrement has a prior increment)
//! - `wait` observes a moving target: it returns as soon as it samples zero,
//!   with no ordering relative to publishes that start afterwards

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

/// Counter of in-flight invocations with an async and a blocking join.
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    pending: AtomicUsize,
    notify: Notify,
    idle_lock: Mutex<()>,
    idle: Condvar,
}

impl CompletionBarrier {
    /// Creates an idle barrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one outstanding invocation.
    ///
    /// The invocation is considered complete when the returned guard is dropped.
    #[must_use = "dropping the guard immediately completes the invocation"]
    pub fn enter(self: &Arc<Self>) -> BarrierGuard {
        self.pending.fetch_add(1, Ordering::AcqRel);
        BarrierGuard {
            barrier: Arc::clone(self),
        }
    }

    /// Number of invocations entered and not yet completed.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Waits until no invocation is outstanding.
    pub async fn wait(&self) {
        loop {
            let mut notified = std::pin::pin!(self.notify.notified());
            // Register interest before sampling so a concurrent final leave is not missed.
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Blocks the calling thread until no invocation is outstanding.
    ///
    /// Must not be called from an async task: it parks the executor thread.
    pub fn wait_blocking(&self) {
        let mut lock = self.idle_lock.lock();
        while self.pending() != 0 {
            self.idle.wait(&mut lock);
        }
    }

    fn leave(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
            // Taking the lock orders this wakeup after a blocked waiter's check.
            let _lock = self.idle_lock.lock();
            self.idle.notify_all();
        }
    }
}

/// Marks one invocation as outstanding until dropped.
#[derive(Debug)]
pub struct BarrierGuard {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        self.barrier.leave();
    }
}
