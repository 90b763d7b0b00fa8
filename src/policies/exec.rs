//! # Execution strategies for handler invocations.
//!
//! [`ExecStrategy`] decides *where* one prepared invocation ([`Job`]) runs.
//! The dispatcher uses one strategy for asynchronous publishes and another for
//! synchronous publishes; both receive the topic and extra context so tracing,
//! metrics or per-topic thread affinity can be layered without touching the
//! dispatcher.
//!
//! - [`ExecStrategy::Spawn`] runs the job as an independent task (default for async).
//! - [`ExecStrategy::Inline`] runs the job on the calling thread (default for sync).
//! - [`ExecStrategy::Custom`] hands the job to a caller-supplied function.
//!
//! ## Rules
//! - A job owns its completion guard: a strategy that drops a job without
//!   running it still releases the barrier.
//! - A job never unwinds out of a synchronous strategy unless the failure
//!   policy itself panics.
//!
//! ## Example
//! ```rust
//! use topicvisor::{ExecStrategy, Observer};
//!
//! // Run async deliveries on the caller's thread, e.g. in a single-threaded test harness.
//! let observer: Observer<u32> = Observer::builder()
//!     .with_async_exec(ExecStrategy::custom(|topic: &str, shard: &u32, job| {
//!         let _ = (topic, shard);
//!         job();
//!     }))
//!     .build();
//! # let _ = observer;
//! ```

use std::fmt;
use std::sync::Arc;

/// One prepared handler invocation.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

type ExecFn<E> = dyn Fn(&str, &E, Job) + Send + Sync;

/// Strategy for running one invocation.
pub enum ExecStrategy<E> {
    /// Schedule the job as an independent task and return immediately.
    ///
    /// Uses the ambient tokio runtime's blocking pool when called inside a
    /// runtime, otherwise a detached OS thread.
    Spawn,
    /// Run the job on the calling thread before returning.
    Inline,
    /// Hand the job to a caller-supplied function.
    Custom(Arc<ExecFn<E>>),
}

impl<E> ExecStrategy<E> {
    /// Wraps a closure `(topic, extra, job)` as a strategy.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, &E, Job) + Send + Sync + 'static,
    {
        ExecStrategy::Custom(Arc::new(f))
    }

    pub(crate) fn run(&self, topic: &str, extra: &E, job: Job) {
        match self {
            ExecStrategy::Spawn => spawn(job),
            ExecStrategy::Inline => job(),
            ExecStrategy::Custom(f) => f(topic, extra, job),
        }
    }
}

fn spawn(job: Job) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(job);
        }
        Err(_) => {
            std::thread::spawn(job);
        }
    }
}

impl<E> Clone for ExecStrategy<E> {
    fn clone(&self) -> Self {
        match self {
            ExecStrategy::Spawn => ExecStrategy::Spawn,
            ExecStrategy::Inline => ExecStrategy::Inline,
            ExecStrategy::Custom(f) => ExecStrategy::Custom(Arc::clone(f)),
        }
    }
}

impl<E> fmt::Debug for ExecStrategy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecStrategy::Spawn => f.write_str("Spawn"),
            ExecStrategy::Inline => f.write_str("Inline"),
            ExecStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_inline_runs_before_return() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        ExecStrategy::<()>::Inline.run("t", &(), Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_spawn_without_runtime_uses_thread() {
        let (tx, rx) = mpsc::channel();
        ExecStrategy::<()>::Spawn.run("t", &(), Box::new(move || {
            tx.send(std::thread::current().id()).unwrap();
        }));
        let id = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(id, std::thread::current().id());
    }

    #[tokio::test]
    async fn test_spawn_inside_runtime() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        ExecStrategy::<()>::Spawn.run("t", &(), Box::new(move || {
            let _ = tx.send(7);
        }));
        assert_eq!(rx.await.unwrap(), 7);
    }

    #[test]
    fn test_custom_sees_topic_and_extra() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let strategy = ExecStrategy::custom(move |topic: &str, extra: &u8, job: Job| {
            s.lock().push((topic.to_string(), *extra));
            job();
        });
        strategy.run("pain", &3, Box::new(|| {}));
        assert_eq!(*seen.lock(), vec![("pain".to_string(), 3)]);
        assert_eq!(format!("{strategy:?}"), "Custom(..)");
    }
}
