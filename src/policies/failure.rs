//! # Failure policies for handler invocations.
//!
//! [`FailurePolicy`] decides what happens when one handler invocation fails
//! (the handler panicked, the call signature did not match, or the result sink
//! panicked). The policy runs inside the invocation's own execution context,
//! after the panic has been caught, so one handler's fault never corrupts the
//! bookkeeping of its siblings.
//!
//! - [`FailurePolicy::Reraise`] logs the failure and re-raises it (default).
//! - [`FailurePolicy::Log`] logs the failure and continues.
//! - [`FailurePolicy::Custom`] hands the failure to a caller-supplied function.
//!
//! ## Re-raise semantics
//! ```text
//! async publish ──► job on independent task ──► policy returns Err ──► task panics with full context
//! sync publish  ──► job on calling thread    ──► policy returns Err ──► collected into DispatchError
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use topicvisor::{FailurePolicy, Observer};
//!
//! let dead_letters = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&dead_letters);
//!
//! let observer: Observer = Observer::builder()
//!     .with_failure_policy(FailurePolicy::custom(move |failure| {
//!         sink.lock().unwrap().push(failure.topic.clone());
//!         Ok(())
//!     }))
//!     .build();
//!
//! observer.subscribe_fn("jobs", |_n: u32| -> () { panic!("boom") });
//! observer.sync_publish("jobs", (), (1u32,)).unwrap();
//! assert_eq!(dead_letters.lock().unwrap().as_slice(), ["jobs".to_string()]);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{error, warn};

use crate::error::HandlerFailure;

type FailureFn<E> = dyn Fn(HandlerFailure<E>) -> Result<(), HandlerFailure<E>> + Send + Sync;

/// What to do with a failed handler invocation.
pub enum FailurePolicy<E> {
    /// Log at `error` level and re-raise the failure (default).
    Reraise,
    /// Log at `warn` level and continue.
    Log,
    /// Hand the failure to a caller-supplied function.
    ///
    /// Returning `Err` re-raises; returning `Ok(())` swallows the failure.
    Custom(Arc<FailureFn<E>>),
}

impl<E> FailurePolicy<E> {
    /// Wraps a closure as a policy.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(HandlerFailure<E>) -> Result<(), HandlerFailure<E>> + Send + Sync + 'static,
    {
        FailurePolicy::Custom(Arc::new(f))
    }
}

impl<E: fmt::Debug> FailurePolicy<E> {
    /// Applies the policy; `Err` means the failure is re-raised.
    pub(crate) fn handle(&self, failure: HandlerFailure<E>) -> Result<(), HandlerFailure<E>> {
        match self {
            FailurePolicy::Reraise => {
                error!(
                    topic = %failure.topic,
                    handler = %failure.handler,
                    callable = failure.callable,
                    extra = ?failure.extra,
                    args = ?failure.args,
                    cause = %failure.cause,
                    label = failure.as_label(),
                    "handler failed"
                );
                Err(failure)
            }
            FailurePolicy::Log => {
                warn!(
                    topic = %failure.topic,
                    handler = %failure.handler,
                    cause = %failure.cause,
                    label = failure.as_label(),
                    "handler failed; continuing"
                );
                Ok(())
            }
            FailurePolicy::Custom(f) => f(failure),
        }
    }
}

impl<E> Default for FailurePolicy<E> {
    /// Returns [`FailurePolicy::Reraise`].
    fn default() -> Self {
        FailurePolicy::Reraise
    }
}

impl<E> Clone for FailurePolicy<E> {
    fn clone(&self) -> Self {
        match self {
            FailurePolicy::Reraise => FailurePolicy::Reraise,
            FailurePolicy::Log => FailurePolicy::Log,
            FailurePolicy::Custom(f) => FailurePolicy::Custom(Arc::clone(f)),
        }
    }
}

impl<E> fmt::Debug for FailurePolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Reraise => f.write_str("Reraise"),
            FailurePolicy::Log => f.write_str("Log"),
            FailurePolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
