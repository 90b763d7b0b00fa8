//! # Observer configuration.
//!
//! Provides [`Config`] centralized settings for one [`Observer`](crate::Observer).
//!
//! Every observer owns its own config; there is no process-wide state, so
//! observers with different policies can coexist.

use std::borrow::Cow;
use std::fmt;

use crate::policies::{ExecStrategy, FailurePolicy};

/// Default name of the tag field used as fallback topic/callback metadata.
pub const DEFAULT_EVENT_FIELD: &str = "event";

/// Configuration for one observer.
///
/// ## Field semantics
/// - `event_field`: name of the [`EventField`](crate::EventField) consulted when a
///   subscriber does not provide both a topic and a callback capability
/// - `failure`: what to do with a failed invocation
/// - `async_exec`: where asynchronous invocations run
/// - `sync_exec`: where synchronous invocations run
pub struct Config<E> {
    /// Name of the tag field carrying `topic`/`notice` metadata.
    pub event_field: Cow<'static, str>,

    /// Failure policy applied to every failed invocation.
    pub failure: FailurePolicy<E>,

    /// Strategy for `publish` / `publish_with_ret`.
    pub async_exec: ExecStrategy<E>,

    /// Strategy for `sync_publish` / `sync_publish_with_ret`.
    pub sync_exec: ExecStrategy<E>,
}

impl<E> Default for Config<E> {
    /// Default configuration:
    ///
    /// - `event_field = "event"`
    /// - `failure = FailurePolicy::Reraise`
    /// - `async_exec = ExecStrategy::Spawn`
    /// - `sync_exec = ExecStrategy::Inline`
    fn default() -> Self {
        Self {
            event_field: Cow::Borrowed(DEFAULT_EVENT_FIELD),
            failure: FailurePolicy::Reraise,
            async_exec: ExecStrategy::Spawn,
            sync_exec: ExecStrategy::Inline,
        }
    }
}

impl<E> Clone for Config<E> {
    fn clone(&self) -> Self {
        Self {
            event_field: self.event_field.clone(),
            failure: self.failure.clone(),
            async_exec: self.async_exec.clone(),
            sync_exec: self.sync_exec.clone(),
        }
    }
}

impl<E> fmt::Debug for Config<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("event_field", &self.event_field)
            .field("failure", &self.failure)
            .field("async_exec", &self.async_exec)
            .field("sync_exec", &self.sync_exec)
            .finish()
    }
}
