use std::borrow::Cow;

use super::{config::Config, observer::Extra, observer::Observer};
use crate::policies::{ExecStrategy, FailurePolicy};

/// Builder for constructing an [`Observer`] with custom policies.
pub struct ObserverBuilder<E> {
    cfg: Config<E>,
}

impl<E: Extra> ObserverBuilder<E> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config<E>) -> Self {
        Self { cfg }
    }

    /// Sets the name of the tag field used as fallback topic/callback metadata.
    pub fn with_event_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        self.cfg.event_field = field.into();
        self
    }

    /// Sets the policy applied to failed invocations.
    pub fn with_failure_policy(mut self, policy: FailurePolicy<E>) -> Self {
        self.cfg.failure = policy;
        self
    }

    /// Sets the strategy for asynchronous invocations.
    pub fn with_async_exec(mut self, exec: ExecStrategy<E>) -> Self {
        self.cfg.async_exec = exec;
        self
    }

    /// Sets the strategy for synchronous invocations.
    pub fn with_sync_exec(mut self, exec: ExecStrategy<E>) -> Self {
        self.cfg.sync_exec = exec;
        self
    }

    /// Builds and returns the observer.
    pub fn build(self) -> Observer<E> {
        Observer::with_config(self.cfg)
    }
}

impl<E: Extra> Default for ObserverBuilder<E> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
