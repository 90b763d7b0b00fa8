//! # Subscription tokens.
//!
//! A [`Subscription`] is the deregistration capability returned by every
//! subscribe call. It captures (topic, handler id) and a weak reference to the
//! registry: holding it never keeps a handler or the observer alive.

use std::sync::{Arc, Weak};

use tracing::debug;

use super::registry::HandlerRegistry;
use crate::handlers::HandlerId;

/// Deregistration capability for one handler.
///
/// Dropping a subscription does **not** unsubscribe; call [`Subscription::cancel`].
#[derive(Clone, Debug)]
pub struct Subscription {
    topic: String,
    id: HandlerId,
    registry: Weak<HandlerRegistry>,
}

impl Subscription {
    pub(crate) fn new(topic: String, id: HandlerId, registry: &Arc<HandlerRegistry>) -> Self {
        Self {
            topic,
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// Topic the handler was registered under.
    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Identity of the registered handler.
    #[inline]
    pub fn id(&self) -> &HandlerId {
        &self.id
    }

    /// Removes the handler from its topic.
    ///
    /// Idempotent: later calls are no-ops. Publishes already in flight keep
    /// their own snapshot and still deliver to the handler. Returns `true` if
    /// this call removed it.
    pub fn cancel(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.remove(&self.topic, &self.id);
        debug!(topic = %self.topic, handler = %self.id, removed, "subscription cancelled");
        removed
    }
}
