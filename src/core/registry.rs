//! # Handler registry - topic to ordered handlers.
//!
//! The registry is the only mutable state shared between subscribers and
//! publishers. A single reader/writer lock guards the whole map: publishes
//! take brief read locks to snapshot a topic, subscribe/unsubscribe take the
//! write lock.
//!
//! ## Architecture
//! ```text
//! Observer::subscribe*()  ──► insert(topic, handler)   (write lock, dedup by id)
//! Subscription::cancel()  ──► remove(topic, id)        (write lock, first match)
//! Observer::publish*()    ──► snapshot(topic)          (read lock, copy-on-read)
//! Observer::for_each()    ──► for_each(fn)             (read lock, then fn unlocked)
//! ```
//!
//! ## Rules
//! - Insertion order is preserved per topic
//! - No two handlers with the same [`HandlerId`] live under one topic
//! - A topic whose last handler is removed is deleted from the map
//! - Snapshots are independent: later mutations never show through them

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handlers::{Handler, HandlerId};

/// Concurrency-safe map of topic to ordered handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    topics: RwLock<HashMap<String, Vec<Arc<Handler>>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to `topic` unless a handler with the same id is already there.
    ///
    /// Returns `true` if the handler was inserted.
    pub fn insert(&self, topic: &str, handler: Arc<Handler>) -> bool {
        let mut topics = self.topics.write();
        let handlers = topics.entry(topic.to_string()).or_default();
        if handlers.iter().any(|h| h.is_same(&handler)) {
            return false;
        }
        handlers.push(handler);
        true
    }

    /// Removes the first handler under `topic` whose id equals `id`.
    ///
    /// Relative order of the remaining handlers is preserved; the topic is
    /// deleted once empty. Returns `true` if a handler was removed.
    pub fn remove(&self, topic: &str, id: &HandlerId) -> bool {
        let mut topics = self.topics.write();
        let Some(handlers) = topics.get_mut(topic) else {
            return false;
        };
        let Some(pos) = handlers.iter().position(|h| h.id() == id) else {
            return false;
        };
        handlers.remove(pos);
        if handlers.is_empty() {
            topics.remove(topic);
        }
        true
    }

    /// Returns an independent copy of the handlers currently registered for `topic`.
    pub fn snapshot(&self, topic: &str) -> Vec<Arc<Handler>> {
        self.topics.read().get(topic).cloned().unwrap_or_default()
    }

    /// Calls `f` for every (topic, handlers) pair.
    ///
    /// All topics are snapshotted under the read lock and `f` runs after it is
    /// released, so `f` may subscribe or unsubscribe without deadlocking.
    /// Topics are visited in sorted order.
    pub fn for_each(&self, mut f: impl FnMut(&str, &[Arc<Handler>])) {
        let mut entries: Vec<(String, Vec<Arc<Handler>>)> = {
            let topics = self.topics.read();
            topics
                .iter()
                .map(|(topic, handlers)| (topic.clone(), handlers.clone()))
                .collect()
        };
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        for (topic, handlers) in &entries {
            f(topic, handlers);
        }
    }

    /// Returns sorted list of topics with at least one handler.
    pub fn topics(&self) -> Vec<String> {
        let topics = self.topics.read();
        let mut names: Vec<String> = topics.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of handlers registered for `topic`.
    pub fn len(&self, topic: &str) -> usize {
        self.topics.read().get(topic).map(Vec::len).unwrap_or(0)
    }

    /// Returns true if no topic has handlers.
    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Callback;

    fn handler(id: &'static str) -> Arc<Handler> {
        Arc::new(Handler::new(HandlerId::named(id), Callback::new(|| ())))
    }

    fn ids(handlers: &[Arc<Handler>]) -> Vec<String> {
        handlers.iter().map(|h| h.id().to_string()).collect()
    }

    #[test]
    fn test_insert_dedups_by_id() {
        let reg = HandlerRegistry::new();
        assert!(reg.insert("x", handler("a")));
        assert!(!reg.insert("x", handler("a")));
        assert!(reg.insert("x", handler("b")));
        assert_eq!(reg.len("x"), 2);
    }

    #[test]
    fn test_same_id_on_different_topics() {
        let reg = HandlerRegistry::new();
        assert!(reg.insert("x", handler("a")));
        assert!(reg.insert("y", handler("a")));
        assert_eq!(reg.topics(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_remove_preserves_order_and_drops_empty_topic() {
        let reg = HandlerRegistry::new();
        reg.insert("x", handler("a"));
        reg.insert("x", handler("b"));
        reg.insert("x", handler("c"));

        assert!(reg.remove("x", &HandlerId::named("b")));
        assert_eq!(ids(&reg.snapshot("x")), vec!["named:a", "named:c"]);

        assert!(!reg.remove("x", &HandlerId::named("b")));
        assert!(reg.remove("x", &HandlerId::named("a")));
        assert!(reg.remove("x", &HandlerId::named("c")));
        assert!(reg.topics().is_empty());
        assert!(reg.is_empty());
        assert!(!reg.remove("x", &HandlerId::named("c")));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let reg = HandlerRegistry::new();
        reg.insert("x", handler("a"));
        let snap = reg.snapshot("x");

        reg.insert("x", handler("b"));
        reg.remove("x", &HandlerId::named("a"));

        assert_eq!(ids(&snap), vec!["named:a"]);
        assert_eq!(ids(&reg.snapshot("x")), vec!["named:b"]);
        assert!(reg.snapshot("missing").is_empty());
    }

    #[test]
    fn test_for_each_allows_reentrant_mutation() {
        let reg = HandlerRegistry::new();
        reg.insert("x", handler("a"));
        reg.insert("y", handler("b"));

        let mut seen = Vec::new();
        reg.for_each(|topic, handlers| {
            seen.push((topic.to_string(), handlers.len()));
            reg.remove(topic, handlers[0].id());
        });

        assert_eq!(seen, vec![("x".to_string(), 1), ("y".to_string(), 1)]);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_concurrent_inserts() {
        let reg = Arc::new(HandlerRegistry::new());
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let id = HandlerId::named(format!("{i}-{j}"));
                        reg.insert("t", Arc::new(Handler::new(id, Callback::new(|| ()))));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(reg.len("t"), 400);
    }
}
