//! # Subscriber capability discovery.
//!
//! This module provides the [`Subscriber`] trait and the resolution step that
//! turns a subscriber value into a topic, a handler identity and a callback.
//! Resolution runs once, at subscribe time; the dispatch engine only ever sees
//! the resolved [`Handler`](crate::Handler).
//!
//! ## Architecture
//! ```text
//! Observer::subscribe(Arc<S>)
//!     │
//!     └──► resolve(subscriber, cfg.event_field)
//!               ├─ Subscriber::topic() / callback()          (capabilities)
//!               ├─ Subscriber::event_fields() → EventField   (tag fallback)
//!               └─ Subscriber::notice(name)                  (typed callback table)
//!                        │
//!                        ▼
//!               (topic, HandlerId, Callback) ──► HandlerRegistry::insert
//! ```
//!
//! Any other discovery mechanism can bypass this module entirely through
//! [`Observer::subscribe_keyed`](crate::Observer::subscribe_keyed).

mod resolve;
mod subscriber;

pub(crate) use resolve::resolve;
pub use subscriber::{EventField, Subscriber};
