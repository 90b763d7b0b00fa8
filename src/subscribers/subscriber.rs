//! # Subscriber capability trait.
//!
//! Provides [`Subscriber`], the extension point through which a value tells the
//! observer *which topic* it listens on and *which callback* to invoke.
//!
//! ## Resolution order
//! ```text
//! 1) topic() + callback()                        → both capabilities present, done
//! 2) event_fields().find(name == cfg.event_field)
//!      ├─ topic:  topic()    or field.topic      (else MissingTopic)
//!      └─ callback: callback() or notice(field.notice) (else MissingNotice / NoticeNotFound)
//! ```
//! Failures abort the subscribe call; an inert subscriber is never registered.
//!
//! ## Identity
//! By default every instance of one type shares a [`HandlerId`]: subscribing a
//! second instance of the same type on the same topic is a no-op. Override
//! [`Subscriber::handler_id`] to key on instance identity instead.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use topicvisor::{Callback, EventField, Observer, Subscriber};
//!
//! struct Person {
//!     name: String,
//! }
//!
//! impl Person {
//!     fn say(&self, pain: u32) {
//!         println!("{} says ouch x{pain}", self.name);
//!     }
//! }
//!
//! impl Subscriber for Person {
//!     fn event_fields(&self) -> Vec<EventField> {
//!         vec![EventField::new("event").topic("pain").notice("say")]
//!     }
//!
//!     fn notice(self: Arc<Self>, name: &str) -> Option<Callback> {
//!         match name {
//!             "say" => Some(Callback::new(move |pain: u32| self.say(pain))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let observer: Observer = Observer::new();
//! let sub = observer.subscribe(Arc::new(Person { name: "Ming".into() })).unwrap();
//! assert_eq!(sub.topic(), "pain");
//! observer.sync_publish("pain", (), (3u32,)).unwrap();
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::handlers::{Callback, HandlerId};

/// A value that can be subscribed to an observer.
///
/// All methods have defaults; implement the capabilities the subscriber has.
pub trait Subscriber: Send + Sync + 'static {
    /// Topic capability: the topic this subscriber listens on.
    ///
    /// Empty topics are treated as absent.
    fn topic(&self) -> Option<Cow<'static, str>> {
        None
    }

    /// Callback capability: the callable to invoke on publish.
    fn callback(self: Arc<Self>) -> Option<Callback> {
        None
    }

    /// Tag fields carrying fallback `topic`/`notice` metadata.
    fn event_fields(&self) -> Vec<EventField> {
        Vec::new()
    }

    /// Callback table for `notice` names declared in [`Subscriber::event_fields`].
    fn notice(self: Arc<Self>, name: &str) -> Option<Callback> {
        let _ = name;
        None
    }

    /// Identity used for deduplication and removal.
    ///
    /// Defaults to the subscriber's type.
    fn handler_id(&self) -> HandlerId {
        HandlerId::of::<Self>()
    }
}

/// Tag metadata attached to a named field of a subscriber.
///
/// Carries the `topic` to listen on and the `notice` name of the callback to
/// look up through [`Subscriber::notice`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventField {
    name: Cow<'static, str>,
    topic: Option<Cow<'static, str>>,
    notice: Option<Cow<'static, str>>,
}

impl EventField {
    /// Creates a field descriptor with no metadata.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            topic: None,
            notice: None,
        }
    }

    /// Sets the `topic` metadata.
    pub fn topic(mut self, topic: impl Into<Cow<'static, str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets the `notice` (callback name) metadata.
    pub fn notice(mut self, notice: impl Into<Cow<'static, str>>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `topic` metadata, if any.
    pub fn topic_tag(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// `notice` metadata, if any.
    pub fn notice_tag(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}
