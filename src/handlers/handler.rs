//! # Handler identity and the registered handler itself.
//!
//! A [`Handler`] pairs a [`HandlerId`] with the [`Callback`] to invoke.
//! Two handlers are considered the same when their ids are equal; the registry
//! relies on this for deduplication on insert and for targeted removal.
//!
//! ## Identity kinds
//! ```text
//! HandlerId::Type  ← default for Subscriber values (declared type, not instance)
//! HandlerId::Named ← caller-supplied stable identity (instance handle, explicit id)
//! HandlerId::Func  ← bare callables; unique per registration, never deduplicated
//! ```

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

use crate::error::SignatureError;
use crate::handlers::args::Args;
use crate::handlers::callback::{Callback, ReturnValue};

/// Identity used to deduplicate and remove handlers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandlerId {
    /// Keyed on a subscriber's declared type.
    ///
    /// Two distinct instances of the same type collapse into one registration.
    Type {
        /// Type id of the subscriber.
        id: TypeId,
        /// Type name, for diagnostics.
        name: &'static str,
    },
    /// Keyed on a caller-supplied name.
    Named(Cow<'static, str>),
    /// A bare callable registered under an explicit topic.
    Func {
        /// Per-observer registration sequence.
        seq: u64,
        /// Type name of the callable, for diagnostics.
        name: &'static str,
    },
}

impl HandlerId {
    /// Type-keyed identity for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        HandlerId::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Caller-supplied identity.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        HandlerId::Named(name.into())
    }

    pub(crate) fn func(seq: u64, name: &'static str) -> Self {
        HandlerId::Func { seq, name }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerId::Type { name, .. } => write!(f, "type:{name}"),
            HandlerId::Named(name) => write!(f, "named:{name}"),
            HandlerId::Func { seq, .. } => write!(f, "func#{seq}"),
        }
    }
}

/// A registered callback bound to an identity.
///
/// Immutable once constructed. The registry hands out `Arc<Handler>` snapshots,
/// so an in-flight dispatch keeps its handlers alive after they are removed.
#[derive(Debug)]
pub struct Handler {
    id: HandlerId,
    callback: Callback,
}

impl Handler {
    /// Creates a handler from an identity and a callback.
    pub fn new(id: HandlerId, callback: Callback) -> Self {
        Self { id, callback }
    }

    /// Returns the identity of this handler.
    #[inline]
    pub fn id(&self) -> &HandlerId {
        &self.id
    }

    /// Returns the callback of this handler.
    #[inline]
    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// True if `other` has the same identity.
    #[inline]
    pub fn is_same(&self, other: &Handler) -> bool {
        self.id == other.id
    }

    pub(crate) fn call(&self, args: &Args) -> Result<ReturnValue, SignatureError> {
        self.callback.call(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person;
    struct Robot;

    #[test]
    fn test_type_identity_ignores_instance() {
        assert_eq!(HandlerId::of::<Person>(), HandlerId::of::<Person>());
        assert_ne!(HandlerId::of::<Person>(), HandlerId::of::<Robot>());
    }

    #[test]
    fn test_same_compares_ids_only() {
        let a = Handler::new(HandlerId::named("a"), Callback::new(|| 1));
        let b = Handler::new(HandlerId::named("a"), Callback::new(|x: i32| x));
        let c = Handler::new(HandlerId::func(1, "f"), Callback::new(|| 1));
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
    }

    #[test]
    fn test_display() {
        assert_eq!(HandlerId::named("audit").to_string(), "named:audit");
        assert_eq!(HandlerId::func(3, "f").to_string(), "func#3");
        assert!(HandlerId::of::<Person>().to_string().starts_with("type:"));
    }
}
