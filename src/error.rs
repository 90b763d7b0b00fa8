//! Error types used by the observer and its handlers.
//!
//! This module defines the error enums surfaced by the dispatcher:
//!
//! - [`SubscribeError`] - a subscriber could not be resolved to a topic and callback.
//! - [`SignatureError`] - published arguments or a result sink do not match a handler.
//! - [`FailureCause`] - why a single handler invocation failed.
//! - [`HandlerFailure`] - one failed invocation with its full diagnostic context.
//! - [`DispatchError`] - failures collected by a synchronous publish.
//!
//! All types provide `as_label` for logging/metrics.

use std::fmt;

use thiserror::Error;

use crate::handlers::{Args, HandlerId};

/// # Errors produced while resolving a subscriber.
///
/// These are configuration errors: they are reported at subscribe time and
/// never deferred to publish time.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// Neither capability resolved and the subscriber declares no tag field with the configured name.
    #[error("{subscriber} has no `{field}` event field")]
    MissingEventField {
        /// Type name of the subscriber.
        subscriber: &'static str,
        /// The configured event field name.
        field: String,
    },

    /// The event field carries no `topic` metadata and no topic capability is provided.
    #[error("{subscriber}.{field} has no topic in its tag")]
    MissingTopic {
        /// Type name of the subscriber.
        subscriber: &'static str,
        /// The configured event field name.
        field: String,
    },

    /// The event field carries no `notice` metadata and no callback capability is provided.
    #[error("{subscriber}.{field} has no notice in its tag")]
    MissingNotice {
        /// Type name of the subscriber.
        subscriber: &'static str,
        /// The configured event field name.
        field: String,
    },

    /// The tag names a notice that the subscriber does not expose.
    #[error("notice `{notice}` does not exist in {subscriber}")]
    NoticeNotFound {
        /// Type name of the subscriber.
        subscriber: &'static str,
        /// The notice name taken from the tag.
        notice: String,
    },
}

impl SubscribeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicvisor::SubscribeError;
    ///
    /// let err = SubscribeError::NoticeNotFound { subscriber: "Person", notice: "say".into() };
    /// assert_eq!(err.as_label(), "subscribe_notice_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscribeError::MissingEventField { .. } => "subscribe_missing_event_field",
            SubscribeError::MissingTopic { .. } => "subscribe_missing_topic",
            SubscribeError::MissingNotice { .. } => "subscribe_missing_notice",
            SubscribeError::NoticeNotFound { .. } => "subscribe_notice_not_found",
        }
    }
}

/// # Signature mismatch between a call site and a handler.
///
/// The dispatcher performs no coercion: arguments must match the handler's
/// parameters positionally and by exact type, and a result sink must accept
/// exactly what the handler returns.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The number of published arguments differs from the handler's parameter count.
    #[error("expected {expected} argument(s), got {found}")]
    Arity {
        /// Parameters declared by the handler.
        expected: usize,
        /// Arguments supplied by the publisher.
        found: usize,
    },

    /// A published argument has a different type than the handler parameter.
    #[error("argument {index}: expected `{expected}`, got `{found}`")]
    ArgType {
        /// Zero-based argument position.
        index: usize,
        /// Parameter type declared by the handler.
        expected: &'static str,
        /// Type of the published value.
        found: &'static str,
    },

    /// The result sink does not accept what the handler returned.
    #[error("result sink expects `{expected}`, handler returned `{found}`")]
    ReturnType {
        /// Shape accepted by the sink.
        expected: &'static str,
        /// Type returned by the handler.
        found: &'static str,
    },
}

impl SignatureError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SignatureError::Arity { .. } => "signature_arity",
            SignatureError::ArgType { .. } => "signature_arg_type",
            SignatureError::ReturnType { .. } => "signature_return_type",
        }
    }
}

/// # Why a single handler invocation failed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// The call could not be made (arguments or sink shape mismatch).
    #[error("signature mismatch: {0}")]
    Signature(#[from] SignatureError),

    /// The handler returned, but the result sink panicked.
    #[error("result sink panicked: {0}")]
    SinkPanicked(String),
}

impl FailureCause {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicvisor::FailureCause;
    ///
    /// assert_eq!(FailureCause::Panicked("boom".into()).as_label(), "handler_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureCause::Panicked(_) => "handler_panicked",
            FailureCause::Signature(e) => e.as_label(),
            FailureCause::SinkPanicked(_) => "sink_panicked",
        }
    }
}

/// # One failed handler invocation.
///
/// Carries everything needed to diagnose the fault: the topic, the extra
/// context supplied by the publisher, the handler identity and callable type,
/// the original arguments and the underlying cause.
#[derive(Debug, Clone)]
pub struct HandlerFailure<E> {
    /// Topic the event was published on.
    pub topic: String,
    /// Extra context supplied by the publisher.
    pub extra: E,
    /// Identity of the failed handler.
    pub handler: HandlerId,
    /// Type name of the handler's callable.
    pub callable: &'static str,
    /// The arguments the handler was invoked with.
    pub args: Args,
    /// The underlying cause.
    pub cause: FailureCause,
}

impl<E> HandlerFailure<E> {
    /// Returns the label of the underlying cause.
    pub fn as_label(&self) -> &'static str {
        self.cause.as_label()
    }
}

impl<E: fmt::Debug> fmt::Display for HandlerFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handler {} ({}) on topic {:?} failed: {}; extra={:?} args={:?}",
            self.handler, self.callable, self.topic, self.cause, self.extra, self.args
        )
    }
}

impl<E: fmt::Debug> std::error::Error for HandlerFailure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// # Errors returned by synchronous publishes.
///
/// A synchronous publish always runs every handler in its snapshot; failures
/// re-raised by the failure policy are collected and returned together.
#[non_exhaustive]
#[derive(Debug)]
pub enum DispatchError<E> {
    /// One or more handlers failed and the failure policy re-raised them.
    HandlersFailed {
        /// Topic the event was published on.
        topic: String,
        /// Number of handlers in the snapshot.
        total: usize,
        /// Re-raised failures, in snapshot order.
        failures: Vec<HandlerFailure<E>>,
    },
}

impl<E> DispatchError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::HandlersFailed { .. } => "dispatch_handlers_failed",
        }
    }

    /// Returns the collected failures.
    pub fn failures(&self) -> &[HandlerFailure<E>] {
        match self {
            DispatchError::HandlersFailed { failures, .. } => failures,
        }
    }

    /// Consumes the error and returns the collected failures.
    pub fn into_failures(self) -> Vec<HandlerFailure<E>> {
        match self {
            DispatchError::HandlersFailed { failures, .. } => failures,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for DispatchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::HandlersFailed {
                topic,
                total,
                failures,
            } => {
                write!(
                    f,
                    "{} of {} handler(s) failed on topic {:?}",
                    failures.len(),
                    total,
                    topic
                )?;
                for failure in failures {
                    write!(f, "\n  - {failure}")?;
                }
                Ok(())
            }
        }
    }
}

impl<E: fmt::Debug> std::error::Error for DispatchError<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::IntoArgs;

    #[test]
    fn test_signature_labels() {
        let err = SignatureError::Arity {
            expected: 2,
            found: 1,
        };
        assert_eq!(err.as_label(), "signature_arity");
        assert_eq!(err.to_string(), "expected 2 argument(s), got 1");

        let cause = FailureCause::from(err);
        assert_eq!(cause.as_label(), "signature_arity");
    }

    #[test]
    fn test_handler_failure_display_carries_context() {
        let failure = HandlerFailure {
            topic: "pain".to_string(),
            extra: 7u8,
            handler: HandlerId::named("person"),
            callable: "closure",
            args: (42i32, "x").into_args(),
            cause: FailureCause::Panicked("boom".to_string()),
        };
        let text = failure.to_string();
        assert!(text.contains("\"pain\""));
        assert!(text.contains("person"));
        assert!(text.contains("boom"));
        assert!(text.contains("42"));
        assert!(text.contains("extra=7"));
    }

    #[test]
    fn test_dispatch_error_lists_failures() {
        let failure = HandlerFailure {
            topic: "t".to_string(),
            extra: (),
            handler: HandlerId::named("a"),
            callable: "closure",
            args: Args::default(),
            cause: FailureCause::Panicked("boom".to_string()),
        };
        let err = DispatchError::HandlersFailed {
            topic: "t".to_string(),
            total: 3,
            failures: vec![failure],
        };
        assert_eq!(err.as_label(), "dispatch_handlers_failed");
        assert!(err.to_string().starts_with("1 of 3 handler(s) failed"));
        assert_eq!(err.failures().len(), 1);
    }
}
