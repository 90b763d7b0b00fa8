//! # One handler invocation.
//!
//! An [`Invocation`] is everything needed to run one handler of one publish:
//! the handler itself, the shared argument list, the optional result sink, the
//! failure policy and the completion guard. It is built on the publishing
//! thread and moved into whatever context the execution strategy picks.
//!
//! ## Flow
//! ```text
//! handler.call(args)  ── panic ────────────► FailureCause::Panicked
//!        │            ── Err(signature) ───► FailureCause::Signature
//!        ▼ Ok(ret)
//! sink.deliver(ret)   ── panic ────────────► FailureCause::SinkPanicked
//!        │            ── Err(signature) ───► FailureCause::Signature
//!        ▼
//!      Ok(())                                 failure ──► policy.handle(..)
//!
//! drop(guard) on every exit path
//! ```
//!
//! ## Rules
//! - Panics never escape [`Invocation::run`]; only the policy's verdict does.
//! - The guard is released before the caller decides what to do with the verdict.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::core::barrier::BarrierGuard;
use crate::error::{FailureCause, HandlerFailure};
use crate::handlers::{Args, Handler, ResultSink};
use crate::policies::FailurePolicy;

pub(crate) struct Invocation<E> {
    pub topic: Arc<str>,
    pub extra: E,
    pub handler: Arc<Handler>,
    pub args: Args,
    pub sink: Option<ResultSink>,
    pub policy: FailurePolicy<E>,
    pub guard: BarrierGuard,
}

impl<E: std::fmt::Debug> Invocation<E> {
    /// Runs the handler (and sink), routing any failure through the policy.
    ///
    /// Returns `Err` only if the policy re-raised.
    pub fn run(self) -> Result<(), HandlerFailure<E>> {
        let Invocation {
            topic,
            extra,
            handler,
            args,
            sink,
            policy,
            guard: _guard,
        } = self;

        let cause = match catch_unwind(AssertUnwindSafe(|| handler.call(&args))) {
            Err(payload) => FailureCause::Panicked(panic_message(payload.as_ref())),
            Ok(Err(signature)) => FailureCause::Signature(signature),
            Ok(Ok(ret)) => {
                let Some(sink) = sink else {
                    return Ok(());
                };
                match catch_unwind(AssertUnwindSafe(|| sink.deliver(ret))) {
                    Ok(Ok(())) => return Ok(()),
                    Ok(Err(signature)) => FailureCause::Signature(signature),
                    Err(payload) => FailureCause::SinkPanicked(panic_message(payload.as_ref())),
                }
            }
        };

        policy.handle(HandlerFailure {
            topic: topic.to_string(),
            extra,
            handler: handler.id().clone(),
            callable: handler.callback().type_name(),
            args,
            cause,
        })
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
