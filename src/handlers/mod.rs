//! # Handlers, callables and argument lists.
//!
//! This module provides the leaf types of the dispatcher:
//! - [`Handler`] - a registered (identity, callback) pair
//! - [`HandlerId`] - the identity used for deduplication and removal
//! - [`Callback`] / [`IntoCallback`] - type-erased handler callables
//! - [`Args`] / [`IntoArgs`] - the argument list of one published event
//! - [`ResultSink`] / [`IntoResultSink`] - receivers of handler return values

mod args;
mod callback;
mod handler;
mod sink;

pub use args::{ArgValue, Args, IntoArgs};
pub use callback::{Callback, IntoCallback, ReturnValue};
pub use handler::{Handler, HandlerId};
pub use sink::{IntoResultSink, ResultSink};
