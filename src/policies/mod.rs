//! Execution and failure policies.
//!
//! This module groups the knobs that control **where** a handler invocation
//! runs and **what happens** when it fails.
//!
//! ## Contents
//! - [`ExecStrategy`] where one invocation runs (spawned / inline / custom)
//! - [`FailurePolicy`] what to do with a failed invocation (re-raise / log / custom)
//! - [`Job`] one prepared invocation handed to a strategy
//!
//! ## Quick wiring
//! ```text
//! Config { async_exec, sync_exec, failure, .. }
//!      └─► Observer::publish*      → async_exec.run(topic, extra, job)
//!      └─► Observer::sync_publish* → sync_exec.run(topic, extra, job)
//!                                      └─► job: call handler → on failure: failure.handle(..)
//! ```
//!
//! ## Defaults
//! - `async_exec = ExecStrategy::Spawn`
//! - `sync_exec = ExecStrategy::Inline`
//! - `failure = FailurePolicy::Reraise`

mod exec;
mod failure;

pub use exec::{ExecStrategy, Job};
pub use failure::FailurePolicy;
