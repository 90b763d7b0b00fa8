//! # topicvisor
//!
//! **Topicvisor** is an in-process, topic-based publish/subscribe dispatcher.
//!
//! Subscribers register a callback under a string topic; publishers fan an
//! event (a list of arguments plus an extra context value) out to every
//! callback currently registered for that topic, either asynchronously on
//! independent tasks or synchronously on the calling thread.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐
//!  │  Subscriber  │   │  Subscriber  │   │  bare callable       │
//!  │ (capability) │   │ (tag fields) │   │  (topic, Fn(..))     │
//!  └──────┬───────┘   └──────┬───────┘   └──────────┬───────────┘
//!         ▼                  ▼                      │
//!    resolve(subscriber, cfg.event_field)           │
//!         │                                         │
//!         └───────────► (topic, HandlerId, Callback)◄┘
//!                                 │
//!                                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Observer                                                         │
//! │  - HandlerRegistry (topic → [Handler], RwLock, dedup by id)       │
//! │  - CompletionBarrier (outstanding invocations, async wait)        │
//! │  - Config (event field, failure policy, async/sync strategies)    │
//! └──────┬───────────────────────────────────────────────┬────────────┘
//!        │ publish / publish_with_ret                    │ sync_publish*
//!        ▼                                               ▼
//!  snapshot(topic) ─► [H1 .. HN]                   snapshot(topic) ─► [H1 .. HN]
//!        │                                               │
//!        ▼                                               ▼
//!  ExecStrategy::Spawn (one task per handler)      ExecStrategy::Inline (in order)
//!        │                                               │
//!        ▼                                               ▼
//!  catch_unwind(Hi(args)) ─► sink(ret)? ─► FailurePolicy on failure
//! ```
//!
//! ### Lifecycle of one handler
//! ```text
//! subscribe ──► HandlerRegistry::insert (no-op if same id already present)
//!                     │
//!                     └─► Subscription { topic, id }
//!
//! publish   ──► snapshot ──► invoke (isolated) ──► barrier -1
//!
//! cancel    ──► HandlerRegistry::remove (idempotent; in-flight snapshots still deliver)
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                               |
//! |-------------------|----------------------------------------------------------------|--------------------------------------------------|
//! | **Dispatch**      | Subscribe, publish (async/sync, with results) and wait.        | [`Observer`], [`Subscription`]                   |
//! | **Subscribers**   | Capability discovery with tag-field fallback.                  | [`Subscriber`], [`EventField`]                   |
//! | **Handlers**      | Type-erased callables, argument lists and result sinks.        | [`Callback`], [`Args`], [`ResultSink`]           |
//! | **Policies**      | Where invocations run and what happens when they fail.         | [`ExecStrategy`], [`FailurePolicy`]              |
//! | **Errors**        | Typed errors for subscription, signatures and dispatch.        | [`SubscribeError`], [`DispatchError`]            |
//! | **Configuration** | Per-observer settings, no global state.                        | [`Config`], [`ObserverBuilder`]                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use topicvisor::{FailurePolicy, Observer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let observer: Observer<&'static str> = Observer::builder()
//!         .with_failure_policy(FailurePolicy::Log)
//!         .build();
//!
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!     let s = Arc::clone(&seen);
//!     let sub = observer.subscribe_fn("greet", move |name: String, age: u32| {
//!         s.lock().push(format!("{name} is {age}"));
//!     });
//!
//!     // Asynchronous fan-out, then wait for every invocation to finish.
//!     observer.publish("greet", "req-1", ("Axing".to_string(), 24u32));
//!     observer.wait().await;
//!
//!     // Synchronous fan-out: handlers have run when this returns.
//!     observer.sync_publish("greet", "req-2", ("Ming".to_string(), 30u32)).unwrap();
//!     assert_eq!(seen.lock().len(), 2);
//!
//!     sub.cancel();
//!     assert_eq!(observer.handler_count("greet"), 0);
//! }
//! ```
mod core;
mod error;
mod handlers;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use core::{
    BarrierGuard, CompletionBarrier, Config, Extra, HandlerRegistry, Observer, ObserverBuilder,
    Subscription, DEFAULT_EVENT_FIELD,
};
pub use error::{DispatchError, FailureCause, HandlerFailure, SignatureError, SubscribeError};
pub use handlers::{
    ArgValue, Args, Callback, Handler, HandlerId, IntoArgs, IntoCallback, IntoResultSink,
    ResultSink, ReturnValue,
};
pub use policies::{ExecStrategy, FailurePolicy, Job};
pub use subscribers::{EventField, Subscriber};
