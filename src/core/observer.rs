//! # Observer: topic registry, fan-out dispatch and completion tracking.
//!
//! The [`Observer`] owns a [`HandlerRegistry`], a [`CompletionBarrier`] and its
//! own [`Config`]. It resolves subscribers into handlers, fans published events
//! out to every handler of a topic and lets callers wait for outstanding
//! asynchronous deliveries.
//!
//! ## Key responsibilities
//! - resolve subscribers at subscribe time and **fail fast** on misconfiguration
//! - deduplicate handlers by identity on insert
//! - take a **snapshot** of a topic's handlers per publish
//! - run each invocation under the configured execution strategy, inside a
//!   panic boundary, routing failures through the failure policy
//!
//! ## Dispatch
//! ```text
//! publish*(topic, extra, [sink], args)
//!     │
//!     ├─► snapshot(topic) ─────────────── [H1, H2, .., HN]     (copy-on-read)
//!     ├─► args.into_args() ────────────── Args (built once, shared)
//!     │
//!     └─► for each Hi in snapshot order:
//!             guard = barrier.enter()                          (+1)
//!             job   = Invocation { Hi, args, sink, policy, guard }
//!             exec.run(topic, &extra, job)
//!                   │
//!                   ├─ async: ExecStrategy::Spawn  → independent task
//!                   └─ sync:  ExecStrategy::Inline → calling thread
//!
//! job: catch_unwind(Hi(args)) → sink(ret)? → policy on failure → drop(guard) (-1)
//! ```
//!
//! ## Failure propagation
//! - async: a re-raised failure panics the job's own task with full context;
//!   siblings and the publisher are unaffected. If the async strategy runs the
//!   job on the publishing thread, the panic is caught at the strategy
//!   boundary, logged, and the fan-out continues.
//! - sync: every handler still runs; re-raised failures are returned together
//!   as [`DispatchError::HandlersFailed`].
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use topicvisor::Observer;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let observer: Observer = Observer::new();
//!     let hits = Arc::new(AtomicUsize::new(0));
//!
//!     for _ in 0..2 {
//!         let hits = Arc::clone(&hits);
//!         observer.subscribe_fn("y", move |s: &'static str| {
//!             assert_eq!(s, "s");
//!             hits.fetch_add(1, Ordering::SeqCst);
//!         });
//!     }
//!
//!     observer.publish("y", (), ("s",));
//!     observer.wait().await;
//!     assert_eq!(hits.load(Ordering::SeqCst), 2);
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, trace};

use super::{
    barrier::CompletionBarrier,
    builder::ObserverBuilder,
    config::Config,
    dispatch::{panic_message, Invocation},
    registry::HandlerRegistry,
    subscription::Subscription,
};
use crate::error::{DispatchError, FailureCause, HandlerFailure, SubscribeError};
use crate::handlers::{
    Args, Callback, Handler, HandlerId, IntoArgs, IntoCallback, IntoResultSink, ResultSink,
};
use crate::subscribers::{resolve, Subscriber};

/// Extra context carried by every publish and handed to strategies and policies.
///
/// Blanket-implemented; use `()` when no context is needed.
pub trait Extra: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> Extra for T {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Async,
    Sync,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Async => "async",
            Mode::Sync => "sync",
        }
    }
}

/// Topic-based publish/subscribe dispatcher.
///
/// `E` is the extra context type passed alongside every publish (default `()`).
pub struct Observer<E = ()> {
    registry: Arc<HandlerRegistry>,
    barrier: Arc<CompletionBarrier>,
    config: Config<E>,
    next_func: AtomicU64,
}

impl<E: Extra> Observer<E> {
    /// Creates an observer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Returns a builder for an observer with custom policies.
    pub fn builder() -> ObserverBuilder<E> {
        ObserverBuilder::default()
    }

    /// Creates an observer from an explicit configuration.
    pub fn with_config(config: Config<E>) -> Self {
        Self {
            registry: Arc::new(HandlerRegistry::new()),
            barrier: Arc::new(CompletionBarrier::new()),
            config,
            next_func: AtomicU64::new(0),
        }
    }

    /// Returns the configuration this observer was built with.
    pub fn config(&self) -> &Config<E> {
        &self.config
    }

    /// Subscribes a value through capability discovery.
    ///
    /// Subscribing a second value with the same [`HandlerId`] on the same topic
    /// is a no-op; the returned token still removes the registered handler.
    ///
    /// # Errors
    /// Returns [`SubscribeError`] if no topic or callback can be resolved.
    pub fn subscribe<S: Subscriber>(
        &self,
        subscriber: Arc<S>,
    ) -> Result<Subscription, SubscribeError> {
        let resolved = resolve(subscriber, &self.config.event_field)?;
        Ok(self.insert(resolved.topic, resolved.id, resolved.callback))
    }

    /// Removes the handler a subscriber resolves to.
    ///
    /// Returns `Ok(true)` if a handler was removed.
    ///
    /// # Errors
    /// Returns [`SubscribeError`] if the subscriber no longer resolves.
    pub fn unsubscribe<S: Subscriber>(&self, subscriber: &Arc<S>) -> Result<bool, SubscribeError> {
        let resolved = resolve(Arc::clone(subscriber), &self.config.event_field)?;
        let removed = self.registry.remove(&resolved.topic, &resolved.id);
        debug!(topic = %resolved.topic, handler = %resolved.id, removed, "unsubscribed");
        Ok(removed)
    }

    /// Subscribes a bare callable under `topic`.
    ///
    /// Never deduplicated: every call registers a new, independently removable handler.
    pub fn subscribe_fn<M, F>(&self, topic: impl Into<String>, f: F) -> Subscription
    where
        F: IntoCallback<M>,
    {
        let callback = f.into_callback();
        let seq = self.next_func.fetch_add(1, Ordering::Relaxed);
        let id = HandlerId::func(seq, callback.type_name());
        self.insert(topic.into(), id, callback)
    }

    /// Subscribes a callable under `topic` with a caller-chosen identity.
    ///
    /// A second registration with an equal `id` on the same topic is a no-op.
    pub fn subscribe_keyed<M, F>(
        &self,
        topic: impl Into<String>,
        id: HandlerId,
        f: F,
    ) -> Subscription
    where
        F: IntoCallback<M>,
    {
        self.insert(topic.into(), id, f.into_callback())
    }

    /// Publishes asynchronously to every handler currently registered for `topic`.
    ///
    /// Returns once every invocation has been handed to the async strategy.
    pub fn publish<A: IntoArgs>(&self, topic: &str, extra: E, args: A) {
        // Async failures never surface here; they are handled in the job's own context.
        let _ = self.dispatch(Mode::Async, topic, extra, None, args.into_args());
    }

    /// Like [`Observer::publish`], forwarding each handler's return value to `sink`.
    pub fn publish_with_ret<M, S, A>(&self, topic: &str, extra: E, sink: S, args: A)
    where
        S: IntoResultSink<M>,
        A: IntoArgs,
    {
        let sink = Some(sink.into_sink());
        let _ = self.dispatch(Mode::Async, topic, extra, sink, args.into_args());
    }

    /// Publishes to every handler of `topic` in snapshot order before returning.
    ///
    /// # Errors
    /// Returns [`DispatchError::HandlersFailed`] if the failure policy re-raised
    /// one or more failures. All handlers run regardless.
    pub fn sync_publish<A: IntoArgs>(
        &self,
        topic: &str,
        extra: E,
        args: A,
    ) -> Result<(), DispatchError<E>> {
        self.dispatch(Mode::Sync, topic, extra, None, args.into_args())
    }

    /// Like [`Observer::sync_publish`], forwarding each handler's return value to `sink`.
    ///
    /// # Errors
    /// See [`Observer::sync_publish`].
    pub fn sync_publish_with_ret<M, S, A>(
        &self,
        topic: &str,
        extra: E,
        sink: S,
        args: A,
    ) -> Result<(), DispatchError<E>>
    where
        S: IntoResultSink<M>,
        A: IntoArgs,
    {
        self.dispatch(Mode::Sync, topic, extra, Some(sink.into_sink()), args.into_args())
    }

    /// Waits until every invocation issued so far has completed.
    ///
    /// Publishes issued while waiting may or may not be awaited.
    pub async fn wait(&self) {
        self.barrier.wait().await;
    }

    /// Blocking form of [`Observer::wait`] for callers without an async executor.
    ///
    /// Must not be called from inside an async task.
    pub fn wait_blocking(&self) {
        self.barrier.wait_blocking();
    }

    /// Number of invocations issued and not yet completed.
    pub fn pending(&self) -> usize {
        self.barrier.pending()
    }

    /// Topics that currently have handlers, sorted.
    pub fn topics(&self) -> Vec<String> {
        self.registry.topics()
    }

    /// Number of handlers registered for `topic`.
    pub fn handler_count(&self, topic: &str) -> usize {
        self.registry.len(topic)
    }

    /// Visits every topic with its handlers, sorted by topic.
    ///
    /// Runs over a snapshot: `f` may subscribe or unsubscribe freely.
    pub fn for_each(&self, f: impl FnMut(&str, &[Arc<Handler>])) {
        self.registry.for_each(f);
    }

    fn insert(&self, topic: String, id: HandlerId, callback: Callback) -> Subscription {
        let inserted = self
            .registry
            .insert(&topic, Arc::new(Handler::new(id.clone(), callback)));
        if inserted {
            debug!(topic = %topic, handler = %id, "subscribed");
        } else {
            debug!(topic = %topic, handler = %id, "already subscribed; skipped");
        }
        Subscription::new(topic, id, &self.registry)
    }

    fn dispatch(
        &self,
        mode: Mode,
        topic: &str,
        extra: E,
        sink: Option<ResultSink>,
        args: Args,
    ) -> Result<(), DispatchError<E>> {
        let handlers = self.registry.snapshot(topic);
        trace!(topic, handlers = handlers.len(), mode = mode.as_str(), "dispatching");
        if handlers.is_empty() {
            return Ok(());
        }

        match mode {
            Mode::Async => {
                self.dispatch_async(topic, &extra, &handlers, &sink, &args);
                Ok(())
            }
            Mode::Sync => self.dispatch_sync(topic, &extra, &handlers, &sink, &args),
        }
    }

    fn dispatch_async(
        &self,
        topic: &str,
        extra: &E,
        handlers: &[Arc<Handler>],
        sink: &Option<ResultSink>,
        args: &Args,
    ) {
        let shared_topic: Arc<str> = Arc::from(topic);

        for handler in handlers {
            let invocation = self.invocation(&shared_topic, extra, handler, sink, args);
            let job = Box::new(move || {
                if let Err(failure) = invocation.run() {
                    panic!("{failure}");
                }
            });
            // A strategy that runs the job on this thread unwinds here on re-raise.
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                self.config.async_exec.run(topic, extra, job)
            }));
            if let Err(payload) = outcome {
                let failure = unwound(topic, extra, handler, args, payload.as_ref());
                error!(
                    topic,
                    handler = %failure.handler,
                    cause = %failure.cause,
                    "async invocation unwound into publisher; continuing"
                );
            }
        }
    }

    fn dispatch_sync(
        &self,
        topic: &str,
        extra: &E,
        handlers: &[Arc<Handler>],
        sink: &Option<ResultSink>,
        args: &Args,
    ) -> Result<(), DispatchError<E>> {
        let shared_topic: Arc<str> = Arc::from(topic);
        let failures = Arc::new(Mutex::new(Vec::new()));

        for handler in handlers {
            let invocation = self.invocation(&shared_topic, extra, handler, sink, args);
            let collected = Arc::clone(&failures);
            let job = Box::new(move || {
                if let Err(failure) = invocation.run() {
                    collected.lock().push(failure);
                }
            });
            // Only a panicking strategy or policy reaches this boundary.
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                self.config.sync_exec.run(topic, extra, job)
            }));
            if let Err(payload) = outcome {
                failures
                    .lock()
                    .push(unwound(topic, extra, handler, args, payload.as_ref()));
            }
        }

        let failures = std::mem::take(&mut *failures.lock());
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::HandlersFailed {
                topic: topic.to_string(),
                total: handlers.len(),
                failures,
            })
        }
    }

    fn invocation(
        &self,
        topic: &Arc<str>,
        extra: &E,
        handler: &Arc<Handler>,
        sink: &Option<ResultSink>,
        args: &Args,
    ) -> Invocation<E> {
        Invocation {
            topic: Arc::clone(topic),
            extra: extra.clone(),
            handler: Arc::clone(handler),
            args: args.clone(),
            sink: sink.clone(),
            policy: self.config.failure.clone(),
            guard: self.barrier.enter(),
        }
    }
}

/// Failure for a panic that escaped the execution strategy.
fn unwound<E: Clone>(
    topic: &str,
    extra: &E,
    handler: &Handler,
    args: &Args,
    payload: &(dyn Any + Send),
) -> HandlerFailure<E> {
    HandlerFailure {
        topic: topic.to_string(),
        extra: extra.clone(),
        handler: handler.id().clone(),
        callable: handler.callback().type_name(),
        args: args.clone(),
        cause: FailureCause::Panicked(panic_message(payload)),
    }
}

impl<E: Extra> Default for Observer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("topics", &self.registry.topics())
            .field("pending", &self.barrier.pending())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::{ExecStrategy, FailurePolicy, Job};
    use crate::subscribers::EventField;
    use std::borrow::Cow;
    use std::sync::atomic::AtomicUsize;

    struct Recorder {
        seen: Arc<Mutex<Vec<i32>>>,
    }

    impl Subscriber for Recorder {
        fn topic(&self) -> Option<Cow<'static, str>> {
            Some("x".into())
        }
        fn callback(self: Arc<Self>) -> Option<Callback> {
            Some(Callback::new(move |n: i32| self.seen.lock().push(n)))
        }
    }

    struct Tagged;

    impl Subscriber for Tagged {
        fn event_fields(&self) -> Vec<EventField> {
            vec![EventField::new("evt").topic("pain").notice("say")]
        }
        fn notice(self: Arc<Self>, name: &str) -> Option<Callback> {
            (name == "say").then(|| Callback::new(|_pain: u32| ()))
        }
    }

    fn counter(observer: &Observer, topic: &str, hits: &Arc<AtomicUsize>) -> Subscription {
        let hits = Arc::clone(hits);
        observer.subscribe_fn(topic, move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_subscribe_dedups_by_type_but_fn_does_not() {
        let observer: Observer = Observer::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        observer
            .subscribe(Arc::new(Recorder { seen: Arc::clone(&seen) }))
            .unwrap();
        observer
            .subscribe(Arc::new(Recorder { seen: Arc::clone(&seen) }))
            .unwrap();
        assert_eq!(observer.handler_count("x"), 1);

        let f = |_s: String| ();
        let a = observer.subscribe_fn("y", f);
        let b = observer.subscribe_fn("y", f);
        assert_eq!(observer.handler_count("y"), 2);
        assert_ne!(a.id(), b.id());

        assert!(a.cancel());
        assert_eq!(observer.handler_count("y"), 1);
        assert!(b.cancel());
        assert_eq!(observer.topics(), vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn test_publish_then_cancel() {
        let observer: Observer = Observer::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sub = observer
            .subscribe(Arc::new(Recorder { seen: Arc::clone(&seen) }))
            .unwrap();
        observer
            .subscribe(Arc::new(Recorder { seen: Arc::clone(&seen) }))
            .unwrap();

        observer.publish("x", (), (42i32,));
        observer.wait().await;
        assert_eq!(*seen.lock(), vec![42]);

        assert!(sub.cancel());
        observer.publish("x", (), (42i32,));
        assert_eq!(observer.pending(), 0);
        observer.wait().await;
        assert_eq!(*seen.lock(), vec![42]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_publish_reaches_every_fn_once() {
        let observer: Observer = Observer::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            observer.subscribe_fn("y", move |s: String| seen.lock().push(s));
        }

        observer.publish("y", (), ("s".to_string(),));
        observer.wait().await;
        assert_eq!(*seen.lock(), vec!["s".to_string(), "s".to_string()]);
    }

    #[test]
    fn test_sync_publish_runs_in_snapshot_order() {
        let observer: Observer = Observer::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let order = Arc::clone(&order);
            observer.subscribe_fn("t", move |n: u64| order.lock().push((i, n)));
        }

        observer.sync_publish("t", (), (9u64,)).unwrap();
        assert_eq!(
            *order.lock(),
            (0..5).map(|i| (i, 9u64)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_sync_failure_does_not_stop_siblings() {
        let observer: Observer = Observer::new();
        let hits = Arc::new(AtomicUsize::new(0));

        counter(&observer, "t", &hits);
        observer.subscribe_fn("t", || -> () { panic!("boom") });
        counter(&observer, "t", &hits);

        let err = observer.sync_publish("t", (), ()).unwrap_err();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(err.as_label(), "dispatch_handlers_failed");

        let failures = err.into_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].cause, FailureCause::Panicked("boom".to_string()));
        assert_eq!(failures[0].topic, "t");
        assert!(matches!(failures[0].handler, HandlerId::Func { seq: 1, .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_failure_does_not_stop_siblings() {
        let observer: Observer = Observer::new();
        let hits = Arc::new(AtomicUsize::new(0));

        counter(&observer, "t", &hits);
        observer.subscribe_fn("t", || -> () { panic!("boom") });
        counter(&observer, "t", &hits);
        counter(&observer, "other", &hits);

        observer.publish("t", (), ());
        observer.publish("other", (), ());
        observer.wait().await;

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(observer.pending(), 0);
    }

    #[test]
    fn test_inline_async_strategy_contains_reraise() {
        let observer: Observer = Observer::builder()
            .with_async_exec(ExecStrategy::custom(|_topic: &str, _extra: &(), job: Job| job()))
            .build();
        let hits = Arc::new(AtomicUsize::new(0));

        observer.subscribe_fn("t", || -> () { panic!("boom") });
        counter(&observer, "t", &hits);

        observer.publish("t", (), ());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(observer.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_failure_reaches_policy() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let f = Arc::clone(&failures);
        let observer: Observer<u32> = Observer::builder()
            .with_failure_policy(FailurePolicy::custom(move |failure: HandlerFailure<u32>| {
                f.lock().push(failure);
                Ok(())
            }))
            .build();

        observer.subscribe_fn("t", |n: i32| -> () { panic!("boom {n}") });
        observer.subscribe_fn("t", |_n: i32| ());

        observer.publish("t", 5, (7i32,));
        observer.wait().await;

        let failures = failures.lock();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].topic, "t");
        assert_eq!(failures[0].extra, 5);
        assert_eq!(failures[0].args.get::<i32>(0), Ok(7));
        assert_eq!(failures[0].cause, FailureCause::Panicked("boom 7".to_string()));
    }

    #[test]
    fn test_wait_blocking_outside_runtime() {
        let observer: Observer = Observer::new();
        let hits = Arc::new(AtomicUsize::new(0));

        counter(&observer, "t", &hits);
        counter(&observer, "t", &hits);

        observer.publish("t", (), ());
        observer.wait_blocking();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(observer.pending(), 0);
    }

    #[tokio::test]
    async fn test_log_policy_swallows_async_failures() {
        let observer: Observer = Observer::builder()
            .with_failure_policy(FailurePolicy::Log)
            .build();
        let hits = Arc::new(AtomicUsize::new(0));

        observer.subscribe_fn("t", |_n: i32| -> () { panic!("boom") });
        let h = Arc::clone(&hits);
        observer.subscribe_fn("t", move |_n: i32| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        observer.publish("t", (), (1i32,));
        observer.wait().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(observer.sync_publish("t", (), (1i32,)).is_ok());
    }

    #[tokio::test]
    async fn test_publish_with_ret_delivers_each_return() {
        let observer: Observer = Observer::new();
        let results = Arc::new(Mutex::new(Vec::new()));

        observer.subscribe_fn("ret", || ("a".to_string(), None::<String>));
        observer.subscribe_fn("ret", || ("b".to_string(), Some("bad".to_string())));

        let r = Arc::clone(&results);
        observer.publish_with_ret(
            "ret",
            (),
            move |value: String, err: Option<String>| r.lock().push((value, err)),
            (),
        );
        observer.wait().await;

        let mut results = results.lock().clone();
        results.sort();
        assert_eq!(
            results,
            vec![
                ("a".to_string(), None),
                ("b".to_string(), Some("bad".to_string())),
            ]
        );
    }

    #[test]
    fn test_sync_publish_with_ret_reports_sink_mismatch() {
        let observer: Observer = Observer::new();
        let total = Arc::new(AtomicUsize::new(0));

        observer.subscribe_fn("sum", |a: usize, b: usize| a + b);
        observer.subscribe_fn("sum", |a: usize, _b: usize| a.to_string());

        let t = Arc::clone(&total);
        let err = observer
            .sync_publish_with_ret(
                "sum",
                (),
                move |n: usize| {
                    t.fetch_add(n, Ordering::SeqCst);
                },
                (2usize, 3usize),
            )
            .unwrap_err();

        assert_eq!(total.load(Ordering::SeqCst), 5);
        assert_eq!(err.failures().len(), 1);
        assert_eq!(err.failures()[0].as_label(), "signature_return_type");
    }

    #[test]
    fn test_cancel_after_snapshot_still_delivers() {
        let queued: Arc<Mutex<Vec<Job>>> = Arc::new(Mutex::new(Vec::new()));
        let q = Arc::clone(&queued);
        let observer: Observer = Observer::builder()
            .with_async_exec(ExecStrategy::custom(move |_topic: &str, _extra: &(), job: Job| {
                q.lock().push(job);
            }))
            .build();
        let hits = Arc::new(AtomicUsize::new(0));

        let sub = counter(&observer, "t", &hits);
        observer.publish("t", (), ());
        assert_eq!(observer.pending(), 1);

        assert!(sub.cancel());
        for job in std::mem::take(&mut *queued.lock()) {
            job();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(observer.pending(), 0);

        observer.publish("t", (), ());
        assert!(queued.lock().is_empty());
    }

    #[test]
    fn test_dropped_job_releases_barrier() {
        let observer: Observer = Observer::builder()
            .with_async_exec(ExecStrategy::custom(|_topic: &str, _extra: &(), job: Job| {
                drop(job);
            }))
            .build();
        observer.subscribe_fn("t", || ());
        observer.publish("t", (), ());
        assert_eq!(observer.pending(), 0);
    }

    #[test]
    fn test_signature_mismatch_goes_through_policy() {
        let labels = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&labels);
        let observer: Observer<&'static str> = Observer::builder()
            .with_failure_policy(FailurePolicy::custom(move |failure: HandlerFailure<&'static str>| {
                l.lock().push((failure.as_label(), failure.extra));
                Ok(())
            }))
            .build();

        observer.subscribe_fn("t", |_n: i32| ());
        observer.sync_publish("t", "req-1", ("nope",)).unwrap();
        observer.sync_publish("t", "req-2", (1i32, 2i32)).unwrap();

        assert_eq!(
            *labels.lock(),
            vec![("signature_arg_type", "req-1"), ("signature_arity", "req-2")]
        );
    }

    #[test]
    fn test_panicking_policy_is_contained_in_sync_publish() {
        let observer: Observer = Observer::builder()
            .with_failure_policy(FailurePolicy::custom(|_failure: HandlerFailure<()>| {
                panic!("policy down")
            }))
            .build();
        let hits = Arc::new(AtomicUsize::new(0));

        observer.subscribe_fn("t", || -> () { panic!("boom") });
        counter(&observer, "t", &hits);

        let err = observer.sync_publish("t", (), ()).unwrap_err();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            err.failures()[0].cause,
            FailureCause::Panicked("policy down".to_string())
        );
    }

    #[test]
    fn test_extra_reaches_strategies() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let observer: Observer<u32> = Observer::builder()
            .with_sync_exec(ExecStrategy::custom(move |topic: &str, extra: &u32, job: Job| {
                s.lock().push((topic.to_string(), *extra));
                job();
            }))
            .build();

        observer.subscribe_fn("a", || ());
        observer.subscribe_fn("a", || ());
        observer.sync_publish("a", 7, ()).unwrap();
        observer.sync_publish("missing", 8, ()).unwrap();

        assert_eq!(
            *seen.lock(),
            vec![("a".to_string(), 7), ("a".to_string(), 7)]
        );
    }

    #[test]
    fn test_unsubscribe_resolves_again() {
        let observer: Observer = Observer::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::new(Recorder { seen });

        observer.subscribe(Arc::clone(&recorder)).unwrap();
        assert!(observer.unsubscribe(&recorder).unwrap());
        assert!(!observer.unsubscribe(&recorder).unwrap());
        assert_eq!(observer.handler_count("x"), 0);
    }

    #[test]
    fn test_custom_event_field() {
        let default: Observer = Observer::new();
        let err = default.subscribe(Arc::new(Tagged)).unwrap_err();
        assert!(matches!(err, SubscribeError::MissingEventField { ref field, .. } if field == "event"));
        assert!(default.topics().is_empty());

        let custom: Observer = Observer::builder().with_event_field("evt").build();
        let sub = custom.subscribe(Arc::new(Tagged)).unwrap();
        assert_eq!(sub.topic(), "pain");
        custom.sync_publish("pain", (), (3u32,)).unwrap();
    }

    #[test]
    fn test_subscribe_keyed_dedups_on_id() {
        let observer: Observer = Observer::new();
        observer.subscribe_keyed("k", HandlerId::named("one"), || ());
        observer.subscribe_keyed("k", HandlerId::named("one"), || ());
        let two = observer.subscribe_keyed("k", HandlerId::named("two"), || ());
        assert_eq!(observer.handler_count("k"), 2);

        two.cancel();
        let mut seen = Vec::new();
        observer.for_each(|topic, handlers| {
            seen.push((topic.to_string(), handlers.iter().map(|h| h.id().to_string()).collect::<Vec<_>>()));
        });
        assert_eq!(seen, vec![("k".to_string(), vec!["named:one".to_string()])]);
    }

    #[test]
    fn test_for_each_may_subscribe() {
        let observer: Observer = Observer::new();
        observer.subscribe_fn("a", || ());
        observer.for_each(|topic, _| {
            observer.subscribe_fn(format!("{topic}-copy"), || ());
        });
        assert_eq!(observer.topics(), vec!["a".to_string(), "a-copy".to_string()]);
    }
}
