//! # Example: failure_policy
//!
//! How failing handlers are isolated and reported.
//!
//! Demonstrates how to:
//! - Collect re-raised failures from a synchronous publish ([`DispatchError`]).
//! - Route failures to a dead-letter list with [`FailurePolicy::custom`].
//! - Tag every publish with an extra context value and read it in a custom
//!   [`ExecStrategy`].
//!
//! ## Flow
//! ```text
//! sync_publish("jobs") ─► [ok, panics, ok] ─► Err(HandlersFailed { 1 of 3 })
//!
//! publish("jobs", request_id) ─► [ok, panics, ok]
//!                                      └─► policy ─► dead_letters.push(..)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=topicvisor=debug cargo run --example failure_policy
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use topicvisor::{DispatchError, ExecStrategy, FailurePolicy, HandlerFailure, Job, Observer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn subscribe_jobs(observer: &Observer<u64>) {
    observer.subscribe_fn("jobs", |n: u32| println!("[first] job {n}"));
    observer.subscribe_fn("jobs", |n: u32| {
        if n % 2 == 1 {
            panic!("odd job {n}");
        }
    });
    observer.subscribe_fn("jobs", |n: u32| println!("[third] job {n}"));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Default policy: failures are re-raised and collected by sync publishes
    let strict: Observer<u64> = Observer::new();
    subscribe_jobs(&strict);

    match strict.sync_publish("jobs", 100, (1u32,)) {
        Ok(()) => println!("all handlers succeeded"),
        Err(DispatchError::HandlersFailed { total, failures, .. }) => {
            println!("{} of {total} handler(s) failed", failures.len());
            for failure in &failures {
                println!("  {} -> {}", failure.handler, failure.cause);
            }
        }
        Err(other) => return Err(other.to_string().into()),
    }

    // 2. Dead-letter policy plus a tracing exec strategy
    let dead_letters: Arc<Mutex<Vec<HandlerFailure<u64>>>> = Arc::new(Mutex::new(Vec::new()));
    let dlq = Arc::clone(&dead_letters);

    let lenient: Observer<u64> = Observer::builder()
        .with_failure_policy(FailurePolicy::custom(move |failure: HandlerFailure<u64>| {
            dlq.lock().push(failure);
            Ok(())
        }))
        .with_async_exec(ExecStrategy::custom(|topic: &str, request: &u64, job: Job| {
            info!(topic, request, "scheduling");
            tokio::task::spawn_blocking(job);
        }))
        .build();
    subscribe_jobs(&lenient);

    for (request, n) in [(200u64, 2u32), (201, 3), (202, 5)] {
        lenient.publish("jobs", request, (n,));
    }
    lenient.wait().await;

    for failure in dead_letters.lock().iter() {
        println!(
            "dead letter: request={} args={:?} cause={}",
            failure.extra, failure.args, failure.cause
        );
    }
    Ok(())
}
