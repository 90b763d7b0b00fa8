//! # Example: basic
//!
//! Minimal fan-out with bare callables.
//!
//! Demonstrates how to:
//! - Register closures under a topic with [`Observer::subscribe_fn`].
//! - Publish asynchronously and wait for completion.
//! - Publish synchronously and collect return values with a result sink.
//! - Cancel a [`Subscription`](topicvisor::Subscription).
//!
//! ## Flow
//! ```text
//! subscribe_fn("orders", ..) x2
//!     ├─► publish("orders", ..)             ─► 2 independent tasks
//!     ├─► wait()                            ─► both done
//!     ├─► sync_publish_with_ret("totals")   ─► sink(total) per handler, in order
//!     └─► cancel() ─► publish("orders")     ─► nothing scheduled
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=topicvisor=debug cargo run --example basic
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use topicvisor::Observer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Observer with the default policies (Spawn / Inline / Reraise)
    let observer: Observer = Observer::new();

    // 2. Two independent handlers on the same topic
    let audit = observer.subscribe_fn("orders", |id: u64, item: String| {
        println!("[audit] order #{id}: {item}");
    });
    observer.subscribe_fn("orders", |id: u64, _item: String| {
        println!("[mailer] confirmation sent for #{id}");
    });

    // 3. Fire-and-forget, then wait for both deliveries
    observer.publish("orders", (), (1u64, "keyboard".to_string()));
    observer.wait().await;

    // 4. Handlers that return a value, collected synchronously
    observer.subscribe_fn("totals", |qty: u32, price: u32| qty * price);
    observer.subscribe_fn("totals", |qty: u32, price: u32| qty * price * 90 / 100);

    let totals = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&totals);
    observer.sync_publish_with_ret(
        "totals",
        (),
        move |total: u32| sink.lock().push(total),
        (3u32, 20u32),
    )?;
    println!("[totals] list / discounted = {:?}", totals.lock());

    // 5. Cancel one handler; the next publish only reaches the other
    audit.cancel();
    observer.publish("orders", (), (2u64, "mouse".to_string()));
    observer.wait().await;

    println!("topics: {:?}", observer.topics());
    Ok(())
}
