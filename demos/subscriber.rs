//! # Example: subscriber
//!
//! Subscribing values through capability discovery.
//!
//! Shows how to:
//! - Implement [`Subscriber`] with explicit `topic` and `callback` capabilities.
//! - Fall back to tag metadata through [`EventField`] and a `notice` table.
//! - Observe type-keyed deduplication and [`Observer::unsubscribe`].
//!
//! ## Flow
//! ```text
//! Thermometer ── topic() + callback() ────────────► "temperature"
//! Person      ── event_fields()["event"] ─┬─ topic  ─► "pain"
//!                                         └─ notice ─► notice("say")
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=topicvisor=debug cargo run --example subscriber
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use topicvisor::{Callback, EventField, HandlerId, Observer, Subscriber};
use tracing_subscriber::EnvFilter;

/// Provides both capabilities directly.
struct Thermometer {
    room: &'static str,
}

impl Subscriber for Thermometer {
    fn topic(&self) -> Option<Cow<'static, str>> {
        Some("temperature".into())
    }

    fn callback(self: Arc<Self>) -> Option<Callback> {
        Some(Callback::new(move |celsius: f64| {
            println!("[{}] {celsius:.1}°C", self.room);
        }))
    }

    // One registration per room instead of one per type.
    fn handler_id(&self) -> HandlerId {
        HandlerId::named(self.room)
    }
}

/// Declares its topic and callback name through tag metadata.
struct Person {
    name: String,
}

impl Person {
    fn say(&self, level: u8) {
        println!("[{}] ouch x{level}", self.name);
    }
}

impl Subscriber for Person {
    fn event_fields(&self) -> Vec<EventField> {
        vec![EventField::new("event").topic("pain").notice("say")]
    }

    fn notice(self: Arc<Self>, name: &str) -> Option<Callback> {
        match name {
            "say" => Some(Callback::new(move |level: u8| self.say(level))),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let observer: Observer = Observer::new();

    observer.subscribe(Arc::new(Thermometer { room: "kitchen" }))?;
    observer.subscribe(Arc::new(Thermometer { room: "garage" }))?;

    let ming = Arc::new(Person { name: "Ming".into() });
    observer.subscribe(Arc::clone(&ming))?;
    // Same type on the same topic: deduplicated.
    observer.subscribe(Arc::new(Person { name: "Axing".into() }))?;

    observer.for_each(|topic, handlers| {
        println!("{topic}: {} handler(s)", handlers.len());
    });

    observer.sync_publish("temperature", (), (21.5f64,))?;
    observer.publish("pain", (), (3u8,));
    observer.wait().await;

    observer.unsubscribe(&ming)?;
    println!("pain handlers after unsubscribe: {}", observer.handler_count("pain"));
    Ok(())
}
