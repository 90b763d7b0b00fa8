//! Dispatcher core: registry, fan-out and completion tracking.
//!
//! The public API from this module is [`Observer`] with its [`ObserverBuilder`],
//! [`Config`] and the [`Subscription`] token returned by every subscribe call.
//!
//! Internal modules:
//! - [`registry`]: topic → handlers map with copy-on-read snapshots;
//! - [`barrier`]: counts outstanding invocations and lets callers wait for them;
//! - [`dispatch`]: runs one invocation inside a panic boundary;
//! - [`observer`]: the facade tying subscribe, publish and wait together.

mod barrier;
mod builder;
mod config;
mod dispatch;
mod observer;
mod registry;
mod subscription;

pub use barrier::{BarrierGuard, CompletionBarrier};
pub use builder::ObserverBuilder;
pub use config::{Config, DEFAULT_EVENT_FIELD};
pub use observer::{Extra, Observer};
pub use registry::HandlerRegistry;
pub use subscription::Subscription;
