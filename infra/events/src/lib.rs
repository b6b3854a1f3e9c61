//! # Events
//!
//! Adapters for the progression core's event sink port.
//!
//! * [`NotificationHub`]: broadcast fan-out to any number of async receivers. Slow receivers
//!   skip ahead instead of blocking publishers.
//! * [`TracingSink`]: renders each notification as a `tracing` event.
//! * [`MemorySink`]: keeps the latest notifications for synchronous callers.
//!
//! # Example
//!
//! ```rust
//! use razed_domain::{EventSink, Notification, Severity};
//! use razed_events::NotificationHub;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let hub = NotificationHub::new();
//!     let mut rx = hub.subscribe();
//!
//!     hub.notify(Notification::new("Learned: Ember Strike!", Severity::Success));
//!
//!     let note = rx.recv().await.unwrap();
//!     assert_eq!(note.message, "Learned: Ember Strike!");
//! }
//! ```

mod error;
mod hub;
mod receiver;
mod sinks;

pub use error::{EventsError, EventsErrorExt};
pub use hub::NotificationHub;
pub use receiver::NotificationReceiver;
pub use sinks::{MemorySink, TracingSink};
