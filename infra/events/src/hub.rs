use crate::error::EventsError;
use crate::receiver::NotificationReceiver;
use razed_domain::{CharacterId, EventSink, Notification};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

/// 128 covers a burst of learn outcomes for a busy shop screen.
const DEFAULT_CAPACITY: usize = 128;

/// Broadcast fan-out of progression notifications.
///
/// Cloning is cheap; every clone publishes into the same channel. Publishing never blocks and
/// never fails: with no receivers the notification is dropped.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

#[derive(Debug)]
struct HubInner {
    sender: broadcast::Sender<Arc<Notification>>,
    capacity: usize,
    published: AtomicU64,
}

impl NotificationHub {
    #[must_use]
    pub fn new() -> Self {
        Self::build(DEFAULT_CAPACITY)
    }

    /// Creates a hub retaining at most `capacity` undelivered notifications per receiver.
    ///
    /// # Errors
    /// Returns [`EventsError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, EventsError> {
        if capacity == 0 {
            return Err(EventsError::InvalidCapacity {
                message: "capacity must be greater than zero".into(),
                context: Some("NotificationHub".into()),
            });
        }
        Ok(Self::build(capacity))
    }

    fn build(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { inner: Arc::new(HubInner { sender, capacity, published: AtomicU64::new(0) }) }
    }

    /// Receives every notification published after this call.
    #[must_use]
    pub fn subscribe(&self) -> NotificationReceiver {
        NotificationReceiver::new(self.inner.sender.subscribe(), None)
    }

    /// Receives only notifications addressed to `character`.
    #[must_use]
    pub fn subscribe_character(&self, character: CharacterId) -> NotificationReceiver {
        NotificationReceiver::new(self.inner.sender.subscribe(), Some(character))
    }

    /// Returns the number of receivers the notification reached.
    pub fn publish(&self, notification: Notification) -> usize {
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        match self.inner.sender.send(Arc::new(notification)) {
            Ok(count) => {
                trace!(count, "Notification dispatched");
                count
            },
            Err(broadcast::error::SendError(dropped)) => {
                trace!(message = %dropped.message, "Notification dropped: no active receivers");
                0
            },
        }
    }

    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Total notifications published, delivered or not.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for NotificationHub {
    fn notify(&self, notification: Notification) {
        self.publish(notification);
    }
}
