use parking_lot::Mutex;
use razed_domain::{EventSink, Notification, Severity};
use std::collections::VecDeque;
use tracing::{error, info, warn};

/// Renders notifications as `tracing` events at a level matching their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, notification: Notification) {
        let character = notification.character.as_ref().map(ToString::to_string);
        let character = character.as_deref().unwrap_or("-");
        let message = notification.message.as_ref();

        match notification.severity {
            Severity::Info | Severity::Success => info!(character, "{message}"),
            Severity::Warning => warn!(character, "{message}"),
            Severity::Error => error!(character, "{message}"),
        }
    }
}

/// Keeps the most recent `limit` notifications in memory.
#[derive(Debug)]
pub struct MemorySink {
    entries: Mutex<VecDeque<Notification>>,
    limit: usize,
}

impl MemorySink {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self { entries: Mutex::new(VecDeque::with_capacity(limit)), limit }
    }

    /// Removes and returns everything recorded so far, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.entries.lock().drain(..).collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.lock().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventSink for MemorySink {
    fn notify(&self, notification: Notification) {
        let mut entries = self.entries.lock();
        if entries.len() == self.limit {
            entries.pop_front();
        }
        entries.push_back(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_latest_entries() {
        let sink = MemorySink::new(2);
        for message in ["one", "two", "three"] {
            sink.notify(Notification::new(message, Severity::Info));
        }

        let kept: Vec<_> = sink.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(kept, ["two", "three"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn tracing_sink_accepts_every_severity() {
        let sink = TracingSink;
        for severity in [Severity::Info, Severity::Success, Severity::Warning, Severity::Error] {
            sink.notify(Notification::new("rendered", severity));
        }
    }
}
