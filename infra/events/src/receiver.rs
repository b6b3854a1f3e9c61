use razed_domain::{CharacterId, Notification};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

/// Lag-tolerant receiving end of a [`NotificationHub`](crate::NotificationHub).
///
/// When the receiver falls behind, it continues from the oldest retained notification and
/// records how many were skipped.
#[derive(Debug)]
pub struct NotificationReceiver {
    inner: broadcast::Receiver<Arc<Notification>>,
    character: Option<CharacterId>,
    skipped: u64,
}

impl NotificationReceiver {
    pub(crate) fn new(
        inner: broadcast::Receiver<Arc<Notification>>,
        character: Option<CharacterId>,
    ) -> Self {
        Self { inner, character, skipped: 0 }
    }

    /// Waits for the next matching notification; `None` once every hub handle is dropped.
    pub async fn recv(&mut self) -> Option<Arc<Notification>> {
        let mut lagged = 0u64;

        loop {
            match self.inner.recv().await {
                Ok(note) => {
                    if !self.wants(&note) {
                        continue;
                    }
                    self.report_lag(lagged);
                    return Some(note);
                },
                Err(RecvError::Lagged(n)) => {
                    lagged = lagged.saturating_add(n);
                    debug!(skipped = n, total_skipped = lagged, "Notification receiver lagged");
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next matching notification already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<Notification>> {
        let mut lagged = 0u64;

        loop {
            match self.inner.try_recv() {
                Ok(note) => {
                    if !self.wants(&note) {
                        continue;
                    }
                    self.report_lag(lagged);
                    return Some(note);
                },
                Err(TryRecvError::Lagged(n)) => lagged = lagged.saturating_add(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => {
                    self.report_lag(lagged);
                    return None;
                },
            }
        }
    }

    /// Notifications lost to lag over the receiver's lifetime.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    fn wants(&self, note: &Notification) -> bool {
        self.character.as_ref().is_none_or(|id| note.character.as_ref() == Some(id))
    }

    fn report_lag(&mut self, lagged: u64) {
        if lagged > 0 {
            self.skipped = self.skipped.saturating_add(lagged);
            warn!(
                skipped = lagged,
                "Notification receiver lagged; continuing from oldest retained"
            );
        }
    }
}
