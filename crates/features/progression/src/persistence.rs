//! Background durable-write pipeline.
//!
//! Commits hand their snapshot to [`PersistenceHandle::enqueue`] and return immediately. A
//! single worker task drains the queue in order, retries failed writes with exponential
//! backoff and records which revision of each character reached the store.

use crate::error::LedgerError;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use razed_domain::config::PersistenceConfig;
use razed_domain::{
    CharacterId, CharacterProgressionState, EventSink, Notification, ProgressionStore, Severity,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Message sent to the event sink when a snapshot could not be written.
pub const PERSISTENCE_FAILED: &str = "Progress could not be saved";

/// Bounded retry schedule for snapshot writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PersistenceConfig::default())
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    #[must_use]
    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff().max(config.initial_backoff()),
        }
    }
}

/// Committed versus durable revision of one character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Durability {
    /// Newest revision handed to the pipeline.
    pub committed: u64,
    /// Newest revision the store acknowledged.
    pub durable: Option<u64>,
}

impl Durability {
    /// `false` while the store lags behind the ledger.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.durable.is_some_and(|durable| durable >= self.committed)
    }
}

#[derive(Debug, Default)]
struct DurabilityTracker {
    entries: Mutex<FxHashMap<CharacterId, Durability>>,
}

impl DurabilityTracker {
    fn commit(&self, id: &CharacterId, revision: u64) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(id.clone()).or_default();
        entry.committed = entry.committed.max(revision);
    }

    fn mark_durable(&self, id: &CharacterId, revision: u64) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(id.clone()).or_default();
        entry.committed = entry.committed.max(revision);
        entry.durable = Some(entry.durable.map_or(revision, |d| d.max(revision)));
    }

    fn get(&self, id: &CharacterId) -> Option<Durability> {
        self.entries.lock().get(id).copied()
    }

    /// Whether a write of `revision` is redundant or superseded by a queued one.
    fn is_stale(&self, id: &CharacterId, revision: u64) -> bool {
        self.get(id).is_some_and(|d| {
            d.durable.is_some_and(|durable| durable >= revision) || d.committed > revision
        })
    }
}

#[derive(Debug)]
enum Job {
    Save(CharacterProgressionState),
    Flush(oneshot::Sender<()>),
}

/// Producer side of the write pipeline. Cloning is cheap; the worker stops once every
/// handle is dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    tx: mpsc::UnboundedSender<Job>,
    tracker: Arc<DurabilityTracker>,
}

impl PersistenceHandle {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Errors
    /// [`LedgerError::Internal`] when called outside a tokio runtime.
    pub fn spawn<S: ProgressionStore>(
        store: S,
        policy: RetryPolicy,
        sink: Arc<dyn EventSink>,
    ) -> Result<(Self, JoinHandle<()>), LedgerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| LedgerError::Internal {
            message: e.to_string().into(),
            context: Some("Persistence worker needs a tokio runtime".into()),
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = Arc::new(DurabilityTracker::default());
        let worker = Worker { store, policy, sink, tracker: Arc::clone(&tracker) };

        let task = runtime.spawn(worker.run(rx));
        Ok((Self { tx, tracker }, task))
    }

    /// Queues a snapshot for writing. Returns `false` if the worker is gone.
    pub fn enqueue(&self, snapshot: CharacterProgressionState) -> bool {
        let id = snapshot.character_id.clone();
        let revision = snapshot.revision;
        self.tracker.commit(&id, revision);

        if self.tx.send(Job::Save(snapshot)).is_err() {
            error!(character = %id, revision, "Persistence worker stopped; snapshot not queued");
            return false;
        }
        true
    }

    /// Records a revision already known to be in the store, e.g. one just loaded from it.
    pub fn mark_durable(&self, id: &CharacterId, revision: u64) {
        self.tracker.mark_durable(id, revision);
    }

    #[must_use]
    pub fn durability(&self, id: &CharacterId) -> Option<Durability> {
        self.tracker.get(id)
    }

    /// Waits until every write queued before this call has been attempted.
    ///
    /// # Errors
    /// [`LedgerError::PersistenceClosed`] if the worker has stopped.
    pub async fn flush(&self) -> Result<(), LedgerError> {
        let (done, wait) = oneshot::channel();
        self.tx.send(Job::Flush(done)).map_err(|_| LedgerError::PersistenceClosed {
            message: "flush requested after shutdown".into(),
            context: None,
        })?;
        wait.await.map_err(|_| LedgerError::PersistenceClosed {
            message: "worker dropped a pending flush".into(),
            context: None,
        })
    }
}

struct Worker<S> {
    store: S,
    policy: RetryPolicy,
    sink: Arc<dyn EventSink>,
    tracker: Arc<DurabilityTracker>,
}

impl<S: ProgressionStore> Worker<S> {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Job>) {
        debug!("Persistence worker started");
        while let Some(job) = rx.recv().await {
            match job {
                Job::Save(snapshot) => self.save(&snapshot).await,
                Job::Flush(done) => {
                    let _ = done.send(());
                },
            }
        }
        debug!("Persistence worker stopped");
    }

    async fn save(&self, snapshot: &CharacterProgressionState) {
        let id = &snapshot.character_id;
        let revision = snapshot.revision;

        if self.tracker.is_stale(id, revision) {
            debug!(character = %id, revision, "Skipping superseded snapshot");
            return;
        }

        let mut delay = self.policy.initial_backoff;
        for attempt in 1..=self.policy.max_attempts {
            match self.store.save(snapshot).await {
                Ok(()) => {
                    self.tracker.mark_durable(id, revision);
                    debug!(character = %id, revision, attempt, "Snapshot persisted");
                    return;
                },
                Err(err) if attempt < self.policy.max_attempts => {
                    warn!(
                        character = %id,
                        attempt,
                        ?delay,
                        error = %err,
                        "Snapshot write failed, retrying..."
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.policy.max_backoff);
                },
                Err(err) => {
                    error!(
                        character = %id,
                        revision,
                        attempts = attempt,
                        error = %err,
                        "Snapshot write abandoned; in-memory state stays authoritative"
                    );
                },
            }
        }

        self.sink.notify(
            Notification::new(PERSISTENCE_FAILED, Severity::Warning).for_character(id.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_always_allows_one_attempt() {
        let config =
            PersistenceConfig { max_attempts: 0, initial_backoff_ms: 200, max_backoff_ms: 50 };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.max_backoff, Duration::from_millis(200));
    }

    #[test]
    fn durability_follows_acknowledged_revisions() {
        let tracker = DurabilityTracker::default();
        let id = CharacterId::new("hero");

        tracker.commit(&id, 1);
        assert!(!tracker.get(&id).unwrap().is_durable());

        tracker.commit(&id, 2);
        assert!(tracker.is_stale(&id, 1));
        assert!(!tracker.is_stale(&id, 2));

        tracker.mark_durable(&id, 2);
        assert!(tracker.get(&id).unwrap().is_durable());
        assert!(tracker.is_stale(&id, 2));
    }
}
