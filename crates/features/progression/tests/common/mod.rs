#![allow(dead_code, unreachable_pub)]

use parking_lot::Mutex;
use razed_domain::{CharacterId, CharacterProgressionState, ProgressionStore};
use razed_events::MemorySink;
use razed_progression::{Ledger, Registry};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../catalog/tomes.toml")
}

pub fn registry() -> Registry {
    Registry::load(catalog_path(), true).unwrap()
}

pub fn ledger() -> (Ledger, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new(256));
    (Ledger::new(registry(), sink.clone()), sink)
}

/// In-memory store that fails the first `failures` saves. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    inner: Arc<FlakyInner>,
}

#[derive(Debug, Default)]
struct FlakyInner {
    failures: AtomicU32,
    attempts: AtomicU32,
    saved: Mutex<HashMap<CharacterId, CharacterProgressionState>>,
    history: Mutex<Vec<(CharacterId, u64)>>,
}

impl FlakyStore {
    pub fn reliable() -> Self {
        Self::default()
    }

    pub fn failing(failures: u32) -> Self {
        let store = Self::default();
        store.inner.failures.store(failures, Ordering::SeqCst);
        store
    }

    pub fn attempts(&self) -> u32 {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    pub fn saved(&self, id: &CharacterId) -> Option<CharacterProgressionState> {
        self.inner.saved.lock().get(id).cloned()
    }

    /// Revisions written, in order.
    pub fn history(&self) -> Vec<(CharacterId, u64)> {
        self.inner.history.lock().clone()
    }

    pub fn seed(&self, state: CharacterProgressionState) {
        self.inner.saved.lock().insert(state.character_id.clone(), state);
    }
}

impl ProgressionStore for FlakyStore {
    type Error = io::Error;

    async fn save(&self, snapshot: &CharacterProgressionState) -> Result<(), Self::Error> {
        self.inner.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.inner.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.inner.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(io::Error::other("store unavailable"));
        }
        self.inner.saved.lock().insert(snapshot.character_id.clone(), snapshot.clone());
        self.inner.history.lock().push((snapshot.character_id.clone(), snapshot.revision));
        Ok(())
    }

    async fn load(
        &self,
        id: &CharacterId,
    ) -> Result<Option<CharacterProgressionState>, Self::Error> {
        Ok(self.saved(id))
    }
}
