//! Snapshot store: one JSON document per character, replaced atomically on every save.

use crate::builder::SnapshotStoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::{TMP_MARKER, maintenance, security};
use razed_domain::{CharacterId, CharacterProgressionState, ProgressionStore};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// The internal shared state of a [`SnapshotStore`].
#[derive(Debug)]
pub struct StoreInner {
    /// Canonicalized physical root; every resolved path must stay below it.
    pub(crate) root: PathBuf,
    pub(crate) pretty: bool,
    /// Makes concurrent temp file names unique within the process.
    pub(crate) tmp_counter: AtomicU64,
}

/// File-backed [`ProgressionStore`].
///
/// Snapshots live at `<root>/characters/<shard>/<id>.json`. Writes go to a unique temp file
/// that is synced and then renamed over the target, so a crash leaves either the previous
/// or the new snapshot on disk. Cloning is cheap.
///
/// ```rust
/// use razed_domain::{CharacterId, CharacterProgressionState};
/// use razed_storage::{SnapshotStore, StorageError};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let store = SnapshotStore::builder().root(tmp.path().join("data")).connect().await?;
///
///     let state = CharacterProgressionState::new(CharacterId::new("K7mPq2xRt9Za"), None, 100);
///     store.write_snapshot(&state).await?;
///
///     let loaded = store.read_snapshot(&state.character_id).await?;
///     assert_eq!(loaded, Some(state));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pub(crate) inner: Arc<StoreInner>,
}

impl Deref for SnapshotStore {
    type Target = StoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl SnapshotStore {
    #[must_use = "The store is not opened until you call .connect()"]
    pub fn builder() -> SnapshotStoreBuilder {
        SnapshotStoreBuilder::new()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical location of a character's snapshot.
    ///
    /// # Errors
    /// [`StorageError::InvalidId`] for ids that are not plain tokens, or
    /// [`StorageError::PathTraversalAttempt`] if a shard directory escapes the root.
    pub fn resolve(&self, id: &CharacterId) -> Result<PathBuf, StorageError> {
        security::snapshot_path(&self.root, id.as_str())
    }

    /// Serializes and atomically replaces the character's snapshot.
    pub async fn write_snapshot(
        &self,
        state: &CharacterProgressionState,
    ) -> Result<(), StorageError> {
        let resolved = self.resolve(&state.character_id)?;
        let data = if self.pretty {
            serde_json::to_vec_pretty(state)
        } else {
            serde_json::to_vec(state)
        }
        .context(format!("Failed to encode snapshot of {}", state.character_id))?;

        self.write_atomic(&resolved, &data).await?;
        debug!(
            character = %state.character_id,
            revision = state.revision,
            path = %resolved.display(),
            "Snapshot saved atomically"
        );
        Ok(())
    }

    /// Loads a character's snapshot; `Ok(None)` when none was ever saved.
    ///
    /// # Errors
    /// [`StorageError::Mismatch`] when the file holds a different character.
    pub async fn read_snapshot(
        &self,
        id: &CharacterId,
    ) -> Result<Option<CharacterProgressionState>, StorageError> {
        let resolved = self.resolve(id)?;

        let data = match fs::read(&resolved).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", resolved.display()).into()),
                });
            },
        };

        let state: CharacterProgressionState = serde_json::from_slice(&data)
            .context(format!("Failed to decode snapshot {}", resolved.display()))?;

        if state.character_id != *id {
            return Err(StorageError::Mismatch {
                message: format!("expected {id}, found {}", state.character_id).into(),
                context: Some(resolved.display().to_string().into()),
            });
        }

        Ok(Some(state))
    }

    /// Removes a snapshot. Returns whether one existed.
    pub async fn delete_snapshot(&self, id: &CharacterId) -> Result<bool, StorageError> {
        let resolved = self.resolve(id)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(character = %id, "Snapshot deleted");
                Ok(true)
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", resolved.display()).into()),
            }),
        }
    }

    /// Every character with a saved snapshot, sorted by id.
    pub async fn list(&self) -> Result<Vec<CharacterId>, StorageError> {
        let root = self.root.clone();
        let ids = tokio::task::spawn_blocking(move || maintenance::snapshot_ids(&root))
            .await
            .map_err(|e| StorageError::Internal {
                message: e.to_string().into(),
                context: Some("Snapshot listing task failed".into()),
            })?;
        Ok(ids.into_iter().map(CharacterId::from).collect())
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    async fn write_atomic(&self, resolved: &Path, data: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create shard for {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(resolved, &self.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, resolved).await {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(resolved)
                    .await
                    .context(format!("Failed to replace existing file: {}", resolved.display()))?;
                fs::rename(&temp, resolved).await.context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    resolved.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                            .into(),
                    ),
                });
            }
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        Ok(())
    }
}

impl ProgressionStore for SnapshotStore {
    type Error = StorageError;

    async fn save(&self, snapshot: &CharacterProgressionState) -> Result<(), Self::Error> {
        self.write_snapshot(snapshot).await
    }

    async fn load(
        &self,
        id: &CharacterId,
    ) -> Result<Option<CharacterProgressionState>, Self::Error> {
        self.read_snapshot(id).await
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("snapshot");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}
