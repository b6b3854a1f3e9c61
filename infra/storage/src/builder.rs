use crate::error::{StorageError, StorageErrorExt};
use crate::store::{SnapshotStore, StoreInner};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
struct StoreConfig {
    create: bool,
    pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { create: true, pretty: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct SnapshotStoreBuilder<S: Sealed = NoRoot> {
    state: S,
    config: StoreConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> SnapshotStoreBuilder<S> {
    #[must_use = "Sets whether the root directory is created when missing"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    /// Indented JSON is easier to inspect by hand; compact JSON is smaller.
    #[must_use = "Sets the snapshot encoding style"]
    pub const fn pretty(mut self, enable: bool) -> Self {
        self.config.pretty = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> SnapshotStoreBuilder<N> {
        SnapshotStoreBuilder { state, config: self.config }
    }
}

impl SnapshotStoreBuilder<NoRoot> {
    #[must_use = "Creates a new store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory of the snapshot store"]
    pub fn root(self, path: impl Into<PathBuf>) -> SnapshotStoreBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl SnapshotStoreBuilder<WithRoot> {
    /// Opens the store.
    ///
    /// 1. Creates the root when `create(true)` (the default).
    /// 2. Canonicalizes the root so later sandbox checks compare physical paths.
    /// 3. Removes stale temp files left by interrupted writes. Failures there are logged only.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root is missing with `create(false)`, or cannot be
    /// created or resolved.
    pub async fn connect(self) -> Result<SnapshotStore, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;
        info!(path = %canonical.display(), "Opened snapshot store");

        let store = SnapshotStore {
            inner: Arc::new(StoreInner {
                root: canonical,
                pretty: self.config.pretty,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        store.purge_tmp().await;

        Ok(store)
    }
}
