//! Facade crate for the razed progression core.
//! Re-exports domain/kernel primitives and wires the catalog, ledger, persistence worker,
//! store and event sink into one [`Progression`] service.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Build a service with [`Progression::builder`], or call [`bootstrap`] to use the file
//!   snapshot store configured under `storage.data_dir`.
//! - Call [`Progression::flush`] before exit so queued writes reach the store.

mod builder;
mod error;
mod service;

pub use builder::{NoStore, ProgressionBuilder, WithStore};
pub use error::{ProgressionError, ProgressionErrorExt};
pub use razed_domain as domain;
pub use razed_events as events;
pub use razed_kernel as kernel;
pub use razed_progression as progression;
pub use razed_storage as storage;
pub use service::{Progression, ProgressionInner};

use razed_domain::EventSink;
use razed_domain::config::AppConfig;
use razed_storage::SnapshotStore;
use std::sync::Arc;

/// Opens the snapshot store under `config.storage.data_dir` and starts the service.
///
/// # Errors
/// Storage, catalog or worker start-up failures. All of them are fatal.
pub async fn bootstrap(
    config: AppConfig,
    sink: Arc<dyn EventSink>,
) -> Result<Progression<SnapshotStore>, ProgressionError> {
    let store = SnapshotStore::builder()
        .root(&config.storage.data_dir)
        .connect()
        .await
        .context("Opening snapshot store")?;

    Progression::builder().config(config).sink(sink).store(store).build()
}
