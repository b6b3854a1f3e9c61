//! Sandboxed, crash-safe file store for character progression snapshots.
//!
//! # Core Features
//!
//! - **Sandbox Security**: character ids are validated as plain tokens before they become file
//!   names, and every resolved path is checked against the canonical root.
//! - **Atomic Writes**: unique temp file + `fsync` + `rename`, so a snapshot is never left
//!   half-written.
//! - **Self-Healing**: temp files orphaned by a crash are removed when the store opens.
//!
//! [`SnapshotStore`] implements [`razed_domain::ProgressionStore`], the persistence port of
//! the progression core.

mod builder;
mod error;
mod maintenance;
mod security;
mod store;

pub use builder::SnapshotStoreBuilder;
pub use error::{StorageError, StorageErrorExt};
pub use store::{SnapshotStore, StoreInner};

pub(crate) const SNAPSHOT_DIR: &str = "characters";
pub(crate) const TMP_MARKER: &str = ".razedtmp.";
