//! # Runtime
//!
//! Tokio runtime profiles shared by the workspace binaries.
//!
//! * **Service**: multi-threaded, one worker per core; used by long-running hosts.
//! * **Compact**: two workers and small stacks; used by the operator shell, where the
//!   only background work is the persistence writer.
//!
//! ```rust,ignore
//! #[razed_runtime::main(compact)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use razed_derive::main;

use anyhow::anyhow;
use std::{thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 256;
/// 1 `MiB` .. 16 `MiB`.
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl RuntimeConfig {
    /// Preset for hosts serving many characters concurrently.
    #[must_use]
    pub fn service() -> Self {
        let workers = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                available_parallelism().map_or(DEFAULT_WORKER_THREADS, std::num::NonZero::get)
            });

        Self {
            worker_threads: workers.min(MAX_WORKER_THREADS),
            stack_size: 3 * 1024 * 1024,
            thread_name: "razed-worker".to_owned(),
            thread_keep_alive: Duration::from_secs(60),
        }
    }

    /// Preset for short-lived tools.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            worker_threads: 2,
            stack_size: 2 * 1024 * 1024,
            thread_name: "razed-tool".to_owned(),
            thread_keep_alive: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.thread_name = name;
        }
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::service()
    }
}

/// Builds a multi-threaded runtime with all drivers enabled.
///
/// Out-of-range values in `config` are clamped rather than rejected.
///
/// # Errors
///
/// Returns an error if the OS refuses to spawn the worker threads.
pub fn build_runtime(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config
        .clone()
        .with_worker_threads(config.worker_threads)
        .with_stack_size(config.stack_size);
    debug!(config = ?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_threads_are_clamped() {
        assert_eq!(RuntimeConfig::compact().with_worker_threads(0).worker_threads, 1);
        assert_eq!(
            RuntimeConfig::compact().with_worker_threads(10_000).worker_threads,
            MAX_WORKER_THREADS
        );
    }

    #[test]
    fn stack_size_is_clamped() {
        assert_eq!(RuntimeConfig::compact().with_stack_size(100).stack_size, MIN_STACK_SIZE);
        assert_eq!(RuntimeConfig::compact().with_stack_size(usize::MAX).stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn blank_thread_name_is_ignored() {
        let config = RuntimeConfig::compact().with_thread_name("  ");
        assert_eq!(config.thread_name, "razed-tool");
    }

    #[test]
    fn compact_runtime_runs_futures() {
        let runtime = build_runtime(&RuntimeConfig::compact()).unwrap();
        let value = runtime.block_on(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            7
        });
        assert_eq!(value, 7);
    }
}
