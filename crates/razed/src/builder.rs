use crate::error::{ProgressionError, ProgressionErrorExt};
use crate::service::{Progression, ProgressionInner};
use private::Sealed;
use razed_domain::config::AppConfig;
use razed_domain::{EventSink, ProgressionStore};
use razed_events::TracingSink;
use razed_progression::{Ledger, PersistenceHandle, Registry, RetryPolicy};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoStore;
#[derive(Debug)]
pub struct WithStore<S>(S);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoStore {}
impl<S> Sealed for WithStore<S> {}

/// Assembles a [`Progression`] service.
///
/// Only the store is mandatory. The catalog is read from `config.catalog` unless a
/// [`Registry`] is supplied, and notifications go to [`TracingSink`] unless a sink is set.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct ProgressionBuilder<S: Sealed = NoStore> {
    state: S,
    config: AppConfig,
    registry: Option<Registry>,
    sink: Option<Arc<dyn EventSink>>,
}

impl Default for ProgressionBuilder<NoStore> {
    fn default() -> Self {
        Self { state: NoStore, config: AppConfig::default(), registry: None, sink: None }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> ProgressionBuilder<S> {
    #[must_use = "Sets the service configuration"]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "Uses an already loaded catalog instead of config.catalog"]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use = "Sets where outcome notifications are delivered"]
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn transition<N: Sealed>(self, state: N) -> ProgressionBuilder<N> {
        ProgressionBuilder { state, config: self.config, registry: self.registry, sink: self.sink }
    }
}

impl ProgressionBuilder<NoStore> {
    #[must_use = "Creates a new service builder"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the persistence gateway"]
    pub fn store<S: ProgressionStore + Clone>(self, store: S) -> ProgressionBuilder<WithStore<S>> {
        self.transition(WithStore(store))
    }
}

impl<S: ProgressionStore + Clone> ProgressionBuilder<WithStore<S>> {
    /// Loads the catalog if needed and starts the persistence worker.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// [`ProgressionError::Catalog`] for an invalid catalog and [`ProgressionError::Ledger`]
    /// when no runtime is available for the worker.
    pub fn build(self) -> Result<Progression<S>, ProgressionError> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => Registry::load(&self.config.catalog.path, self.config.catalog.strict)
                .context("Loading tome catalog")?,
        };
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        let policy = RetryPolicy::from_config(&self.config.persistence);
        let (persistence, _worker) =
            PersistenceHandle::spawn(self.state.0.clone(), policy, Arc::clone(&sink))
                .context("Starting persistence worker")?;
        let ledger = Ledger::with_persistence(registry, sink, persistence);

        info!(
            tomes = ledger.registry().len(),
            max_attempts = policy.max_attempts,
            "Progression service ready"
        );

        Ok(Progression {
            inner: Arc::new(ProgressionInner { config: self.config, ledger, store: self.state.0 }),
        })
    }
}
