use crate::builder::ProgressionBuilder;
use crate::error::ProgressionError;
use razed_domain::config::AppConfig;
use razed_domain::{
    CharacterId, CharacterProgressionState, Faction, Outcome, ProgressionStore, TomeDefinition,
};
use razed_progression::{Durability, Ledger, LedgerError, Offer, Registry};
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// The internal shared state of a [`Progression`] service.
#[derive(Debug)]
pub struct ProgressionInner<S> {
    pub(crate) config: AppConfig,
    pub(crate) ledger: Ledger,
    pub(crate) store: S,
}

/// The progression service: the call surface used by session and UI collaborators.
///
/// Characters are loaded from the store on first use and stay resident afterwards; every
/// successful commit is written back in the background. Cloning is cheap.
#[derive(Debug)]
pub struct Progression<S> {
    pub(crate) inner: Arc<ProgressionInner<S>>,
}

impl<S> Clone for Progression<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S> Deref for Progression<S> {
    type Target = ProgressionInner<S>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Progression<()> {
    #[must_use = "The service is not started until you call .build()"]
    pub fn builder() -> ProgressionBuilder {
        ProgressionBuilder::new()
    }
}

impl<S: ProgressionStore + Clone> Progression<S> {
    /// Learns a tome for a character, loading the character from the store if needed.
    ///
    /// Unknown tomes are reported as a `NotFound` denial without touching the store.
    ///
    /// # Errors
    /// [`ProgressionError::CharacterNotFound`] if the character exists nowhere, and store
    /// or ledger failures.
    pub async fn learn_tome(
        &self,
        character: &CharacterId,
        tome_id: &str,
    ) -> Result<Outcome, ProgressionError> {
        if self.registry().contains(tome_id) {
            self.ensure_loaded(character).await?;
        }
        Ok(self.ledger.learn_tome(character, tome_id)?)
    }

    /// Read-only catalog lookup for display.
    #[must_use]
    pub fn get_definition_info(&self, tome_id: &str) -> Option<&TomeDefinition> {
        self.registry().get(tome_id)
    }

    /// Creates and registers a new level 1 character.
    #[must_use]
    pub fn initialize_character(
        &self,
        faction: Option<Faction>,
        credits: u64,
    ) -> CharacterProgressionState {
        self.ledger.initialize_character(faction, credits)
    }

    /// Starting credits from `characters.default_starting_credits`.
    #[must_use]
    pub fn default_starting_credits(&self) -> u64 {
        self.config.characters.default_starting_credits
    }

    /// Creates a character from a catalog background.
    ///
    /// # Errors
    /// [`ProgressionError::Ledger`] wrapping `UnknownBackground`.
    pub fn initialize_from_background(
        &self,
        background_id: &str,
    ) -> Result<CharacterProgressionState, ProgressionError> {
        Ok(self.ledger.initialize_from_background(background_id)?)
    }

    /// Registers a character built by `template` under a fresh id.
    pub fn create_character(
        &self,
        template: impl FnOnce(CharacterId) -> CharacterProgressionState,
    ) -> CharacterProgressionState {
        self.ledger.create_character(template)
    }

    /// Every tome with the character's eligibility, in catalog order.
    ///
    /// # Errors
    /// Same as [`Progression::status`].
    pub async fn preview(&self, character: &CharacterId) -> Result<Vec<Offer>, ProgressionError> {
        self.ensure_loaded(character).await?;
        Ok(self.ledger.preview(character)?)
    }

    /// Current state of a character, loading it if needed.
    ///
    /// # Errors
    /// [`ProgressionError::CharacterNotFound`] or a store failure.
    pub async fn status(
        &self,
        character: &CharacterId,
    ) -> Result<CharacterProgressionState, ProgressionError> {
        self.ensure_loaded(character).await?;
        self.ledger.snapshot(character).ok_or_else(|| not_found(character))
    }

    #[must_use]
    pub fn durability(&self, character: &CharacterId) -> Option<Durability> {
        self.ledger.durability(character)
    }

    /// Drops a resident character from memory once its latest revision is durable.
    ///
    /// # Errors
    /// [`ProgressionError::Ledger`] wrapping `WritePending` while a write is still queued.
    pub fn evict(
        &self,
        character: &CharacterId,
    ) -> Result<Option<CharacterProgressionState>, ProgressionError> {
        Ok(self.ledger.evict(character)?)
    }

    /// Waits for every queued write to be attempted.
    ///
    /// # Errors
    /// [`ProgressionError::Ledger`] if the persistence worker has stopped.
    pub async fn flush(&self) -> Result<(), ProgressionError> {
        if let Some(persistence) = self.ledger.persistence() {
            persistence.flush().await?;
        }
        Ok(())
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.ledger.registry()
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn ensure_loaded(&self, character: &CharacterId) -> Result<(), ProgressionError> {
        if self.ledger.is_loaded(character) {
            return Ok(());
        }

        match self.load_and_adopt(character).await {
            // An evicted revision is still queued; wait for it and read the store again.
            Err(ProgressionError::Ledger { source: LedgerError::WritePending { .. }, .. }) => {
                debug!(character = %character, "Waiting for queued writes before reload");
                self.flush().await?;
                self.load_and_adopt(character).await
            },
            result => result,
        }
    }

    async fn load_and_adopt(&self, character: &CharacterId) -> Result<(), ProgressionError> {
        let loaded = self.store.load(character).await.map_err(|e| ProgressionError::Store {
            message: e.to_string().into(),
            context: Some(format!("Loading {character}").into()),
        })?;
        let state = loaded.ok_or_else(|| not_found(character))?;

        match self.ledger.adopt(state) {
            // Another request loaded it first; the resident copy wins.
            Ok(()) | Err(LedgerError::AlreadyLoaded { .. }) => {
                debug!(character = %character, "Character resident");
                Ok(())
            },
            Err(err) => Err(err.into()),
        }
    }
}

fn not_found(character: &CharacterId) -> ProgressionError {
    ProgressionError::CharacterNotFound { message: character.to_string().into(), context: None }
}
