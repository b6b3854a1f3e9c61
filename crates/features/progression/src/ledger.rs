//! Authoritative in-memory progression state and its atomic mutation.

use crate::error::LedgerError;
use crate::evaluator;
use crate::persistence::{Durability, PersistenceHandle};
use crate::registry::Registry;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use razed_domain::{
    AbilityPath, CharacterId, CharacterProgressionState, DenialReason, EventSink, Faction, Grant,
    Notification, Outcome, Severity, TomeDefinition, TomeId,
};
use razed_kernel::new_character_id;
use std::collections::hash_map::Entry;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info};

type Slot = Arc<Mutex<CharacterProgressionState>>;

/// One catalog entry as seen by a particular character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub tome: TomeDefinition,
    pub eligibility: Result<(), DenialReason>,
}

impl Offer {
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.eligibility.is_ok()
    }
}

/// The internal shared state of a [`Ledger`].
#[derive(Debug)]
pub struct LedgerInner {
    registry: Registry,
    characters: RwLock<FxHashMap<CharacterId, Slot>>,
    sink: Arc<dyn EventSink>,
    persistence: Option<PersistenceHandle>,
}

/// Owns every resident character and serializes mutation per character.
///
/// The character map is only locked long enough to find a slot; each character has its own
/// mutex held for evaluation and commit, so different characters never contend. Cloning is
/// cheap.
#[derive(Debug, Clone)]
pub struct Ledger {
    inner: Arc<LedgerInner>,
}

impl Deref for Ledger {
    type Target = LedgerInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Ledger {
    /// A ledger without durable writes.
    #[must_use]
    pub fn new(registry: Registry, sink: Arc<dyn EventSink>) -> Self {
        Self::build(registry, sink, None)
    }

    /// A ledger that queues every committed snapshot on `persistence`.
    #[must_use]
    pub fn with_persistence(
        registry: Registry,
        sink: Arc<dyn EventSink>,
        persistence: PersistenceHandle,
    ) -> Self {
        Self::build(registry, sink, Some(persistence))
    }

    fn build(
        registry: Registry,
        sink: Arc<dyn EventSink>,
        persistence: Option<PersistenceHandle>,
    ) -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                registry,
                characters: RwLock::new(FxHashMap::default()),
                sink,
                persistence,
            }),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn persistence(&self) -> Option<&PersistenceHandle> {
        self.persistence.as_ref()
    }

    /// Attempts to learn `tome_id` for a resident character.
    ///
    /// The character's lock is held from evaluation through commit, so concurrent requests
    /// for the same character are serialized and re-checked. A denial leaves the state
    /// untouched and queues nothing. A success debits credits, credits XP, and grants the
    /// skill, soul power and reputation in one step, then queues the new snapshot for a
    /// durable write.
    ///
    /// # Errors
    /// [`LedgerError::CharacterNotLoaded`] for characters that are not resident, and
    /// [`LedgerError::Overflow`] if a reward would overflow a counter. Neither mutates state.
    pub fn learn_tome(
        &self,
        character: &CharacterId,
        tome_id: &str,
    ) -> Result<Outcome, LedgerError> {
        let Some(tome) = self.registry.get(tome_id) else {
            debug!(character = %character, tome = tome_id, "Unknown tome requested");
            self.notify_denial(character, DenialReason::NotFound, None);
            return Ok(Outcome::denied(TomeId::new(tome_id), DenialReason::NotFound));
        };

        let slot = self.slot(character)?;
        let mut state = slot.lock();

        if let Err(reason) = evaluator::evaluate(&state, tome) {
            drop(state);
            debug!(character = %character, tome = %tome.id, ?reason, "Tome denied");
            self.notify_denial(character, reason, Some(tome));
            return Ok(Outcome::denied(tome.id.clone(), reason));
        }

        let grant = commit(&mut state, tome)?;
        let snapshot = state.clone();
        drop(state);

        debug!(
            character = %character,
            tome = %tome.id,
            credits = snapshot.credits,
            xp = snapshot.current_xp,
            revision = snapshot.revision,
            "Tome learned"
        );
        self.sink.notify(
            Notification::new(format!("Learned: {}!", tome.display_name), Severity::Success)
                .for_character(character.clone()),
        );
        self.persist(snapshot);

        Ok(Outcome::Learned(grant))
    }

    /// Every catalog tome with the character's current eligibility, in catalog order.
    ///
    /// # Errors
    /// [`LedgerError::CharacterNotLoaded`] for characters that are not resident.
    pub fn preview(&self, character: &CharacterId) -> Result<Vec<Offer>, LedgerError> {
        let slot = self.slot(character)?;
        let state = slot.lock();

        Ok(self
            .registry
            .iter()
            .map(|tome| Offer {
                tome: tome.clone(),
                eligibility: evaluator::evaluate(&state, tome),
            })
            .collect())
    }

    /// Creates a level 1 character with a fresh id and queues its first write.
    pub fn initialize_character(
        &self,
        faction: Option<Faction>,
        credits: u64,
    ) -> CharacterProgressionState {
        self.create_character(|id| CharacterProgressionState::new(id, faction, credits))
    }

    /// Creates a character seeded from a catalog background.
    ///
    /// A starting element also selects the Elemental path.
    ///
    /// # Errors
    /// [`LedgerError::UnknownBackground`] if the catalog has no such background.
    pub fn initialize_from_background(
        &self,
        background_id: &str,
    ) -> Result<CharacterProgressionState, LedgerError> {
        let background = self.registry.background(background_id).ok_or_else(|| {
            LedgerError::UnknownBackground {
                message: background_id.to_owned().into(),
                context: None,
            }
        })?;

        Ok(self.create_character(|id| {
            let mut state = CharacterProgressionState::new(
                id,
                background.starting_faction,
                background.starting_credits,
            );
            state.current_xp = background.starting_xp;
            if let Some(element) = background.starting_element {
                state = state.with_path(AbilityPath::Elemental).with_element(element);
            }
            state
        }))
    }

    /// Registers a character built by `template` under a freshly generated id.
    ///
    /// The id passed to `template` is authoritative; any other id on the returned state is
    /// replaced. The id is reserved before `template` runs, and requests for it wait until
    /// the state is filled in.
    pub fn create_character(
        &self,
        template: impl FnOnce(CharacterId) -> CharacterProgressionState,
    ) -> CharacterProgressionState {
        let slot: Slot =
            Arc::new(Mutex::new(CharacterProgressionState::new(CharacterId::new(""), None, 0)));
        let mut reserved = slot.lock();
        let id = self.reserve(&slot);

        let mut state = template(id.clone());
        state.character_id = id;
        reserved.clone_from(&state);
        drop(reserved);

        info!(
            character = %state.character_id,
            faction = ?state.faction,
            credits = state.credits,
            "Character created"
        );
        self.persist(state.clone());
        state
    }

    /// Makes a new character resident and queues its first write.
    ///
    /// # Errors
    /// [`LedgerError::AlreadyLoaded`] if the id is taken.
    pub fn register(&self, state: CharacterProgressionState) -> Result<(), LedgerError> {
        let snapshot = state.clone();
        self.insert(state)?;
        self.persist(snapshot);
        Ok(())
    }

    /// Makes a character loaded from the store resident. Nothing is written back.
    ///
    /// # Errors
    /// [`LedgerError::AlreadyLoaded`] if the character is already resident; the resident
    /// copy is newer than anything in the store. [`LedgerError::WritePending`] if this ledger
    /// committed a newer revision that has not reached the store yet.
    pub fn adopt(&self, state: CharacterProgressionState) -> Result<(), LedgerError> {
        let id = state.character_id.clone();
        let revision = state.revision;

        if let Some(durability) = self.durability(&id)
            && durability.committed > revision
        {
            return Err(LedgerError::WritePending {
                message: id.to_string().into(),
                context: Some(
                    format!(
                        "store has revision {revision}, ledger committed {}",
                        durability.committed
                    )
                    .into(),
                ),
            });
        }

        self.insert(state)?;
        if let Some(persistence) = &self.persistence {
            persistence.mark_durable(&id, revision);
        }
        debug!(character = %id, revision, "Character adopted from store");
        Ok(())
    }

    /// Copy of the character's current state.
    #[must_use]
    pub fn snapshot(&self, character: &CharacterId) -> Option<CharacterProgressionState> {
        let slot = self.characters.read().get(character).cloned()?;
        let state = slot.lock().clone();
        Some(state)
    }

    /// Drops a character from memory. Returns `None` if it was not resident.
    ///
    /// # Errors
    /// [`LedgerError::WritePending`] while the character's latest revision has not reached
    /// the store; the character stays resident.
    pub fn evict(
        &self,
        character: &CharacterId,
    ) -> Result<Option<CharacterProgressionState>, LedgerError> {
        let mut characters = self.characters.write();
        let Some(slot) = characters.get(character).cloned() else {
            return Ok(None);
        };
        let state = slot.lock();

        if let Some(durability) = self.durability(character)
            && !durability.is_durable()
        {
            return Err(LedgerError::WritePending {
                message: character.to_string().into(),
                context: Some(format!("revision {} not yet durable", durability.committed).into()),
            });
        }

        let evicted = state.clone();
        drop(state);
        characters.remove(character);
        drop(characters);

        debug!(character = %character, revision = evicted.revision, "Character evicted");
        Ok(Some(evicted))
    }

    #[must_use]
    pub fn is_loaded(&self, character: &CharacterId) -> bool {
        self.characters.read().contains_key(character)
    }

    /// Resident character ids, sorted.
    #[must_use]
    pub fn characters(&self) -> Vec<CharacterId> {
        let mut ids: Vec<_> = self.characters.read().keys().cloned().collect();
        ids.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    #[must_use]
    pub fn durability(&self, character: &CharacterId) -> Option<Durability> {
        self.persistence.as_ref().and_then(|p| p.durability(character))
    }

    fn slot(&self, character: &CharacterId) -> Result<Slot, LedgerError> {
        self.characters.read().get(character).cloned().ok_or_else(|| {
            LedgerError::CharacterNotLoaded { message: character.to_string().into(), context: None }
        })
    }

    /// Files `slot` under an unused id.
    fn reserve(&self, slot: &Slot) -> CharacterId {
        let mut characters = self.characters.write();
        let id = loop {
            let candidate = new_character_id();
            if !characters.contains_key(&candidate) {
                break candidate;
            }
        };
        characters.insert(id.clone(), Arc::clone(slot));
        id
    }

    fn insert(&self, state: CharacterProgressionState) -> Result<(), LedgerError> {
        match self.characters.write().entry(state.character_id.clone()) {
            Entry::Occupied(entry) => Err(LedgerError::AlreadyLoaded {
                message: entry.key().to_string().into(),
                context: None,
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(state)));
                Ok(())
            },
        }
    }

    fn persist(&self, snapshot: CharacterProgressionState) {
        if let Some(persistence) = &self.persistence {
            persistence.enqueue(snapshot);
        }
    }

    fn notify_denial(
        &self,
        character: &CharacterId,
        reason: DenialReason,
        tome: Option<&TomeDefinition>,
    ) {
        self.sink.notify(
            Notification::new(reason.message(tome), reason.severity())
                .for_character(character.clone()),
        );
    }
}

/// Applies an eligible tome. Every new value is computed before anything is written, so an
/// overflow leaves `state` unchanged.
fn commit(
    state: &mut CharacterProgressionState,
    tome: &TomeDefinition,
) -> Result<Grant, LedgerError> {
    let overflow = |what: &'static str| LedgerError::Overflow {
        message: what.into(),
        context: Some(format!("{} learning {}", state.character_id, tome.id).into()),
    };

    let credits = state.credits.checked_sub(tome.cost).ok_or_else(|| overflow("credits"))?;
    let current_xp = state.current_xp.checked_add(tome.xp_reward).ok_or_else(|| overflow("xp"))?;
    let revision = state.revision.checked_add(1).ok_or_else(|| overflow("revision"))?;
    let reputation = match tome.reputation_grant() {
        Some((faction, amount)) => {
            let total = state
                .faction_reputation
                .get(faction)
                .checked_add(amount)
                .ok_or_else(|| overflow("reputation"))?;
            Some((faction, total))
        },
        None => None,
    };

    state.credits = credits;
    state.current_xp = current_xp;
    state.revision = revision;
    if let Some(skill) = tome.skill() {
        state.unlocked_skills.insert(skill.to_owned());
    }
    if let Some(power) = tome.granted_soul_power {
        state.unlocked_soul_powers.unlock(power);
    }
    if let Some((faction, total)) = reputation {
        state.faction_reputation.set(faction, total);
    }

    Ok(Grant {
        character_id: state.character_id.clone(),
        tome_id: tome.id.clone(),
        display_name: tome.display_name.clone(),
        credits_spent: tome.cost,
        xp_gained: tome.xp_reward,
        granted_skill: tome.skill().map(str::to_owned),
        granted_soul_power: tome.granted_soul_power,
        reputation: tome.reputation_grant(),
        revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use razed_domain::{CharacterId, SoulPower};

    #[test]
    fn overflow_leaves_state_untouched() {
        let tome = TomeDefinition { xp_reward: 10, ..TomeDefinition::new("xp", "Insight") };
        let mut state = CharacterProgressionState::new(CharacterId::new("hero"), None, 50);
        state.current_xp = u64::MAX - 5;
        let before = state.clone();

        let err = commit(&mut state, &tome).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn commit_grants_everything_at_once() {
        let tome = TomeDefinition {
            cost: 1000,
            xp_reward: 400,
            required_faction: Some(Faction::FrontierRebels),
            reputation_reward: 25,
            granted_skill: Some("Soul Bind".to_owned()),
            granted_soul_power: Some(SoulPower::SoulBind),
            ..TomeDefinition::new("soul_bind", "Soul Bind")
        };
        let mut state = CharacterProgressionState::new(
            CharacterId::new("hero"),
            Some(Faction::FrontierRebels),
            1000,
        );

        let grant = commit(&mut state, &tome).unwrap();

        assert_eq!((state.credits, state.current_xp, state.revision), (0, 400, 1));
        assert!(state.has_skill("Soul Bind"));
        assert!(state.unlocked_soul_powers.has(SoulPower::SoulBind));
        assert_eq!(state.faction_reputation.get(Faction::FrontierRebels), 25);
        assert_eq!(grant.reputation, Some((Faction::FrontierRebels, 25)));
        assert_eq!(grant.revision, 1);
    }
}
