use crate::abilities::{AbilityPath, Element, ExoticPower, Faction, SoulPowers};
use crate::ids::CharacterId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Reputation per faction. Every known faction always has an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reputation(BTreeMap<Faction, u64>);

impl Default for Reputation {
    fn default() -> Self {
        Self(Faction::ALL.iter().map(|f| (*f, 0)).collect())
    }
}

impl Reputation {
    #[must_use]
    pub fn get(&self, faction: Faction) -> u64 {
        self.0.get(&faction).copied().unwrap_or_default()
    }

    pub fn set(&mut self, faction: Faction, value: u64) {
        self.0.insert(faction, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Faction, u64)> + '_ {
        self.0.iter().map(|(f, v)| (*f, *v))
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().fold(0, |acc, v| acc.saturating_add(*v))
    }
}

impl<'de> Deserialize<'de> for Reputation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = BTreeMap::<Faction, u64>::deserialize(deserializer)?;
        let mut reputation = Self::default();
        reputation.0.extend(stored);
        Ok(reputation)
    }
}

/// Mutable progression record of one character.
///
/// Live instances are owned by the ledger; everything else works on snapshots.
/// `revision` grows by one on every committed change and orders persisted snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterProgressionState {
    pub character_id: CharacterId,
    pub level: u32,
    pub credits: u64,
    pub current_xp: u64,
    #[serde(default)]
    pub primary_path: Option<AbilityPath>,
    #[serde(default)]
    pub primary_element: Option<Element>,
    #[serde(default)]
    pub exotic_power: Option<ExoticPower>,
    #[serde(default)]
    pub faction: Option<Faction>,
    #[serde(default)]
    pub unlocked_soul_powers: SoulPowers,
    #[serde(default)]
    pub unlocked_skills: BTreeSet<String>,
    #[serde(default)]
    pub faction_reputation: Reputation,
    #[serde(default)]
    pub revision: u64,
}

impl CharacterProgressionState {
    /// Level 1, no XP, nothing unlocked, every faction at zero reputation.
    #[must_use]
    pub fn new(character_id: CharacterId, faction: Option<Faction>, credits: u64) -> Self {
        Self {
            character_id,
            level: 1,
            credits,
            current_xp: 0,
            primary_path: None,
            primary_element: None,
            exotic_power: None,
            faction,
            unlocked_soul_powers: SoulPowers::empty(),
            unlocked_skills: BTreeSet::new(),
            faction_reputation: Reputation::default(),
            revision: 0,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: AbilityPath) -> Self {
        self.primary_path = Some(path);
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.primary_element = Some(element);
        self
    }

    #[must_use]
    pub fn with_exotic(mut self, power: ExoticPower) -> Self {
        self.exotic_power = Some(power);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_soul_powers(mut self, powers: SoulPowers) -> Self {
        self.unlocked_soul_powers |= powers;
        self
    }

    #[must_use]
    pub fn has_skill(&self, skill: &str) -> bool {
        self.unlocked_skills.contains(skill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_seeds_every_faction() {
        let state = CharacterProgressionState::new(CharacterId::new("c1"), None, 100);
        assert_eq!(state.level, 1);
        assert_eq!(state.faction_reputation.iter().count(), Faction::ALL.len());
        assert_eq!(state.faction_reputation.total(), 0);
    }

    #[test]
    fn partial_reputation_is_reseeded_on_load() {
        let json = r#"{
            "character_id": "c1",
            "level": 3,
            "credits": 40,
            "current_xp": 900,
            "faction_reputation": { "apex_hunters": 200 }
        }"#;
        let state: CharacterProgressionState = serde_json::from_str(json).unwrap();
        assert_eq!(state.faction_reputation.get(Faction::ApexHunters), 200);
        assert_eq!(state.faction_reputation.get(Faction::PyreClans), 0);
        assert_eq!(state.faction_reputation.iter().count(), Faction::ALL.len());
    }

    #[test]
    fn unknown_snapshot_fields_are_rejected() {
        let json =
            r#"{ "character_id": "c1", "level": 1, "credits": 0, "current_xp": 0, "gold": 1 }"#;
        assert!(serde_json::from_str::<CharacterProgressionState>(json).is_err());
    }
}
