use crate::abilities::{AbilityPath, Element, ExoticPower, Faction, SoulPower};
use crate::ids::TomeId;
use serde::{Deserialize, Serialize};

/// Immutable description of a learnable tome.
///
/// Every gate is optional; an absent gate never denies. `required_level` of `0` or `1` is
/// satisfied by any character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomeDefinition {
    pub id: TomeId,
    pub display_name: String,
    #[serde(default)]
    pub flavor_text: String,
    pub cost: u64,
    #[serde(default)]
    pub xp_reward: u64,
    #[serde(default)]
    pub required_level: u32,
    #[serde(default)]
    pub required_path: Option<AbilityPath>,
    #[serde(default)]
    pub required_element: Option<Element>,
    #[serde(default)]
    pub required_exotic: Option<ExoticPower>,
    #[serde(default)]
    pub required_soul_power: Option<SoulPower>,
    #[serde(default)]
    pub required_faction: Option<Faction>,
    /// Reputation credited to `required_faction` on success.
    #[serde(default)]
    pub reputation_reward: u64,
    /// Optional restatement of the rewarded faction; must match `required_faction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_faction: Option<Faction>,
    #[serde(default)]
    pub granted_skill: Option<String>,
    #[serde(default)]
    pub granted_soul_power: Option<SoulPower>,
}

impl TomeDefinition {
    /// A free, ungated tome with no rewards. Use struct update syntax to fill in the rest.
    #[must_use]
    pub fn new(id: impl Into<TomeId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            flavor_text: String::new(),
            cost: 0,
            xp_reward: 0,
            required_level: 0,
            required_path: None,
            required_element: None,
            required_exotic: None,
            required_soul_power: None,
            required_faction: None,
            reputation_reward: 0,
            reputation_faction: None,
            granted_skill: None,
            granted_soul_power: None,
        }
    }

    /// The skill granted on success; blank names count as none.
    #[must_use]
    pub fn skill(&self) -> Option<&str> {
        self.granted_skill.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Faction and amount credited on success, if any.
    #[must_use]
    pub fn reputation_grant(&self) -> Option<(Faction, u64)> {
        self.required_faction
            .filter(|_| self.reputation_reward > 0)
            .map(|faction| (faction, self.reputation_reward))
    }
}

/// Starting template for a new character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackgroundDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starting_faction: Option<Faction>,
    #[serde(default)]
    pub starting_element: Option<Element>,
    pub starting_credits: u64,
    #[serde(default)]
    pub starting_xp: u64,
}
