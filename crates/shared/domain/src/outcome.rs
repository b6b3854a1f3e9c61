use crate::abilities::{Faction, SoulPower};
use crate::catalog::TomeDefinition;
use crate::ids::{CharacterId, TomeId};
use crate::ports::Severity;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Why a learn request was refused.
///
/// Variants are listed in evaluation order; `NotFound` is resolved before any gate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    NotFound,
    LevelTooLow,
    WrongPath,
    WrongElement,
    WrongExotic,
    SoulPowerLocked,
    FactionMismatch,
    InsufficientCredits,
    AlreadyLearned,
}

impl DenialReason {
    /// Player-facing message. The tome fills in the level and faction placeholders.
    #[must_use]
    pub fn message(self, tome: Option<&TomeDefinition>) -> Cow<'static, str> {
        match self {
            Self::NotFound => Cow::Borrowed("Tome not found!"),
            Self::LevelTooLow => tome.map_or(Cow::Borrowed("Level too low!"), |t| {
                Cow::Owned(format!("Need level {}!", t.required_level))
            }),
            Self::WrongPath => Cow::Borrowed("Wrong path!"),
            Self::WrongElement => Cow::Borrowed("Wrong element!"),
            Self::WrongExotic => Cow::Borrowed("Wrong exotic power!"),
            Self::SoulPowerLocked => Cow::Borrowed("Soul power not unlocked!"),
            Self::FactionMismatch => {
                match tome.and_then(|t| t.required_faction) {
                    Some(faction) => Cow::Owned(format!("Requires {faction} faction!")),
                    None => Cow::Borrowed("Wrong faction!"),
                }
            },
            Self::InsufficientCredits => Cow::Borrowed("Not enough credits!"),
            Self::AlreadyLearned => Cow::Borrowed("Already learned!"),
        }
    }

    /// A repeated purchase is informational; every other denial is an error.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::AlreadyLearned => Severity::Info,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message(None))
    }
}

/// Everything one successful commit changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub character_id: CharacterId,
    pub tome_id: TomeId,
    pub display_name: String,
    pub credits_spent: u64,
    pub xp_gained: u64,
    pub granted_skill: Option<String>,
    pub granted_soul_power: Option<SoulPower>,
    pub reputation: Option<(Faction, u64)>,
    /// Character revision produced by this commit.
    pub revision: u64,
}

/// Result of `learn_tome`. Denials are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Learned(Grant),
    Denied { tome_id: TomeId, reason: DenialReason },
}

impl Outcome {
    #[must_use]
    pub fn denied(tome_id: TomeId, reason: DenialReason) -> Self {
        Self::Denied { tome_id, reason }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Learned(_))
    }

    #[must_use]
    pub const fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::Learned(_) => None,
            Self::Denied { reason, .. } => Some(*reason),
        }
    }

    #[must_use]
    pub fn granted_skill(&self) -> Option<&str> {
        match self {
            Self::Learned(grant) => grant.granted_skill.as_deref(),
            Self::Denied { .. } => None,
        }
    }

    #[must_use]
    pub const fn grant(&self) -> Option<&Grant> {
        match self {
            Self::Learned(grant) => Some(grant),
            Self::Denied { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_fill_in_tome_details() {
        let tome = TomeDefinition {
            required_level: 5,
            required_faction: Some(Faction::ApexHunters),
            ..TomeDefinition::new("fire_lv2", "Flame Burst")
        };
        assert_eq!(DenialReason::LevelTooLow.message(Some(&tome)), "Need level 5!");
        assert_eq!(
            DenialReason::FactionMismatch.message(Some(&tome)),
            "Requires Apex Hunters faction!"
        );
        assert_eq!(DenialReason::NotFound.message(None), "Tome not found!");
    }

    #[test]
    fn only_repeat_purchase_is_informational() {
        assert_eq!(DenialReason::AlreadyLearned.severity(), Severity::Info);
        assert_eq!(DenialReason::InsufficientCredits.severity(), Severity::Error);
    }

    #[test]
    fn denied_outcome_carries_no_skill() {
        let outcome = Outcome::denied(TomeId::new("fire_lv1"), DenialReason::AlreadyLearned);
        assert!(!outcome.is_success());
        assert_eq!(outcome.reason(), Some(DenialReason::AlreadyLearned));
        assert_eq!(outcome.granted_skill(), None);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "denied");
        assert_eq!(json["reason"], "already_learned");
    }
}
