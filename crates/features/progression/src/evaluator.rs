//! Pure eligibility rules. No I/O, no locking, no mutation.

use razed_domain::{CharacterProgressionState, DenialReason, TomeDefinition};

type Gate = fn(&CharacterProgressionState, &TomeDefinition) -> bool;

/// Ordered gates. Each returns `true` when the character fails it.
const GATES: [(DenialReason, Gate); 8] = [
    (DenialReason::LevelTooLow, level_too_low),
    (DenialReason::WrongPath, wrong_path),
    (DenialReason::WrongElement, wrong_element),
    (DenialReason::WrongExotic, wrong_exotic),
    (DenialReason::SoulPowerLocked, soul_power_locked),
    (DenialReason::FactionMismatch, faction_mismatch),
    (DenialReason::InsufficientCredits, insufficient_credits),
    (DenialReason::AlreadyLearned, already_learned),
];

/// Decides whether `state` may learn `tome`.
///
/// Returns the first failing gate in a fixed order: level, path, element, exotic power,
/// soul power, faction, credits, duplicate skill.
///
/// # Errors
/// The [`DenialReason`] of the first gate the character fails.
pub fn evaluate(
    state: &CharacterProgressionState,
    tome: &TomeDefinition,
) -> Result<(), DenialReason> {
    failing_gates(state, tome).next().map_or(Ok(()), Err)
}

/// Every gate the character fails, in evaluation order.
pub fn failing_gates<'a>(
    state: &'a CharacterProgressionState,
    tome: &'a TomeDefinition,
) -> impl Iterator<Item = DenialReason> + 'a {
    GATES.iter().filter(move |(_, fails)| fails(state, tome)).map(|&(reason, _)| reason)
}

fn level_too_low(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    tome.required_level > 0 && state.level < tome.required_level
}

fn wrong_path(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    tome.required_path.is_some_and(|path| state.primary_path != Some(path))
}

fn wrong_element(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    tome.required_element.is_some_and(|element| state.primary_element != Some(element))
}

fn wrong_exotic(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    tome.required_exotic.is_some_and(|power| state.exotic_power != Some(power))
}

fn soul_power_locked(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    tome.required_soul_power.is_some_and(|power| !state.unlocked_soul_powers.has(power))
}

fn faction_mismatch(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    tome.required_faction.is_some_and(|faction| state.faction != Some(faction))
}

fn insufficient_credits(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    state.credits < tome.cost
}

fn already_learned(state: &CharacterProgressionState, tome: &TomeDefinition) -> bool {
    tome.skill().is_some_and(|skill| state.has_skill(skill))
}
