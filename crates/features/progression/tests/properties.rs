use proptest::prelude::*;
use proptest::sample::select;
use razed_domain::{
    AbilityPath, CharacterId, CharacterProgressionState, Element, ExoticPower, Faction,
    Outcome, SoulPower, SoulPowers, TomeDefinition,
};
use razed_events::MemorySink;
use razed_progression::{Ledger, Registry, evaluator};
use std::sync::Arc;

fn tome() -> impl Strategy<Value = TomeDefinition> {
    (
        (0..2_000u64, 0..1_000u64, 0..8u32),
        (
            proptest::option::of(select(AbilityPath::ALL)),
            proptest::option::of(select(Element::ALL)),
            proptest::option::of(select(ExoticPower::ALL)),
            proptest::option::of(select(SoulPower::ALL)),
            proptest::option::of(select(Faction::ALL)),
        ),
        (
            0..500u64,
            proptest::option::of("[A-Z][a-z]{2,8}"),
            proptest::option::of(select(SoulPower::ALL)),
        ),
    )
        .prop_map(|((cost, xp_reward, required_level), gates, rewards)| {
            let (
                required_path,
                required_element,
                required_exotic,
                required_soul_power,
                required_faction,
            ) = gates;
            let (reputation_reward, granted_skill, granted_soul_power) = rewards;
            TomeDefinition {
                cost,
                xp_reward,
                required_level,
                required_path,
                required_element,
                required_exotic,
                required_soul_power,
                required_faction,
                reputation_reward,
                granted_skill,
                granted_soul_power,
                ..TomeDefinition::new("subject", "Subject")
            }
        })
}

fn character() -> impl Strategy<Value = CharacterProgressionState> {
    (
        (1..8u32, 0..2_500u64, 0..10_000u64),
        (
            proptest::option::of(select(AbilityPath::ALL)),
            proptest::option::of(select(Element::ALL)),
            proptest::option::of(select(ExoticPower::ALL)),
            proptest::option::of(select(Faction::ALL)),
        ),
        (
            proptest::collection::vec(select(SoulPower::ALL), 0..3),
            proptest::collection::btree_set("[A-Z][a-z]{2,8}", 0..3),
        ),
    )
        .prop_map(|((level, credits, current_xp), identity, unlocks)| {
            let (primary_path, primary_element, exotic_power, faction) = identity;
            let (powers, skills) = unlocks;
            let mut state =
                CharacterProgressionState::new(CharacterId::new("subject"), faction, credits)
                    .with_level(level)
                    .with_soul_powers(powers.into_iter().collect::<SoulPowers>());
            state.current_xp = current_xp;
            state.primary_path = primary_path;
            state.primary_element = primary_element;
            state.exotic_power = exotic_power;
            state.unlocked_skills = skills;
            state
        })
}

fn ledger_with(tome: &TomeDefinition, state: &CharacterProgressionState) -> Ledger {
    let registry = Registry::from_definitions(vec![tome.clone()], Vec::new(), false).unwrap();
    let ledger = Ledger::new(registry, Arc::new(MemorySink::default()));
    ledger.adopt(state.clone()).unwrap();
    ledger
}

proptest! {
    #[test]
    fn denial_leaves_state_untouched(tome in tome(), before in character()) {
        let ledger = ledger_with(&tome, &before);
        let outcome = ledger.learn_tome(&before.character_id, "subject").unwrap();

        if !outcome.is_success() {
            prop_assert_eq!(ledger.snapshot(&before.character_id).unwrap(), before);
        }
    }

    #[test]
    fn success_conserves_credits_and_xp(tome in tome(), before in character()) {
        let ledger = ledger_with(&tome, &before);
        let outcome = ledger.learn_tome(&before.character_id, "subject").unwrap();
        let after = ledger.snapshot(&before.character_id).unwrap();

        if let Outcome::Learned(grant) = outcome {
            prop_assert_eq!(after.credits, before.credits - tome.cost);
            prop_assert_eq!(after.current_xp, before.current_xp + tome.xp_reward);
            prop_assert_eq!(after.revision, before.revision + 1);
            prop_assert_eq!(grant.revision, after.revision);
            prop_assert!(before.unlocked_skills.is_subset(&after.unlocked_skills));
            prop_assert!(after.unlocked_soul_powers.contains(before.unlocked_soul_powers));
        }
    }

    #[test]
    fn reputation_moves_only_for_required_faction(tome in tome(), before in character()) {
        let ledger = ledger_with(&tome, &before);
        ledger.learn_tome(&before.character_id, "subject").unwrap();
        let after = ledger.snapshot(&before.character_id).unwrap();

        for &faction in Faction::ALL {
            let gained =
                after.faction_reputation.get(faction) - before.faction_reputation.get(faction);
            if tome.required_faction != Some(faction) {
                prop_assert_eq!(gained, 0);
            } else if after.revision > before.revision {
                prop_assert_eq!(gained, tome.reputation_reward);
            }
        }
    }

    #[test]
    fn ledger_reports_first_failing_gate(tome in tome(), before in character()) {
        let ledger = ledger_with(&tome, &before);
        let expected = evaluator::failing_gates(&before, &tome).next();
        let outcome = ledger.learn_tome(&before.character_id, "subject").unwrap();

        prop_assert_eq!(outcome.reason(), expected);
        prop_assert_eq!(evaluator::evaluate(&before, &tome).err(), expected);
    }
}
