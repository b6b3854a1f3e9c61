use crate::cli::Command;
use anyhow::{Context, Result, bail};
use razed::Progression;
use razed::domain::{
    AbilityPath, CharacterId, CharacterProgressionState, Element, ExoticPower, Faction, Outcome,
    ProgressionStore, SoulPower, TomeDefinition,
};
use std::io::{self, Write};

pub async fn run<S: ProgressionStore + Clone>(
    service: &Progression<S>,
    command: Command,
) -> Result<()> {
    let mut out = io::stdout().lock();

    match command {
        Command::Check => {
            let registry = service.registry();
            writeln!(
                out,
                "catalog ok: {} tomes, {} backgrounds ({})",
                registry.len(),
                registry.backgrounds().len(),
                service.config().catalog.path.display()
            )?;
        },
        Command::List => {
            for tome in service.registry().iter() {
                writeln!(
                    out,
                    "{:<24} {:<22} {:>6} cr  {:>5} xp",
                    tome.id.as_str(),
                    tome.display_name,
                    tome.cost,
                    tome.xp_reward
                )?;
            }
        },
        Command::Show { tome } => {
            let Some(definition) = service.get_definition_info(&tome) else {
                bail!("Tome not found: {tome}");
            };
            describe(&mut out, definition)?;
        },
        Command::New { faction, credits, background, element } => {
            let state = match background {
                Some(background) => service.initialize_from_background(&background)?,
                None => {
                    let credits = credits.unwrap_or_else(|| service.default_starting_credits());
                    service.create_character(|id| {
                        let state = CharacterProgressionState::new(id, faction, credits);
                        match element {
                            Some(element) => {
                                state.with_path(AbilityPath::Elemental).with_element(element)
                            },
                            None => state,
                        }
                    })
                },
            };
            writeln!(out, "{}", state.character_id)?;
        },
        Command::Learn { character, tome } => {
            let id = CharacterId::new(character);
            let outcome = service
                .learn_tome(&id, &tome)
                .await
                .with_context(|| format!("Cannot learn {tome} for {id}"))?;
            match outcome {
                Outcome::Learned(grant) => {
                    write!(
                        out,
                        "Learned: {}! -{} credits, +{} xp",
                        grant.display_name, grant.credits_spent, grant.xp_gained
                    )?;
                    if let Some((faction, amount)) = grant.reputation {
                        write!(out, ", +{amount} {faction} reputation")?;
                    }
                    writeln!(out)?;
                },
                Outcome::Denied { reason, .. } => {
                    writeln!(out, "{}", reason.message(service.get_definition_info(&tome)))?;
                },
            }
        },
        Command::Status { character } => {
            let id = CharacterId::new(character);
            let state = service.status(&id).await?;
            summarize(&mut out, &state)?;

            let offers = service.preview(&id).await?;
            let eligible: Vec<_> =
                offers.iter().filter(|o| o.is_eligible()).map(|o| o.tome.id.as_str()).collect();
            writeln!(out, "can learn:  {}", joined(&eligible))?;
        },
    }

    out.flush()?;
    Ok(())
}

fn describe(out: &mut impl Write, tome: &TomeDefinition) -> io::Result<()> {
    writeln!(out, "{} ({})", tome.display_name, tome.id)?;
    if !tome.flavor_text.is_empty() {
        writeln!(out, "  {}", tome.flavor_text)?;
    }
    writeln!(out, "  cost:       {} credits", tome.cost)?;
    writeln!(out, "  reward:     {} xp", tome.xp_reward)?;
    if tome.required_level > 0 {
        writeln!(out, "  level:      {}", tome.required_level)?;
    }
    let gates = [
        ("path", tome.required_path.map(AbilityPath::label)),
        ("element", tome.required_element.map(Element::label)),
        ("exotic", tome.required_exotic.map(ExoticPower::label)),
        ("soul power", tome.required_soul_power.map(SoulPower::label)),
        ("faction", tome.required_faction.map(Faction::label)),
    ];
    for (gate, value) in gates {
        if let Some(value) = value {
            writeln!(out, "  {:<11} {value}", format!("{gate}:"))?;
        }
    }
    if let Some(skill) = tome.skill() {
        writeln!(out, "  grants:     {skill}")?;
    }
    if let Some(power) = tome.granted_soul_power {
        writeln!(out, "  unlocks:    {power}")?;
    }
    if let Some((faction, amount)) = tome.reputation_grant() {
        writeln!(out, "  reputation: +{amount} {faction}")?;
    }
    Ok(())
}

fn summarize(out: &mut impl Write, state: &CharacterProgressionState) -> io::Result<()> {
    let label = |v: Option<&'static str>| v.unwrap_or("-");

    writeln!(out, "character:  {} (revision {})", state.character_id, state.revision)?;
    writeln!(out, "level:      {}", state.level)?;
    writeln!(out, "credits:    {}", state.credits)?;
    writeln!(out, "xp:         {}", state.current_xp)?;
    writeln!(out, "faction:    {}", label(state.faction.map(Faction::label)))?;
    writeln!(out, "path:       {}", label(state.primary_path.map(AbilityPath::label)))?;
    writeln!(out, "element:    {}", label(state.primary_element.map(Element::label)))?;
    writeln!(out, "exotic:     {}", label(state.exotic_power.map(ExoticPower::label)))?;

    let skills: Vec<_> = state.unlocked_skills.iter().map(String::as_str).collect();
    writeln!(out, "skills:     {}", joined(&skills))?;

    let powers: Vec<_> = state.unlocked_soul_powers.powers().map(SoulPower::label).collect();
    writeln!(out, "soul:       {}", joined(&powers))?;

    for (faction, reputation) in state.faction_reputation.iter().filter(|&(_, r)| r > 0) {
        writeln!(out, "reputation: {faction} {reputation}")?;
    }
    Ok(())
}

fn joined(items: &[&str]) -> String {
    if items.is_empty() { "-".to_owned() } else { items.join(", ") }
}
