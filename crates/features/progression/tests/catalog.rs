mod common;

use razed_domain::{Element, Faction, SoulPower};
use razed_progression::{CatalogError, Registry};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn shipped_catalog_is_valid() {
    let registry = common::registry();

    assert_eq!(registry.len(), 9);
    let soul_drain = registry.get("soul_drain").unwrap();
    assert_eq!(soul_drain.required_level, 10);
    assert_eq!(soul_drain.required_soul_power, Some(SoulPower::SoulBind));

    let contract = registry.get("apex_hunter_contract").unwrap();
    assert_eq!(contract.skill(), None);
    assert_eq!(contract.reputation_grant(), Some((Faction::ApexHunters, 100)));

    let background = registry.background("military_family").unwrap();
    assert_eq!(background.title, "Stellar Guard Progeny");
    assert_eq!(background.starting_element, Some(Element::Earth));
}

#[test]
fn json_catalog_loads() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tomes.json",
        r#"{ "tomes": [ { "id": "wind_lv1", "display_name": "Gust Slash", "cost": 500,
              "required_element": "wind", "granted_skill": "Gust Slash" } ] }"#,
    );

    let registry = Registry::load(&path, true).unwrap();
    assert_eq!(registry.get("wind_lv1").unwrap().required_element, Some(Element::Wind));
    assert!(registry.backgrounds().is_empty());
}

#[test]
fn duplicate_ids_abort_loading() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tomes.toml",
        r#"
        [[tomes]]
        id = "fire_lv1"
        display_name = "Ember Strike"
        cost = 500

        [[tomes]]
        id = "fire_lv1"
        display_name = "Ember Strike Again"
        cost = 10
        "#,
    );

    let err = Registry::load(&path, false).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateTome { .. }), "{err}");
    assert!(err.to_string().contains("fire_lv1"));
}

#[test]
fn reward_for_another_faction_aborts_loading() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tomes.toml",
        r#"
        [[tomes]]
        id = "apex_hunter_contract"
        display_name = "Elite Hunt Contract"
        cost = 2000
        required_faction = "apex_hunters"
        reputation_faction = "pyre_clans"
        reputation_reward = 100
        "#,
    );

    let err = Registry::load(&path, false).unwrap_err();
    assert!(matches!(err, CatalogError::FactionRewardMismatch { .. }), "{err}");
}

#[test]
fn strict_mode_rejects_unassigned_reward() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tomes.toml",
        r#"
        [[tomes]]
        id = "bounty"
        display_name = "Open Bounty"
        cost = 100
        reputation_reward = 25
        "#,
    );

    assert!(Registry::load(&path, false).is_ok());
    let err = Registry::load(&path, true).unwrap_err();
    assert!(matches!(err, CatalogError::UnassignedReward { .. }));
}

#[test]
fn unknown_keys_and_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let typo = write(
        &dir,
        "typo.toml",
        "[[tomes]]\nid = \"a\"\ndisplay_name = \"A\"\ncost = 1\nprice = 2\n",
    );
    let plasma = write(
        &dir,
        "plasma.toml",
        "[[tomes]]\nid = \"a\"\ndisplay_name = \"A\"\ncost = 1\nrequired_element = \"plasma\"\n",
    );

    for path in [typo, plasma] {
        let err = Registry::load(&path, false).unwrap_err();
        assert!(matches!(err, CatalogError::Toml { .. }), "{err}");
    }
}

#[test]
fn blank_names_and_bad_files_fail() {
    let dir = TempDir::new().unwrap();
    let blank =
        write(&dir, "blank.toml", "[[tomes]]\nid = \" \"\ndisplay_name = \"A\"\ncost = 1\n");
    assert!(matches!(Registry::load(&blank, false), Err(CatalogError::Invalid { .. })));

    let yaml = write(&dir, "tomes.yaml", "tomes: []");
    assert!(matches!(Registry::load(&yaml, false), Err(CatalogError::UnsupportedFormat { .. })));

    let missing = dir.path().join("absent.toml");
    assert!(matches!(Registry::load(&missing, false), Err(CatalogError::Io { .. })));
}
