use razed_domain::config::{AppConfig, CatalogConfig, CharacterConfig, PersistenceConfig};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn config_defaults_are_sane() {
    let catalog = CatalogConfig::default();
    assert_eq!(catalog.path, PathBuf::from("catalog/tomes.toml"));
    assert!(!catalog.strict);

    let persistence = PersistenceConfig::default();
    assert_eq!(persistence.max_attempts, 5);
    assert_eq!(persistence.initial_backoff(), Duration::from_millis(100));
    assert!(persistence.max_backoff() >= persistence.initial_backoff());

    assert_eq!(CharacterConfig::default().default_starting_credits, 100);
}

#[test]
fn app_config_deserializes_partial_sections() {
    let raw = json!({
        "catalog": { "path": "/srv/razed/tomes.json", "strict": true },
        "persistence": { "max_attempts": 2 },
        "logging": { "level": "debug", "json": true }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert!(cfg.catalog.strict);
    assert_eq!(cfg.persistence.max_attempts, 2);
    assert_eq!(cfg.persistence.initial_backoff_ms, 100);
    assert_eq!(cfg.storage.data_dir, PathBuf::from("data"));
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.console);
}

#[test]
fn clones_share_until_mutated() {
    let base = AppConfig::default();
    let mut tuned = base.clone();
    tuned.characters.default_starting_credits = 250;

    assert_eq!(base.characters.default_starting_credits, 100);
    assert_eq!(tuned.characters.default_starting_credits, 250);
}
