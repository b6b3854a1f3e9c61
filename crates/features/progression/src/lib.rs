//! # Tome Progression
//!
//! The rule engine and ledger behind learning tomes.
//!
//! ## Architecture
//!
//! 1.  **[`Registry`]:** the immutable tome catalog, validated once at startup.
//! 2.  **[`evaluator`]:** pure eligibility checks in a fixed order.
//! 3.  **[`Ledger`]:** resident character state with per-character locking and an atomic
//!     commit. Outcomes go to an injected [`EventSink`](razed_domain::EventSink).
//! 4.  **[`persistence`]:** a background worker that writes committed snapshots through a
//!     [`ProgressionStore`](razed_domain::ProgressionStore) with bounded retries.
//!
//! ```rust
//! use razed_domain::{AbilityPath, Element, EventSink, Notification};
//! use razed_progression::{CatalogFormat, Ledger, Registry};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Quiet;
//! impl EventSink for Quiet {
//!     fn notify(&self, _: Notification) {}
//! }
//!
//! let catalog = r#"
//!     [[tomes]]
//!     id = "fire_lv1"
//!     display_name = "Ember Strike"
//!     cost = 500
//!     xp_reward = 100
//!     required_path = "elemental"
//!     required_element = "fire"
//!     granted_skill = "Ember Strike"
//! "#;
//! let registry = Registry::parse(catalog, CatalogFormat::Toml, true).unwrap();
//! let ledger = Ledger::new(registry, Arc::new(Quiet));
//!
//! let hero = ledger.create_character(|id| {
//!     razed_domain::CharacterProgressionState::new(id, None, 500)
//!         .with_path(AbilityPath::Elemental)
//!         .with_element(Element::Fire)
//! });
//! let outcome = ledger.learn_tome(&hero.character_id, "fire_lv1").unwrap();
//! assert_eq!(outcome.granted_skill(), Some("Ember Strike"));
//! ```

mod error;
pub mod evaluator;
mod ledger;
pub mod persistence;
mod registry;

pub use error::{CatalogError, CatalogErrorExt, LedgerError, LedgerErrorExt};
pub use ledger::{Ledger, LedgerInner, Offer};
pub use persistence::{Durability, PersistenceHandle, RetryPolicy};
pub use registry::{CatalogFile, CatalogFormat, Registry, RegistryInner};
