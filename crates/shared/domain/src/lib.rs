//! # Domain Models
//!
//! Pure progression types shared by every other crate: the ability taxonomy, catalog
//! definitions, per-character progression state, learn outcomes, configuration and the
//! two collaborator ports.
//!
//! Keep it lean: no I/O, locking, or business rules. Dependencies are `serde` and `bitflags`.

pub mod abilities;
pub mod catalog;
pub mod character;
pub mod config;
pub mod ids;
pub mod outcome;
pub mod ports;

pub use abilities::{AbilityPath, Element, ExoticPower, Faction, SoulPower, SoulPowers};
pub use catalog::{BackgroundDefinition, TomeDefinition};
pub use character::{CharacterProgressionState, Reputation};
pub use ids::{CharacterId, TomeId};
pub use outcome::{DenialReason, Grant, Outcome};
pub use ports::{EventSink, Notification, ProgressionStore, Severity};
