//! Collaborator ports. The progression core depends on these traits, never on adapters.

use crate::character::CharacterProgressionState;
use crate::ids::CharacterId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Human-readable outcome message handed to the event sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: Cow<'static, str>,
    pub severity: Severity,
    pub character: Option<CharacterId>,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>, severity: Severity) -> Self {
        Self { message: message.into(), severity, character: None }
    }

    #[must_use]
    pub fn for_character(mut self, character: CharacterId) -> Self {
        self.character = Some(character);
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Fire-and-forget notification port. Implementations must not block.
pub trait EventSink: Send + Sync + fmt::Debug {
    fn notify(&self, notification: Notification);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Durable store keyed by character id.
///
/// `save` is an idempotent upsert; `load` returns `Ok(None)` for unknown characters.
/// The core never relies on the storage technology or format behind it.
pub trait ProgressionStore: Send + Sync + fmt::Debug + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn save(
        &self,
        snapshot: &CharacterProgressionState,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn load(
        &self,
        id: &CharacterId,
    ) -> impl Future<Output = Result<Option<CharacterProgressionState>, Self::Error>> + Send;
}
