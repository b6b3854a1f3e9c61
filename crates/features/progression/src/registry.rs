//! Read-only lookup of tome and background definitions.

use crate::error::{CatalogError, CatalogErrorExt};
use fxhash::FxHashMap;
use razed_domain::{BackgroundDefinition, Faction, TomeDefinition, TomeId};
use serde::Deserialize;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Serialized form of a catalog file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub tomes: Vec<TomeDefinition>,
    #[serde(default)]
    pub backgrounds: Vec<BackgroundDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Toml,
    Json,
}

impl CatalogFormat {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    /// [`CatalogError::UnsupportedFormat`] for anything but `.toml` and `.json`.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(CatalogError::UnsupportedFormat {
                message: path.display().to_string().into(),
                context: Some("expected a .toml or .json file".into()),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct RegistryInner {
    tomes: Vec<TomeDefinition>,
    index: FxHashMap<TomeId, usize>,
    backgrounds: Vec<BackgroundDefinition>,
    background_index: FxHashMap<String, usize>,
}

/// Immutable tome catalog, shared by every request. Cloning is cheap.
///
/// Built once at startup; lookups never lock. Iteration follows catalog order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Deref for Registry {
    type Target = RegistryInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Registry {
    /// Reads and validates a catalog file. The extension selects the format.
    ///
    /// # Errors
    /// I/O and parse failures, plus every validation error of [`Registry::from_definitions`].
    pub fn load(path: impl AsRef<Path>, strict: bool) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let format = CatalogFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read catalog: {}", path.display()))?;

        let registry =
            Self::parse(&text, format, strict).context(path.display().to_string())?;
        info!(
            path = %path.display(),
            tomes = registry.len(),
            backgrounds = registry.backgrounds.len(),
            "Tome catalog loaded"
        );
        Ok(registry)
    }

    /// Parses catalog text in the given format.
    ///
    /// # Errors
    /// Malformed text or any validation error.
    pub fn parse(text: &str, format: CatalogFormat, strict: bool) -> Result<Self, CatalogError> {
        let file: CatalogFile = match format {
            CatalogFormat::Toml => toml::from_str(text)?,
            CatalogFormat::Json => serde_json::from_str(text)?,
        };
        Self::from_definitions(file.tomes, file.backgrounds, strict)
    }

    /// Validates definitions and builds the lookup indexes.
    ///
    /// A reputation reward on a tome without a faction gate credits nobody. That is a
    /// warning, or [`CatalogError::UnassignedReward`] when `strict`.
    ///
    /// # Errors
    /// Blank ids or names, duplicate ids, and reputation rewards aimed at a faction other
    /// than the one the tome requires.
    pub fn from_definitions(
        tomes: Vec<TomeDefinition>,
        backgrounds: Vec<BackgroundDefinition>,
        strict: bool,
    ) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();
        index.reserve(tomes.len());

        for (position, tome) in tomes.iter().enumerate() {
            validate_tome(tome, strict)?;
            if index.insert(tome.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTome {
                    message: tome.id.to_string().into(),
                    context: None,
                });
            }
        }

        let mut background_index = FxHashMap::default();
        for (position, background) in backgrounds.iter().enumerate() {
            if background.id.trim().is_empty() || background.title.trim().is_empty() {
                return Err(CatalogError::Invalid {
                    message: format!("background {position} needs an id and a title").into(),
                    context: None,
                });
            }
            if background_index.insert(background.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateBackground {
                    message: background.id.clone().into(),
                    context: None,
                });
            }
        }

        Ok(Self {
            inner: Arc::new(RegistryInner { tomes, index, backgrounds, background_index }),
        })
    }

    /// Definition by id; `None` for unknown ids, including the empty one.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TomeDefinition> {
        self.index.get(id).map(|&position| &self.tomes[position])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every tome in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &TomeDefinition> {
        self.tomes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tomes.is_empty()
    }

    #[must_use]
    pub fn backgrounds(&self) -> &[BackgroundDefinition] {
        &self.backgrounds
    }

    #[must_use]
    pub fn background(&self, id: &str) -> Option<&BackgroundDefinition> {
        self.background_index.get(id).map(|&position| &self.backgrounds[position])
    }
}

fn validate_tome(tome: &TomeDefinition, strict: bool) -> Result<(), CatalogError> {
    if tome.id.is_blank() {
        return Err(CatalogError::Invalid {
            message: format!("tome '{}' has a blank id", tome.display_name).into(),
            context: None,
        });
    }
    if tome.display_name.trim().is_empty() {
        return Err(CatalogError::Invalid {
            message: format!("tome {} has a blank display name", tome.id).into(),
            context: None,
        });
    }

    if let Some(restated) = tome.reputation_faction
        && match tome.required_faction {
            Some(required) => required != restated,
            None => tome.reputation_reward > 0,
        }
    {
        return Err(CatalogError::FactionRewardMismatch {
            message: format!(
                "tome {} credits {restated} but requires {}",
                tome.id,
                tome.required_faction.map_or("no faction", Faction::label),
            )
            .into(),
            context: None,
        });
    }

    if tome.reputation_reward > 0 && tome.required_faction.is_none() {
        if strict {
            return Err(CatalogError::UnassignedReward {
                message: tome.id.to_string().into(),
                context: None,
            });
        }
        warn!(
            tome = %tome.id,
            reward = tome.reputation_reward,
            "Reputation reward has no faction to credit and will be ignored"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tome(id: &str) -> TomeDefinition {
        TomeDefinition { cost: 500, ..TomeDefinition::new(id, "Ember Strike") }
    }

    #[test]
    fn lookup_follows_catalog_order() {
        let registry =
            Registry::from_definitions(vec![tome("b"), tome("a")], Vec::new(), false).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").map(|t| t.cost), Some(500));
        assert!(registry.get("").is_none());
        let order: Vec<_> = registry.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Registry::from_definitions(vec![tome("a"), tome("a")], Vec::new(), false)
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTome { .. }));
    }

    #[test]
    fn unassigned_reward_fails_only_in_strict_mode() {
        let generous = TomeDefinition { reputation_reward: 50, ..tome("gift") };

        assert!(Registry::from_definitions(vec![generous.clone()], Vec::new(), false).is_ok());
        let err = Registry::from_definitions(vec![generous], Vec::new(), true).unwrap_err();
        assert!(matches!(err, CatalogError::UnassignedReward { .. }));
    }

    #[test]
    fn restated_faction_must_match() {
        let crossed = TomeDefinition {
            required_faction: Some(Faction::ApexHunters),
            reputation_reward: 100,
            reputation_faction: Some(Faction::PyreClans),
            ..tome("contract")
        };
        let err = Registry::from_definitions(vec![crossed], Vec::new(), false).unwrap_err();
        assert!(matches!(err, CatalogError::FactionRewardMismatch { .. }));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = CatalogFormat::from_path(Path::new("tomes.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedFormat { .. }));
        assert_eq!(CatalogFormat::from_path(Path::new("T.JSON")).unwrap(), CatalogFormat::Json);
    }
}
