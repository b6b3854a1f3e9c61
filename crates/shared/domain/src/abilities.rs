use bitflags::bitflags;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Generates the catalog key, display label, `Display` and `FromStr` for a unit enum.
///
/// Keys are the `snake_case` names used in catalog files and snapshots.
macro_rules! labeled {
    ($ty:ident { $($variant:ident => ($key:literal, $label:literal)),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace(['-', ' '], "_").to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.key() == wanted)
                    .ok_or_else(|| UnknownVariant { kind: stringify!($ty), value: s.to_owned() })
            }
        }
    };
}

/// Returned when a name does not match any variant of a taxonomy enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityPath {
    Elemental,
    Exotic,
    Soul,
}

labeled!(AbilityPath {
    Elemental => ("elemental", "Elemental"),
    Exotic => ("exotic", "Exotic"),
    Soul => ("soul", "Soul"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Wind,
}

labeled!(Element {
    Fire => ("fire", "Fire"),
    Water => ("water", "Water"),
    Earth => ("earth", "Earth"),
    Wind => ("wind", "Wind"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExoticPower {
    Telekinesis,
    Teleportation,
    Precognition,
    Shadowmeld,
}

labeled!(ExoticPower {
    Telekinesis => ("telekinesis", "Telekinesis"),
    Teleportation => ("teleportation", "Teleportation"),
    Precognition => ("precognition", "Precognition"),
    Shadowmeld => ("shadowmeld", "Shadowmeld"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoulPower {
    SoulBind,
    SoulDrain,
    SoulWard,
    SoulSight,
}

labeled!(SoulPower {
    SoulBind => ("soul_bind", "Soul Bind"),
    SoulDrain => ("soul_drain", "Soul Drain"),
    SoulWard => ("soul_ward", "Soul Ward"),
    SoulSight => ("soul_sight", "Soul Sight"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    StellarGuard,
    PyreClans,
    VoltSyndicate,
    ApexHunters,
    NexusTradeGuild,
    FrontierRebels,
}

labeled!(Faction {
    StellarGuard => ("stellar_guard", "Stellar Guard"),
    PyreClans => ("pyre_clans", "Pyre Clans"),
    VoltSyndicate => ("volt_syndicate", "Volt Syndicate"),
    ApexHunters => ("apex_hunters", "Apex Hunters"),
    NexusTradeGuild => ("nexus_trade_guild", "Nexus Trade Guild"),
    FrontierRebels => ("frontier_rebels", "Frontier Rebels"),
});

bitflags! {
    /// Set of unlocked soul powers.
    ///
    /// Serialized as a list of soul power keys, not as raw bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SoulPowers: u8 {
        const SOUL_BIND  = 1 << 0;
        const SOUL_DRAIN = 1 << 1;
        const SOUL_WARD  = 1 << 2;
        const SOUL_SIGHT = 1 << 3;
    }
}

impl From<SoulPower> for SoulPowers {
    fn from(power: SoulPower) -> Self {
        match power {
            SoulPower::SoulBind => Self::SOUL_BIND,
            SoulPower::SoulDrain => Self::SOUL_DRAIN,
            SoulPower::SoulWard => Self::SOUL_WARD,
            SoulPower::SoulSight => Self::SOUL_SIGHT,
        }
    }
}

impl FromIterator<SoulPower> for SoulPowers {
    fn from_iter<I: IntoIterator<Item = SoulPower>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |acc, p| acc | p.into())
    }
}

impl SoulPowers {
    #[must_use]
    pub fn has(self, power: SoulPower) -> bool {
        self.contains(power.into())
    }

    pub fn unlock(&mut self, power: SoulPower) {
        self.insert(power.into());
    }

    /// Unlocked powers in declaration order.
    pub fn powers(self) -> impl Iterator<Item = SoulPower> {
        SoulPower::ALL.iter().copied().filter(move |p| self.has(*p))
    }
}

impl Serialize for SoulPowers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.powers().count()))?;
        for power in self.powers() {
            seq.serialize_element(&power)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SoulPowers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PowersVisitor;

        impl<'de> Visitor<'de> for PowersVisitor {
            type Value = SoulPowers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of soul powers")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut powers = SoulPowers::empty();
                while let Some(power) = seq.next_element::<SoulPower>()? {
                    powers.unlock(power);
                }
                Ok(powers)
            }
        }

        deserializer.deserialize_seq(PowersVisitor)
    }
}
