use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BlockLocation, ItemDescriptor, RequiredItems};

/// Boss name that selects the host's built-in fallback mob.
pub const DEFAULT_BOSS_NAME: &str = "DefaultBoss";

/// Label shown to players when the fallback mob is summoned.
pub const DEFAULT_BOSS_LABEL: &str = "Zombie";

/// Unique altar name chosen by an operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AltarName(String);

impl AltarName {
    /// Wraps the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AltarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a claimed block plays within its altar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotRole {
    /// The block that accepts the central item.
    Center,
    /// A block that accepts required items.
    Pedestal,
}

/// Boss an altar summons once its ritual completes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BossRequest {
    /// The host's built-in fallback mob.
    Default,
    /// A boss resolved by name through the host's boss provider.
    Named(String),
}

impl BossRequest {
    /// Interprets a configured boss name; [`DEFAULT_BOSS_NAME`] matches case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case(DEFAULT_BOSS_NAME) {
            Self::Default
        } else {
            Self::Named(name.to_owned())
        }
    }

    /// Name as written in altar definitions.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Default => DEFAULT_BOSS_NAME,
            Self::Named(name) => name,
        }
    }

    /// Name shown to players.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Default => DEFAULT_BOSS_LABEL,
            Self::Named(name) => name,
        }
    }
}

/// Fully resolved altar definition.
///
/// An altar without a center is dormant: its pedestals remain protected but
/// no interaction ever resolves to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Altar {
    name: AltarName,
    boss: BossRequest,
    central_item: Option<ItemDescriptor>,
    required: RequiredItems,
    center: Option<BlockLocation>,
    pedestals: Vec<BlockLocation>,
}

impl Altar {
    /// Assembles an altar from already validated parts.
    #[must_use]
    pub fn new(
        name: AltarName,
        boss: BossRequest,
        central_item: Option<ItemDescriptor>,
        required: RequiredItems,
        center: Option<BlockLocation>,
        pedestals: Vec<BlockLocation>,
    ) -> Self {
        Self {
            name,
            boss,
            central_item,
            required,
            center,
            pedestals,
        }
    }

    /// Unique name of the altar.
    #[must_use]
    pub fn name(&self) -> &AltarName {
        &self.name
    }

    /// Boss summoned on completion.
    #[must_use]
    pub fn boss(&self) -> &BossRequest {
        &self.boss
    }

    /// Item that activates the altar when used on its center.
    #[must_use]
    pub fn central_item(&self) -> Option<&ItemDescriptor> {
        self.central_item.as_ref()
    }

    /// Items that must be placed before activation.
    #[must_use]
    pub fn required(&self) -> &RequiredItems {
        &self.required
    }

    /// Center block, absent while the altar is dormant.
    #[must_use]
    pub fn center(&self) -> Option<&BlockLocation> {
        self.center.as_ref()
    }

    /// Pedestal blocks in definition order.
    #[must_use]
    pub fn pedestals(&self) -> &[BlockLocation] {
        &self.pedestals
    }

    /// Every block the altar claims: pedestals first, then the center.
    pub fn slots(&self) -> impl Iterator<Item = &BlockLocation> {
        self.pedestals.iter().chain(self.center.iter())
    }
}

/// Altar definition as read from storage, before validation.
///
/// Item fields carry the decoder's complaint instead of failing the whole
/// record so that a single malformed entry never hides the rest of the altar.
#[derive(Clone, Debug, PartialEq)]
pub struct AltarRecord {
    /// Name the altar is stored under.
    pub name: AltarName,
    /// Configured boss name, absent when the key is missing.
    pub boss_name: Option<String>,
    /// Encoded center location, absent when the key is missing.
    pub center: Option<String>,
    /// Central item template or the reason it could not be read.
    pub central_item: Option<Result<ItemDescriptor, String>>,
    /// Required entries as `(item, amount)` or the reason they could not be read.
    pub required_items: Vec<Result<(ItemDescriptor, i64), String>>,
    /// Encoded pedestal locations.
    pub pedestal_locations: Vec<String>,
}

impl AltarRecord {
    /// Creates an empty record for the named altar.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: AltarName::new(name),
            boss_name: None,
            center: None,
            central_item: None,
            required_items: Vec::new(),
            pedestal_locations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorldName;

    #[test]
    fn default_boss_matches_case_insensitively() {
        assert_eq!(BossRequest::from_name("defaultboss"), BossRequest::Default);
        assert_eq!(BossRequest::Default.label(), "Zombie");
        let named = BossRequest::from_name("SkeletonKing");
        assert_eq!(named.label(), "SkeletonKing");
        assert_eq!(named.name(), "SkeletonKing");
    }

    #[test]
    fn slots_list_pedestals_before_the_center() {
        let world = WorldName::new("world");
        let center = BlockLocation::new(world.clone(), 0, 64, 0);
        let pedestal = BlockLocation::new(world, 2, 64, 0);
        let altar = Altar::new(
            AltarName::new("fire"),
            BossRequest::Default,
            None,
            RequiredItems::new(),
            Some(center.clone()),
            vec![pedestal.clone()],
        );
        let slots: Vec<_> = altar.slots().cloned().collect();
        assert_eq!(slots, vec![pedestal, center]);
    }
}
