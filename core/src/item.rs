use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

const AIR_MATERIALS: [&str; 3] = ["AIR", "CAVE_AIR", "VOID_AIR"];

/// Canonical description of an item kind, independent of stack size.
///
/// Two descriptors match exactly when every field is equal. That single rule
/// is used for required items, placed items and central items alike.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ItemDescriptor {
    #[serde(deserialize_with = "material_name")]
    material: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lore: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    enchantments: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_model_data: Option<i32>,
}

fn material_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let normalized = normalize_material(&raw);
    if normalized.is_empty() {
        return Err(serde::de::Error::custom("material must not be empty"));
    }
    Ok(normalized)
}

fn normalize_material(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

impl ItemDescriptor {
    /// Creates a plain descriptor for the provided material.
    #[must_use]
    pub fn new(material: &str) -> Self {
        Self {
            material: normalize_material(material),
            display_name: None,
            lore: Vec::new(),
            enchantments: BTreeMap::new(),
            custom_model_data: None,
        }
    }

    /// Attaches a custom display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Appends a lore line.
    #[must_use]
    pub fn with_lore_line(mut self, line: impl Into<String>) -> Self {
        self.lore.push(line.into());
        self
    }

    /// Adds or replaces an enchantment.
    #[must_use]
    pub fn with_enchantment(mut self, name: impl Into<String>, level: u32) -> Self {
        let _ = self.enchantments.insert(name.into(), level);
        self
    }

    /// Attaches custom model data.
    #[must_use]
    pub fn with_custom_model_data(mut self, data: i32) -> Self {
        self.custom_model_data = Some(data);
        self
    }

    /// Upper-case material identifier.
    #[must_use]
    pub fn material(&self) -> &str {
        &self.material
    }

    /// Custom display name, if any.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Lore lines in display order.
    #[must_use]
    pub fn lore(&self) -> &[String] {
        &self.lore
    }

    /// Enchantments keyed by name.
    #[must_use]
    pub fn enchantments(&self) -> &BTreeMap<String, u32> {
        &self.enchantments
    }

    /// Custom model data, if any.
    #[must_use]
    pub const fn custom_model_data(&self) -> Option<i32> {
        self.custom_model_data
    }

    /// Reports whether the descriptor stands for an empty hand.
    #[must_use]
    pub fn is_air(&self) -> bool {
        AIR_MATERIALS.contains(&self.material.as_str())
    }

    /// Human readable label used in listings and messages.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => self.material.to_ascii_lowercase().replace('_', " "),
        }
    }
}

/// Items held by a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    descriptor: ItemDescriptor,
    amount: u32,
}

impl ItemStack {
    /// Creates a stack of `amount` items.
    #[must_use]
    pub fn new(descriptor: ItemDescriptor, amount: u32) -> Self {
        Self { descriptor, amount }
    }

    /// Kind of item in the stack.
    #[must_use]
    pub fn descriptor(&self) -> &ItemDescriptor {
        &self.descriptor
    }

    /// Number of items in the stack.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Reports whether the stack amounts to an empty hand.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.descriptor.is_air()
    }
}

/// One required item kind and the number of units it needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredItem {
    item: ItemDescriptor,
    amount: u32,
}

impl RequiredItem {
    /// Required item kind.
    #[must_use]
    pub fn item(&self) -> &ItemDescriptor {
        &self.item
    }

    /// Units of the kind that must be placed.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }
}

/// Required items of an altar, merged by descriptor equality.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequiredItems {
    entries: Vec<RequiredItem>,
}

impl RequiredItems {
    /// Creates an empty requirement list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` units of `item`, summing with an equal entry if present.
    pub fn add(&mut self, item: ItemDescriptor, amount: u32) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.item == item) {
            entry.amount = entry.amount.saturating_add(amount);
            return;
        }
        self.entries.push(RequiredItem { item, amount });
    }

    /// Reports whether any entry matches the provided item.
    #[must_use]
    pub fn requires(&self, item: &ItemDescriptor) -> bool {
        self.entries.iter().any(|entry| entry.item == *item)
    }

    /// Sum of all required units.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.amount))
            .sum()
    }

    /// Reports whether nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct required kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RequiredItem> {
        self.entries.iter()
    }
}

impl FromIterator<(ItemDescriptor, u32)> for RequiredItems {
    fn from_iter<I: IntoIterator<Item = (ItemDescriptor, u32)>>(iter: I) -> Self {
        let mut required = Self::new();
        for (item, amount) in iter {
            required.add(item, amount);
        }
        required
    }
}
