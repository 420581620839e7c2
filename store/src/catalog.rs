//! Persisted altar catalog.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use altars_core::{AltarRecord, ItemDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to read or write the definition file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but could not be read.
    #[error("failed to read altar definitions from {path}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML or does not have the catalog shape.
    #[error("failed to parse altar definitions in {path}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Parser complaint.
        #[source]
        source: toml::de::Error,
    },
    /// The catalog could not be rendered as TOML.
    #[error("failed to serialize altar definitions")]
    Serialize {
        /// Serializer complaint.
        #[source]
        source: toml::ser::Error,
    },
    /// The rendered catalog could not be written.
    #[error("failed to write altar definitions to {path}")]
    Write {
        /// File that was written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Every stored altar, keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Stored altars.
    #[serde(default)]
    pub altars: BTreeMap<String, AltarEntry>,
}

/// One stored altar exactly as it appears on disk.
///
/// Table-valued fields come last so the entry serializes as valid TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AltarEntry {
    /// Boss summoned on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_name: Option<String>,
    /// Encoded center or `not_set`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<String>,
    /// Encoded pedestal locations.
    #[serde(default)]
    pub pedestal_locations: Vec<String>,
    /// Item that activates the altar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central_item: Option<toml::Value>,
    /// Required entries, each a table with `amount` and `item`.
    #[serde(default)]
    pub required_items: Vec<toml::Value>,
}

impl AltarEntry {
    /// Decodes the entry into a record the world can validate.
    #[must_use]
    pub fn to_record(&self, name: &str) -> AltarRecord {
        let mut record = AltarRecord::named(name);
        record.boss_name = self.boss_name.clone();
        record.center = self.center.clone();
        record.central_item = self.central_item.as_ref().map(decode_item);
        record.required_items = self.required_items.iter().map(decode_required).collect();
        record.pedestal_locations = self.pedestal_locations.clone();
        record
    }

    /// Sum of every well-formed positive required amount.
    #[must_use]
    pub fn required_total(&self) -> i64 {
        self.required_items
            .iter()
            .filter_map(|entry| decode_required(entry).ok())
            .map(|(_, amount)| amount.max(0))
            .sum()
    }
}

pub(crate) fn decode_item(value: &toml::Value) -> Result<ItemDescriptor, String> {
    value.clone().try_into().map_err(|error| error.to_string())
}

fn decode_required(value: &toml::Value) -> Result<(ItemDescriptor, i64), String> {
    let table = value.as_table().ok_or("required entry is not a table")?;
    let amount = table
        .get("amount")
        .and_then(toml::Value::as_integer)
        .ok_or("required entry has no integer amount")?;
    let item = table.get("item").ok_or("required entry has no item")?;
    Ok((decode_item(item)?, amount))
}

impl Catalog {
    /// Decodes every stored altar, in name order.
    #[must_use]
    pub fn records(&self) -> Vec<AltarRecord> {
        self.altars
            .iter()
            .map(|(name, entry)| entry.to_record(name))
            .collect()
    }

    /// Names of every stored altar, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.altars.keys().map(String::as_str)
    }
}

/// Catalog bound to the file it was read from.
#[derive(Debug)]
pub struct DefinitionStore {
    path: PathBuf,
    catalog: Catalog,
}

impl DefinitionStore {
    /// Reads the catalog at `path`; a missing file is an empty catalog.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let catalog = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no altar definitions yet");
                Catalog::default()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self { path, catalog })
    }

    /// File the catalog is persisted to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable catalog; call [`DefinitionStore::save`] to persist changes.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Decodes every stored altar, in name order.
    #[must_use]
    pub fn records(&self) -> Vec<AltarRecord> {
        self.catalog.records()
    }

    /// Writes the catalog back to its file, creating parent directories.
    pub fn save(&self) -> Result<(), StoreError> {
        let text = toml::to_string_pretty(&self.catalog)
            .map_err(|source| StoreError::Serialize { source })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, text).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(
            path = %self.path.display(),
            altars = self.catalog.altars.len(),
            "altar definitions saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[altars.fire_altar]
boss-name = "DefaultBoss"
center = "world,10,64,10"
pedestal-locations = ["world,12,64,10", "world,8,64,10"]

[altars.fire_altar.central-item]
material = "NETHER_STAR"

[[altars.fire_altar.required-items]]
amount = 2
[altars.fire_altar.required-items.item]
material = "BLAZE_ROD"
display-name = "Ember"

[[altars.fire_altar.required-items]]
amount = "three"
[altars.fire_altar.required-items.item]
material = "DIRT"
"#;

    #[test]
    fn records_decode_items_field_by_field() {
        let catalog: Catalog = toml::from_str(SAMPLE).expect("sample parses");
        let records = catalog.records();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.name.as_str(), "fire_altar");
        assert_eq!(record.boss_name.as_deref(), Some("DefaultBoss"));
        assert_eq!(
            record.central_item,
            Some(Ok(ItemDescriptor::new("NETHER_STAR")))
        );
        assert_eq!(record.required_items.len(), 2);
        assert_eq!(
            record.required_items[0],
            Ok((ItemDescriptor::new("BLAZE_ROD").with_display_name("Ember"), 2))
        );
        assert!(record.required_items[1].is_err(), "bad amount is reported, not fatal");
        assert_eq!(record.pedestal_locations.len(), 2);
    }

    #[test]
    fn required_total_skips_malformed_entries() {
        let catalog: Catalog = toml::from_str(SAMPLE).expect("sample parses");
        assert_eq!(catalog.altars["fire_altar"].required_total(), 2);
    }

    #[test]
    fn empty_item_tables_are_reported() {
        let entry: AltarEntry = toml::from_str("[central-item]\nlore = []\n").expect("entry parses");
        let record = entry.to_record("broken");
        assert!(matches!(record.central_item, Some(Err(_))));
    }
}
