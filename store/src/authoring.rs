//! Permission-checked edits of the altar catalog.
//!
//! Every edit validates against the catalog as it stands and only then
//! mutates it, so a rejected edit leaves the catalog untouched.

use std::{collections::BTreeSet, fmt};

use altars_core::{
    location::{self, UNSET},
    BlockLocation, ItemDescriptor, KnownWorlds, DEFAULT_BOSS_NAME,
};
use thiserror::Error;

use crate::catalog::{decode_item, AltarEntry, Catalog};

/// Operator capability guarding a family of edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    /// Create altars.
    Create,
    /// Delete altars.
    Delete,
    /// List altars.
    List,
    /// Change an existing altar.
    Edit,
}

impl Permission {
    const ALL: [Self; 4] = [Self::Create, Self::Delete, Self::List, Self::Edit];

    /// Lower-case name used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Edit => "edit",
        }
    }
}

/// Set of permissions held by the operator issuing edits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grants {
    permissions: BTreeSet<Permission>,
}

impl Grants {
    /// Grants every permission.
    #[must_use]
    pub fn all() -> Self {
        Permission::ALL.into_iter().collect()
    }

    /// Grants nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds one permission.
    #[must_use]
    pub fn with(mut self, permission: Permission) -> Self {
        let _ = self.permissions.insert(permission);
        self
    }

    /// Reports whether the permission is held.
    #[must_use]
    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

impl FromIterator<Permission> for Grants {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

/// Which pedestals to remove.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PedestalTarget {
    /// The pedestal at this block.
    One(BlockLocation),
    /// Every pedestal.
    All,
}

/// Which required items to remove.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemTarget {
    /// Every entry whose item equals this one.
    Matching(ItemDescriptor),
    /// Every entry.
    All,
}

/// One change an operator asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    /// Creates an empty altar.
    Create {
        /// Name of the new altar.
        name: String,
    },
    /// Deletes an altar.
    Delete {
        /// Altar to delete.
        name: String,
    },
    /// Moves the center block.
    SetCenter {
        /// Altar to change.
        name: String,
        /// New center.
        location: BlockLocation,
    },
    /// Changes the summoned boss.
    SetBoss {
        /// Altar to change.
        name: String,
        /// Boss name, `DefaultBoss` for the built-in fallback.
        boss: String,
    },
    /// Changes the activating item.
    SetCentralItem {
        /// Altar to change.
        name: String,
        /// Item the operator is holding.
        item: ItemDescriptor,
    },
    /// Adds a pedestal block.
    AddPedestal {
        /// Altar to change.
        name: String,
        /// Pedestal block.
        location: BlockLocation,
    },
    /// Adds a required item entry.
    AddRequiredItem {
        /// Altar to change.
        name: String,
        /// Item the operator is holding.
        item: ItemDescriptor,
        /// Units required.
        amount: i64,
    },
    /// Removes pedestals.
    RemovePedestal {
        /// Altar to change.
        name: String,
        /// Pedestals to remove.
        target: PedestalTarget,
    },
    /// Removes required item entries.
    RemoveRequiredItem {
        /// Altar to change.
        name: String,
        /// Entries to remove.
        target: ItemTarget,
    },
}

impl Edit {
    /// Altar the edit targets.
    #[must_use]
    pub fn altar(&self) -> &str {
        match self {
            Self::Create { name }
            | Self::Delete { name }
            | Self::SetCenter { name, .. }
            | Self::SetBoss { name, .. }
            | Self::SetCentralItem { name, .. }
            | Self::AddPedestal { name, .. }
            | Self::AddRequiredItem { name, .. }
            | Self::RemovePedestal { name, .. }
            | Self::RemoveRequiredItem { name, .. } => name,
        }
    }

    /// Permission the edit needs.
    #[must_use]
    pub const fn permission(&self) -> Permission {
        match self {
            Self::Create { .. } => Permission::Create,
            Self::Delete { .. } => Permission::Delete,
            _ => Permission::Edit,
        }
    }
}

/// Reason an edit was rejected; the text is shown to the operator.
#[derive(Debug, Error)]
pub enum AuthoringError {
    /// The operator lacks the permission.
    #[error("You do not have permission to {} altars.", .permission.label())]
    PermissionDenied {
        /// Missing permission.
        permission: Permission,
    },
    /// An altar with that name already exists.
    #[error("An altar named '{name}' already exists.")]
    AltarExists {
        /// Name in use.
        name: String,
    },
    /// No altar has that name.
    #[error("No altar named '{name}' exists.")]
    NoSuchAltar {
        /// Name looked up.
        name: String,
    },
    /// The operator is not holding an item.
    #[error("You must hold an item in your main hand.")]
    NoItemInHand,
    /// The location's world is not loaded.
    #[error("World '{world}' is not loaded.")]
    UnknownWorld {
        /// World named by the location.
        world: String,
    },
    /// Pedestals need a center to measure against.
    #[error("Set the altar center before adding pedestals.")]
    CenterNotSet,
    /// The pedestal is in another world or too far from the center.
    #[error("Pedestals must be within {radius} blocks of the center, in the same world.")]
    PedestalTooFar {
        /// Configured maximum distance.
        radius: f64,
    },
    /// The pedestal is already part of the altar.
    #[error("That block is already a pedestal of this altar.")]
    PedestalExists,
    /// The pedestal is not part of the altar.
    #[error("That block is not a pedestal of this altar.")]
    PedestalNotFound,
    /// Required items need pedestals to rest on.
    #[error("Add pedestals before adding required items.")]
    NoPedestals,
    /// Required amounts must be positive.
    #[error("The amount must be a positive whole number.")]
    InvalidAmount,
    /// More items would be required than there are pedestals.
    #[error("Required items ({total}) cannot exceed the number of pedestals ({pedestals}).")]
    TooManyRequired {
        /// Total required after the edit.
        total: i64,
        /// Pedestals available.
        pedestals: usize,
    },
    /// There are no pedestals to remove.
    #[error("Altar '{name}' has no pedestals to clear.")]
    NoPedestalsToClear {
        /// Altar edited.
        name: String,
    },
    /// There are no required items to remove.
    #[error("This altar has no required items to remove.")]
    NoRequiredItems,
    /// No required entry matches the held item.
    #[error("No required item matches the item in your hand.")]
    NoMatchingItem,
    /// The item could not be written as TOML.
    #[error("The item could not be stored: {reason}")]
    Unstorable {
        /// Serializer complaint.
        reason: String,
    },
}

/// Accepted edit, rendered as the confirmation shown to the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// An altar was created.
    Created {
        /// Altar created.
        name: String,
    },
    /// An altar was deleted.
    Deleted {
        /// Altar deleted.
        name: String,
    },
    /// The center moved.
    CenterSet,
    /// The boss changed.
    BossSet {
        /// Altar edited.
        name: String,
        /// New boss.
        boss: String,
    },
    /// The central item changed.
    CentralItemSet {
        /// Label of the new item.
        item: String,
    },
    /// A pedestal was added.
    PedestalAdded,
    /// A required entry was added.
    RequiredItemAdded {
        /// Units required.
        amount: i64,
        /// Label of the item.
        item: String,
    },
    /// A pedestal was removed.
    PedestalRemoved,
    /// Every pedestal was removed.
    PedestalsCleared {
        /// Altar edited.
        name: String,
    },
    /// Matching required entries were removed.
    RequiredItemRemoved,
    /// Every required entry was removed.
    RequiredItemsCleared,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { name } => write!(f, "Altar '{name}' created."),
            Self::Deleted { name } => write!(f, "Altar '{name}' deleted."),
            Self::CenterSet => f.write_str("Altar center set."),
            Self::BossSet { name, boss } => write!(f, "Altar '{name}' now summons {boss}."),
            Self::CentralItemSet { item } => write!(f, "Central item set to {item}."),
            Self::PedestalAdded => f.write_str("Pedestal added."),
            Self::RequiredItemAdded { amount, item } => {
                write!(f, "Added {amount} x {item} to the required items.")
            }
            Self::PedestalRemoved => f.write_str("Pedestal removed."),
            Self::PedestalsCleared { name } => write!(f, "All pedestals of '{name}' cleared."),
            Self::RequiredItemRemoved => f.write_str("Required item removed."),
            Self::RequiredItemsCleared => f.write_str("All required items cleared."),
        }
    }
}

/// Applies operator edits to a catalog.
#[derive(Clone, Debug)]
pub struct Editor {
    grants: Grants,
    worlds: KnownWorlds,
    max_pedestal_radius: f64,
}

impl Editor {
    /// Creates an editor acting with the provided grants.
    #[must_use]
    pub fn new(grants: Grants) -> Self {
        Self {
            grants,
            worlds: KnownWorlds::new(),
            max_pedestal_radius: altars_core::AltarSettings::default().max_pedestal_radius,
        }
    }

    /// Sets the worlds locations may refer to.
    #[must_use]
    pub fn with_worlds(mut self, worlds: KnownWorlds) -> Self {
        self.worlds = worlds;
        self
    }

    /// Sets the furthest a pedestal may sit from its center.
    #[must_use]
    pub fn with_max_pedestal_radius(mut self, radius: f64) -> Self {
        self.max_pedestal_radius = radius;
        self
    }

    /// Lists altar names, in order.
    pub fn list<'a>(&self, catalog: &'a Catalog) -> Result<Vec<&'a str>, AuthoringError> {
        self.check(Permission::List)?;
        Ok(catalog.names().collect())
    }

    /// Validates and applies one edit.
    pub fn apply(&self, catalog: &mut Catalog, edit: Edit) -> Result<Change, AuthoringError> {
        self.check(edit.permission())?;

        let change = match edit {
            Edit::Create { name } => {
                if catalog.altars.contains_key(&name) {
                    return Err(AuthoringError::AltarExists { name });
                }
                let entry = AltarEntry {
                    boss_name: Some(DEFAULT_BOSS_NAME.to_owned()),
                    center: Some(UNSET.to_owned()),
                    ..AltarEntry::default()
                };
                let _ = catalog.altars.insert(name.clone(), entry);
                Change::Created { name }
            }
            Edit::Delete { name } => {
                if catalog.altars.remove(&name).is_none() {
                    return Err(AuthoringError::NoSuchAltar { name });
                }
                Change::Deleted { name }
            }
            Edit::SetCenter { name, location } => {
                let entry = altar_entry(catalog, &name)?;
                let encoded = location::encode(&location, &self.worlds).ok_or_else(|| {
                    AuthoringError::UnknownWorld {
                        world: location.world().to_string(),
                    }
                })?;
                entry.center = Some(encoded);
                Change::CenterSet
            }
            Edit::SetBoss { name, boss } => {
                altar_entry(catalog, &name)?.boss_name = Some(boss.clone());
                Change::BossSet { name, boss }
            }
            Edit::SetCentralItem { name, item } => {
                let entry = altar_entry(catalog, &name)?;
                let value = encode_item(&item)?;
                entry.central_item = Some(value);
                Change::CentralItemSet { item: item.label() }
            }
            Edit::AddPedestal { name, location } => {
                let entry = altar_entry(catalog, &name)?;
                self.add_pedestal(entry, location)?;
                Change::PedestalAdded
            }
            Edit::AddRequiredItem { name, item, amount } => {
                let entry = altar_entry(catalog, &name)?;
                add_required(entry, &item, amount)?;
                Change::RequiredItemAdded {
                    amount,
                    item: item.label(),
                }
            }
            Edit::RemovePedestal { name, target } => {
                let entry = altar_entry(catalog, &name)?;
                self.remove_pedestal(entry, &name, target)?
            }
            Edit::RemoveRequiredItem { name, target } => {
                let entry = altar_entry(catalog, &name)?;
                remove_required(entry, target)?
            }
        };

        tracing::info!(%change, "altar catalog edited");
        Ok(change)
    }

    fn check(&self, permission: Permission) -> Result<(), AuthoringError> {
        if self.grants.allows(permission) {
            Ok(())
        } else {
            Err(AuthoringError::PermissionDenied { permission })
        }
    }

    fn add_pedestal(
        &self,
        entry: &mut AltarEntry,
        location: BlockLocation,
    ) -> Result<(), AuthoringError> {
        let center = location::decode(entry.center.as_deref(), &self.worlds)
            .ok_or(AuthoringError::CenterNotSet)?;
        let within_reach = center
            .distance_to(&location)
            .is_some_and(|distance| distance <= self.max_pedestal_radius);
        if !within_reach {
            return Err(AuthoringError::PedestalTooFar {
                radius: self.max_pedestal_radius,
            });
        }
        if self.pedestal_index(entry, &location).is_some() {
            return Err(AuthoringError::PedestalExists);
        }
        entry.pedestal_locations.push(location.encode());
        Ok(())
    }

    fn remove_pedestal(
        &self,
        entry: &mut AltarEntry,
        name: &str,
        target: PedestalTarget,
    ) -> Result<Change, AuthoringError> {
        match target {
            PedestalTarget::All => {
                if entry.pedestal_locations.is_empty() {
                    return Err(AuthoringError::NoPedestalsToClear {
                        name: name.to_owned(),
                    });
                }
                entry.pedestal_locations.clear();
                Ok(Change::PedestalsCleared {
                    name: name.to_owned(),
                })
            }
            PedestalTarget::One(location) => {
                let index = self
                    .pedestal_index(entry, &location)
                    .ok_or(AuthoringError::PedestalNotFound)?;
                let _ = entry.pedestal_locations.remove(index);
                Ok(Change::PedestalRemoved)
            }
        }
    }

    /// Matches stored pedestals by decoded location, falling back to the raw
    /// text for pedestals whose world is not loaded.
    fn pedestal_index(&self, entry: &AltarEntry, location: &BlockLocation) -> Option<usize> {
        let encoded = location.encode();
        entry.pedestal_locations.iter().position(|stored| {
            stored.trim() == encoded
                || location::decode(Some(stored), &self.worlds).as_ref() == Some(location)
        })
    }
}

fn altar_entry<'a>(
    catalog: &'a mut Catalog,
    name: &str,
) -> Result<&'a mut AltarEntry, AuthoringError> {
    catalog
        .altars
        .get_mut(name)
        .ok_or_else(|| AuthoringError::NoSuchAltar {
            name: name.to_owned(),
        })
}

fn encode_item(item: &ItemDescriptor) -> Result<toml::Value, AuthoringError> {
    if item.is_air() {
        return Err(AuthoringError::NoItemInHand);
    }
    toml::Value::try_from(item).map_err(|error| AuthoringError::Unstorable {
        reason: error.to_string(),
    })
}

fn add_required(
    entry: &mut AltarEntry,
    item: &ItemDescriptor,
    amount: i64,
) -> Result<(), AuthoringError> {
    let value = encode_item(item)?;
    if amount <= 0 {
        return Err(AuthoringError::InvalidAmount);
    }
    let pedestals = entry.pedestal_locations.len();
    if pedestals == 0 {
        return Err(AuthoringError::NoPedestals);
    }
    let total = entry.required_total().saturating_add(amount);
    if total > i64::try_from(pedestals).unwrap_or(i64::MAX) {
        return Err(AuthoringError::TooManyRequired { total, pedestals });
    }

    let mut table = toml::Table::new();
    let _ = table.insert("amount".to_owned(), toml::Value::Integer(amount));
    let _ = table.insert("item".to_owned(), value);
    entry.required_items.push(toml::Value::Table(table));
    Ok(())
}

fn remove_required(entry: &mut AltarEntry, target: ItemTarget) -> Result<Change, AuthoringError> {
    match target {
        ItemTarget::All => {
            if entry.required_items.is_empty() {
                return Err(AuthoringError::NoRequiredItems);
            }
            entry.required_items.clear();
            Ok(Change::RequiredItemsCleared)
        }
        ItemTarget::Matching(item) => {
            if item.is_air() {
                return Err(AuthoringError::NoItemInHand);
            }
            if entry.required_items.is_empty() {
                return Err(AuthoringError::NoRequiredItems);
            }
            let before = entry.required_items.len();
            entry.required_items.retain(|stored| {
                let stored = stored.get("item").map(decode_item);
                !stored.is_some_and(|decoded| decoded.ok().as_ref() == Some(&item))
            });
            if entry.required_items.len() == before {
                return Err(AuthoringError::NoMatchingItem);
            }
            Ok(Change::RequiredItemRemoved)
        }
    }
}
