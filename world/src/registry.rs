use std::collections::{BTreeMap, HashMap, HashSet};

use altars_core::{
    location, Altar, AltarName, AltarRecord, BlockLocation, BossRequest, Diagnostic, Diagnostics,
    ItemDescriptor, KnownWorlds, RequiredItems, SlotRole, DEFAULT_BOSS_NAME,
};

/// Loaded altars together with the indexes used to resolve clicked blocks.
#[derive(Debug, Default)]
pub(crate) struct AltarRegistry {
    altars: BTreeMap<AltarName, Altar>,
    slots: HashMap<BlockLocation, (AltarName, SlotRole)>,
    claimed: HashSet<BlockLocation>,
}

impl AltarRegistry {
    /// Builds a complete registry; problems are recorded and never abort the build.
    pub(crate) fn build(
        mut records: Vec<AltarRecord>,
        worlds: &KnownWorlds,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        records.sort_by(|a, b| a.name.cmp(&b.name));

        let mut registry = Self::default();
        for record in records {
            if registry.altars.contains_key(&record.name) {
                let _ = diagnostics.record(Diagnostic::altar_data(format!(
                    "Duplicate definition for altar '{}' was ignored.",
                    record.name
                )));
                continue;
            }
            registry.admit(record, worlds, diagnostics);
        }
        registry
    }

    fn admit(&mut self, record: AltarRecord, worlds: &KnownWorlds, diagnostics: &mut Diagnostics) {
        let AltarRecord {
            name,
            boss_name,
            center: raw_center,
            central_item,
            required_items,
            pedestal_locations,
        } = record;

        let boss = BossRequest::from_name(boss_name.as_deref().unwrap_or(DEFAULT_BOSS_NAME));

        let mut center = location::decode(raw_center.as_deref(), worlds);
        if center.is_none() && !location::is_unset(raw_center.as_deref()) {
            let _ = diagnostics.record(Diagnostic::altar_data(format!(
                "Invalid center location for altar '{name}'. It might be a typo or a world that no longer exists."
            )));
        }
        if let Some(block) = center.as_ref().filter(|block| self.claimed.contains(*block)) {
            let _ = diagnostics.record(Diagnostic::altar_data(format!(
                "Center {block} of altar '{name}' is already claimed by another altar."
            )));
            center = None;
        }

        let central_item = match central_item {
            Some(Ok(item)) => Some(item),
            Some(Err(reason)) => {
                let _ = diagnostics.record(Diagnostic::altar_data(format!(
                    "Failed to read the central item for altar '{name}': {reason}"
                )));
                None
            }
            None => None,
        };

        let required = resolve_required(&name, required_items, diagnostics);

        let mut pedestals: Vec<BlockLocation> = Vec::new();
        for raw in pedestal_locations {
            let Some(block) = location::decode(Some(&raw), worlds) else {
                let _ = diagnostics.record(Diagnostic::altar_data(format!(
                    "Invalid pedestal location '{raw}' for altar '{name}'."
                )));
                continue;
            };
            if pedestals.contains(&block) {
                continue;
            }
            if center.as_ref() == Some(&block) {
                let _ = diagnostics.record(Diagnostic::altar_data(format!(
                    "Pedestal {block} of altar '{name}' coincides with its center."
                )));
                continue;
            }
            if self.claimed.contains(&block) {
                let _ = diagnostics.record(Diagnostic::altar_data(format!(
                    "Pedestal {block} of altar '{name}' is already claimed by another altar."
                )));
                continue;
            }
            pedestals.push(block);
        }

        let altar = Altar::new(name.clone(), boss, central_item, required, center, pedestals);
        for block in altar.slots() {
            let _ = self.claimed.insert(block.clone());
        }
        if let Some(center) = altar.center() {
            let _ = self
                .slots
                .insert(center.clone(), (name.clone(), SlotRole::Center));
            for pedestal in altar.pedestals() {
                let _ = self
                    .slots
                    .insert(pedestal.clone(), (name.clone(), SlotRole::Pedestal));
            }
        }
        let _ = self.altars.insert(name, altar);
    }

    pub(crate) fn find_altar_at(&self, location: &BlockLocation) -> Option<(&Altar, SlotRole)> {
        let (name, role) = self.slots.get(location)?;
        self.altars.get(name).map(|altar| (altar, *role))
    }

    pub(crate) fn is_claimed(&self, location: &BlockLocation) -> bool {
        self.claimed.contains(location)
    }

    pub(crate) fn altar(&self, name: &AltarName) -> Option<&Altar> {
        self.altars.get(name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Altar> {
        self.altars.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.altars.len()
    }

    pub(crate) fn claimed_len(&self) -> usize {
        self.claimed.len()
    }
}

fn resolve_required(
    name: &AltarName,
    entries: Vec<Result<(ItemDescriptor, i64), String>>,
    diagnostics: &mut Diagnostics,
) -> RequiredItems {
    let mut required = RequiredItems::new();
    for entry in entries {
        match entry {
            Ok((item, amount)) => match u32::try_from(amount) {
                Ok(amount) if amount > 0 => required.add(item, amount),
                _ => {
                    let _ = diagnostics.record(Diagnostic::altar_data(format!(
                        "Required item amount {amount} for altar '{name}' must be a positive whole number."
                    )));
                }
            },
            Err(reason) => {
                let _ = diagnostics.record(Diagnostic::altar_data(format!(
                    "Failed to read a required item for altar '{name}': {reason}"
                )));
            }
        }
    }
    required
}

#[cfg(test)]
mod tests {
    use super::*;
    use altars_core::WorldName;

    fn worlds() -> KnownWorlds {
        ["world"].into_iter().collect()
    }

    fn block(x: i32) -> BlockLocation {
        BlockLocation::new(WorldName::new("world"), x, 64, 0)
    }

    fn record(name: &str, center: &str, pedestals: &[&str]) -> AltarRecord {
        let mut record = AltarRecord::named(name);
        record.center = Some(center.to_owned());
        record.pedestal_locations = pedestals.iter().map(|p| (*p).to_owned()).collect();
        record
    }

    #[test]
    fn invalid_pieces_are_dropped_and_reported() {
        let mut diagnostics = Diagnostics::new();
        let mut broken = record("broken", "world,0,64,0", &["world,1,64,0", "nowhere,1,2,3"]);
        broken.central_item = Some(Err("missing material".to_owned()));
        broken
            .required_items
            .push(Ok((ItemDescriptor::new("BONE"), 0)));
        let registry = AltarRegistry::build(vec![broken], &worlds(), &mut diagnostics);

        let altar = registry
            .altar(&AltarName::new("broken"))
            .expect("altar still loads");
        assert_eq!(altar.pedestals(), &[block(1)]);
        assert!(altar.central_item().is_none());
        assert!(altar.required().is_empty());
        assert_eq!(diagnostics.entries().len(), 3, "{:?}", diagnostics.entries());
    }

    #[test]
    fn repeated_required_entries_merge_on_load() {
        let mut diagnostics = Diagnostics::new();
        let ember = ItemDescriptor::new("BLAZE_ROD");
        let mut forge = record("forge", "world,0,64,0", &["world,1,64,0"]);
        forge.required_items = vec![Ok((ember.clone(), 2)), Ok((ember.clone(), 3))];
        let registry = AltarRegistry::build(vec![forge], &worlds(), &mut diagnostics);

        let required = registry
            .altar(&AltarName::new("forge"))
            .expect("forge loads")
            .required();
        assert_eq!(required.len(), 1);
        let entry = required.iter().next().expect("one entry");
        assert_eq!(entry.item(), &ember);
        assert_eq!(entry.amount(), 5);
        assert!(diagnostics.entries().is_empty());
    }

    #[test]
    fn unset_center_is_silent_but_dormant() {
        let mut diagnostics = Diagnostics::new();
        let dormant = record("dormant", "not_set", &["world,5,64,0"]);
        let registry = AltarRegistry::build(vec![dormant], &worlds(), &mut diagnostics);

        assert!(!diagnostics.has_errors());
        assert!(registry.is_claimed(&block(5)), "pedestal stays protected");
        assert!(registry.find_altar_at(&block(5)).is_none());
    }

    #[test]
    fn later_overlapping_claims_are_rejected() {
        let mut diagnostics = Diagnostics::new();
        let first = record("alpha", "world,0,64,0", &["world,1,64,0"]);
        let second = record("beta", "world,10,64,0", &["world,1,64,0", "world,11,64,0"]);
        let registry = AltarRegistry::build(vec![second, first], &worlds(), &mut diagnostics);

        let (owner, role) = registry.find_altar_at(&block(1)).expect("claimed");
        assert_eq!(owner.name().as_str(), "alpha");
        assert_eq!(role, SlotRole::Pedestal);
        let beta = registry.altar(&AltarName::new("beta")).expect("beta loads");
        assert_eq!(beta.pedestals(), &[block(11)]);
        assert_eq!(diagnostics.entries().len(), 1);
    }

    #[test]
    fn unknown_center_world_is_reported() {
        let mut diagnostics = Diagnostics::new();
        let lost = record("lost", "old_world,0,64,0", &[]);
        let registry = AltarRegistry::build(vec![lost], &worlds(), &mut diagnostics);
        assert_eq!(registry.len(), 1);
        assert!(diagnostics.entries()[0]
            .message()
            .starts_with("Invalid center location for altar 'lost'"));
    }
}
