use std::collections::HashMap;

use altars_core::{BlockLocation, DisplayId, ItemDescriptor, PlayerId, WorldPoint};

/// Item resting on an altar slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    display: DisplayId,
    item: ItemDescriptor,
    placer: PlayerId,
    position: WorldPoint,
}

impl Placement {
    pub(crate) fn new(
        display: DisplayId,
        item: ItemDescriptor,
        placer: PlayerId,
        position: WorldPoint,
    ) -> Self {
        Self {
            display,
            item,
            placer,
            position,
        }
    }

    /// Display showing the item.
    #[must_use]
    pub const fn display(&self) -> DisplayId {
        self.display
    }

    /// Item resting on the slot.
    #[must_use]
    pub fn item(&self) -> &ItemDescriptor {
        &self.item
    }

    /// Player who placed the item.
    #[must_use]
    pub const fn placer(&self) -> PlayerId {
        self.placer
    }

    /// Where the display floats.
    #[must_use]
    pub fn position(&self) -> &WorldPoint {
        &self.position
    }
}

/// At most one placement per slot.
#[derive(Debug, Default)]
pub(crate) struct PlacementRegistry {
    slots: HashMap<BlockLocation, Placement>,
}

impl PlacementRegistry {
    pub(crate) fn get(&self, location: &BlockLocation) -> Option<&Placement> {
        self.slots.get(location)
    }

    pub(crate) fn insert(&mut self, location: BlockLocation, placement: Placement) {
        let _ = self.slots.insert(location, placement);
    }

    pub(crate) fn take(&mut self, location: &BlockLocation) -> Option<Placement> {
        self.slots.remove(location)
    }

    /// Removes the placements on the provided slots, in slot order.
    pub(crate) fn drain_slots<'a, I>(&mut self, slots: I) -> Vec<Placement>
    where
        I: IntoIterator<Item = &'a BlockLocation>,
    {
        slots
            .into_iter()
            .filter_map(|slot| self.slots.remove(slot))
            .collect()
    }

    /// Removes every placement whose slot fails `keep`.
    pub(crate) fn evict<F>(&mut self, mut keep: F) -> Vec<Placement>
    where
        F: FnMut(&BlockLocation) -> bool,
    {
        let mut evicted: Vec<(BlockLocation, Placement)> = Vec::new();
        let doomed: Vec<BlockLocation> = self
            .slots
            .keys()
            .filter(|location| !keep(location))
            .cloned()
            .collect();
        for location in doomed {
            if let Some(placement) = self.slots.remove(&location) {
                evicted.push((location, placement));
            }
        }
        evicted.sort_by(|a, b| a.0.cmp(&b.0));
        evicted.into_iter().map(|(_, placement)| placement).collect()
    }

    pub(crate) fn clear(&mut self) -> Vec<Placement> {
        let mut drained: Vec<(BlockLocation, Placement)> = self.slots.drain().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));
        drained.into_iter().map(|(_, placement)| placement).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&BlockLocation, &Placement)> {
        self.slots.iter()
    }
}
