#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative altar state.
//!
//! The world owns the altar registry, every item resting on an altar slot,
//! the set of altars currently performing a ritual, and the bookkeeping for
//! displays and proxies handed to rituals. All mutations go through [`apply`];
//! everything else reads through [`query`].

mod interaction;
mod placements;
mod registry;

use std::collections::{BTreeMap, BTreeSet};

use altars_core::{AltarName, Command, DisplayId, Diagnostics, Event, ProxyId, Settings};

pub use placements::Placement;

use placements::PlacementRegistry;
use registry::AltarRegistry;

/// Represents the authoritative altar world.
#[derive(Debug, Default)]
pub struct World {
    settings: Settings,
    diagnostics: Diagnostics,
    registry: AltarRegistry,
    placements: PlacementRegistry,
    summoning: BTreeSet<AltarName>,
    ceremony_displays: BTreeSet<DisplayId>,
    proxies: BTreeMap<ProxyId, ProxyState>,
    next_display: u32,
    tick: u64,
}

#[derive(Debug)]
struct ProxyState {
    altar: AltarName,
    lost: bool,
}

impl World {
    /// Creates an empty world with default settings and no altars.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_display(&mut self) -> DisplayId {
        let display = DisplayId::new(self.next_display);
        self.next_display = self.next_display.wrapping_add(1);
        display
    }

    fn reload(
        &mut self,
        records: Vec<altars_core::AltarRecord>,
        worlds: &altars_core::KnownWorlds,
        out_events: &mut Vec<Event>,
    ) {
        self.diagnostics.clear();
        self.registry = AltarRegistry::build(records, worlds, &mut self.diagnostics);

        let registry = &self.registry;
        let orphaned = self
            .placements
            .evict(|location| registry.find_altar_at(location).is_some());
        for placement in orphaned {
            tracing::warn!(
                display = placement.display().get(),
                "refunding item left on a slot that no longer belongs to an altar"
            );
            out_events.push(Event::DisplayRemoved {
                display: placement.display(),
            });
            out_events.push(Event::ItemReturned {
                player: placement.placer(),
                item: placement.item().clone(),
            });
        }

        tracing::info!(
            altars = self.registry.len(),
            claimed = self.registry.claimed_len(),
            "altar definitions loaded"
        );
        out_events.push(Event::AltarsLoaded {
            altars: self.registry.len(),
            claimed_blocks: self.registry.claimed_len(),
        });
    }

    fn shutdown(&mut self, out_events: &mut Vec<Event>) {
        for placement in self.placements.clear() {
            out_events.push(Event::DisplayRemoved {
                display: placement.display(),
            });
        }
        for display in std::mem::take(&mut self.ceremony_displays) {
            out_events.push(Event::DisplayRemoved { display });
        }
        for proxy in std::mem::take(&mut self.proxies).into_keys() {
            out_events.push(Event::ProxyRemoved { proxy });
        }
        self.summoning.clear();
        tracing::info!("altar effects torn down");
        out_events.push(Event::ShutDown);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Configure { settings } => {
            world.settings = settings;
        }
        Command::LoadAltars { records, worlds } => {
            world.reload(records, &worlds, out_events);
        }
        Command::Interact {
            player,
            location,
            held,
        } => {
            interaction::interact(world, player, location, held, out_events);
        }
        Command::Tick => {
            world.tick = world.tick.saturating_add(1);
            out_events.push(Event::TimeAdvanced { tick: world.tick });
        }
        Command::PlaySound { sound, at } => {
            out_events.push(Event::SoundPlayed { sound, at });
        }
        Command::SpawnParticles { emission } => {
            out_events.push(Event::ParticlesSpawned { emission });
        }
        Command::Notify { player, notice } => {
            out_events.push(Event::Notified { player, notice });
        }
        Command::Broadcast { announcement } => {
            out_events.push(Event::Broadcast { announcement });
        }
        Command::ReportDiagnostic { diagnostic } => {
            let _ = world.diagnostics.record(diagnostic);
        }
        Command::RemoveDisplay { display } => {
            if world.ceremony_displays.remove(&display) {
                out_events.push(Event::DisplayRemoved { display });
            }
        }
        Command::SpawnProxy {
            altar,
            proxy,
            item,
            at,
        } => {
            if !world.summoning.contains(&altar) || world.proxies.contains_key(&proxy) {
                return;
            }
            let _ = world.proxies.insert(
                proxy,
                ProxyState {
                    altar: altar.clone(),
                    lost: false,
                },
            );
            out_events.push(Event::ProxySpawned {
                altar,
                proxy,
                item,
                at,
            });
        }
        Command::MoveProxy { proxy, to } => {
            if world.proxies.get(&proxy).is_some_and(|state| !state.lost) {
                out_events.push(Event::ProxyMoved { proxy, to });
            }
        }
        Command::RemoveProxy { proxy } => {
            if world.proxies.remove(&proxy).is_some() {
                out_events.push(Event::ProxyRemoved { proxy });
            }
        }
        Command::ReportProxyLost { proxy } => {
            if let Some(state) = world.proxies.get_mut(&proxy) {
                if !state.lost {
                    state.lost = true;
                    tracing::warn!(altar = %state.altar, proxy = proxy.get(), "ritual proxy lost");
                    out_events.push(Event::ProxyLost { proxy });
                }
            }
        }
        Command::ReleaseAltar { altar } => {
            if world.summoning.remove(&altar) {
                out_events.push(Event::AltarReleased { altar });
            }
        }
        Command::Shutdown => world.shutdown(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use altars_core::{Altar, AltarName, BlockLocation, Diagnostics, Settings, SlotRole};
    use altars_system_readiness::{self as readiness, Shortfall};

    use super::{Placement, World};

    /// Active configuration.
    #[must_use]
    pub fn settings(world: &World) -> &Settings {
        &world.settings
    }

    /// Problems recorded since the last reload.
    #[must_use]
    pub fn diagnostics(world: &World) -> &Diagnostics {
        &world.diagnostics
    }

    /// Ticks elapsed since the world was created.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Every loaded altar, ordered by name.
    pub fn altars(world: &World) -> impl Iterator<Item = &Altar> {
        world.registry.iter()
    }

    /// Looks up an altar by name.
    #[must_use]
    pub fn altar<'a>(world: &'a World, name: &AltarName) -> Option<&'a Altar> {
        world.registry.altar(name)
    }

    /// Resolves a block to the active altar claiming it and the block's role.
    #[must_use]
    pub fn find_altar_at<'a>(
        world: &'a World,
        location: &BlockLocation,
    ) -> Option<(&'a Altar, SlotRole)> {
        world.registry.find_altar_at(location)
    }

    /// Reports whether any loaded altar, dormant or not, claims the block.
    #[must_use]
    pub fn is_claimed_block(world: &World, location: &BlockLocation) -> bool {
        world.registry.is_claimed(location)
    }

    /// Reports whether the altar is performing a ritual.
    #[must_use]
    pub fn is_summoning(world: &World, altar: &AltarName) -> bool {
        world.summoning.contains(altar)
    }

    /// Item resting on a slot.
    #[must_use]
    pub fn placement_at<'a>(world: &'a World, location: &BlockLocation) -> Option<&'a Placement> {
        world.placements.get(location)
    }

    /// Items resting on the altar's slots, in slot order.
    #[must_use]
    pub fn placements_for<'a>(world: &'a World, altar: &'a Altar) -> Vec<&'a Placement> {
        altar
            .slots()
            .filter_map(|slot| world.placements.get(slot))
            .collect()
    }

    /// Requirements the altar's current placements do not satisfy yet.
    #[must_use]
    pub fn shortfalls(world: &World, altar: &Altar) -> Vec<Shortfall> {
        readiness::shortfalls(
            altar.required(),
            placements_for(world, altar).into_iter().map(Placement::item),
        )
    }

    /// Reports whether the altar's placements satisfy every requirement.
    #[must_use]
    pub fn is_ready(world: &World, altar: &Altar) -> bool {
        readiness::is_ready(
            altar.required(),
            placements_for(world, altar).into_iter().map(Placement::item),
        )
    }

    /// Centers of active altars that are ready and not performing a ritual.
    #[must_use]
    pub fn ready_centers(world: &World) -> Vec<BlockLocation> {
        world
            .registry
            .iter()
            .filter(|altar| !world.summoning.contains(altar.name()))
            .filter(|altar| is_ready(world, altar))
            .filter_map(|altar| altar.center().cloned())
            .collect()
    }

    /// Slots holding an item that matches one of their altar's requirements, sorted.
    #[must_use]
    pub fn feeding_slots(world: &World) -> Vec<BlockLocation> {
        let mut slots: Vec<BlockLocation> = world
            .placements
            .iter()
            .filter(|(location, placement)| {
                world
                    .registry
                    .find_altar_at(location)
                    .is_some_and(|(altar, _)| altar.required().requires(placement.item()))
            })
            .map(|(location, _)| location.clone())
            .collect();
        slots.sort();
        slots
    }
}
