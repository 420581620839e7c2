#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-facing engine that wires the world to its systems.
//!
//! Hosts feed interactions, ticks and lifecycle commands into [`Engine`] and
//! execute the events it returns: show displays, move proxies, play sounds,
//! hand items back and spawn bosses through their [`BossSpawner`].

use altars_core::{
    AltarRecord, BlockLocation, BossSpawner, Command, Diagnostic, Event, ItemStack, KnownWorlds,
    PlayerRef, ProxyId,
};
use altars_store::{
    AuthoringError, Change, DefinitionStore, Edit, Editor, SettingsReport, StoreError,
};
use altars_system_ambient::Ambient;
use altars_system_summoning::{Config as SummoningConfig, Summoning};
use altars_world::{self as world, query, World};
use thiserror::Error;

/// Rounds of command feedback processed per submission.
pub const MAX_PUMP_ROUNDS: usize = 16;

/// Failure of an authoring round trip.
#[derive(Debug, Error)]
pub enum EditError {
    /// The edit was rejected; nothing was written.
    #[error(transparent)]
    Rejected(#[from] AuthoringError),
    /// The edit was applied in memory but could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Altar engine owned by a host.
#[derive(Debug)]
pub struct Engine<S> {
    world: World,
    summoning: Summoning,
    ambient: Ambient,
    spawner: S,
    worlds: KnownWorlds,
    config_diagnostics: Vec<Diagnostic>,
}

impl<S: BossSpawner> Engine<S> {
    /// Creates an engine with default settings and no altars.
    ///
    /// The seed drives the ritual particle bursts, so equal seeds replay
    /// equal event streams.
    #[must_use]
    pub fn new(spawner: S, seed: u64) -> Self {
        Self {
            world: World::new(),
            summoning: Summoning::new(SummoningConfig::new(seed)),
            ambient: Ambient::new(),
            spawner,
            worlds: KnownWorlds::new(),
            config_diagnostics: Vec::new(),
        }
    }

    /// Read access to the world for `altars_world::query`.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The boss spawner.
    #[must_use]
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Worlds the last load was resolved against.
    #[must_use]
    pub fn worlds(&self) -> &KnownWorlds {
        &self.worlds
    }

    /// Applies a command and every command the systems emit in response.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut emitted = Vec::new();
        let mut pending = vec![command];
        for _ in 0..MAX_PUMP_ROUNDS {
            if pending.is_empty() {
                break;
            }
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            let ready = query::ready_centers(&self.world);
            let feeding = query::feeding_slots(&self.world);
            let settings = query::settings(&self.world);
            self.summoning
                .handle(&events, settings, &mut self.spawner, &mut pending);
            self.ambient
                .handle(&events, &ready, &feeding, &settings.effects, &mut pending);
            emitted.extend(events);
        }
        if !pending.is_empty() {
            tracing::warn!(dropped = pending.len(), "command feedback did not settle");
        }
        emitted
    }

    /// Installs new settings; their diagnostics are reported on the next load.
    pub fn configure(&mut self, report: SettingsReport) -> Vec<Event> {
        self.config_diagnostics = report.diagnostics;
        self.submit(Command::Configure {
            settings: report.settings,
        })
    }

    /// Rebuilds the altar registry from stored records.
    pub fn load(&mut self, records: Vec<AltarRecord>, worlds: KnownWorlds) -> Vec<Event> {
        self.worlds = worlds.clone();
        let mut events = self.submit(Command::LoadAltars { records, worlds });
        for diagnostic in self.config_diagnostics.clone() {
            events.extend(self.submit(Command::ReportDiagnostic { diagnostic }));
        }
        events
    }

    /// Full reload: settings first, then definitions.
    pub fn reload(
        &mut self,
        report: SettingsReport,
        records: Vec<AltarRecord>,
        worlds: KnownWorlds,
    ) -> Vec<Event> {
        let mut events = self.configure(report);
        events.extend(self.load(records, worlds));
        events
    }

    /// A player used their main hand on a block.
    pub fn interact(
        &mut self,
        player: PlayerRef,
        location: BlockLocation,
        held: Option<ItemStack>,
    ) -> Vec<Event> {
        self.submit(Command::Interact {
            player,
            location,
            held,
        })
    }

    /// Advances every ritual and ambient effect by one tick.
    pub fn tick(&mut self) -> Vec<Event> {
        self.submit(Command::Tick)
    }

    /// The host noticed that a proxy vanished on its own.
    pub fn report_lost_proxy(&mut self, proxy: ProxyId) -> Vec<Event> {
        self.submit(Command::ReportProxyLost { proxy })
    }

    /// Tears everything down without refunds.
    pub fn shutdown(&mut self) -> Vec<Event> {
        self.submit(Command::Shutdown)
    }

    /// Reports whether breaking the block must be cancelled.
    #[must_use]
    pub fn is_protected(&self, location: &BlockLocation) -> bool {
        query::is_claimed_block(&self.world, location)
    }

    /// Drops every claimed block from an explosion's block list.
    pub fn retain_unprotected(&self, blocks: &mut Vec<BlockLocation>) {
        blocks.retain(|block| !self.is_protected(block));
    }

    /// Applies an authoring edit, persists the catalog and reloads the world.
    ///
    /// A rejected edit touches neither the file nor the world. A failed save
    /// rolls the in-memory catalog back.
    pub fn apply_edit(
        &mut self,
        store: &mut DefinitionStore,
        editor: &Editor,
        edit: Edit,
    ) -> Result<(Change, Vec<Event>), EditError> {
        let previous = store.catalog().clone();
        let change = editor.apply(store.catalog_mut(), edit)?;
        if let Err(error) = store.save() {
            *store.catalog_mut() = previous;
            return Err(error.into());
        }
        let worlds = self.worlds.clone();
        let events = self.load(store.records(), worlds);
        Ok((change, events))
    }
}
