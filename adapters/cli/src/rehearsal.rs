//! Headless ritual runs against the stored definitions.

use std::fmt;

use altars_core::{
    AltarName, BlockLocation, BossRequest, BossSpawnError, BossSpawner, Event, ItemDescriptor,
    ItemStack, Notice, PlayerId, PlayerRef, WorldPoint,
};
use altars_host::Engine;
use altars_system_summoning::COMPLETION_TICK;
use altars_world::query;
use anyhow::{bail, Context, Result};

/// Spawner that pretends to summon bosses.
#[derive(Debug)]
pub(crate) struct StageSpawner {
    accept_named: bool,
}

impl StageSpawner {
    pub(crate) fn new(accept_named: bool) -> Self {
        Self { accept_named }
    }
}

impl BossSpawner for StageSpawner {
    fn spawn(&mut self, boss: &BossRequest, at: &WorldPoint) -> Result<(), BossSpawnError> {
        match boss {
            BossRequest::Named(name) if !self.accept_named => {
                Err(BossSpawnError::UnknownBoss { name: name.clone() })
            }
            _ => {
                tracing::info!(boss = boss.label(), at = ?at.point(), "boss would spawn");
                Ok(())
            }
        }
    }
}

/// How a rehearsal ended.
#[derive(Debug)]
pub(crate) struct Outcome {
    altar: AltarName,
    ticks: u32,
    notices: Vec<Notice>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rehearsal of '{}' finished after {} ticks.", self.altar, self.ticks)?;
        for notice in &self.notices {
            writeln!(f, "  {notice}")?;
        }
        Ok(())
    }
}

/// Places every required item, activates the altar and ticks until it is released.
pub(crate) fn rehearse(engine: &mut Engine<StageSpawner>, name: &AltarName) -> Result<Outcome> {
    let (center, central, plan) = {
        let altar = query::altar(engine.world(), name)
            .with_context(|| format!("no altar named '{name}' is loaded"))?;
        let center = altar
            .center()
            .cloned()
            .with_context(|| format!("altar '{name}' has no center"))?;
        let central = altar
            .central_item()
            .cloned()
            .with_context(|| format!("altar '{name}' has no central item"))?;

        let mut pedestals = altar.pedestals().iter();
        let mut plan: Vec<(BlockLocation, ItemDescriptor)> = Vec::new();
        for entry in altar.required().iter() {
            for _ in 0..entry.amount() {
                let Some(pedestal) = pedestals.next() else {
                    bail!("altar '{name}' requires more items than it has pedestals");
                };
                plan.push((pedestal.clone(), entry.item().clone()));
            }
        }
        (center, central, plan)
    };

    let rehearser = PlayerRef::new(PlayerId::new(0), "rehearsal");
    let mut notices = Vec::new();
    for (pedestal, item) in plan {
        let events = engine.interact(rehearser.clone(), pedestal, Some(ItemStack::new(item, 1)));
        record(&events, &mut notices);
    }

    let events = engine.interact(rehearser, center, Some(ItemStack::new(central, 1)));
    record(&events, &mut notices);
    if !events
        .iter()
        .any(|event| matches!(event, Event::SummoningStarted { .. }))
    {
        bail!("altar '{name}' did not start a ritual: {notices:?}");
    }

    let mut ticks = 0;
    while query::is_summoning(engine.world(), name) && ticks <= COMPLETION_TICK + 1 {
        let events = engine.tick();
        record(&events, &mut notices);
        ticks += 1;
    }

    Ok(Outcome {
        altar: name.clone(),
        ticks,
        notices,
    })
}

fn record(events: &[Event], notices: &mut Vec<Notice>) {
    for event in events {
        match event {
            Event::ParticlesSpawned { .. } | Event::ProxyMoved { .. } => {
                tracing::trace!(?event, "effect");
            }
            Event::Notified { notice, .. } => {
                tracing::info!(%notice, "notice");
                notices.push(notice.clone());
            }
            _ => tracing::info!(?event, "event"),
        }
    }
}
