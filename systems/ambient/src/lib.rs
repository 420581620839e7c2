#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Idle particle effects around altars.
//!
//! Ready altars pulse above their center and every pedestal holding a
//! required item is circled by a slow particle loop. The system owns nothing
//! but loop angles; which slots and centers qualify is read from world views
//! on every call.

use std::{collections::BTreeMap, f64::consts::PI};

use altars_core::{BlockLocation, Command, EffectSettings, Event, ParticleEmission};
use glam::DVec3;

/// Ticks between two pulses above a ready altar.
pub const READY_PULSE_INTERVAL: u64 = 20;
/// Ticks between two steps of a pedestal loop.
pub const PEDESTAL_LOOP_INTERVAL: u64 = 2;

const LOOP_STEP: f64 = PI / 16.0;
const LOOP_RADIUS: f64 = 0.8;
const PULSE_COUNT: u32 = 5;
const PULSE_SPREAD: f64 = 0.3;
const PULSE_SPEED: f64 = 0.01;

/// Pure system that emits ambient particles for idle altars.
#[derive(Debug, Default)]
pub struct Ambient {
    loops: BTreeMap<BlockLocation, f64>,
}

impl Ambient {
    /// Creates a system with no pedestal loops.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pedestal loops currently running.
    #[must_use]
    pub fn active_loops(&self) -> usize {
        self.loops.len()
    }

    /// Consumes world events and views to emit particle commands.
    ///
    /// `ready_centers` lists the centers of ready, idle altars and
    /// `feeding_slots` the slots holding an item their altar requires.
    pub fn handle(
        &mut self,
        events: &[Event],
        ready_centers: &[BlockLocation],
        feeding_slots: &[BlockLocation],
        effects: &EffectSettings,
        out: &mut Vec<Command>,
    ) {
        if events.iter().any(|event| matches!(event, Event::ShutDown)) {
            if !self.loops.is_empty() {
                tracing::debug!(loops = self.loops.len(), "pedestal loops stopped");
            }
            self.loops.clear();
            return;
        }

        self.reconcile(feeding_slots);

        for event in events {
            if let Event::TimeAdvanced { tick } = event {
                if tick % READY_PULSE_INTERVAL == 0 {
                    pulse(ready_centers, effects, out);
                }
                if tick % PEDESTAL_LOOP_INTERVAL == 0 {
                    self.step_loops(effects, out);
                }
            }
        }
    }

    fn reconcile(&mut self, feeding_slots: &[BlockLocation]) {
        self.loops.retain(|slot, _| feeding_slots.contains(slot));
        for slot in feeding_slots {
            let _ = self.loops.entry(slot.clone()).or_insert(0.0);
        }
    }

    fn step_loops(&mut self, effects: &EffectSettings, out: &mut Vec<Command>) {
        let height = effects.heights.pedestal;
        for (slot, angle) in self.loops.iter_mut() {
            *angle = (*angle + LOOP_STEP) % (2.0 * PI);
            let Some(particle) = &effects.particles.pedestal_ready else {
                continue;
            };
            let at = slot.offset(
                0.5 + LOOP_RADIUS * angle.cos(),
                height,
                0.5 + LOOP_RADIUS * angle.sin(),
            );
            out.push(Command::SpawnParticles {
                emission: ParticleEmission::single(particle.clone(), at),
            });
        }
    }
}

fn pulse(ready_centers: &[BlockLocation], effects: &EffectSettings, out: &mut Vec<Command>) {
    let Some(particle) = &effects.particles.altar_ready else {
        return;
    };
    for center in ready_centers {
        let at = center.offset(0.5, effects.heights.ready_particle, 0.5);
        out.push(Command::SpawnParticles {
            emission: ParticleEmission::single(particle.clone(), at).scattered(
                PULSE_COUNT,
                DVec3::splat(PULSE_SPREAD),
                PULSE_SPEED,
            ),
        });
    }
}
