#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Summoning animation driver.
//!
//! Every ritual is a session keyed by its altar and advanced exactly once per
//! [`Event::TimeAdvanced`]. A session walks through fixed stages: a pre-delay,
//! the gather that swaps ceremony displays for flying proxies, a spiral out to
//! an orbit ring, an orbit hold, a convergence, the one-off completion that
//! summons the boss, and a cleanup one tick later that releases the altar.
//! A refused spawn cleans up and releases on the completion tick itself.

use std::{
    collections::{BTreeMap, BTreeSet},
    f64::consts::{FRAC_PI_4, PI, TAU},
};

use altars_core::{
    AltarName, Announcement, BlockLocation, BossRequest, BossSpawnError, BossSpawner,
    CeremonyItem, Command, Diagnostic, EffectSettings, Event, Notice, ParticleEmission,
    ParticleKind, PlayerRef, ProxyId, Settings, SoundSpec, WorldPoint, PREPARE_SOUND,
};
use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ticks between activation and the gather.
pub const PRE_DELAY: u32 = 40;
/// Ticks spent flying from the slots to the orbit ring.
pub const SPIRAL_TO_ORBIT: u32 = 14;
/// Ticks spent circling the orbit ring.
pub const ORBIT_HOLD: u32 = 60;
/// Ticks spent flying from the ring to the convergence point.
pub const CONVERGE: u32 = 5;
/// Tick, counted from activation, on which the boss is summoned.
pub const COMPLETION_TICK: u32 = PRE_DELAY + SPIRAL_TO_ORBIT + ORBIT_HOLD + CONVERGE;

const RING_DURATION: u32 = 40;
const RING_SOUND_INTERVAL: u32 = 25;
const RING_RADIUS: f64 = 0.8;
const RING_POINTS: u32 = 32;

const ORBIT_HEIGHT: f64 = 4.0;
const ORBIT_RADIUS: f64 = 2.0;
const ORBIT_SWEEP_DEGREES: f64 = 540.0;
const CONVERGENCE_HEIGHT: f64 = 5.0;
const BOSS_HEIGHT: f64 = 3.0;

const TRAIL_LIFT: f64 = 0.2;
const TRAIL_SPREAD: f64 = 0.5;
const SECONDARY_TRAIL_INTERVAL: u32 = 3;
const BURST_PARTICLES: usize = 150;
const BURST_VELOCITY: f64 = 0.4;

/// Configuration parameters required to construct the summoning driver.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration; the seed drives the convergence burst.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that animates rituals and summons bosses.
#[derive(Debug)]
pub struct Summoning {
    sessions: BTreeMap<AltarName, Session>,
    next_proxy: u32,
    rng: ChaCha8Rng,
}

#[derive(Debug)]
struct Session {
    summoner: PlayerRef,
    center: BlockLocation,
    boss: BossRequest,
    ceremony: Vec<CeremonyItem>,
    flights: Vec<Flight>,
    lost: BTreeSet<ProxyId>,
    ticks: u32,
    finished: bool,
}

#[derive(Debug)]
struct Flight {
    proxy: ProxyId,
    start: DVec3,
    slot_angle: f64,
}

impl Summoning {
    /// Creates a driver with no rituals in flight.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_proxy: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Reports whether a ritual is being animated for the altar.
    #[must_use]
    pub fn is_running(&self, altar: &AltarName) -> bool {
        self.sessions.contains_key(altar)
    }

    /// Number of rituals being animated.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Consumes world events and emits the commands that drive every ritual.
    pub fn handle<S>(
        &mut self,
        events: &[Event],
        settings: &Settings,
        spawner: &mut S,
        out: &mut Vec<Command>,
    ) where
        S: BossSpawner + ?Sized,
    {
        for event in events {
            match event {
                Event::SummoningStarted {
                    altar,
                    summoner,
                    center,
                    boss,
                    ceremony,
                } => self.start(
                    altar,
                    Session {
                        summoner: summoner.clone(),
                        center: center.clone(),
                        boss: boss.clone(),
                        ceremony: ceremony.clone(),
                        flights: Vec::new(),
                        lost: BTreeSet::new(),
                        ticks: 0,
                        finished: false,
                    },
                    &settings.effects,
                    out,
                ),
                Event::ProxyLost { proxy } => {
                    for session in self.sessions.values_mut() {
                        if session.flights.iter().any(|flight| flight.proxy == *proxy) {
                            let _ = session.lost.insert(*proxy);
                        }
                    }
                }
                Event::TimeAdvanced { .. } => self.advance(settings, spawner, out),
                Event::ShutDown => self.sessions.clear(),
                _ => {}
            }
        }
    }

    fn start(
        &mut self,
        altar: &AltarName,
        session: Session,
        effects: &EffectSettings,
        out: &mut Vec<Command>,
    ) {
        if let Some(stale) = self.sessions.remove(altar) {
            tracing::warn!(%altar, "replacing a ritual the world already released");
            for flight in stale.flights {
                out.push(Command::RemoveProxy {
                    proxy: flight.proxy,
                });
            }
        }
        out.push(Command::Notify {
            player: session.summoner.id(),
            notice: Notice::RitualStarted,
        });
        play(out, effects.sounds.ritual_start.as_ref(), sound_point(&session.center));
        let _ = self.sessions.insert(altar.clone(), session);
    }

    fn advance<S>(&mut self, settings: &Settings, spawner: &mut S, out: &mut Vec<Command>)
    where
        S: BossSpawner + ?Sized,
    {
        let mut done: Vec<AltarName> = Vec::new();
        for (altar, session) in self.sessions.iter_mut() {
            let mut frame = Frame {
                altar,
                settings,
                next_proxy: &mut self.next_proxy,
                rng: &mut self.rng,
                out: &mut *out,
            };
            if frame.step(session, spawner) {
                done.push(altar.clone());
            }
        }
        for altar in done {
            let _ = self.sessions.remove(&altar);
        }
    }
}

/// Everything one session needs to render a tick.
struct Frame<'a> {
    altar: &'a AltarName,
    settings: &'a Settings,
    next_proxy: &'a mut u32,
    rng: &'a mut ChaCha8Rng,
    out: &'a mut Vec<Command>,
}

impl Frame<'_> {
    /// Advances a session by one tick, returning `true` once it is over.
    fn step<S>(&mut self, session: &mut Session, spawner: &mut S) -> bool
    where
        S: BossSpawner + ?Sized,
    {
        let tick = session.ticks;
        session.ticks = session.ticks.saturating_add(1);

        if tick <= RING_DURATION {
            self.rings(session, tick);
        }

        if tick < PRE_DELAY {
            if tick == 0 {
                let prepare = SoundSpec::new(PREPARE_SOUND);
                play(self.out, Some(&prepare), sound_point(&session.center));
            }
            return false;
        }

        if tick == PRE_DELAY {
            self.gather(session);
        }

        let stage = tick - PRE_DELAY;
        let orbit = session.center.offset(0.5, ORBIT_HEIGHT, 0.5).point();
        let convergence = session.center.offset(0.5, CONVERGENCE_HEIGHT, 0.5).point();

        if stage < SPIRAL_TO_ORBIT {
            let progress = f64::from(stage + 1) / f64::from(SPIRAL_TO_ORBIT);
            for flight in &session.flights {
                let target = ring_position(orbit, flight.slot_angle);
                let position = flight.start.lerp(target, progress);
                self.fly(session, flight.proxy, position, stage);
            }
        } else if stage < SPIRAL_TO_ORBIT + ORBIT_HOLD {
            let progress = f64::from(stage - SPIRAL_TO_ORBIT + 1) / f64::from(ORBIT_HOLD);
            let sweep = (progress * ORBIT_SWEEP_DEGREES).to_radians();
            for flight in &session.flights {
                let position = ring_position(orbit, flight.slot_angle + sweep);
                self.fly(session, flight.proxy, position, stage);
            }
        } else if stage < SPIRAL_TO_ORBIT + ORBIT_HOLD + CONVERGE {
            let progress =
                f64::from(stage - SPIRAL_TO_ORBIT - ORBIT_HOLD + 1) / f64::from(CONVERGE);
            let sweep = ORBIT_SWEEP_DEGREES.to_radians();
            for flight in &session.flights {
                let from = ring_position(orbit, flight.slot_angle + sweep);
                let position = from.lerp(convergence, progress);
                self.fly(session, flight.proxy, position, stage);
            }
        } else if !session.finished {
            session.finished = true;
            if !self.complete(session, convergence, spawner) {
                self.release(session);
                return true;
            }
        } else {
            self.release(session);
            return true;
        }
        false
    }

    /// Removes the proxies and hands the altar back to the world.
    fn release(&mut self, session: &Session) {
        for flight in &session.flights {
            self.out.push(Command::RemoveProxy {
                proxy: flight.proxy,
            });
        }
        self.out.push(Command::ReleaseAltar {
            altar: self.altar.clone(),
        });
    }

    fn rings(&mut self, session: &Session, tick: u32) {
        let settings = self.settings;
        let effects = &settings.effects;
        let ring_center = session
            .center
            .offset(0.5, 1.0 + effects.heights.ritual_ring_offset, 0.5);
        if tick % RING_SOUND_INTERVAL == 0 {
            play(
                self.out,
                effects.sounds.ritual_ambient_loop.as_ref(),
                ring_center.clone(),
            );
        }
        let Some(particle) = &effects.particles.ritual_ring else {
            return;
        };
        for offset in ring_offsets(tick) {
            self.out.push(Command::SpawnParticles {
                emission: ParticleEmission::single(particle.clone(), ring_center.translated(offset)),
            });
        }
    }

    fn gather(&mut self, session: &mut Session) {
        play(
            self.out,
            self.settings.effects.sounds.ritual_items_fly.as_ref(),
            sound_point(&session.center),
        );

        let increment = 360.0 / session.ceremony.len().max(1) as f64;
        for (index, item) in session.ceremony.iter().enumerate() {
            let proxy = ProxyId::new(*self.next_proxy);
            *self.next_proxy = self.next_proxy.wrapping_add(1);

            self.out.push(Command::RemoveDisplay {
                display: item.display,
            });
            self.out.push(Command::SpawnProxy {
                altar: self.altar.clone(),
                proxy,
                item: item.item.clone(),
                at: item.position.clone(),
            });
            session.flights.push(Flight {
                proxy,
                start: item.position.point(),
                slot_angle: (index as f64 * increment).to_radians(),
            });
        }
    }

    fn fly(&mut self, session: &Session, proxy: ProxyId, position: DVec3, age: u32) {
        if session.lost.contains(&proxy) {
            return;
        }
        let to = WorldPoint::new(session.center.world().clone(), position);
        self.out.push(Command::MoveProxy {
            proxy,
            to: to.clone(),
        });

        let settings = self.settings;
        let particles = &settings.effects.particles;
        let trail_at = to.translated(DVec3::new(0.0, TRAIL_LIFT, 0.0));
        if let Some(trail) = &particles.animation_trail {
            self.out.push(Command::SpawnParticles {
                emission: ParticleEmission::single(trail.clone(), trail_at.clone()).scattered(
                    1,
                    DVec3::splat(TRAIL_SPREAD),
                    0.0,
                ),
            });
        }
        if let Some(trail) = &particles.animation_trail_secondary {
            if age % SECONDARY_TRAIL_INTERVAL == 0 {
                self.out.push(Command::SpawnParticles {
                    emission: ParticleEmission::single(trail.clone(), trail_at),
                });
            }
        }
    }

    /// Summons the boss, returning `false` when the spawner refused it.
    fn complete<S>(&mut self, session: &Session, convergence: DVec3, spawner: &mut S) -> bool
    where
        S: BossSpawner + ?Sized,
    {
        let convergence = WorldPoint::new(session.center.world().clone(), convergence);
        for flight in &session.flights {
            if !session.lost.contains(&flight.proxy) {
                self.out.push(Command::MoveProxy {
                    proxy: flight.proxy,
                    to: convergence.clone(),
                });
            }
        }

        let settings = self.settings;
        let effects = &settings.effects;
        play(
            self.out,
            effects.sounds.ritual_converge.as_ref(),
            convergence.clone(),
        );
        if let Some(burst) = &effects.particles.convergence_burst {
            self.burst(burst, &convergence);
        }

        let spawn_at = session.center.offset(0.5, BOSS_HEIGHT, 0.5);
        match spawner.spawn(&session.boss, &spawn_at) {
            Ok(()) => {
                self.announce(session);
                true
            }
            Err(error) => {
                self.abort(session, &error);
                false
            }
        }
    }

    fn burst(&mut self, particle: &ParticleKind, at: &WorldPoint) {
        for _ in 0..BURST_PARTICLES {
            let direction = DVec3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            )
            .normalize_or_zero()
                * BURST_VELOCITY;
            self.out.push(Command::SpawnParticles {
                emission: ParticleEmission::single(particle.clone(), at.clone()).scattered(
                    0,
                    direction,
                    1.0,
                ),
            });
        }
    }

    fn announce(&mut self, session: &Session) {
        if session.boss == BossRequest::Default {
            tracing::info!(altar = %self.altar, "altar summoned the default boss");
        } else {
            tracing::info!(altar = %self.altar, boss = session.boss.name(), "altar summoned a boss");
        }
        self.out.push(Command::Notify {
            player: session.summoner.id(),
            notice: Notice::BossSpawned,
        });
        play(
            self.out,
            self.settings.effects.sounds.summon_spawn.as_ref(),
            sound_point(&session.center),
        );
        if self.settings.altar.broadcast_summon {
            self.out.push(Command::Broadcast {
                announcement: Announcement {
                    boss: session.boss.label().to_owned(),
                    summoner: session.summoner.name().to_owned(),
                },
            });
        }
    }

    fn abort(&mut self, session: &Session, error: &BossSpawnError) {
        let boss = session.boss.name();
        let message = match error {
            BossSpawnError::UnknownBoss { .. } => format!(
                "Invalid boss name '{boss}' for altar '{}'. Check the boss definitions and the altar configuration.",
                self.altar
            ),
            BossSpawnError::Unavailable { reason } => format!(
                "Boss '{boss}' for altar '{}' could not be spawned: {reason}",
                self.altar
            ),
        };
        self.out.push(Command::ReportDiagnostic {
            diagnostic: Diagnostic::altar_data(message),
        });
        self.out.push(Command::Notify {
            player: session.summoner.id(),
            notice: Notice::InvalidBoss {
                boss: boss.to_owned(),
            },
        });
    }
}

fn play(out: &mut Vec<Command>, sound: Option<&SoundSpec>, at: WorldPoint) {
    if let Some(sound) = sound {
        out.push(Command::PlaySound {
            sound: sound.clone(),
            at,
        });
    }
}

fn sound_point(center: &BlockLocation) -> WorldPoint {
    center.offset(0.5, 0.5, 0.5)
}

fn ring_position(orbit: DVec3, angle: f64) -> DVec3 {
    orbit + DVec3::new(ORBIT_RADIUS * angle.cos(), 0.0, ORBIT_RADIUS * angle.sin())
}

/// Offsets of both tilted ritual rings for one tick, relative to the ring center.
fn ring_offsets(tick: u32) -> Vec<DVec3> {
    let flow = f64::from(tick) / 20.0 * TAU;
    let (tilt_sin, tilt_cos) = FRAC_PI_4.sin_cos();
    let rotate = |v: DVec3| {
        DVec3::new(
            v.x * tilt_cos - v.z * tilt_sin,
            v.y,
            v.x * tilt_sin + v.z * tilt_cos,
        )
    };

    let mut offsets = Vec::with_capacity(RING_POINTS as usize * 2);
    for step in 0..RING_POINTS {
        let theta = f64::from(step) * PI / 16.0 + flow;
        let (sin, cos) = theta.sin_cos();
        offsets.push(rotate(DVec3::new(RING_RADIUS * cos, RING_RADIUS * sin, 0.0)));
        offsets.push(rotate(DVec3::new(0.0, RING_RADIUS * sin, RING_RADIUS * cos)));
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_follows_the_stage_budget() {
        assert_eq!(COMPLETION_TICK, 119);
    }

    #[test]
    fn ring_points_stay_on_the_ring() {
        for tick in [0, 7, 40] {
            let offsets = ring_offsets(tick);
            assert_eq!(offsets.len(), 64);
            for offset in offsets {
                assert!((offset.length() - RING_RADIUS).abs() < 1e-9, "{offset:?}");
            }
        }
    }

    #[test]
    fn ring_positions_sit_on_the_orbit() {
        let orbit = DVec3::new(10.5, 68.0, 10.5);
        for degrees in [0.0_f64, 90.0, 540.0] {
            let position = ring_position(orbit, degrees.to_radians());
            assert!(((position - orbit).length() - ORBIT_RADIUS).abs() < 1e-9);
            assert_eq!(position.y, orbit.y);
        }
    }
}
