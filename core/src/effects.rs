use std::fmt;

use glam::DVec3;
use thiserror::Error;

use crate::WorldPoint;

/// Particle names the host understands.
const KNOWN_PARTICLES: &[&str] = &[
    "ASH",
    "BUBBLE_POP",
    "CAMPFIRE_COSY_SMOKE",
    "CLOUD",
    "CRIT",
    "CRIT_MAGIC",
    "DRAGON_BREATH",
    "DRIP_LAVA",
    "ELECTRIC_SPARK",
    "ENCHANT",
    "ENCHANTMENT_TABLE",
    "END_ROD",
    "EXPLOSION_LARGE",
    "EXPLOSION_NORMAL",
    "FIREWORKS_SPARK",
    "FLAME",
    "GLOW",
    "HEART",
    "LAVA",
    "NOTE",
    "PORTAL",
    "REDSTONE",
    "REVERSE_PORTAL",
    "SCULK_SOUL",
    "SMALL_FLAME",
    "SMOKE_LARGE",
    "SMOKE_NORMAL",
    "SNOWFLAKE",
    "SOUL",
    "SOUL_FIRE_FLAME",
    "SPELL_WITCH",
    "TOTEM",
    "VILLAGER_HAPPY",
    "WAX_OFF",
    "WAX_ON",
    "WHITE_ASH",
];

/// Sound played when an item is set on a pedestal.
pub const PLACE_SOUND: &str = "BLOCK_END_PORTAL_FRAME_FILL";
/// Sound played when a placed item is taken back.
pub const PICKUP_SOUND: &str = "ENTITY_ITEM_PICKUP";
/// Sound played on the first tick of a ritual.
pub const PREPARE_SOUND: &str = "ENTITY_EVOKER_PREPARE_SUMMON";

/// Reason an effect setting could not be interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EffectError {
    /// The particle name is not one the host understands.
    #[error("unknown particle '{name}'")]
    UnknownParticle {
        /// Name as written in the configuration.
        name: String,
    },
    /// The sound name contains characters no sound identifier uses.
    #[error("unknown sound '{name}'")]
    UnknownSound {
        /// Name as written in the configuration.
        name: String,
    },
    /// Volume or pitch is not a finite number.
    #[error("invalid {field} '{value}'")]
    InvalidNumber {
        /// Either `volume` or `pitch`.
        field: &'static str,
        /// Text that failed to parse.
        value: String,
    },
}

/// Particle type emitted by the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParticleKind(String);

impl ParticleKind {
    pub(crate) fn builtin(name: &'static str) -> Self {
        Self(name.to_owned())
    }

    /// Parses a configured particle; empty text and `none` disable the effect.
    pub fn parse(text: &str) -> Result<Option<Self>, EffectError> {
        let name = text.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        let upper = name.to_ascii_uppercase();
        if KNOWN_PARTICLES.contains(&upper.as_str()) {
            Ok(Some(Self(upper)))
        } else {
            Err(EffectError::UnknownParticle {
                name: name.to_owned(),
            })
        }
    }

    /// Upper-case particle identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sound with its playback volume and pitch.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundSpec {
    name: String,
    volume: f32,
    pitch: f32,
}

impl SoundSpec {
    /// Creates a sound at full volume and normal pitch.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            volume: 1.0,
            pitch: 1.0,
        }
    }

    /// Overrides volume and pitch.
    #[must_use]
    pub fn with_levels(mut self, volume: f32, pitch: f32) -> Self {
        self.volume = volume;
        self.pitch = pitch;
        self
    }

    /// Parses `NAME[,volume[,pitch]]`; empty text and `none` disable the sound.
    pub fn parse(text: &str) -> Result<Option<Self>, EffectError> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Ok(None);
        }

        let mut fields = text.split(',').map(str::trim);
        let name = fields.next().unwrap_or_default();
        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid_name {
            return Err(EffectError::UnknownSound {
                name: name.to_owned(),
            });
        }

        let volume = parse_level("volume", fields.next())?;
        let pitch = parse_level("pitch", fields.next())?;
        Ok(Some(Self::new(name).with_levels(volume, pitch)))
    }

    /// Upper-case sound identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Playback volume.
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Playback pitch.
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }
}

fn parse_level(field: &'static str, text: Option<&str>) -> Result<f32, EffectError> {
    let Some(text) = text.filter(|text| !text.is_empty()) else {
        return Ok(1.0);
    };
    match text.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(EffectError::InvalidNumber {
            field,
            value: text.to_owned(),
        }),
    }
}

/// Single particle spawn request.
///
/// With `count` of zero the host treats `spread` as the direction of a single
/// particle travelling at `speed`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleEmission {
    /// Particle type.
    pub particle: ParticleKind,
    /// Where the particles appear.
    pub at: WorldPoint,
    /// Number of particles.
    pub count: u32,
    /// Random offset range per axis, or the direction when `count` is zero.
    pub spread: DVec3,
    /// Particle speed.
    pub speed: f64,
}

impl ParticleEmission {
    /// A single motionless particle.
    #[must_use]
    pub fn single(particle: ParticleKind, at: WorldPoint) -> Self {
        Self {
            particle,
            at,
            count: 1,
            spread: DVec3::ZERO,
            speed: 0.0,
        }
    }

    /// Replaces count, spread and speed.
    #[must_use]
    pub fn scattered(mut self, count: u32, spread: DVec3, speed: f64) -> Self {
        self.count = count;
        self.spread = spread;
        self.speed = speed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particles_accept_known_names_and_none() {
        assert_eq!(
            ParticleKind::parse("end_rod"),
            Ok(Some(ParticleKind::builtin("END_ROD")))
        );
        assert_eq!(ParticleKind::parse("none"), Ok(None));
        assert_eq!(ParticleKind::parse(""), Ok(None));
        assert!(matches!(
            ParticleKind::parse("sparkles"),
            Err(EffectError::UnknownParticle { .. })
        ));
    }

    #[test]
    fn sounds_default_to_full_volume() {
        let sound = SoundSpec::parse("entity_wither_spawn")
            .expect("valid sound")
            .expect("enabled");
        assert_eq!(sound.name(), "ENTITY_WITHER_SPAWN");
        assert_eq!((sound.volume(), sound.pitch()), (1.0, 1.0));

        let tuned = SoundSpec::parse("BLOCK_BEACON_ACTIVATE, 0.5 ,1.5")
            .expect("valid sound")
            .expect("enabled");
        assert_eq!((tuned.volume(), tuned.pitch()), (0.5, 1.5));
    }

    #[test]
    fn malformed_sounds_are_rejected() {
        assert!(matches!(
            SoundSpec::parse("BLOCK BEACON"),
            Err(EffectError::UnknownSound { .. })
        ));
        assert_eq!(
            SoundSpec::parse("BLOCK_BEACON_ACTIVATE,loud"),
            Err(EffectError::InvalidNumber {
                field: "volume",
                value: "loud".to_owned(),
            })
        );
    }
}
