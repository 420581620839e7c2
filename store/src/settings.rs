//! Lenient configuration loading.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use altars_core::{
    AltarSettings, Diagnostic, EffectHeights, EffectSettings, ParticleKind, ParticleSettings,
    Settings, SoundSettings, SoundSpec,
};
use serde::Deserialize;
use thiserror::Error;

/// Failure to read the configuration file at all.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file exists but could not be read.
    #[error("failed to read configuration from {path}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML or a key has the wrong type.
    #[error("failed to parse configuration")]
    Parse {
        /// Parser complaint.
        #[source]
        source: toml::de::Error,
    },
}

/// Settings together with the problems found while reading them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsReport {
    /// Usable configuration; broken effects are disabled.
    pub settings: Settings,
    /// Configuration Error entries for every disabled effect.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawConfig {
    altar: RawAltar,
    effects: RawEffects,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawAltar {
    max_pedestal_radius: Option<f64>,
    prevent_item_theft: Option<bool>,
    broadcast_summon: RawToggle,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawToggle {
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEffects {
    heights: RawHeights,
    particles: RawParticles,
    sounds: RawSounds,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawHeights {
    pedestal: Option<f64>,
    ready_particle: Option<f64>,
    ritual_ring_offset: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawParticles {
    pedestal_ready: Option<String>,
    altar_ready: Option<String>,
    ritual_ring: Option<String>,
    animation_trail: Option<String>,
    animation_trail_secondary: Option<String>,
    convergence_burst: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawSounds {
    ritual_start: Option<String>,
    ritual_ambient_loop: Option<String>,
    ritual_items_fly: Option<String>,
    ritual_converge: Option<String>,
    summon_spawn: Option<String>,
}

/// Reads `path`; a missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<SettingsReport, SettingsError> {
    match fs::read_to_string(path) {
        Ok(text) => parse_settings(&text),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(SettingsReport::default())
        }
        Err(source) => Err(SettingsError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parses configuration text, disabling effects whose names are unusable.
pub fn parse_settings(text: &str) -> Result<SettingsReport, SettingsError> {
    let raw: RawConfig = toml::from_str(text).map_err(|source| SettingsError::Parse { source })?;
    let mut diagnostics = Vec::new();

    let altar_defaults = AltarSettings::default();
    let altar = AltarSettings {
        max_pedestal_radius: raw
            .altar
            .max_pedestal_radius
            .unwrap_or(altar_defaults.max_pedestal_radius),
        prevent_item_theft: raw
            .altar
            .prevent_item_theft
            .unwrap_or(altar_defaults.prevent_item_theft),
        broadcast_summon: raw
            .altar
            .broadcast_summon
            .enabled
            .unwrap_or(altar_defaults.broadcast_summon),
    };

    let height_defaults = EffectHeights::default();
    let heights = EffectHeights {
        pedestal: raw.effects.heights.pedestal.unwrap_or(height_defaults.pedestal),
        ready_particle: raw
            .effects
            .heights
            .ready_particle
            .unwrap_or(height_defaults.ready_particle),
        ritual_ring_offset: raw
            .effects
            .heights
            .ritual_ring_offset
            .unwrap_or(height_defaults.ritual_ring_offset),
    };

    let defaults = ParticleSettings::default();
    let p = &raw.effects.particles;
    let mut particle = |key: &str, value: &Option<String>, default: Option<ParticleKind>| {
        resolve_particle(key, value.as_deref(), default, &mut diagnostics)
    };
    let particles = ParticleSettings {
        pedestal_ready: particle("pedestal-ready", &p.pedestal_ready, defaults.pedestal_ready),
        altar_ready: particle("altar-ready", &p.altar_ready, defaults.altar_ready),
        ritual_ring: particle("ritual-ring", &p.ritual_ring, defaults.ritual_ring),
        animation_trail: particle("animation-trail", &p.animation_trail, defaults.animation_trail),
        animation_trail_secondary: particle(
            "animation-trail-secondary",
            &p.animation_trail_secondary,
            defaults.animation_trail_secondary,
        ),
        convergence_burst: particle(
            "convergence-burst",
            &p.convergence_burst,
            defaults.convergence_burst,
        ),
    };

    let s = &raw.effects.sounds;
    let mut sound =
        |key: &str, value: &Option<String>| resolve_sound(key, value.as_deref(), &mut diagnostics);
    let sounds = SoundSettings {
        ritual_start: sound("ritual-start", &s.ritual_start),
        ritual_ambient_loop: sound("ritual-ambient-loop", &s.ritual_ambient_loop),
        ritual_items_fly: sound("ritual-items-fly", &s.ritual_items_fly),
        ritual_converge: sound("ritual-converge", &s.ritual_converge),
        summon_spawn: sound("summon-spawn", &s.summon_spawn),
    };

    Ok(SettingsReport {
        settings: Settings {
            altar,
            effects: EffectSettings {
                heights,
                particles,
                sounds,
            },
        },
        diagnostics,
    })
}

fn resolve_particle(
    key: &str,
    value: Option<&str>,
    default: Option<ParticleKind>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ParticleKind> {
    let Some(value) = value else {
        return default;
    };
    match ParticleKind::parse(value) {
        Ok(particle) => particle,
        Err(error) => {
            tracing::debug!(key, %error, "particle disabled");
            diagnostics.push(Diagnostic::configuration(format!(
                "Invalid particle name in config at path 'effects.particles.{key}': {value}"
            )));
            None
        }
    }
}

fn resolve_sound(
    key: &str,
    value: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<SoundSpec> {
    let value = value?;
    match SoundSpec::parse(value) {
        Ok(sound) => sound,
        Err(error) => {
            tracing::debug!(key, %error, "sound disabled");
            diagnostics.push(Diagnostic::configuration(format!(
                "Invalid sound name in config at path 'effects.sounds.{key}': {value}"
            )));
            None
        }
    }
}
