use crate::{ParticleKind, SoundSpec};

/// Gameplay switches for altars.
#[derive(Clone, Debug, PartialEq)]
pub struct AltarSettings {
    /// Furthest a pedestal may sit from its center, in blocks.
    pub max_pedestal_radius: f64,
    /// Only the player who placed an item may take it back.
    pub prevent_item_theft: bool,
    /// Announce successful summons to every player.
    pub broadcast_summon: bool,
}

impl Default for AltarSettings {
    fn default() -> Self {
        Self {
            max_pedestal_radius: 10.0,
            prevent_item_theft: true,
            broadcast_summon: true,
        }
    }
}

/// Vertical offsets used by visual effects.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectHeights {
    /// Height above a pedestal block at which placed items float.
    pub pedestal: f64,
    /// Height above the center block of the "altar ready" pulse.
    pub ready_particle: f64,
    /// Extra lift applied to the ritual rings.
    pub ritual_ring_offset: f64,
}

impl Default for EffectHeights {
    fn default() -> Self {
        Self {
            pedestal: 1.2,
            ready_particle: 1.2,
            ritual_ring_offset: 0.0,
        }
    }
}

/// Particle choices; `None` disables the effect.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSettings {
    /// Orbit around pedestals holding a required item.
    pub pedestal_ready: Option<ParticleKind>,
    /// Pulse above altars that are ready to activate.
    pub altar_ready: Option<ParticleKind>,
    /// Tilted rings shown while a ritual starts.
    pub ritual_ring: Option<ParticleKind>,
    /// Trail behind every flying proxy.
    pub animation_trail: Option<ParticleKind>,
    /// Sparse secondary trail behind flying proxies.
    pub animation_trail_secondary: Option<ParticleKind>,
    /// Burst at the convergence point.
    pub convergence_burst: Option<ParticleKind>,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            pedestal_ready: Some(ParticleKind::builtin("END_ROD")),
            altar_ready: Some(ParticleKind::builtin("SOUL_FIRE_FLAME")),
            ritual_ring: Some(ParticleKind::builtin("SOUL_FIRE_FLAME")),
            animation_trail: Some(ParticleKind::builtin("ENCHANTMENT_TABLE")),
            animation_trail_secondary: Some(ParticleKind::builtin("END_ROD")),
            convergence_burst: Some(ParticleKind::builtin("END_ROD")),
        }
    }
}

/// Ritual sounds; `None` keeps the moment silent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoundSettings {
    /// Played when a ritual begins.
    pub ritual_start: Option<SoundSpec>,
    /// Repeated while the ritual rings are shown.
    pub ritual_ambient_loop: Option<SoundSpec>,
    /// Played when the ceremony items lift off.
    pub ritual_items_fly: Option<SoundSpec>,
    /// Played at the convergence burst.
    pub ritual_converge: Option<SoundSpec>,
    /// Played when the boss appears.
    pub summon_spawn: Option<SoundSpec>,
}

/// Visual and audio configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectSettings {
    /// Vertical offsets.
    pub heights: EffectHeights,
    /// Particle choices.
    pub particles: ParticleSettings,
    /// Sound choices.
    pub sounds: SoundSettings,
}

/// Complete runtime configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    /// Gameplay switches.
    pub altar: AltarSettings,
    /// Visual and audio configuration.
    pub effects: EffectSettings,
}
