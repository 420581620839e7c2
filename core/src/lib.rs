#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the altar engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! hosts to react to. Systems consume event streams, query immutable views,
//! and respond exclusively with new command batches.

mod altar;
mod diagnostics;
mod effects;
mod item;
pub mod location;
mod settings;

use std::fmt;

use thiserror::Error;

pub use altar::{
    Altar, AltarName, AltarRecord, BossRequest, SlotRole, DEFAULT_BOSS_LABEL, DEFAULT_BOSS_NAME,
};
pub use diagnostics::{Diagnostic, Diagnostics, ErrorCategory};
pub use effects::{
    EffectError, ParticleEmission, ParticleKind, SoundSpec, PICKUP_SOUND, PLACE_SOUND,
    PREPARE_SOUND,
};
pub use item::{ItemDescriptor, ItemStack, RequiredItem, RequiredItems};
pub use location::{BlockLocation, KnownWorlds, WorldName, WorldPoint};
pub use settings::{
    AltarSettings, EffectHeights, EffectSettings, ParticleSettings, Settings, SoundSettings,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the runtime configuration.
    Configure {
        /// Configuration to apply from now on.
        settings: Settings,
    },
    /// Rebuilds the altar registry from stored definitions.
    LoadAltars {
        /// Every stored definition, valid or not.
        records: Vec<AltarRecord>,
        /// Worlds the host currently has loaded.
        worlds: KnownWorlds,
    },
    /// A player used their main hand on a block.
    Interact {
        /// Player performing the interaction.
        player: PlayerRef,
        /// Block that was clicked.
        location: BlockLocation,
        /// Item in the player's main hand, if any.
        held: Option<ItemStack>,
    },
    /// Advances the engine by one host tick.
    Tick,
    /// Requests a sound at a point.
    PlaySound {
        /// Sound to play.
        sound: SoundSpec,
        /// Where the sound originates.
        at: WorldPoint,
    },
    /// Requests particles.
    SpawnParticles {
        /// Particle request.
        emission: ParticleEmission,
    },
    /// Requests that a message be shown to one player.
    Notify {
        /// Recipient.
        player: PlayerId,
        /// Message to show.
        notice: Notice,
    },
    /// Requests that a message be shown to every player.
    Broadcast {
        /// Message to show.
        announcement: Announcement,
    },
    /// Records a data or configuration problem.
    ReportDiagnostic {
        /// Problem to record.
        diagnostic: Diagnostic,
    },
    /// Removes a ceremony display handed over to a ritual.
    RemoveDisplay {
        /// Display to remove.
        display: DisplayId,
    },
    /// Creates a flying proxy for a ceremony item.
    SpawnProxy {
        /// Altar whose ritual owns the proxy.
        altar: AltarName,
        /// Identifier chosen by the ritual for the proxy.
        proxy: ProxyId,
        /// Item the proxy carries.
        item: ItemDescriptor,
        /// Initial position.
        at: WorldPoint,
    },
    /// Moves a proxy.
    MoveProxy {
        /// Proxy to move.
        proxy: ProxyId,
        /// New position.
        to: WorldPoint,
    },
    /// Removes a proxy.
    RemoveProxy {
        /// Proxy to remove.
        proxy: ProxyId,
    },
    /// The host reports that a proxy vanished on its own.
    ReportProxyLost {
        /// Proxy that is gone.
        proxy: ProxyId,
    },
    /// Ends the Summoning state of an altar.
    ReleaseAltar {
        /// Altar to release.
        altar: AltarName,
    },
    /// Tears down every display, proxy and ritual without refunds.
    Shutdown,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that a host tick elapsed.
    TimeAdvanced {
        /// Number of ticks elapsed since the world was created.
        tick: u64,
    },
    /// Confirms that the altar registry was rebuilt.
    AltarsLoaded {
        /// Number of altars in the new registry.
        altars: usize,
        /// Number of blocks the altars claim.
        claimed_blocks: usize,
    },
    /// A message must be shown to one player.
    Notified {
        /// Recipient.
        player: PlayerId,
        /// Message to show.
        notice: Notice,
    },
    /// A message must be shown to every player.
    Broadcast {
        /// Message to show.
        announcement: Announcement,
    },
    /// A sound must be played.
    SoundPlayed {
        /// Sound to play.
        sound: SoundSpec,
        /// Where the sound originates.
        at: WorldPoint,
    },
    /// Particles must be spawned.
    ParticlesSpawned {
        /// Particle request.
        emission: ParticleEmission,
    },
    /// A passive, unpickable single-item display must be created.
    DisplaySpawned {
        /// Identifier assigned by the world.
        display: DisplayId,
        /// Item shown.
        item: ItemDescriptor,
        /// Where the item floats.
        at: WorldPoint,
    },
    /// A display must be removed.
    DisplayRemoved {
        /// Display to remove.
        display: DisplayId,
    },
    /// Confirms that a player set an item on a pedestal.
    ItemPlaced {
        /// Altar owning the pedestal.
        altar: AltarName,
        /// Player who placed the item.
        player: PlayerId,
        /// Pedestal block.
        location: BlockLocation,
        /// Display showing the item.
        display: DisplayId,
        /// Item placed.
        item: ItemDescriptor,
        /// Whether the item matches one of the altar's requirements.
        feeds_readiness: bool,
    },
    /// Confirms that a player took a placed item back; the host must hand it over.
    ItemRetrieved {
        /// Altar owning the slot.
        altar: AltarName,
        /// Player receiving the item.
        player: PlayerId,
        /// Slot the item was taken from.
        location: BlockLocation,
        /// Item returned.
        item: ItemDescriptor,
    },
    /// An item must be given back to the player who placed it.
    ItemReturned {
        /// Player receiving the item.
        player: PlayerId,
        /// Item returned.
        item: ItemDescriptor,
    },
    /// Units must be removed from a player's main hand.
    HeldItemConsumed {
        /// Player whose hand shrinks.
        player: PlayerId,
        /// Units removed.
        amount: u32,
    },
    /// Confirms that an altar entered the Summoning state.
    SummoningStarted {
        /// Altar performing the ritual.
        altar: AltarName,
        /// Player who activated the altar.
        summoner: PlayerRef,
        /// Center block of the altar.
        center: BlockLocation,
        /// Boss to summon on completion.
        boss: BossRequest,
        /// Items consumed by the ritual, now owned by it.
        ceremony: Vec<CeremonyItem>,
    },
    /// A flying proxy must be created.
    ProxySpawned {
        /// Altar whose ritual owns the proxy.
        altar: AltarName,
        /// Proxy identifier.
        proxy: ProxyId,
        /// Item the proxy carries.
        item: ItemDescriptor,
        /// Initial position.
        at: WorldPoint,
    },
    /// A proxy must be moved.
    ProxyMoved {
        /// Proxy to move.
        proxy: ProxyId,
        /// New position.
        to: WorldPoint,
    },
    /// Confirms that a proxy is no longer animated.
    ProxyLost {
        /// Proxy that vanished.
        proxy: ProxyId,
    },
    /// A proxy must be removed.
    ProxyRemoved {
        /// Proxy to remove.
        proxy: ProxyId,
    },
    /// Confirms that an altar left the Summoning state.
    AltarReleased {
        /// Altar released.
        altar: AltarName,
    },
    /// Confirms that every display, proxy and ritual was torn down.
    ShutDown,
}

/// Unique identifier of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u128);

impl PlayerId {
    /// Creates a new player identifier.
    #[must_use]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }
}

/// Player identity together with the name shown in announcements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerRef {
    id: PlayerId,
    name: String,
}

impl PlayerRef {
    /// Creates a player reference.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Identifier of the player.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name of the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Identifier of a passive item display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(u32);

impl DisplayId {
    /// Creates a new display identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a flying ritual proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(u32);

impl ProxyId {
    /// Creates a new proxy identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Item handed over to a ritual together with the display showing it.
#[derive(Clone, Debug, PartialEq)]
pub struct CeremonyItem {
    /// Display currently showing the item.
    pub display: DisplayId,
    /// Item consumed by the ritual.
    pub item: ItemDescriptor,
    /// Last visible position of the item.
    pub position: WorldPoint,
}

/// Player-facing messages; hosts decide how to phrase and localize them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Notice {
    /// The altar is busy with a ritual.
    AlreadySummoning,
    /// The clicked item belongs to someone else.
    NotYourItem,
    /// The central item was used before every requirement was met.
    NotReady,
    /// The held item does not activate this altar.
    WrongItem,
    /// A ritual began.
    RitualStarted,
    /// The boss appeared.
    BossSpawned,
    /// The configured boss could not be summoned.
    InvalidBoss {
        /// Boss name as configured.
        boss: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySummoning => f.write_str("This altar is already performing a ritual."),
            Self::NotYourItem => f.write_str("That item belongs to another player."),
            Self::NotReady => f.write_str("The altar is missing required items."),
            Self::WrongItem => f.write_str("That item does not awaken this altar."),
            Self::RitualStarted => f.write_str("The ritual has begun!"),
            Self::BossSpawned => f.write_str("The boss has been summoned!"),
            Self::InvalidBoss { boss } => {
                write!(f, "The boss '{boss}' could not be summoned.")
            }
        }
    }
}

/// Server-wide announcement of a successful summon.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Announcement {
    /// Boss label shown to players.
    pub boss: String,
    /// Name of the summoning player.
    pub summoner: String,
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has summoned {}!", self.summoner, self.boss)
    }
}

/// Reason the host could not spawn a boss.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BossSpawnError {
    /// The boss provider does not know the requested name.
    #[error("unknown boss type '{name}'")]
    UnknownBoss {
        /// Name that failed to resolve.
        name: String,
    },
    /// The boss provider is not available.
    #[error("boss provider unavailable: {reason}")]
    Unavailable {
        /// Explanation supplied by the host.
        reason: String,
    },
}

/// Host seam that materializes bosses.
pub trait BossSpawner {
    /// Spawns the requested boss at the provided point.
    fn spawn(&mut self, boss: &BossRequest, at: &WorldPoint) -> Result<(), BossSpawnError>;
}

impl<S: BossSpawner + ?Sized> BossSpawner for &mut S {
    fn spawn(&mut self, boss: &BossRequest, at: &WorldPoint) -> Result<(), BossSpawnError> {
        (**self).spawn(boss, at)
    }
}
