//! Block coordinates and their textual codec.
//!
//! Persisted altar definitions store every block as `"<world>,<x>,<y>,<z>"`.
//! Decoding is tolerant: anything that cannot be resolved against the set of
//! worlds the host currently knows simply yields `None`, leaving the caller
//! to decide whether the absence deserves a diagnostic.

use std::{collections::BTreeSet, fmt};

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Sentinel persisted for a location that has not been chosen yet.
pub const UNSET: &str = "not_set";

/// Name of a world loaded by the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldName(String);

impl WorldName {
    /// Wraps the provided world name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer block coordinate inside a named world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockLocation {
    world: WorldName,
    x: i32,
    y: i32,
    z: i32,
}

impl BlockLocation {
    /// Creates a block location from its world and integer coordinates.
    #[must_use]
    pub fn new(world: WorldName, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }

    /// World containing the block.
    #[must_use]
    pub fn world(&self) -> &WorldName {
        &self.world
    }

    /// Block column along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Block height along the y axis.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Block row along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Point offset from the block's minimum corner.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> WorldPoint {
        let corner = DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z));
        WorldPoint::new(self.world.clone(), corner + DVec3::new(dx, dy, dz))
    }

    /// Euclidean distance between two blocks, `None` when they live in different worlds.
    #[must_use]
    pub fn distance_to(&self, other: &BlockLocation) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    /// Renders the location in its persisted form without consulting the host.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{},{},{},{}", self.world, self.x, self.y, self.z)
    }
}

impl fmt::Display for BlockLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.world, self.x, self.y, self.z)
    }
}

/// Continuous position inside a named world.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldPoint {
    world: WorldName,
    point: DVec3,
}

impl WorldPoint {
    /// Creates a point in the provided world.
    #[must_use]
    pub fn new(world: WorldName, point: DVec3) -> Self {
        Self { world, point }
    }

    /// World containing the point.
    #[must_use]
    pub fn world(&self) -> &WorldName {
        &self.world
    }

    /// Coordinates of the point.
    #[must_use]
    pub const fn point(&self) -> DVec3 {
        self.point
    }

    /// Returns a copy of the point moved by `delta`.
    #[must_use]
    pub fn translated(&self, delta: DVec3) -> Self {
        Self::new(self.world.clone(), self.point + delta)
    }
}

/// Worlds the host currently has loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KnownWorlds {
    names: BTreeSet<String>,
}

impl KnownWorlds {
    /// Creates an empty world directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a world, returning `true` when it was not known before.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Reports whether the named world is loaded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Resolves a world name to its typed form when the world is loaded.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<WorldName> {
        self.names.get(name).map(|known| WorldName::new(known.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for KnownWorlds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Encodes a location, yielding `None` when its world is not loaded.
#[must_use]
pub fn encode(location: &BlockLocation, worlds: &KnownWorlds) -> Option<String> {
    if !worlds.contains(location.world.as_str()) {
        return None;
    }
    Some(location.encode())
}

/// Reports whether persisted text stands for "no location chosen".
///
/// Absent text counts as unset, which mirrors how freshly created altars are
/// written out.
#[must_use]
pub fn is_unset(text: Option<&str>) -> bool {
    match text {
        None => true,
        Some(text) => text.trim().eq_ignore_ascii_case(UNSET),
    }
}

/// Decodes persisted text into a location.
///
/// Returns `None` for absent or empty text, the [`UNSET`] sentinel, fewer than
/// four fields, an unknown world, or a coordinate that is not an integer.
#[must_use]
pub fn decode(text: Option<&str>, worlds: &KnownWorlds) -> Option<BlockLocation> {
    let text = text?.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(UNSET) {
        return None;
    }

    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return None;
    }

    let world = worlds.resolve(fields[0])?;
    let x = fields[1].parse().ok()?;
    let y = fields[2].parse().ok()?;
    let z = fields[3].parse().ok()?;
    Some(BlockLocation::new(world, x, y, z))
}
