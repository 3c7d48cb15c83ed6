use serde::{Deserialize, Serialize};

/// Grid position of a terrain tile in tile-space coordinates.
///
/// `x` runs west to east, `z` runs south to north.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub z: u32,
}

impl TileCoord {
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

/// Continuous world-space position on the ground plane using f64 for precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub z: f64,
}

impl WorldPos {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Axis-aligned world extent, half-open on the max side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub min: WorldPos,
    pub max: WorldPos,
}

impl WorldBounds {
    pub const fn new(min: WorldPos, max: WorldPos) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn depth(&self) -> f64 {
        self.max.z - self.min.z
    }

    pub fn center(&self) -> WorldPos {
        WorldPos::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// True if `pos` lies in `[min, max)` on both axes.
    pub fn contains(&self, pos: WorldPos) -> bool {
        pos.x >= self.min.x && pos.x < self.max.x && pos.z >= self.min.z && pos.z < self.max.z
    }
}
