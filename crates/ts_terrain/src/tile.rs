use ts_core::{ConfigurationError, HeightSampler, TileCoord, WorldBounds, WorldPos};

/// Adjacent tiles in the grid, stored as coordinates rather than references.
///
/// Informational only: seams line up because of how samples are placed,
/// not because neighbours are blended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileNeighbors {
    pub left: Option<TileCoord>,
    pub top: Option<TileCoord>,
    pub right: Option<TileCoord>,
    pub bottom: Option<TileCoord>,
}

impl TileNeighbors {
    pub fn count(&self) -> usize {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .filter(|n| n.is_some())
            .count()
    }
}

/// One square tile of the height field.
///
/// Holds `resolution × resolution` samples in world units, stored row-major
/// with `i` along X and `j` along Z. Sample `(0, 0)` sits on the tile origin
/// (its south-west corner) and sample `(N-1, N-1)` on the opposite corner, so
/// adjacent tiles share their edge rows.
#[derive(Clone, Debug)]
pub struct TerrainTile {
    coord: TileCoord,
    origin: WorldPos,
    size: f64,
    max_height: f64,
    resolution: u32,
    heights: Vec<f64>,
    neighbors: TileNeighbors,
}

impl TerrainTile {
    /// Allocate a flat tile. `origin` is expected to be `coord * size`.
    pub fn new(
        coord: TileCoord,
        origin: WorldPos,
        size: f64,
        resolution: u32,
    ) -> Result<Self, ConfigurationError> {
        if resolution < 2 {
            return Err(ConfigurationError::InvalidResolution(resolution));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(ConfigurationError::InvalidTileSize(size));
        }

        let n = resolution as usize;
        Ok(Self {
            coord,
            origin,
            size,
            max_height: 0.0,
            resolution,
            heights: vec![0.0; n * n],
            neighbors: TileNeighbors::default(),
        })
    }

    /// Sample `sampler` at every grid point and scale by `height_scale`.
    pub fn fill_heights(&mut self, sampler: &dyn HeightSampler, height_scale: f64) {
        let n = self.resolution;
        for j in 0..n {
            for i in 0..n {
                let pos = self.sample_world_pos(i, j);
                let idx = self.index(i, j);
                self.heights[idx] = sampler.sample(pos.x, pos.z) * height_scale;
            }
        }
        self.max_height = height_scale;
    }

    /// Absolute world position of sample `(i, j)`.
    ///
    /// Derived from the sample's index across the whole grid, so the last
    /// column of one tile and the first column of the next compute the
    /// exact same coordinate.
    pub fn sample_world_pos(&self, i: u32, j: u32) -> WorldPos {
        let edge = f64::from(self.resolution - 1);
        let global_i = f64::from(self.coord.x) * edge + f64::from(i);
        let global_j = f64::from(self.coord.z) * edge + f64::from(j);
        WorldPos::new(global_i / edge * self.size, global_j / edge * self.size)
    }

    /// Bilinear height at normalized local coordinates, clamped to `[0, 1]`.
    pub fn height_at(&self, local_x: f64, local_z: f64) -> f64 {
        let edge = (self.resolution - 1) as usize;
        let (i0, tx) = Self::cell(local_x, edge);
        let (j0, tz) = Self::cell(local_z, edge);

        let h00 = self.sample(i0 as u32, j0 as u32);
        let h10 = self.sample(i0 as u32 + 1, j0 as u32);
        let h01 = self.sample(i0 as u32, j0 as u32 + 1);
        let h11 = self.sample(i0 as u32 + 1, j0 as u32 + 1);

        let south = lerp(h00, h10, tx);
        let north = lerp(h01, h11, tx);
        lerp(south, north, tz)
    }

    pub fn set_neighbors(
        &mut self,
        left: Option<TileCoord>,
        top: Option<TileCoord>,
        right: Option<TileCoord>,
        bottom: Option<TileCoord>,
    ) {
        self.neighbors = TileNeighbors {
            left,
            top,
            right,
            bottom,
        };
    }

    pub fn sample(&self, i: u32, j: u32) -> f64 {
        self.heights[self.index(i, j)]
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Height scale applied by the last fill, zero before that.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn neighbors(&self) -> TileNeighbors {
        self.neighbors
    }

    pub fn world_bounds(&self) -> WorldBounds {
        WorldBounds::new(
            self.origin,
            WorldPos::new(self.origin.x + self.size, self.origin.z + self.size),
        )
    }

    /// Debug name, e.g. `terrain_tile_2_0`.
    pub fn name(&self) -> String {
        format!("terrain_tile_{}_{}", self.coord.x, self.coord.z)
    }

    fn index(&self, i: u32, j: u32) -> usize {
        j as usize * self.resolution as usize + i as usize
    }

    /// Cell index and fraction for a normalized coordinate along one axis.
    fn cell(local: f64, edge: usize) -> (usize, f64) {
        let scaled = local.clamp(0.0, 1.0) * edge as f64;
        let index = (scaled.floor() as usize).min(edge - 1);
        (index, scaled - index as f64)
    }
}

/// `a` at `t = 0` and `b` at `t = 1`, both exactly.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}
