use bevy::log::{debug, info};
use bevy::prelude::Resource;
use rayon::prelude::*;
use std::time::Instant;
use ts_core::{
    ConfigurationError, HeightQuery, HeightSampler, TileCoord, WorldBounds, WorldPos,
    OUT_OF_BOUNDS_HEIGHT,
};

use crate::config::TerrainConfig;
use crate::tile::TerrainTile;

/// Whether the grid currently holds queryable terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GridState {
    /// No tiles. Every height query returns the out-of-bounds fallback.
    #[default]
    Empty,
    /// Every tile is built, filled and linked.
    Generated,
}

/// Tiles from the last successful generation, with the config that built them.
#[derive(Debug)]
struct GeneratedTerrain {
    config: TerrainConfig,
    tiles: Vec<TerrainTile>,
}

/// Rectangular grid of terrain tiles that together form one seamless surface.
///
/// Configuration is staged: [`TerrainGrid::configure`] only changes what the
/// next [`TerrainGrid::generate`] builds. Queries always answer from the last
/// successful generation, using the tile layout it was built with.
#[derive(Resource, Debug, Default)]
pub struct TerrainGrid {
    config: TerrainConfig,
    generated: Option<GeneratedTerrain>,
}

impl TerrainGrid {
    /// An empty grid staged with `config`.
    pub fn new(config: TerrainConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            generated: None,
        })
    }

    /// Stage new generation parameters, keeping the current fractal settings.
    #[allow(clippy::too_many_arguments)]
    pub fn configure(
        &mut self,
        tiles_x: u32,
        tiles_z: u32,
        tile_size: f64,
        resolution: u32,
        noise_scale: f64,
        height_scale: f64,
        seed: i32,
    ) -> Result<(), ConfigurationError> {
        self.set_config(TerrainConfig {
            tiles_x,
            tiles_z,
            tile_size,
            resolution,
            noise_scale,
            height_scale,
            seed,
            fractal: self.config.fractal,
        })
    }

    /// Stage a full config. Rejected configs leave the staged one untouched.
    pub fn set_config(&mut self, config: TerrainConfig) -> Result<(), ConfigurationError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Rebuild every tile from the staged config.
    ///
    /// Tiles are filled in parallel. On error nothing is replaced and the
    /// previous terrain (or the empty state) stays visible to queries.
    pub fn generate(&mut self) -> Result<(), ConfigurationError> {
        let config = self.config.clone();
        config.validate()?;

        let started = Instant::now();
        let field = config.noise_field();

        let coords: Vec<TileCoord> = (0..config.tiles_z)
            .flat_map(|z| (0..config.tiles_x).map(move |x| TileCoord::new(x, z)))
            .collect();

        let mut tiles = coords
            .into_par_iter()
            .map(|coord| build_tile(coord, &config, &field))
            .collect::<Result<Vec<_>, _>>()?;

        link_neighbors(&mut tiles, config.tiles_x, config.tiles_z);

        info!(
            "Generated {}x{} terrain tiles ({} samples per edge) in {:.1?}",
            config.tiles_x,
            config.tiles_z,
            config.resolution,
            started.elapsed()
        );

        self.generated = Some(GeneratedTerrain { config, tiles });
        Ok(())
    }

    /// Drop all tiles and return to [`GridState::Empty`].
    pub fn clear(&mut self) {
        self.generated = None;
    }

    pub fn state(&self) -> GridState {
        match self.generated {
            Some(_) => GridState::Generated,
            None => GridState::Empty,
        }
    }

    /// Config staged for the next generation.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Config the current tiles were built with.
    pub fn generated_config(&self) -> Option<&TerrainConfig> {
        self.generated.as_ref().map(|g| &g.config)
    }

    /// All tiles in row-major order (`z * tiles_x + x`). Empty before generation.
    pub fn tiles(&self) -> &[TerrainTile] {
        self.generated
            .as_ref()
            .map(|g| g.tiles.as_slice())
            .unwrap_or(&[])
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        let generated = self.generated.as_ref()?;
        if coord.x >= generated.config.tiles_x || coord.z >= generated.config.tiles_z {
            return None;
        }
        let index = coord.z as usize * generated.config.tiles_x as usize + coord.x as usize;
        generated.tiles.get(index)
    }

    /// Tile owning world position `(x, z)`, if it lies inside the terrain.
    pub fn tile_at(&self, x: f64, z: f64) -> Option<&TerrainTile> {
        let generated = self.generated.as_ref()?;
        if !x.is_finite() || !z.is_finite() {
            return None;
        }

        let config = &generated.config;
        if x < 0.0 || z < 0.0 || x >= config.world_width() || z >= config.world_depth() {
            return None;
        }

        // x / size can round up to tiles_x just inside the far edge.
        let tile_x = ((x / config.tile_size).floor() as u32).min(config.tiles_x - 1);
        let tile_z = ((z / config.tile_size).floor() as u32).min(config.tiles_z - 1);
        self.tile(TileCoord::new(tile_x, tile_z))
    }

    /// Ground height at a world position, or [`OUT_OF_BOUNDS_HEIGHT`] outside
    /// the generated terrain.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        let Some(tile) = self.tile_at(x, z) else {
            return OUT_OF_BOUNDS_HEIGHT;
        };

        let origin = tile.origin();
        let local_x = (x - origin.x) / tile.size();
        let local_z = (z - origin.z) / tile.size();
        tile.height_at(local_x, local_z)
    }

    /// Width and depth of the generated terrain in world units.
    pub fn world_size(&self) -> Option<(f64, f64)> {
        self.generated
            .as_ref()
            .map(|g| (g.config.world_width(), g.config.world_depth()))
    }

    pub fn world_center(&self) -> Option<WorldPos> {
        self.world_bounds().map(|b| b.center())
    }
}

impl HeightQuery for TerrainGrid {
    fn height_at(&self, x: f64, z: f64) -> f64 {
        TerrainGrid::height_at(self, x, z)
    }

    fn world_bounds(&self) -> Option<WorldBounds> {
        self.world_size()
            .map(|(width, depth)| WorldBounds::new(WorldPos::default(), WorldPos::new(width, depth)))
    }
}

fn build_tile(
    coord: TileCoord,
    config: &TerrainConfig,
    sampler: &dyn HeightSampler,
) -> Result<TerrainTile, ConfigurationError> {
    let origin = WorldPos::new(
        f64::from(coord.x) * config.tile_size,
        f64::from(coord.z) * config.tile_size,
    );

    let mut tile = TerrainTile::new(coord, origin, config.tile_size, config.resolution)?;
    tile.fill_heights(sampler, config.height_scale);

    debug!("Filled {} from {} at {:?}", tile.name(), sampler.name(), origin);
    Ok(tile)
}

/// Link every tile to its west/north/east/south neighbours.
fn link_neighbors(tiles: &mut [TerrainTile], tiles_x: u32, tiles_z: u32) {
    for tile in tiles.iter_mut() {
        let TileCoord { x, z } = tile.coord();
        let left = (x > 0).then(|| TileCoord::new(x - 1, z));
        let right = (x + 1 < tiles_x).then(|| TileCoord::new(x + 1, z));
        let bottom = (z > 0).then(|| TileCoord::new(x, z - 1));
        let top = (z + 1 < tiles_z).then(|| TileCoord::new(x, z + 1));

        tile.set_neighbors(left, top, right, bottom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_grid() -> TerrainGrid {
        let mut grid = TerrainGrid::default();
        grid.configure(2, 1, 100.0, 5, 0.01, 50.0, 42).unwrap();
        grid.generate().unwrap();
        grid
    }

    #[test]
    fn starts_empty() {
        let grid = TerrainGrid::default();
        assert_eq!(grid.state(), GridState::Empty);
        assert!(grid.tiles().is_empty());
        assert_eq!(grid.height_at(10.0, 10.0), OUT_OF_BOUNDS_HEIGHT);
        assert_eq!(HeightQuery::world_bounds(&grid), None);
    }

    #[test]
    fn scenario_seam_matches() {
        let grid = scenario_grid();
        assert_eq!(grid.state(), GridState::Generated);

        let west = grid.tile(TileCoord::new(0, 0)).unwrap();
        let east = grid.tile(TileCoord::new(1, 0)).unwrap();
        let from_west = west.height_at(1.0, 0.5);
        let from_east = east.height_at(0.0, 0.5);
        assert!((from_west - from_east).abs() < 1e-6);
        assert!((grid.height_at(100.0, 50.0) - from_west).abs() < 1e-6);
    }

    #[test]
    fn far_edge_rounding_stays_on_last_tile() {
        let mut grid = TerrainGrid::default();
        grid.configure(5, 1, 0.7, 5, 1.0, 50.0, 42).unwrap();
        grid.generate().unwrap();

        // 3.4999999999999996 / 0.7 rounds to 5.0, one past the last tile.
        let x = 3.4999999999999996;
        let z = 0.35;
        let bounds = HeightQuery::world_bounds(&grid).unwrap();
        assert!(bounds.contains(WorldPos::new(x, z)));

        let last = grid.tile(TileCoord::new(4, 0)).unwrap();
        assert_eq!(grid.tile_at(x, z).map(|t| t.coord()), Some(last.coord()));
        let edge = last.height_at(1.0, z / 0.7);
        assert!(edge > 0.0);
        assert!((grid.height_at(x, z) - edge).abs() < 1e-6);
    }

    #[test]
    fn negative_seed_generates() {
        let mut grid = TerrainGrid::default();
        grid.configure(2, 2, 50.0, 9, 0.02, 40.0, -7321).unwrap();
        grid.generate().unwrap();
        assert_eq!(grid.generated_config().unwrap().seed, -7321);

        let h = grid.height_at(60.0, 35.0);
        assert!((0.0..=40.0).contains(&h));
    }

    #[test]
    fn all_internal_seams_are_exact() {
        let mut grid = TerrainGrid::default();
        grid.configure(4, 3, 37.5, 9, 0.02, 80.0, 12345).unwrap();
        grid.generate().unwrap();
        let n = grid.config().resolution;

        for tile in grid.tiles() {
            let neighbors = tile.neighbors();
            if let Some(right) = neighbors.right {
                let east = grid.tile(right).unwrap();
                for j in 0..n {
                    assert_eq!(tile.sample(n - 1, j), east.sample(0, j));
                }
                for step in 0..=20 {
                    let t = step as f64 / 20.0;
                    assert_eq!(tile.height_at(1.0, t), east.height_at(0.0, t));
                }
            }
            if let Some(top) = neighbors.top {
                let north = grid.tile(top).unwrap();
                for i in 0..n {
                    assert_eq!(tile.sample(i, n - 1), north.sample(i, 0));
                }
                for step in 0..=20 {
                    let t = step as f64 / 20.0;
                    assert_eq!(tile.height_at(t, 1.0), north.height_at(t, 0.0));
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = scenario_grid();
        let b = scenario_grid();
        for (ta, tb) in a.tiles().iter().zip(b.tiles()) {
            assert_eq!(ta.heights(), tb.heights());
        }
    }

    #[test]
    fn repeated_configure_is_idempotent() {
        let once = scenario_grid();

        let mut twice = TerrainGrid::default();
        twice.configure(2, 1, 100.0, 5, 0.01, 50.0, 42).unwrap();
        twice.configure(2, 1, 100.0, 5, 0.01, 50.0, 42).unwrap();
        twice.generate().unwrap();

        assert_eq!(once.tiles().len(), twice.tiles().len());
        for (a, b) in once.tiles().iter().zip(twice.tiles()) {
            assert_eq!(a.heights(), b.heights());
        }
    }

    #[test]
    fn heights_stay_within_scale() {
        let grid = scenario_grid();
        for step_x in 0..40 {
            for step_z in 0..20 {
                let x = step_x as f64 * 5.0 + 0.3;
                let z = step_z as f64 * 5.0 + 0.7;
                let h = grid.height_at(x, z);
                assert!(h.is_finite());
                assert!((0.0..=50.0 + 1e-9).contains(&h), "Height {} at ({}, {})", h, x, z);
            }
        }
    }

    #[test]
    fn out_of_bounds_returns_fallback() {
        let grid = scenario_grid();
        assert_eq!(grid.height_at(-10.0, -10.0), OUT_OF_BOUNDS_HEIGHT);
        assert_eq!(grid.height_at(200.0, 50.0), OUT_OF_BOUNDS_HEIGHT);
        assert_eq!(grid.height_at(50.0, 100.0), OUT_OF_BOUNDS_HEIGHT);
        assert_eq!(grid.height_at(f64::NAN, 50.0), OUT_OF_BOUNDS_HEIGHT);
        assert!(grid.tile_at(-0.001, 1.0).is_none());
    }

    #[test]
    fn invalid_configure_keeps_grid_empty() {
        let mut grid = TerrainGrid::default();
        let result = grid.configure(0, 1, 100.0, 5, 0.01, 50.0, 42);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidTileCount { tiles_x: 0, .. })
        ));
        assert_eq!(grid.state(), GridState::Empty);
        assert_eq!(grid.config(), &TerrainConfig::default());
    }

    #[test]
    fn failed_generation_keeps_previous_terrain() {
        let mut grid = scenario_grid();
        let before: Vec<f64> = grid.tiles().iter().flat_map(|t| t.heights().to_vec()).collect();

        grid.configure(3, 3, 100.0, 1, 0.01, 50.0, 7).unwrap();
        let result = grid.generate();
        assert_eq!(result, Err(ConfigurationError::InvalidResolution(1)));

        assert_eq!(grid.state(), GridState::Generated);
        assert_eq!(grid.tiles().len(), 2);
        assert_eq!(grid.generated_config().unwrap().seed, 42);
        let after: Vec<f64> = grid.tiles().iter().flat_map(|t| t.heights().to_vec()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn failed_first_generation_stays_empty() {
        let mut grid = TerrainGrid::default();
        grid.configure(2, 2, -5.0, 5, 0.01, 50.0, 42).unwrap();
        assert_eq!(grid.generate(), Err(ConfigurationError::InvalidTileSize(-5.0)));
        assert_eq!(grid.state(), GridState::Empty);
    }

    #[test]
    fn staged_config_does_not_affect_queries() {
        let mut grid = scenario_grid();
        let before = grid.height_at(150.0, 30.0);
        grid.configure(1, 1, 10.0, 3, 0.5, 1.0, 9).unwrap();
        assert_eq!(grid.height_at(150.0, 30.0), before);
        assert_eq!(grid.world_size(), Some((200.0, 100.0)));
    }

    #[test]
    fn regeneration_replaces_tiles() {
        let mut grid = scenario_grid();
        grid.configure(3, 2, 50.0, 3, 0.01, 10.0, 1).unwrap();
        grid.generate().unwrap();
        assert_eq!(grid.tiles().len(), 6);
        assert_eq!(grid.world_size(), Some((150.0, 100.0)));
        assert!(grid.tile(TileCoord::new(2, 1)).is_some());
        assert!(grid.tile(TileCoord::new(3, 0)).is_none());
    }

    #[test]
    fn tiles_are_row_major_with_offsets() {
        let mut grid = TerrainGrid::default();
        grid.configure(3, 2, 64.0, 3, 0.01, 10.0, 5).unwrap();
        grid.generate().unwrap();

        for (index, tile) in grid.tiles().iter().enumerate() {
            let coord = tile.coord();
            assert_eq!(index, coord.z as usize * 3 + coord.x as usize);
            assert_eq!(
                tile.origin(),
                WorldPos::new(f64::from(coord.x) * 64.0, f64::from(coord.z) * 64.0)
            );
        }
    }

    #[test]
    fn neighbors_follow_grid_adjacency() {
        let mut grid = TerrainGrid::default();
        grid.configure(3, 2, 64.0, 3, 0.01, 10.0, 5).unwrap();
        grid.generate().unwrap();

        let corner = grid.tile(TileCoord::new(0, 0)).unwrap().neighbors();
        assert_eq!(corner.left, None);
        assert_eq!(corner.bottom, None);
        assert_eq!(corner.right, Some(TileCoord::new(1, 0)));
        assert_eq!(corner.top, Some(TileCoord::new(0, 1)));

        let edge = grid.tile(TileCoord::new(1, 1)).unwrap().neighbors();
        assert_eq!(edge.left, Some(TileCoord::new(0, 1)));
        assert_eq!(edge.right, Some(TileCoord::new(2, 1)));
        assert_eq!(edge.bottom, Some(TileCoord::new(1, 0)));
        assert_eq!(edge.top, None);
        assert_eq!(edge.count(), 3);
    }

    #[test]
    fn world_bounds_and_center() {
        let grid = scenario_grid();
        let bounds = HeightQuery::world_bounds(&grid).unwrap();
        assert_eq!(bounds.max, WorldPos::new(200.0, 100.0));
        assert_eq!(grid.world_center(), Some(WorldPos::new(100.0, 50.0)));
    }

    #[test]
    fn clear_returns_to_empty() {
        let mut grid = scenario_grid();
        grid.clear();
        assert_eq!(grid.state(), GridState::Empty);
        assert_eq!(grid.height_at(50.0, 50.0), OUT_OF_BOUNDS_HEIGHT);
    }
}
