use serde::{Deserialize, Serialize};
use ts_core::ConfigurationError;
use ts_noise::{FractalParams, NoiseField};

/// Parameters for one terrain generation run.
///
/// Tile counts and numeric ranges are checked by [`TerrainConfig::validate`];
/// resolution and tile size are checked when each tile is initialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of tiles along X (east-west).
    pub tiles_x: u32,
    /// Number of tiles along Z (north-south).
    pub tiles_z: u32,
    /// Edge length of each tile in world units.
    pub tile_size: f64,
    /// Height samples per tile edge (power of two + 1 is typical, e.g. 257).
    pub resolution: u32,
    /// Noise frequency in world-units⁻¹. Smaller is smoother.
    pub noise_scale: f64,
    /// Maximum terrain height in world units. Must not be negative.
    pub height_scale: f64,
    /// World seed, shared by every tile.
    pub seed: i32,
    /// Octave layering. One octave by default.
    pub fractal: FractalParams,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tiles_x: 3,
            tiles_z: 3,
            tile_size: 512.0,
            resolution: 257,
            noise_scale: 0.003,
            height_scale: 80.0,
            seed: 12345,
            fractal: FractalParams::default(),
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.tiles_x == 0 || self.tiles_z == 0 {
            return Err(ConfigurationError::InvalidTileCount {
                tiles_x: self.tiles_x,
                tiles_z: self.tiles_z,
            });
        }

        let finite_checks = [
            ("tile_size", self.tile_size),
            ("noise_scale", self.noise_scale),
            ("height_scale", self.height_scale),
            ("persistence", self.fractal.persistence),
            ("lacunarity", self.fractal.lacunarity),
        ];
        for (name, value) in finite_checks {
            if !value.is_finite() {
                return Err(ConfigurationError::NonFinite { name, value });
            }
        }

        if self.height_scale < 0.0 {
            return Err(ConfigurationError::NegativeHeightScale(self.height_scale));
        }

        Ok(())
    }

    /// The single noise field every tile samples from.
    ///
    /// Heights come out normalized; tiles apply `height_scale` themselves.
    pub fn noise_field(&self) -> NoiseField {
        NoiseField::new(self.seed, self.noise_scale, 1.0).with_fractal(self.fractal)
    }

    pub fn world_width(&self) -> f64 {
        f64::from(self.tiles_x) * self.tile_size
    }

    pub fn world_depth(&self) -> f64 {
        f64::from(self.tiles_z) * self.tile_size
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_x as usize * self.tiles_z as usize
    }
}
