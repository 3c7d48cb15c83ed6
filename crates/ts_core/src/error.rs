use thiserror::Error;

/// Invalid terrain parameters, rejected before any tile is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("tile counts must be at least 1, got {tiles_x}x{tiles_z}")]
    InvalidTileCount { tiles_x: u32, tiles_z: u32 },

    #[error("heightmap resolution must be at least 2, got {0}")]
    InvalidResolution(u32),

    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(f64),

    #[error("height scale must not be negative, got {0}")]
    NegativeHeightScale(f64),

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
}
