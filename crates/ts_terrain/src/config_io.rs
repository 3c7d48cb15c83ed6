use std::fs;
use std::path::Path;
use thiserror::Error;
use ts_core::ConfigurationError;

use crate::config::TerrainConfig;

/// Config file the binary looks for when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "assets/terrain.ron";

/// Error type for terrain config I/O.
#[derive(Debug, Error)]
pub enum ConfigIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    Ron(#[from] ron::Error),
    #[error("RON parse error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("invalid terrain config: {0}")]
    Invalid(#[from] ConfigurationError),
}

/// Save a terrain config to a RON file.
pub fn save_config(path: &Path, config: &TerrainConfig) -> Result<(), ConfigIoError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .struct_names(true);

    let ron_string = ron::ser::to_string_pretty(config, pretty_config)?;
    fs::write(path, ron_string)?;
    Ok(())
}

/// Load and validate a terrain config from a RON file.
///
/// Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<TerrainConfig, ConfigIoError> {
    let contents = fs::read_to_string(path)?;
    let config: TerrainConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.ron");

        let config = TerrainConfig {
            tiles_x: 5,
            seed: -99,
            ..TerrainConfig::default()
        };
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.ron");
        fs::write(&path, "(tiles_x: 2, tiles_z: 1, tile_size: 100.0)").unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.tiles_x, 2);
        assert_eq!(loaded.tile_size, 100.0);
        assert_eq!(loaded.resolution, TerrainConfig::default().resolution);
        assert_eq!(loaded.fractal.octaves, 1);
    }

    #[test]
    fn invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.ron");
        fs::write(&path, "(tiles_x: 0)").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigIoError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, ConfigIoError::Io(_)));
    }
}
