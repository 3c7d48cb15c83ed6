use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::plan::{SpawnConfig, SpawnError};

/// Spawn config file the binary looks for next to the terrain config.
pub const DEFAULT_SPAWN_CONFIG_PATH: &str = "assets/spawn.ron";

/// Error type for spawn config I/O.
#[derive(Debug, Error)]
pub enum SpawnConfigIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    Ron(#[from] ron::Error),
    #[error("RON parse error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("invalid spawn config: {0}")]
    Invalid(#[from] SpawnError),
}

pub fn save_spawn_config(path: &Path, config: &SpawnConfig) -> Result<(), SpawnConfigIoError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .struct_names(true);

    let ron_string = ron::ser::to_string_pretty(config, pretty_config)?;
    fs::write(path, ron_string)?;
    Ok(())
}

/// Load and validate a spawn config. Missing fields take their defaults.
pub fn load_spawn_config(path: &Path) -> Result<SpawnConfig, SpawnConfigIoError> {
    let contents = fs::read_to_string(path)?;
    let config: SpawnConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
