use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::path::Path;
use ts_spawn::{
    load_spawn_config, PlannedSpawns, SpawnConfig, SpawnConfigIoError, SpawnSettings,
    TsSpawnPlugin, DEFAULT_SPAWN_CONFIG_PATH,
};
use ts_terrain::{
    load_config, ConfigIoError, RegenerateTerrain, TerrainConfig, TerrainGenerated,
    TerrainGenerationFailed, TerrainGrid, TerrainSettings, TsTerrainPlugin, DEFAULT_CONFIG_PATH,
};

/// Where the terrain config came from, for the startup log.
#[derive(Resource, Debug, Clone)]
struct ConfigSource(String);

fn main() -> AppExit {
    let mut args = std::env::args().skip(1);
    let (config, source) = match resolve_config(args.next()) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Failed to load terrain config: {}", e);
            return AppExit::error();
        }
    };

    let mut spawn = match resolve_spawn_config(args.next()) {
        Ok(spawn) => spawn,
        Err(e) => {
            eprintln!("Failed to load spawn config: {}", e);
            return AppExit::error();
        }
    };
    // One seed reproduces the whole world unless placement has its own.
    spawn.seed.get_or_insert(i64::from(config.seed) as u64);

    App::new()
        .add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_plugins((TsTerrainPlugin, TsSpawnPlugin))
        .insert_resource(TerrainSettings(config))
        .insert_resource(SpawnSettings(spawn))
        .insert_resource(ConfigSource(source))
        .add_systems(Startup, request_generation)
        .add_systems(
            Update,
            report_and_exit.after(ts_spawn::plan_spawns_on_generation),
        )
        .run()
}

/// Explicit path first, then the default config file, then built-in defaults.
fn resolve_config(arg: Option<String>) -> Result<(TerrainConfig, String), ConfigIoError> {
    if let Some(path) = arg {
        let config = load_config(Path::new(&path))?;
        return Ok((config, path));
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = load_config(default_path)?;
        return Ok((config, DEFAULT_CONFIG_PATH.to_string()));
    }

    Ok((TerrainConfig::default(), "built-in defaults".to_string()))
}

/// Explicit path first, then the default spawn file, then built-in defaults.
fn resolve_spawn_config(arg: Option<String>) -> Result<SpawnConfig, SpawnConfigIoError> {
    if let Some(path) = arg {
        return load_spawn_config(Path::new(&path));
    }

    let default_path = Path::new(DEFAULT_SPAWN_CONFIG_PATH);
    if default_path.exists() {
        return load_spawn_config(default_path);
    }

    Ok(SpawnConfig::default())
}

fn request_generation(
    settings: Res<TerrainSettings>,
    source: Res<ConfigSource>,
    mut requests: EventWriter<RegenerateTerrain>,
) {
    let config = &settings.0;
    info!(
        "Terrain config from {}: {}x{} tiles of {} units, resolution {}, seed {}",
        source.0, config.tiles_x, config.tiles_z, config.tile_size, config.resolution, config.seed
    );
    requests.send(RegenerateTerrain);
}

/// System that logs the finished world and stops the app.
fn report_and_exit(
    mut generated: EventReader<TerrainGenerated>,
    mut failed: EventReader<TerrainGenerationFailed>,
    grid: Res<TerrainGrid>,
    spawns: Res<PlannedSpawns>,
    mut exit: EventWriter<AppExit>,
) {
    if let Some(event) = failed.read().last() {
        error!("World setup aborted: {}", event.error);
        exit.send(AppExit::error());
        return;
    }

    let Some(event) = generated.read().last() else {
        return;
    };

    let (min, max) = grid
        .tiles()
        .iter()
        .flat_map(|tile| tile.heights().iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
            (lo.min(h), hi.max(h))
        });
    info!(
        "World ready: {} tiles covering {:.0}x{:.0}, heights {:.2}..{:.2}",
        event.tiles,
        event.bounds.width(),
        event.bounds.depth(),
        min,
        max
    );

    let center = event.bounds.center();
    info!(
        "Ground at world centre ({:.1}, {:.1}) is {:.2}",
        center.x,
        center.z,
        grid.height_at(center.x, center.z)
    );

    match spawns.0.player() {
        Some(player) => info!(
            "Player spawns at ({:.1}, {:.2}, {:.1}) with {} other placements",
            player.position.x,
            player.height,
            player.position.z,
            spawns.0.len() - 1
        ),
        None => warn!("No spawn plan for this terrain"),
    }

    exit.send(AppExit::Success);
}
