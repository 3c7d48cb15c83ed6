use bevy::prelude::*;
use ts_core::{ConfigurationError, HeightQuery, NavMeshBuilder, WorldBounds};

pub mod config;
pub mod config_io;
pub mod grid;
pub mod tile;

pub use config::TerrainConfig;
pub use config_io::{load_config, save_config, ConfigIoError, DEFAULT_CONFIG_PATH};
pub use grid::{GridState, TerrainGrid};
pub use tile::{TerrainTile, TileNeighbors};

/// Parameters applied on the next [`RegenerateTerrain`].
#[derive(Resource, Debug, Clone, Default)]
pub struct TerrainSettings(pub TerrainConfig);

/// Request a full rebuild of the terrain grid from [`TerrainSettings`].
#[derive(Event, Clone, Debug, Default)]
pub struct RegenerateTerrain;

/// Fired once every tile is built and linked. Geometry is final from here on.
#[derive(Event, Clone, Debug)]
pub struct TerrainGenerated {
    pub tiles: usize,
    pub bounds: WorldBounds,
}

/// Fired when a regeneration was rejected. The previous terrain is kept.
#[derive(Event, Clone, Debug)]
pub struct TerrainGenerationFailed {
    pub error: ConfigurationError,
}

/// Ordering for terrain systems within `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerrainSet {
    Generate,
    NavMesh,
}

/// Optional navigation mesh builder, run after every successful generation.
#[derive(Resource, Default)]
pub struct NavMeshHook {
    builder: Option<Box<dyn NavMeshBuilder>>,
}

impl NavMeshHook {
    pub fn new(builder: impl NavMeshBuilder + 'static) -> Self {
        Self {
            builder: Some(Box::new(builder)),
        }
    }

    pub fn is_set(&self) -> bool {
        self.builder.is_some()
    }
}

/// Terrain plugin for Terraseam.
/// Owns the tile grid and rebuilds it on request.
pub struct TsTerrainPlugin;

impl Plugin for TsTerrainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TerrainGrid>()
            .init_resource::<TerrainSettings>()
            .init_resource::<NavMeshHook>()
            .add_event::<RegenerateTerrain>()
            .add_event::<TerrainGenerated>()
            .add_event::<TerrainGenerationFailed>()
            .configure_sets(Update, (TerrainSet::Generate, TerrainSet::NavMesh).chain())
            .add_systems(Update, (
                regenerate_terrain.in_set(TerrainSet::Generate),
                build_nav_mesh.in_set(TerrainSet::NavMesh),
            ));
    }
}

/// System that rebuilds the grid when a [`RegenerateTerrain`] arrives.
/// Several requests in one frame collapse into one rebuild.
pub fn regenerate_terrain(
    mut requests: EventReader<RegenerateTerrain>,
    settings: Res<TerrainSettings>,
    mut grid: ResMut<TerrainGrid>,
    mut generated: EventWriter<TerrainGenerated>,
    mut failed: EventWriter<TerrainGenerationFailed>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    let result = grid
        .set_config(settings.0.clone())
        .and_then(|()| grid.generate());

    match result {
        Ok(()) => {
            if let Some(bounds) = grid.world_bounds() {
                generated.send(TerrainGenerated {
                    tiles: grid.tiles().len(),
                    bounds,
                });
            }
        }
        Err(error) => {
            error!("Terrain generation failed: {}", error);
            failed.send(TerrainGenerationFailed { error });
        }
    }
}

/// System that hands finished terrain to the registered nav mesh builder.
pub fn build_nav_mesh(
    mut events: EventReader<TerrainGenerated>,
    grid: Res<TerrainGrid>,
    mut hook: ResMut<NavMeshHook>,
) {
    for event in events.read() {
        match hook.builder.as_mut() {
            Some(builder) => {
                builder.build_nav_mesh(&*grid);
                info!("Navigation mesh built over {} tiles", event.tiles);
            }
            None => debug!("No navigation mesh builder registered"),
        }
    }
}
