use bevy::prelude::*;
use ts_terrain::{TerrainGenerated, TerrainGrid, TerrainSet};

pub mod config_io;
pub mod plan;

pub use config_io::{
    load_spawn_config, save_spawn_config, SpawnConfigIoError, DEFAULT_SPAWN_CONFIG_PATH,
};
pub use plan::{
    plan_spawns, DecorationConfig, SpawnConfig, SpawnError, SpawnKind, SpawnPlan, SpawnPoint,
};

/// Placement parameters used after each terrain generation.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpawnSettings(pub SpawnConfig);

/// Placements planned for the current terrain.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlannedSpawns(pub SpawnPlan);

/// Fired after [`PlannedSpawns`] has been refreshed.
#[derive(Event, Clone, Debug)]
pub struct SpawnPlanned {
    pub points: usize,
}

/// Spawn planning plugin for Terraseam.
/// Places the player, decorations and enemies on the ground once terrain
/// and the navigation mesh are ready.
pub struct TsSpawnPlugin;

impl Plugin for TsSpawnPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnSettings>()
            .init_resource::<PlannedSpawns>()
            .add_event::<SpawnPlanned>()
            .add_systems(Update, plan_spawns_on_generation.after(TerrainSet::NavMesh));
    }
}

/// System that replans placements whenever new terrain is generated.
pub fn plan_spawns_on_generation(
    mut events: EventReader<TerrainGenerated>,
    grid: Res<TerrainGrid>,
    settings: Res<SpawnSettings>,
    mut planned: ResMut<PlannedSpawns>,
    mut notify: EventWriter<SpawnPlanned>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    match plan_spawns(&*grid, &settings.0) {
        Ok(plan) => {
            let summary: Vec<String> = SpawnKind::all()
                .iter()
                .map(|kind| format!("{} {}", plan.count(*kind), kind.name()))
                .collect();
            info!("Planned spawns: {}", summary.join(", "));

            notify.send(SpawnPlanned { points: plan.len() });
            planned.0 = plan;
        }
        Err(err) => warn!("Skipping spawn planning: {}", err),
    }
}
