//! Ground-level placement planning over finished terrain.
//!
//! Produces positions only; turning them into entities is up to the caller.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_core::{HeightQuery, WorldBounds, WorldPos};

/// Fraction of the world edge where the enemy band starts.
const ENEMY_BAND_MIN: f64 = 0.25;
/// Fraction of the world edge where the enemy band ends.
const ENEMY_BAND_MAX: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("terrain has not been generated")]
    TerrainNotGenerated,
    #[error("spawn margin must be finite and non-negative, got {0}")]
    InvalidMargin(f64),
    #[error("terrain extent {width}x{depth} has no area to place on")]
    DegenerateBounds { width: f64, depth: f64 },
    #[error("spawn margin {margin} leaves no room in a {width}x{depth} world")]
    MarginTooLarge { margin: f64, width: f64, depth: f64 },
}

/// What a spawn point is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    Player,
    Tree,
    Rock,
    Bush,
    Enemy,
}

impl SpawnKind {
    pub fn all() -> &'static [SpawnKind] {
        &[
            Self::Player,
            Self::Tree,
            Self::Rock,
            Self::Bush,
            Self::Enemy,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Tree => "Tree",
            Self::Rock => "Rock",
            Self::Bush => "Bush",
            Self::Enemy => "Enemy",
        }
    }
}

/// How many of one decoration to scatter, and how many variants to pick from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorationConfig {
    pub count: usize,
    pub variants: u32,
}

impl DecorationConfig {
    pub const fn new(count: usize, variants: u32) -> Self {
        Self { count, variants }
    }

    fn is_active(&self) -> bool {
        self.count > 0 && self.variants > 0
    }
}

/// Placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Placement seed. `None` lets the caller pick one, usually the terrain seed.
    pub seed: Option<u64>,
    /// Height added above ground for the player.
    pub player_lift: f64,
    pub trees: DecorationConfig,
    pub rocks: DecorationConfig,
    pub bushes: DecorationConfig,
    pub enemy_count: usize,
    /// Distance from world edges kept clear of decorations.
    pub spawn_margin: f64,
    /// Uniform decoration scale range, `[min, max)`.
    pub scale_range: (f64, f64),
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            seed: None,
            player_lift: 1.0,
            trees: DecorationConfig::new(40, 1),
            rocks: DecorationConfig::new(25, 1),
            bushes: DecorationConfig::new(30, 1),
            enemy_count: 10,
            spawn_margin: 20.0,
            scale_range: (0.8, 1.3),
        }
    }
}

impl SpawnConfig {
    /// Check the parameters that do not depend on the terrain.
    pub fn validate(&self) -> Result<(), SpawnError> {
        let margin = self.spawn_margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(SpawnError::InvalidMargin(margin));
        }
        Ok(())
    }

    fn decorations(&self) -> [(SpawnKind, DecorationConfig); 3] {
        [
            (SpawnKind::Tree, self.trees),
            (SpawnKind::Rock, self.rocks),
            (SpawnKind::Bush, self.bushes),
        ]
    }
}

/// A single planned placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub kind: SpawnKind,
    /// Index into the caller's variant list. Always 0 for player and enemies.
    pub variant: u32,
    pub position: WorldPos,
    /// Vertical placement in world units.
    pub height: f64,
    pub yaw_degrees: f64,
    pub scale: f64,
}

/// Every placement from one planning pass, in spawn order.
#[derive(Debug, Clone, Default)]
pub struct SpawnPlan {
    pub points: Vec<SpawnPoint>,
}

impl SpawnPlan {
    pub fn player(&self) -> Option<&SpawnPoint> {
        self.points.iter().find(|p| p.kind == SpawnKind::Player)
    }

    pub fn of_kind(&self, kind: SpawnKind) -> impl Iterator<Item = &SpawnPoint> + '_ {
        self.points.iter().filter(move |p| p.kind == kind)
    }

    pub fn count(&self, kind: SpawnKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Plan player, decoration and enemy positions on `terrain`.
///
/// Order is player, trees, rocks, bushes, enemies. The same terrain and
/// config always produce the same plan.
pub fn plan_spawns(terrain: &dyn HeightQuery, config: &SpawnConfig) -> Result<SpawnPlan, SpawnError> {
    let bounds = terrain.world_bounds().ok_or(SpawnError::TerrainNotGenerated)?;
    config.validate()?;
    let (width, depth) = (bounds.width(), bounds.depth());
    if !(width > 0.0 && depth > 0.0) || !width.is_finite() || !depth.is_finite() {
        return Err(SpawnError::DegenerateBounds { width, depth });
    }

    let margin = config.spawn_margin;

    let wants_decorations = config.decorations().iter().any(|(_, d)| d.is_active());
    if wants_decorations && (2.0 * margin >= width || 2.0 * margin >= depth) {
        return Err(SpawnError::MarginTooLarge { margin, width, depth });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or_default());
    let mut points = Vec::new();

    let center = bounds.center();
    points.push(SpawnPoint {
        kind: SpawnKind::Player,
        variant: 0,
        position: center,
        height: terrain.height_at(center.x, center.z) + config.player_lift,
        yaw_degrees: 0.0,
        scale: 1.0,
    });

    for (kind, decoration) in config.decorations() {
        if !decoration.is_active() {
            continue;
        }
        for _ in 0..decoration.count {
            let variant = rng.gen_range(0..decoration.variants);
            let position = WorldPos::new(
                rng.gen_range(bounds.min.x + margin..bounds.max.x - margin),
                rng.gen_range(bounds.min.z + margin..bounds.max.z - margin),
            );
            let yaw_degrees = rng.gen_range(0.0..360.0);
            let scale = sample_scale(&mut rng, config.scale_range);

            points.push(SpawnPoint {
                kind,
                variant,
                position,
                height: terrain.height_at(position.x, position.z),
                yaw_degrees,
                scale,
            });
        }
    }

    for _ in 0..config.enemy_count {
        let position = enemy_position(&mut rng, &bounds);
        points.push(SpawnPoint {
            kind: SpawnKind::Enemy,
            variant: 0,
            position,
            height: terrain.height_at(position.x, position.z),
            yaw_degrees: 0.0,
            scale: 1.0,
        });
    }

    Ok(SpawnPlan { points })
}

fn enemy_position(rng: &mut ChaCha8Rng, bounds: &WorldBounds) -> WorldPos {
    let x_min = bounds.min.x + bounds.width() * ENEMY_BAND_MIN;
    let x_max = bounds.min.x + bounds.width() * ENEMY_BAND_MAX;
    let z_min = bounds.min.z + bounds.depth() * ENEMY_BAND_MIN;
    let z_max = bounds.min.z + bounds.depth() * ENEMY_BAND_MAX;
    WorldPos::new(rng.gen_range(x_min..x_max), rng.gen_range(z_min..z_max))
}

fn sample_scale(rng: &mut ChaCha8Rng, (min, max): (f64, f64)) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
