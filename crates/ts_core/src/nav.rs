use crate::query::HeightQuery;

/// Hook for the navigation mesh build step.
///
/// Called once per successful generation, after all tiles are final.
pub trait NavMeshBuilder: Send + Sync {
    fn build_nav_mesh(&mut self, terrain: &dyn HeightQuery);
}
