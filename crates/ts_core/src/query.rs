use crate::coords::WorldBounds;

/// Height returned for positions outside the generated world.
pub const OUT_OF_BOUNDS_HEIGHT: f64 = 0.0;

/// A deterministic height function over continuous world coordinates.
///
/// Implementations must be pure: the same `(x, z)` always yields the same
/// value, and the value varies continuously with the coordinates.
pub trait HeightSampler: Send + Sync {
    /// Normalized height in `[0, 1]` at absolute world coordinates.
    fn sample(&self, x: f64, z: f64) -> f64;

    /// Returns the name of this sampler for debugging.
    fn name(&self) -> &'static str {
        "HeightSampler"
    }
}

/// Read-only ground height lookup over finished terrain.
///
/// Used by placement and navigation collaborators once generation is done.
pub trait HeightQuery: Send + Sync {
    /// Surface height in world units at `(x, z)`.
    ///
    /// Positions outside [`HeightQuery::world_bounds`] return
    /// [`OUT_OF_BOUNDS_HEIGHT`] instead of failing.
    fn height_at(&self, x: f64, z: f64) -> f64;

    /// World extent covered by terrain, or `None` if nothing is generated.
    fn world_bounds(&self) -> Option<WorldBounds>;
}
