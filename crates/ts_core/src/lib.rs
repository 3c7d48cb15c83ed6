pub mod coords;
pub mod error;
pub mod nav;
pub mod query;

pub use coords::{TileCoord, WorldBounds, WorldPos};
pub use error::ConfigurationError;
pub use nav::NavMeshBuilder;
pub use query::{HeightQuery, HeightSampler, OUT_OF_BOUNDS_HEIGHT};
