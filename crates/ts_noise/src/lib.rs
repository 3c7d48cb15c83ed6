pub mod field;

pub use field::{FractalParams, NoiseField};
