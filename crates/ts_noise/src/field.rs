use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_core::HeightSampler;

/// Permutation seed of the underlying Perlin lattice.
///
/// Held fixed: the world seed moves the sampling window instead.
const LATTICE_SEED: u32 = 0;

/// Octave settings for fractal Brownian motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParams {
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 1,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Deterministic coherent-noise height field over world coordinates.
///
/// The seed is folded into the sampled coordinates as
/// `(x + seed) * frequency`, so two fields with the same parameters agree
/// everywhere and neighbouring tiles sampling the same world position get
/// the same value.
///
/// Output of [`NoiseField::sample`] is in `[0, 1]`.
#[derive(Clone)]
pub struct NoiseField {
    noise: Perlin,
    seed: i32,
    frequency: f64,
    amplitude: f64,
    fractal: FractalParams,
}

impl NoiseField {
    pub fn new(seed: i32, frequency: f64, amplitude: f64) -> Self {
        Self {
            noise: Perlin::new(LATTICE_SEED),
            seed,
            frequency,
            amplitude,
            fractal: FractalParams::default(),
        }
    }

    /// Layer extra octaves on top of the base frequency.
    pub fn with_fractal(mut self, fractal: FractalParams) -> Self {
        self.fractal = FractalParams {
            octaves: fractal.octaves.max(1),
            ..fractal
        };
        self
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn fractal(&self) -> FractalParams {
        self.fractal
    }

    /// Normalized height in `[0, 1]` at absolute world coordinates.
    pub fn sample(&self, world_x: f64, world_z: f64) -> f64 {
        let offset = f64::from(self.seed);
        let x = (world_x + offset) * self.frequency;
        let z = (world_z + offset) * self.frequency;

        let raw = self.fbm(x, z);
        (raw * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Height in world units: `sample * amplitude`.
    pub fn height(&self, world_x: f64, world_z: f64) -> f64 {
        self.sample(world_x, world_z) * self.amplitude
    }

    /// Fractal Brownian motion, normalized to roughly [-1, 1].
    fn fbm(&self, x: f64, z: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..self.fractal.octaves {
            value += self.noise.get([x * frequency, z * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.fractal.persistence;
            frequency *= self.fractal.lacunarity;
        }

        if max_amplitude == 0.0 {
            return 0.0;
        }
        value / max_amplitude
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .field("frequency", &self.frequency)
            .field("amplitude", &self.amplitude)
            .field("fractal", &self.fractal)
            .finish_non_exhaustive()
    }
}

impl HeightSampler for NoiseField {
    fn sample(&self, x: f64, z: f64) -> f64 {
        NoiseField::sample(self, x, z)
    }

    fn name(&self) -> &'static str {
        "NoiseField"
    }
}
