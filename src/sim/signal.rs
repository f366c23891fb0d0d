use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Twelve raw samples of a sensor whose true value is 50.0, with roughly
/// +/-2 of noise. Handy as a fixed fixture for filter demos and tests.
pub const REFERENCE_MEASUREMENTS: [f64; 12] = [
    51.2, 48.8, 50.9, 49.1, 51.5, 48.5, 52.0, 47.8, 50.3, 49.7, 51.1, 48.9,
];

/// True value behind [`REFERENCE_MEASUREMENTS`].
pub const REFERENCE_TRUTH: f64 = 50.0;

/// Deterministic noisy sensor: a constant true value plus uniform noise.
pub struct NoisySignal {
    rng: StdRng,
    pub truth: f64,
    pub amplitude: f64,
}

impl NoisySignal {
    pub fn new(seed: u64, truth: f64, amplitude: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            truth,
            amplitude,
        }
    }

    /// Draw one sample in `[truth - amplitude, truth + amplitude)`.
    ///
    /// An amplitude that is not a positive finite number gives `truth` exactly.
    pub fn sample(&mut self) -> f64 {
        if !(self.amplitude > 0.0 && self.amplitude.is_finite()) {
            return self.truth;
        }
        self.truth + self.rng.gen_range(-self.amplitude..self.amplitude)
    }

    pub fn take(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.sample()).collect()
    }

    /// Shift the true value, e.g. to simulate a step disturbance.
    pub fn step(&mut self, delta: f64) {
        self.truth += delta;
    }
}
