use nalgebra::RealField;

// ---------------------------------------------------------------------------
// First-order Kalman filter (single scalar channel)
// ---------------------------------------------------------------------------

/// Recursive estimator for one noisy scalar signal.
///
/// The process model is a random walk: the prediction for the next tick is the
/// current estimate, and only the covariance grows by `Q`. Call [`update`] once
/// per sampling period with the new raw measurement.
///
/// `process_noise` and `measurement_noise` must both be positive. Neither is
/// checked here; feeding negative values gives a gain outside `[0, 1]`.
///
/// [`update`]: ScalarKalman::update
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarKalman<T: RealField + Copy> {
    process_noise: T,
    measurement_noise: T,
    estimate: T,
    error_covariance: T,
}

impl<T: RealField + Copy> ScalarKalman<T> {
    /// Create a filter seeded with `initial_value` and an error covariance of 1.
    ///
    /// A good seed is the mean of the first few raw samples.
    pub fn new(process_noise: T, measurement_noise: T, initial_value: T) -> Self {
        Self {
            process_noise,
            measurement_noise,
            estimate: initial_value,
            error_covariance: T::one(),
        }
    }

    /// Fold one measurement into the estimate and return the new estimate.
    pub fn update(&mut self, measurement: T) -> T {
        // Predict
        let predicted_estimate = self.estimate;
        let predicted_covariance = self.error_covariance + self.process_noise;

        // Correct
        let gain = predicted_covariance / (predicted_covariance + self.measurement_noise);
        self.estimate = predicted_estimate + gain * (measurement - predicted_estimate);
        self.error_covariance = (T::one() - gain) * predicted_covariance;

        self.estimate
    }

    /// Run [`update`](ScalarKalman::update) over a batch, returning every estimate.
    pub fn filter_all(&mut self, measurements: &[T]) -> Vec<T> {
        measurements.iter().map(|&m| self.update(m)).collect()
    }

    /// Gain the next `update` will apply.
    pub fn gain(&self) -> T {
        let predicted_covariance = self.error_covariance + self.process_noise;
        predicted_covariance / (predicted_covariance + self.measurement_noise)
    }

    /// Fixed point of the covariance recursion.
    ///
    /// Positive root of `P^2 + Q*P - Q*R = 0`, i.e. the `P` satisfying
    /// `P = (1 - K)(P + Q)` with `K = (P + Q) / (P + Q + R)`.
    pub fn steady_state_covariance(&self) -> T {
        let q = self.process_noise;
        let r = self.measurement_noise;
        let two: T = nalgebra::convert(2.0);
        let four: T = nalgebra::convert(4.0);
        (-q + (q * q + four * q * r).sqrt()) / two
    }

    /// Reseed the estimate and restore the initial covariance.
    pub fn reset(&mut self, initial_value: T) {
        self.estimate = initial_value;
        self.error_covariance = T::one();
    }

    pub fn estimate(&self) -> T {
        self.estimate
    }

    pub fn error_covariance(&self) -> T {
        self.error_covariance
    }

    pub fn process_noise(&self) -> T {
        self.process_noise
    }

    pub fn measurement_noise(&self) -> T {
        self.measurement_noise
    }
}
