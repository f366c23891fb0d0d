//! Discrete PID controllers, one update per fixed sampling tick.
//!
//! Two forms are provided as separate types so their error histories can never
//! be mixed on one instance:
//!
//! - [`PositionPid`] returns the absolute command each tick.
//! - [`IncrementPid`] returns the change in command; the caller accumulates it.
//!
//! Neither form scales by a sample period. Gains are per-tick, and the caller is
//! expected to invoke `update` at a constant rate.

use nalgebra::RealField;

use super::controller::{Controller, OutputKind};

// ---------------------------------------------------------------------------
// Tuning records
// ---------------------------------------------------------------------------

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains<T> {
    pub kp: T,
    pub ki: T,
    pub kd: T,
}

impl<T> PidGains<T> {
    pub fn new(kp: T, ki: T, kd: T) -> Self {
        Self { kp, ki, kd }
    }
}

/// Symmetric saturation bounds.
///
/// Both limits must be non-negative. A negative limit is not rejected; it makes
/// the clamp window empty and the result meaningless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidLimits<T> {
    /// Anti-windup bound on the accumulated error (position form only).
    pub integral_limit: T,
    /// Bound on the returned output or increment.
    pub output_limit: T,
}

impl<T> PidLimits<T> {
    pub fn new(integral_limit: T, output_limit: T) -> Self {
        Self { integral_limit, output_limit }
    }
}

/// Clamp `value` into `[-limit, +limit]`.
fn saturate<T: RealField + Copy>(value: T, limit: T) -> T {
    if value > limit {
        limit
    } else if value < -limit {
        -limit
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Position form
// ---------------------------------------------------------------------------

/// Position-form PID: `u(k) = Kp*e(k) + Ki*sum(e) + Kd*(e(k) - e(k-1))`.
#[derive(Debug, Clone)]
pub struct PositionPid<T: RealField + Copy> {
    gains: PidGains<T>,
    limits: PidLimits<T>,
    setpoint: T,
    current_value: T,
    error: T,
    previous_error: T,
    integral: T,
    output: T,
}

impl<T: RealField + Copy> PositionPid<T> {
    pub fn new(gains: PidGains<T>, limits: PidLimits<T>) -> Self {
        Self {
            gains,
            limits,
            setpoint: T::zero(),
            current_value: T::zero(),
            error: T::zero(),
            previous_error: T::zero(),
            integral: T::zero(),
            output: T::zero(),
        }
    }

    /// Advance one tick and return the clamped absolute command.
    pub fn update(&mut self, setpoint: T, current_value: T) -> T {
        self.setpoint = setpoint;
        self.current_value = current_value;
        self.error = setpoint - current_value;

        // Anti-windup: the accumulator itself is clamped, not just its contribution
        self.integral = saturate(self.integral + self.error, self.limits.integral_limit);

        let PidGains { kp, ki, kd } = self.gains;
        let raw = kp * self.error + ki * self.integral + kd * (self.error - self.previous_error);
        self.output = saturate(raw, self.limits.output_limit);

        self.previous_error = self.error;
        self.output
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.gains, self.limits);
    }

    /// Retune without touching the running state.
    pub fn set_gains(&mut self, gains: PidGains<T>) {
        self.gains = gains;
    }

    /// Takes effect from the next update; the stored integral is not re-clamped.
    pub fn set_limits(&mut self, limits: PidLimits<T>) {
        self.limits = limits;
    }

    pub fn gains(&self) -> PidGains<T> {
        self.gains
    }

    pub fn limits(&self) -> PidLimits<T> {
        self.limits
    }

    pub fn setpoint(&self) -> T {
        self.setpoint
    }

    pub fn current_value(&self) -> T {
        self.current_value
    }

    pub fn error(&self) -> T {
        self.error
    }

    pub fn previous_error(&self) -> T {
        self.previous_error
    }

    pub fn integral(&self) -> T {
        self.integral
    }

    /// Output of the most recent update.
    pub fn output(&self) -> T {
        self.output
    }
}

impl<T: RealField + Copy> Controller<T> for PositionPid<T> {
    fn update(&mut self, setpoint: T, current_value: T) -> T {
        PositionPid::update(self, setpoint, current_value)
    }

    fn reset(&mut self) {
        PositionPid::reset(self);
    }

    fn name(&self) -> &str {
        "PositionPid"
    }
}

// ---------------------------------------------------------------------------
// Increment form
// ---------------------------------------------------------------------------

/// Increment-form PID:
/// `du(k) = Kp*(e(k) - e(k-1)) + Ki*e(k) + Kd*(e(k) - 2e(k-1) + e(k-2))`.
///
/// There is no accumulator, so `integral_limit` is unused here and
/// `output_limit` bounds the size of a single step.
#[derive(Debug, Clone)]
pub struct IncrementPid<T: RealField + Copy> {
    gains: PidGains<T>,
    limits: PidLimits<T>,
    setpoint: T,
    current_value: T,
    error: T,
    previous_error: T,
    error_before_previous: T,
    delta: T,
}

impl<T: RealField + Copy> IncrementPid<T> {
    pub fn new(gains: PidGains<T>, limits: PidLimits<T>) -> Self {
        Self {
            gains,
            limits,
            setpoint: T::zero(),
            current_value: T::zero(),
            error: T::zero(),
            previous_error: T::zero(),
            error_before_previous: T::zero(),
            delta: T::zero(),
        }
    }

    /// Advance one tick and return the clamped change in command.
    pub fn update(&mut self, setpoint: T, current_value: T) -> T {
        self.setpoint = setpoint;
        self.current_value = current_value;
        self.error = setpoint - current_value;

        let PidGains { kp, ki, kd } = self.gains;
        let e = self.error;
        let e1 = self.previous_error;
        let e2 = self.error_before_previous;
        let two = T::one() + T::one();
        let raw = kp * (e - e1) + ki * e + kd * (e - two * e1 + e2);
        self.delta = saturate(raw, self.limits.output_limit);

        self.error_before_previous = e1;
        self.previous_error = e;
        self.delta
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.gains, self.limits);
    }

    pub fn set_gains(&mut self, gains: PidGains<T>) {
        self.gains = gains;
    }

    pub fn set_limits(&mut self, limits: PidLimits<T>) {
        self.limits = limits;
    }

    pub fn gains(&self) -> PidGains<T> {
        self.gains
    }

    pub fn limits(&self) -> PidLimits<T> {
        self.limits
    }

    pub fn setpoint(&self) -> T {
        self.setpoint
    }

    pub fn current_value(&self) -> T {
        self.current_value
    }

    pub fn error(&self) -> T {
        self.error
    }

    pub fn previous_error(&self) -> T {
        self.previous_error
    }

    pub fn error_before_previous(&self) -> T {
        self.error_before_previous
    }

    /// Increment returned by the most recent update.
    pub fn delta(&self) -> T {
        self.delta
    }
}

impl<T: RealField + Copy> Controller<T> for IncrementPid<T> {
    fn update(&mut self, setpoint: T, current_value: T) -> T {
        IncrementPid::update(self, setpoint, current_value)
    }

    fn reset(&mut self) {
        IncrementPid::reset(self);
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Increment
    }

    fn name(&self) -> &str {
        "IncrementPid"
    }
}
