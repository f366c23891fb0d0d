use nalgebra::RealField;

/// What a controller's output means to the loop driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// The output is the actuator command itself.
    Absolute,
    /// The output is a change to be added onto the previous command.
    Increment,
}

/// Trait for single-channel feedback controllers.
///
/// Implement this to plug a custom controller into
/// [`run_loop`](crate::sim::run_loop). The loop calls [`update`] once per tick
/// and uses [`output_kind`] to decide whether to accumulate the result.
///
/// [`update`]: Controller::update
/// [`output_kind`]: Controller::output_kind
pub trait Controller<T: RealField + Copy> {
    /// Compute the controller output for one tick.
    fn update(&mut self, setpoint: T, current_value: T) -> T;

    /// Reset controller internal state (error history, integrator).
    fn reset(&mut self) {}

    fn output_kind(&self) -> OutputKind {
        OutputKind::Absolute
    }

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
