use crate::control::{Controller, OutputKind};
use crate::filter::ScalarKalman;
use super::plant::FirstOrderPlant;

// ---------------------------------------------------------------------------
// Trace records
// ---------------------------------------------------------------------------

/// One tick of a filter run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSample {
    pub tick: usize,
    pub measurement: f64,
    pub estimate: f64,
    pub covariance: f64,
    /// Gain applied on this tick.
    pub gain: f64,
}

/// One tick of a closed-loop run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSample {
    pub tick: usize,
    pub setpoint: f64,
    /// Raw controller output (a delta for increment-form controllers).
    pub output: f64,
    /// Absolute command applied to the plant.
    pub command: f64,
    /// Plant value after responding to `command`.
    pub process_value: f64,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub setpoint: f64,
    pub ticks: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            setpoint: 1000.0,
            ticks: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

/// Feed every measurement through `filter`, recording the state after each tick.
pub fn run_filter(filter: &mut ScalarKalman<f64>, measurements: &[f64]) -> Vec<FilterSample> {
    run_filter_from(filter, measurements, 0)
}

/// [`run_filter`] with ticks numbered from `first_tick`, for continuing a
/// trace as more measurements arrive.
pub fn run_filter_from(
    filter: &mut ScalarKalman<f64>,
    measurements: &[f64],
    first_tick: usize,
) -> Vec<FilterSample> {
    measurements
        .iter()
        .enumerate()
        .map(|(i, &measurement)| {
            let tick = first_tick + i;
            let gain = filter.gain();
            let estimate = filter.update(measurement);
            FilterSample {
                tick,
                measurement,
                estimate,
                covariance: filter.error_covariance(),
                gain,
            }
        })
        .collect()
}

/// Close a loop around `plant` for `config.ticks` ticks.
///
/// Increment-form controllers have their outputs summed into the absolute
/// command; absolute controllers drive the plant directly.
pub fn run_loop(
    controller: &mut dyn Controller<f64>,
    plant: &mut FirstOrderPlant,
    config: &LoopConfig,
) -> Vec<LoopSample> {
    let accumulate = controller.output_kind() == OutputKind::Increment;
    let mut command = 0.0;
    let mut trace = Vec::with_capacity(config.ticks);

    log::debug!(
        "running {} for {} ticks toward {}",
        controller.name(),
        config.ticks,
        config.setpoint
    );

    for tick in 0..config.ticks {
        let output = controller.update(config.setpoint, plant.value());
        command = if accumulate { command + output } else { output };
        let process_value = plant.respond(command);

        trace.push(LoopSample {
            tick,
            setpoint: config.setpoint,
            output,
            command,
            process_value,
        });
    }

    trace
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
