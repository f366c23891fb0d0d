use std::io::{self, Write};

use crate::sim::{FilterSample, LoopSample};

/// Fraction of the setpoint used as the settling band.
pub const SETTLING_BAND: f64 = 0.02;

/// Step-response figures computed from a closed-loop trace.
#[derive(Debug, Clone)]
pub struct LoopSummary {
    pub setpoint: f64,
    pub final_value: f64,
    pub steady_state_error: f64,
    /// Peak excursion past the setpoint, percent of the setpoint magnitude.
    pub overshoot_pct: f64,
    /// First tick from which the process value stays inside the settling band.
    pub settling_tick: Option<usize>,
    pub ticks: usize,
}

impl LoopSummary {
    /// Returns `None` for an empty trace.
    pub fn from_samples(trace: &[LoopSample]) -> Option<Self> {
        let last = trace.last()?;
        let setpoint = last.setpoint;
        let scale = if setpoint != 0.0 { setpoint.abs() } else { 1.0 };

        // Overshoot is measured in the direction of the initial error
        let direction = if setpoint >= trace[0].process_value { 1.0 } else { -1.0 };
        let peak = trace
            .iter()
            .map(|s| (s.process_value - setpoint) * direction)
            .fold(0.0_f64, f64::max);

        let band = SETTLING_BAND * scale;
        let settling_tick = match trace.iter().rposition(|s| (s.process_value - setpoint).abs() > band) {
            None => Some(0),
            Some(i) if i + 1 < trace.len() => Some(trace[i + 1].tick),
            Some(_) => None,
        };

        Some(LoopSummary {
            setpoint,
            final_value: last.process_value,
            steady_state_error: setpoint - last.process_value,
            overshoot_pct: peak / scale * 100.0,
            settling_tick,
            ticks: trace.len(),
        })
    }
}

/// Noise-reduction figures computed from a filter trace.
#[derive(Debug, Clone)]
pub struct FilterSummary {
    pub samples: usize,
    pub reference: f64,
    pub raw_mean_abs_dev: f64,
    pub filtered_mean_abs_dev: f64,
    pub final_estimate: f64,
    pub final_covariance: f64,
}

impl FilterSummary {
    /// `reference` is the known true value the sensor was sampling.
    pub fn from_samples(trace: &[FilterSample], reference: f64) -> Option<Self> {
        let last = trace.last()?;
        let n = trace.len() as f64;
        let raw = trace.iter().map(|s| (s.measurement - reference).abs()).sum::<f64>() / n;
        let filtered = trace.iter().map(|s| (s.estimate - reference).abs()).sum::<f64>() / n;

        Some(FilterSummary {
            samples: trace.len(),
            reference,
            raw_mean_abs_dev: raw,
            filtered_mean_abs_dev: filtered,
            final_estimate: last.estimate,
            final_covariance: last.covariance,
        })
    }
}

/// Write a loop summary as JSON.
pub fn write_loop_summary<W: Write>(
    writer: &mut W,
    controller: &str,
    summary: &LoopSummary,
) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"controller\": \"{}\",", controller)?;
    writeln!(writer, "  \"response\": {{")?;
    writeln!(writer, "    \"setpoint\": {:.4},", summary.setpoint)?;
    writeln!(writer, "    \"final_value\": {:.4},", summary.final_value)?;
    writeln!(writer, "    \"steady_state_error\": {:.4},", summary.steady_state_error)?;
    writeln!(writer, "    \"overshoot_pct\": {:.2},", summary.overshoot_pct)?;
    match summary.settling_tick {
        Some(t) => writeln!(writer, "    \"settling_tick\": {},", t)?,
        None => writeln!(writer, "    \"settling_tick\": null,")?,
    }
    writeln!(writer, "    \"ticks\": {}", summary.ticks)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write a filter summary as JSON.
pub fn write_filter_summary<W: Write>(writer: &mut W, summary: &FilterSummary) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"samples\": {},", summary.samples)?;
    writeln!(writer, "  \"reference\": {:.4},", summary.reference)?;
    writeln!(writer, "  \"raw_mean_abs_dev\": {:.4},", summary.raw_mean_abs_dev)?;
    writeln!(writer, "  \"filtered_mean_abs_dev\": {:.4},", summary.filtered_mean_abs_dev)?;
    writeln!(writer, "  \"final_estimate\": {:.4},", summary.final_estimate)?;
    writeln!(writer, "  \"final_covariance\": {:.6}", summary.final_covariance)?;
    writeln!(writer, "}}")?;
    Ok(())
}

pub fn write_loop_summary_file(path: &str, controller: &str, summary: &LoopSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_loop_summary(&mut file, controller, summary)
}

pub fn write_filter_summary_file(path: &str, summary: &FilterSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_filter_summary(&mut file, summary)
}
