//! Tuning loaded from TOML.
//!
//! Every field has a default, so an empty file (or a missing section) yields the
//! stock demo tuning. Loading does not validate; call [`DemoConfig::validate`]
//! before building filters or controllers from untrusted input.
//!
//! ```toml
//! [kalman]
//! process_noise = 0.05
//! measurement_noise = 0.5
//! initial_value = 50.0
//!
//! [pid]
//! mode = "increment"
//! output_limit = 50.0
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::control::{Controller, IncrementPid, PidGains, PidLimits, PositionPid};
use crate::filter::ScalarKalman;
use crate::sim::{FirstOrderPlant, LoopConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("`{name}` must be {requirement}, got {value}")]
    InvalidParameter {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

fn require(name: &'static str, value: f64, ok: bool, requirement: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, requirement, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    require(name, value, value.is_finite() && value > 0.0, "finite and > 0")
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    require(name, value, value.is_finite() && value >= 0.0, "finite and >= 0")
}

// ---------------------------------------------------------------------------
// Kalman
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KalmanConfig {
    pub process_noise: f64,
    pub measurement_noise: f64,
    pub initial_value: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: 0.05,
            measurement_noise: 0.5,
            initial_value: 50.0,
        }
    }
}

impl KalmanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("kalman.process_noise", self.process_noise)?;
        positive("kalman.measurement_noise", self.measurement_noise)?;
        require("kalman.initial_value", self.initial_value, self.initial_value.is_finite(), "finite")
    }

    pub fn build(&self) -> ScalarKalman<f64> {
        ScalarKalman::new(self.process_noise, self.measurement_noise, self.initial_value)
    }
}

// ---------------------------------------------------------------------------
// PID
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PidMode {
    Position,
    Increment,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PidConfig {
    pub mode: PidMode,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_limit: f64,
    pub output_limit: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            mode: PidMode::Position,
            kp: 2.0,
            ki: 0.5,
            kd: 0.1,
            integral_limit: 50.0,
            output_limit: 200.0,
        }
    }
}

impl PidConfig {
    /// Stock increment-form tuning: same gains, a 50-unit step limit.
    pub fn increment() -> Self {
        Self {
            mode: PidMode::Increment,
            output_limit: 50.0,
            ..Self::default()
        }
    }

    pub fn gains(&self) -> PidGains<f64> {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    pub fn limits(&self) -> PidLimits<f64> {
        PidLimits::new(self.integral_limit, self.output_limit)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [("pid.kp", self.kp), ("pid.ki", self.ki), ("pid.kd", self.kd)] {
            require(name, v, v.is_finite(), "finite")?;
        }
        non_negative("pid.integral_limit", self.integral_limit)?;
        non_negative("pid.output_limit", self.output_limit)
    }

    /// Build the controller selected by `mode`.
    pub fn build(&self) -> Box<dyn Controller<f64>> {
        match self.mode {
            PidMode::Position => Box::new(PositionPid::new(self.gains(), self.limits())),
            PidMode::Increment => Box::new(IncrementPid::new(self.gains(), self.limits())),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    pub gain: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self { gain: 0.8 }
    }
}

impl PlantConfig {
    pub fn build(&self) -> FirstOrderPlant {
        FirstOrderPlant::new(self.gain)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopSettings {
    pub setpoint: f64,
    pub ticks: usize,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self { setpoint: 1000.0, ticks: 50 }
    }
}

impl From<&LoopSettings> for LoopConfig {
    fn from(s: &LoopSettings) -> Self {
        LoopConfig { setpoint: s.setpoint, ticks: s.ticks }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    pub kalman: KalmanConfig,
    pub pid: PidConfig,
    pub plant: PlantConfig,
    #[serde(rename = "loop")]
    pub control_loop: LoopSettings,
}

impl DemoConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}: {:?}", path, config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kalman.validate()?;
        self.pid.validate()?;
        require("plant.gain", self.plant.gain, self.plant.gain.is_finite(), "finite")?;
        require(
            "loop.setpoint",
            self.control_loop.setpoint,
            self.control_loop.setpoint.is_finite(),
            "finite",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::OutputKind;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = DemoConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, DemoConfig::default());
        assert_eq!(cfg.kalman.process_noise, 0.05);
        assert_eq!(cfg.pid.output_limit, 200.0);
        assert_eq!(cfg.control_loop.ticks, 50);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_sections_override() {
        let cfg = DemoConfig::from_toml_str(
            r#"
            [pid]
            mode = "increment"
            output_limit = 50.0

            [plant]
            gain = 0.08

            [loop]
            ticks = 80
            "#,
        )
        .unwrap();
        assert_eq!(cfg.pid.mode, PidMode::Increment);
        assert_eq!(cfg.pid.kp, 2.0);
        assert_eq!(cfg.pid.output_limit, 50.0);
        assert_eq!(cfg.plant.gain, 0.08);
        assert_eq!(cfg.control_loop.ticks, 80);
        assert_eq!(cfg.control_loop.setpoint, 1000.0);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = DemoConfig::from_toml_str("[kalman]\nq = 0.1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_noise_fails_validation() {
        let cfg = DemoConfig::from_toml_str("[kalman]\nmeasurement_noise = -0.5\n").unwrap();
        match cfg.validate() {
            Err(ConfigError::InvalidParameter { name, value, .. }) => {
                assert_eq!(name, "kalman.measurement_noise");
                assert_eq!(value, -0.5);
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn negative_limit_fails_validation() {
        let cfg = PidConfig { integral_limit: -1.0, ..PidConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn build_selects_form() {
        assert_eq!(PidConfig::default().build().output_kind(), OutputKind::Absolute);
        assert_eq!(PidConfig::increment().build().output_kind(), OutputKind::Increment);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DemoConfig::load("/nonexistent/filter-control.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/filter-control.toml"));
    }
}
