//! Scalar Kalman filter and PID controllers for fixed-rate loops.
//!
//! The core is [`filter::ScalarKalman`], [`control::PositionPid`] and
//! [`control::IncrementPid`]. Each is a plain value: construct it, call
//! `update` once per sampling tick, read the result. They are generic over
//! `f32`/`f64` through [`nalgebra::RealField`].
//!
//! [`sim`], [`io`] and [`config`] wrap the core with a loop harness, trace
//! export and TOML tuning for demos and offline tuning.

pub mod config;
pub mod control;
pub mod filter;
pub mod io;
pub mod sim;

pub use control::{Controller, IncrementPid, OutputKind, PidGains, PidLimits, PositionPid};
pub use filter::ScalarKalman;
