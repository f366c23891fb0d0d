pub mod controller;
pub mod pid;

pub use controller::{Controller, OutputKind};
pub use pid::{IncrementPid, PidGains, PidLimits, PositionPid};
