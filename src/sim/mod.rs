pub mod plant;
pub mod runner;
pub mod signal;

pub use plant::FirstOrderPlant;
pub use runner::{run_filter, run_filter_from, run_loop, FilterSample, LoopConfig, LoopSample};
pub use signal::{NoisySignal, REFERENCE_MEASUREMENTS, REFERENCE_TRUTH};
