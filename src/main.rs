use std::process::ExitCode;

use filter_control::config::{DemoConfig, PidConfig, PidMode, PlantConfig};
use filter_control::io::json::{FilterSummary, LoopSummary};
use filter_control::sim::{self, LoopConfig, LoopSample, REFERENCE_MEASUREMENTS, REFERENCE_TRUTH};

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("FILTER_CONTROL_LOG", "info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match DemoConfig::load(&path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => DemoConfig::default(),
    };
    if let Err(e) = config.validate() {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }

    println!();
    println!("====================================================================");
    println!("  SCALAR KALMAN FILTER  (true value {:.1})", REFERENCE_TRUTH);
    println!("====================================================================");
    println!(
        "  Q = {}   R = {}   x0 = {}",
        config.kalman.process_noise, config.kalman.measurement_noise, config.kalman.initial_value
    );
    println!();
    println!("  {:>4}  {:>10}  {:>10}  {:>8}  {:>6}", "tick", "raw", "filtered", "P", "K");
    println!("  {}", "─".repeat(46));

    let mut kf = config.kalman.build();
    let filter_trace = sim::run_filter(&mut kf, &REFERENCE_MEASUREMENTS);
    for s in &filter_trace {
        println!(
            "  {:>4}  {:>10.1}  {:>10.1}  {:>8.4}  {:>6.3}",
            s.tick + 1,
            s.measurement,
            s.estimate,
            s.covariance,
            s.gain
        );
    }
    if let Some(summary) = FilterSummary::from_samples(&filter_trace, REFERENCE_TRUTH) {
        println!();
        println!(
            "  Mean |error|: raw {:.3}  filtered {:.3}   steady-state P {:.4}",
            summary.raw_mean_abs_dev,
            summary.filtered_mean_abs_dev,
            kf.steady_state_covariance()
        );
    }

    // Position form uses the configured tuning; the increment form gets its
    // own stock tuning and a slower plant unless the config selected it.
    let (position_cfg, position_plant, increment_cfg, increment_plant) = match config.pid.mode {
        PidMode::Position => (
            config.pid.clone(),
            config.plant.clone(),
            PidConfig::increment(),
            PlantConfig { gain: 0.08 },
        ),
        PidMode::Increment => (
            PidConfig::default(),
            PlantConfig::default(),
            config.pid.clone(),
            config.plant.clone(),
        ),
    };
    let loop_config = LoopConfig::from(&config.control_loop);

    print_loop("POSITION-FORM PID", &position_cfg, &position_plant, &loop_config);
    print_loop("INCREMENT-FORM PID", &increment_cfg, &increment_plant, &loop_config);

    println!("====================================================================");
    println!();
    ExitCode::SUCCESS
}

fn print_loop(title: &str, pid: &PidConfig, plant_cfg: &PlantConfig, loop_config: &LoopConfig) {
    let mut controller = pid.build();
    let mut plant = plant_cfg.build();
    let trace: Vec<LoopSample> = sim::run_loop(controller.as_mut(), &mut plant, loop_config);

    println!();
    println!("====================================================================");
    println!("  {}  (target {:.0})", title, loop_config.setpoint);
    println!("====================================================================");
    println!(
        "  kp = {}  ki = {}  kd = {}  |I| <= {}  |u| <= {}  plant gain {}",
        pid.kp, pid.ki, pid.kd, pid.integral_limit, pid.output_limit, plant.gain
    );
    println!();
    println!("  {:>4}  {:>12}  {:>10}  {:>10}", "tick", "value", "output", "command");
    println!("  {}", "─".repeat(44));
    for s in &trace {
        println!(
            "  {:>4}  {:>12.1}  {:>10.1}  {:>10.1}",
            s.tick + 1,
            s.process_value,
            s.output,
            s.command
        );
    }

    if let Some(summary) = LoopSummary::from_samples(&trace) {
        println!();
        println!(
            "  Final {:.1}   error {:.1}   overshoot {:.1}%   settled at {}",
            summary.final_value,
            summary.steady_state_error,
            summary.overshoot_pct,
            summary
                .settling_tick
                .map_or_else(|| "n/a".to_string(), |t| format!("tick {}", t + 1)),
        );
    }
    println!();
}
