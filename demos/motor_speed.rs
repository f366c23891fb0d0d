use filter_control::control::{IncrementPid, PidGains, PidLimits, PositionPid};
use filter_control::io::csv;
use filter_control::io::json::{self, LoopSummary};
use filter_control::sim::{self, FirstOrderPlant, LoopConfig};

fn main() {
    let gains = PidGains::new(2.0_f64, 0.5, 0.1);
    let config = LoopConfig { setpoint: 1000.0, ticks: 50 };

    // Absolute command, e.g. a PWM duty in [-200, 200]
    let mut position = PositionPid::new(gains, PidLimits::new(50.0, 200.0));
    let position_trace = sim::run_loop(&mut position, &mut FirstOrderPlant::new(0.8), &config);

    // Per-tick change capped at 50; the runner sums the increments
    let mut increment = IncrementPid::new(gains, PidLimits::new(50.0, 50.0));
    let increment_trace = sim::run_loop(&mut increment, &mut FirstOrderPlant::new(0.08), &config);

    for (name, trace) in [("position", &position_trace), ("increment", &increment_trace)] {
        let Some(summary) = LoopSummary::from_samples(trace) else { continue };
        println!(
            "{:<10} final {:>7.1} rpm  overshoot {:>5.1}%  settled {:?}",
            name, summary.final_value, summary.overshoot_pct, summary.settling_tick
        );
        csv::write_loop_trace_file(&format!("{}_trace.csv", name), trace)
            .expect("Failed to write CSV");
        json::write_loop_summary_file(&format!("{}_summary.json", name), name, &summary)
            .expect("Failed to write JSON");
    }

    println!("Exported: position_trace.csv, increment_trace.csv and summaries");
}
