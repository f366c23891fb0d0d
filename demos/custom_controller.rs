use filter_control::control::Controller;
use filter_control::io::json::LoopSummary;
use filter_control::sim::{self, FirstOrderPlant, LoopConfig};

/// On/off controller with a hysteresis band: full drive below the band,
/// full reverse above it, nothing inside.
struct BangBangController {
    drive: f64,
    band: f64,
}

impl Controller<f64> for BangBangController {
    fn update(&mut self, setpoint: f64, current_value: f64) -> f64 {
        let error = setpoint - current_value;
        if error > self.band {
            self.drive
        } else if error < -self.band {
            -self.drive
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "BangBang"
    }
}

fn main() {
    let mut controller = BangBangController { drive: 200.0, band: 25.0 };
    let mut plant = FirstOrderPlant::new(0.8);
    let config = LoopConfig { setpoint: 1000.0, ticks: 30 };

    println!("Simulating with {} controller...", controller.name());
    let trace = sim::run_loop(&mut controller, &mut plant, &config);

    for s in &trace {
        println!("{:>3}  value {:>8.1}  command {:>7.1}", s.tick + 1, s.process_value, s.command);
    }
    if let Some(summary) = LoopSummary::from_samples(&trace) {
        println!("Final value: {:.1}", summary.final_value);
        println!("Overshoot: {:.1}%", summary.overshoot_pct);
    }
}
