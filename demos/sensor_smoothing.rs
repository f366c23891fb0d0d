use filter_control::filter::ScalarKalman;
use filter_control::io::{csv, json::{self, FilterSummary}};
use filter_control::sim::{self, NoisySignal};

fn main() {
    // Two channels filtered side by side, each with its own state
    let mut temperature = ScalarKalman::new(0.01, 0.8, 25.0);
    let mut rate = ScalarKalman::new(0.1, 0.3, 0.0);

    let mut temp_sensor = NoisySignal::new(1, 25.0, 1.5);
    let mut rate_sensor = NoisySignal::new(2, 0.0, 0.5);

    let temp_trace = sim::run_filter(&mut temperature, &temp_sensor.take(100));
    rate_sensor.step(3.0);
    let rate_trace = sim::run_filter(&mut rate, &rate_sensor.take(100));

    for (name, trace, truth) in [("temperature", &temp_trace, 25.0), ("rate", &rate_trace, 3.0)] {
        if let Some(s) = FilterSummary::from_samples(trace, truth) {
            println!(
                "{:<12} raw |err| {:.3}  filtered |err| {:.3}  final {:.3}",
                name, s.raw_mean_abs_dev, s.filtered_mean_abs_dev, s.final_estimate
            );
        }
    }

    csv::write_filter_trace_file("temperature_trace.csv", &temp_trace)
        .expect("Failed to write CSV");
    if let Some(summary) = FilterSummary::from_samples(&temp_trace, 25.0) {
        json::write_filter_summary_file("temperature_summary.json", &summary)
            .expect("Failed to write JSON");
    }

    println!("Exported: temperature_trace.csv, temperature_summary.json");
}
