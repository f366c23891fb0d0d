use std::path::Path;
use std::time::{Duration, Instant};

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use filter_control::config::{DemoConfig, PidConfig, PlantConfig};
use filter_control::filter::ScalarKalman;
use filter_control::io::csv;
use filter_control::sim::{self, FilterSample, LoopConfig, LoopSample, NoisySignal};

/// Rows kept from a logged series, matching what fits on one plot.
const MAX_POINTS: usize = 2000;
/// How often a logged series is re-read for appended rows.
const REFRESH: Duration = Duration::from_secs(1);

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("FILTER_CONTROL_LOG", "info")).init();

    let config = DemoConfig::default();
    let mut kf = config.kalman.build();

    // Optional argument: a `timestamp,value` CSV a sensor logger appends to
    let (title, filter_trace, live) = match std::env::args().nth(1) {
        Some(path) => {
            if !Path::new(&path).exists() {
                log::info!("{} not found; writing a sample series", path);
                if let Err(e) = csv::write_series_file(&path, "timestamp", "value", &csv::sample_series(20)) {
                    log::error!("{}: {}", path, e);
                    std::process::exit(1);
                }
            }
            let mut live = LiveSeries { path: path.clone(), offset: 0, filter: kf, last_poll: Instant::now() };
            let mut trace = Vec::new();
            if let Err(e) = live.poll(&mut trace) {
                log::error!("{}: {}", path, e);
                std::process::exit(1);
            }
            (format!("{} (live)", path), trace, Some(live))
        }
        None => {
            let mut signal = NoisySignal::new(42, config.kalman.initial_value, 2.0);
            let trace = sim::run_filter(&mut kf, &signal.take(200));
            ("synthetic sensor (50.0 +/- 2.0)".to_string(), trace, None)
        }
    };

    let loop_config = LoopConfig::from(&config.control_loop);
    let position = run(&PidConfig::default(), &PlantConfig::default(), &loop_config);
    let increment = run(&PidConfig::increment(), &PlantConfig { gain: 0.08 }, &loop_config);

    let app = ControlViz { title, filter_trace, live, position, increment };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Filter & Control", options, Box::new(|_| Ok(Box::new(app))))
}

fn run(pid: &PidConfig, plant: &PlantConfig, loop_config: &LoopConfig) -> Vec<LoopSample> {
    let mut controller = pid.build();
    let mut plant = plant.build();
    sim::run_loop(controller.as_mut(), &mut plant, loop_config)
}

/// A logged series being followed as it grows. One filter sees every row
/// exactly once, in file order.
struct LiveSeries {
    path: String,
    offset: usize,
    filter: ScalarKalman<f64>,
    last_poll: Instant,
}

impl LiveSeries {
    /// Filter rows appended since the last poll onto the end of `trace`.
    fn poll(&mut self, trace: &mut Vec<FilterSample>) -> Result<(), csv::TraceError> {
        self.last_poll = Instant::now();
        let tail = csv::read_series_from_file(&self.path, "timestamp", "value", self.offset)?;
        self.offset = tail.next_offset;
        if tail.points.is_empty() {
            return Ok(());
        }

        let values: Vec<f64> = tail.points.iter().map(|&(_, y)| y).collect();
        if trace.is_empty() {
            self.filter.reset(values[0]);
        }
        let next_tick = trace.last().map_or(0, |s| s.tick + 1);
        trace.extend(sim::run_filter_from(&mut self.filter, &values, next_tick));
        if trace.len() > MAX_POINTS {
            trace.drain(..trace.len() - MAX_POINTS);
        }
        log::debug!("{}: {} new rows, {} consumed", self.path, values.len(), self.offset);
        Ok(())
    }
}

struct ControlViz {
    title: String,
    filter_trace: Vec<FilterSample>,
    live: Option<LiveSeries>,
    position: Vec<LoopSample>,
    increment: Vec<LoopSample>,
}

impl ControlViz {
    fn loop_plot(ui: &mut egui::Ui, id: &str, trace: &[LoopSample], width: f32, height: f32) {
        let value: PlotPoints = trace.iter().map(|s| [s.tick as f64, s.process_value]).collect();
        let target: PlotPoints = trace.iter().map(|s| [s.tick as f64, s.setpoint]).collect();
        let command: PlotPoints = trace.iter().map(|s| [s.tick as f64, s.command]).collect();
        Plot::new(id)
            .width(width)
            .height(height)
            .legend(Legend::default())
            .x_axis_label("Tick")
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new("Setpoint", target));
                plot_ui.line(Line::new("Value", value));
                plot_ui.line(Line::new("Command", command));
            });
    }
}

impl eframe::App for ControlViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(live) = &mut self.live {
            if live.last_poll.elapsed() >= REFRESH {
                if let Err(e) = live.poll(&mut self.filter_trace) {
                    log::warn!("{}: {}", live.path, e);
                }
            }
            ctx.request_repaint_after(REFRESH);
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Signal: {}", self.title));
            if let Some(last) = self.filter_trace.last() {
                ui.label(format!(
                    "Tick: {}  |  Latest estimate: {:.3}  |  P: {:.4}  |  K: {:.3}",
                    last.tick + 1,
                    last.estimate,
                    last.covariance,
                    last.gain,
                ));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Raw vs filtered
                ui.vertical(|ui| {
                    ui.label("Measurement vs estimate");
                    let raw: PlotPoints = self.filter_trace.iter()
                        .map(|s| [s.tick as f64, s.measurement])
                        .collect();
                    let est: PlotPoints = self.filter_trace.iter()
                        .map(|s| [s.tick as f64, s.estimate])
                        .collect();
                    Plot::new("filter")
                        .width(half_w)
                        .height(half_h)
                        .legend(Legend::default())
                        .x_axis_label("Tick")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Raw", raw));
                            plot_ui.line(Line::new("Filtered", est));
                        });
                });

                // Covariance and gain
                ui.vertical(|ui| {
                    ui.label("Error covariance / gain");
                    let p: PlotPoints = self.filter_trace.iter()
                        .map(|s| [s.tick as f64, s.covariance])
                        .collect();
                    let k: PlotPoints = self.filter_trace.iter()
                        .map(|s| [s.tick as f64, s.gain])
                        .collect();
                    Plot::new("covariance")
                        .width(half_w)
                        .height(half_h)
                        .legend(Legend::default())
                        .x_axis_label("Tick")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("P", p));
                            plot_ui.line(Line::new("K", k));
                        });
                });
            });

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Position-form PID");
                    Self::loop_plot(ui, "position", &self.position, half_w, half_h);
                });
                ui.vertical(|ui| {
                    ui.label("Increment-form PID");
                    Self::loop_plot(ui, "increment", &self.increment, half_w, half_h);
                });
            });
        });
    }
}
