//! Long-run invariants of the filter and both PID forms.

use filter_control::sim::NoisySignal;
use filter_control::{IncrementPid, PidGains, PidLimits, PositionPid, ScalarKalman};

// ============================================================================
// KALMAN
// ============================================================================

#[test]
fn covariance_positive_and_bounded_over_noisy_run() {
    for (seed, q, r) in [(1_u64, 0.05_f64, 0.5), (2, 1e-4, 10.0), (3, 5.0, 0.01)] {
        let mut kf = ScalarKalman::new(q, r, 0.0);
        let mut sensor = NoisySignal::new(seed, 12.0, 4.0);
        for _ in 0..1000 {
            let before = kf.error_covariance();
            let k = kf.gain();
            kf.update(sensor.sample());
            assert!((0.0..=1.0).contains(&k));
            assert!(kf.error_covariance() > 0.0);
            assert!(kf.error_covariance() <= before + q);
        }
    }
}

#[test]
fn estimate_tracks_step_in_truth() {
    let mut kf = ScalarKalman::new(0.05, 0.5, 50.0);
    let mut sensor = NoisySignal::new(9, 50.0, 0.0);
    sensor.step(10.0);
    for _ in 0..60 {
        kf.update(sensor.sample());
    }
    assert!((kf.estimate() - 60.0).abs() < 1e-3, "estimate {}", kf.estimate());
}

#[test]
fn independent_channels_do_not_interact() {
    let mut a = ScalarKalman::new(0.05_f64, 0.5, 0.0);
    let mut b = ScalarKalman::new(0.05_f64, 0.5, 0.0);
    let solo = ScalarKalman::new(0.05_f64, 0.5, 0.0).filter_all(&[1.0, 2.0, 3.0]);
    let mut interleaved = Vec::new();
    for (x, y) in [(1.0, -5.0), (2.0, 7.0), (3.0, 0.5)] {
        interleaved.push(a.update(x));
        b.update(y);
    }
    assert_eq!(solo, interleaved);
}

// ============================================================================
// PID
// ============================================================================

#[test]
fn position_limits_hold_under_random_inputs() {
    let limits = PidLimits::new(50.0, 200.0);
    let mut pid = PositionPid::new(PidGains::new(2.0, 0.5, 0.1), limits);
    let mut setpoints = NoisySignal::new(11, 0.0, 5000.0);
    let mut readings = NoisySignal::new(12, 0.0, 5000.0);
    for _ in 0..2000 {
        let out = pid.update(setpoints.sample(), readings.sample());
        assert!(pid.integral().abs() <= limits.integral_limit);
        assert!(out.abs() <= limits.output_limit);
        assert_eq!(out, pid.output());
    }
}

#[test]
fn increment_limit_holds_under_random_inputs() {
    let limits = PidLimits::new(50.0, 50.0);
    let mut pid = IncrementPid::new(PidGains::new(2.0, 0.5, 0.1), limits);
    let mut readings = NoisySignal::new(13, 500.0, 800.0);
    for _ in 0..2000 {
        let d = pid.update(1000.0, readings.sample());
        assert!(d.abs() <= limits.output_limit);
        assert_eq!(d, pid.delta());
    }
}

#[test]
fn zero_error_from_start_is_silent() {
    let mut pos = PositionPid::new(PidGains::new(2.0, 0.5, 0.1), PidLimits::new(50.0, 200.0));
    let mut inc = IncrementPid::new(PidGains::new(2.0, 0.5, 0.1), PidLimits::new(50.0, 50.0));
    for i in 0..100 {
        let v = i as f64 * 3.25;
        assert_eq!(pos.update(v, v), 0.0);
        assert_eq!(inc.update(v, v), 0.0);
    }
}

#[test]
fn retuning_keeps_running_state() {
    let mut pid = PositionPid::new(PidGains::new(1.0_f64, 1.0, 0.0), PidLimits::new(100.0, 100.0));
    pid.update(5.0, 0.0);
    pid.set_gains(PidGains::new(0.0_f64, 2.0, 0.0));
    // Integral was 5, now 10; only the integral term remains
    assert!((pid.update(5.0, 0.0) - 20.0).abs() < 1e-12);
}
