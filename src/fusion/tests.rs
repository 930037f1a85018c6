use super::WindFusion;
use crate::acquisition::SensorSample;
use crate::config::Config;
use crate::position::PositionFix;
use std::time::Duration;
use tokio::time::Instant;

fn default_fusion() -> WindFusion { WindFusion::from_config(&Config::default()) }

fn fix(speed: f64) -> PositionFix { PositionFix::new(speed, 0.0, Instant::now()) }

#[test]
fn test_radial_speed_from_counts() {
    let fusion = default_fusion();
    for (count, secs) in [(0u32, 0.5), (20, 1.0), (7, 0.55), (1000, 3.25)] {
        let elapsed = Duration::from_secs_f64(secs);
        let est = fusion.fuse(&SensorSample::new(count, 0.0, 0), elapsed, &PositionFix::default());
        let expected = (f64::from(count) / 2.0 / elapsed.as_secs_f64()) * 70.0;
        assert!((est.apparent_radial_speed_mm_s() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_short_interval_uses_fallback_rate() {
    let fusion = default_fusion();
    for count in [0u32, 3, 500] {
        let est = fusion.fuse(
            &SensorSample::new(count, 45.0, 0),
            Duration::from_millis(399),
            &PositionFix::default(),
        );
        assert!((est.apparent_radial_speed_mm_s() - 700.0).abs() < 1e-9);
    }
}

#[test]
fn test_fallback_rate_is_configurable() {
    let fusion = WindFusion::new(70.0, 2.0, Duration::from_millis(400), 4.0);
    assert!((fusion.rotations_per_second(99, Duration::ZERO) - 4.0).abs() < f64::EPSILON);
    let est = fusion.fuse(&SensorSample::new(99, 0.0, 0), Duration::ZERO, &PositionFix::default());
    assert!((est.apparent_radial_speed_mm_s() - 280.0).abs() < 1e-9);
}

#[test]
fn test_deterministic() {
    let fusion = default_fusion();
    let sample = SensorSample::new(33, 123.4, 0);
    let f = fix(3.3);
    let elapsed = Duration::from_millis(730);
    let first = fusion.fuse(&sample, elapsed, &f);
    for _ in 0..10 {
        assert_eq!(fusion.fuse(&sample, elapsed, &f), first);
    }
}

#[test]
fn test_invalid_fix_degenerates_to_apparent_speed() {
    let fusion = default_fusion();
    let sample = SensorSample::new(17, 260.0, 0);
    let elapsed = Duration::from_millis(900);
    let est = fusion.fuse(&sample, elapsed, &PositionFix::no_fix(Instant::now()));
    let apparent_kn = est.apparent_radial_speed_mm_s() * WindFusion::MM_S_TO_KN;
    assert_eq!(est.true_speed(), apparent_kn);

    let still = fusion.fuse(&sample, elapsed, &fix(0.0));
    assert_eq!(still.true_speed(), apparent_kn);
}

#[test]
fn test_end_to_end_reference_triangle() {
    let fusion = default_fusion();
    let est = fusion.fuse(&SensorSample::new(20, 90.0, 0), Duration::from_secs(1), &fix(5.0));
    assert!((est.apparent_radial_speed_mm_s() - 700.0).abs() < 1e-9);
    let expected = (1.358f64.powi(2) + 9.7f64.powi(2)).sqrt();
    assert!((est.true_speed() - expected).abs() < 1e-9);
    assert!((est.true_speed() - 9.794).abs() < 1e-3);
    assert!((est.direction_deg() - 90.0).abs() < f64::EPSILON);
}

#[test]
fn test_direction_is_not_heading_corrected() {
    // Known approximation: the apparent direction passes through unchanged
    // regardless of the vessel heading.
    let fusion = default_fusion();
    let sample = SensorSample::new(20, 30.0, 0);
    let north = fusion.fuse(&sample, Duration::from_secs(1), &PositionFix::new(5.0, 0.0, Instant::now()));
    let east = fusion.fuse(&sample, Duration::from_secs(1), &PositionFix::new(5.0, 90.0, Instant::now()));
    assert_eq!(north, east);
    assert!((north.direction_deg() - 30.0).abs() < f64::EPSILON);
}

#[test]
fn test_never_nan_for_aligned_vectors() {
    let fusion = default_fusion();
    // a == b and theta == 0 drives the squared term to (rounded) zero
    let count = 2_000_u32;
    let elapsed = Duration::from_secs(1);
    let a = f64::from(count) / 2.0 * 70.0 * WindFusion::MM_S_TO_KN;
    let speed = a / WindFusion::M_S_TO_KN;
    let est = fusion.fuse(&SensorSample::new(count, 0.0, 0), elapsed, &fix(speed));
    assert!(est.true_speed().is_finite());
    assert!(est.true_speed() < 1e-4);
}
