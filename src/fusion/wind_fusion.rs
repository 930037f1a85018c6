use super::WindEstimate;
use crate::acquisition::SensorSample;
use crate::config::Config;
use crate::position::PositionFix;
use std::time::Duration;

/// Combines pulse counts, the elapsed interval and the latest position fix
/// into a [`WindEstimate`].
///
/// The computation is pure: identical inputs always yield identical outputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindFusion {
    radius_mm: f64,
    pulses_per_rotation: f64,
    min_rate_interval: Duration,
    fallback_rps: f64,
}

impl WindFusion {
    /// Conversion factor from mm/s to knots.
    pub const MM_S_TO_KN: f64 = 0.00194;
    /// Conversion factor from m/s to knots.
    pub const M_S_TO_KN: f64 = 1.94;

    pub fn new(radius_mm: f64, pulses_per_rotation: f64, min_rate_interval: Duration, fallback_rps: f64) -> Self {
        Self { radius_mm, pulses_per_rotation, min_rate_interval, fallback_rps }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.radius_mm,
            config.pulses_per_rotation,
            config.min_rate_interval(),
            config.fallback_rps,
        )
    }

    /// Rotations per second over `elapsed`.
    ///
    /// Intervals shorter than the configured minimum amplify counting noise,
    /// so the fixed fallback rate is returned for them instead.
    pub fn rotations_per_second(&self, rotation_count: u32, elapsed: Duration) -> f64 {
        if elapsed < self.min_rate_interval {
            return self.fallback_rps;
        }
        f64::from(rotation_count) / self.pulses_per_rotation / elapsed.as_secs_f64()
    }

    /// Fuses one cycle's inputs.
    ///
    /// # Arguments
    /// * `sample` – The instrument reading; its direction must already lie in `[0, 360)`.
    /// * `elapsed` – Time since the previous cycle ended.
    /// * `fix` – Position snapshot; an invalid fix contributes no ground speed.
    ///
    /// # Returns
    /// The apparent cup speed, the true wind speed in knots (law of cosines over
    /// the apparent direction) and the uncorrected apparent direction.
    pub fn fuse(&self, sample: &SensorSample, elapsed: Duration, fix: &PositionFix) -> WindEstimate {
        let rps = self.rotations_per_second(sample.rotation_count(), elapsed);
        let radial_speed = rps * self.radius_mm;

        let a = radial_speed * Self::MM_S_TO_KN;
        let b = if fix.is_valid() { fix.ground_speed_mps() * Self::M_S_TO_KN } else { 0.0 };
        let theta = sample.apparent_direction_deg().to_radians();
        // Direction is relative to the track, not corrected for heading.
        let squared = a * a + b * b - 2.0 * a * b * theta.cos();
        let true_speed = squared.max(0.0).sqrt();

        WindEstimate::new(radial_speed, true_speed, sample.apparent_direction_deg())
    }
}
