/// Result of one fusion step. Only its printable fields are ever persisted.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct WindEstimate {
    apparent_radial_speed_mm_s: f64,
    true_speed_kn: f64,
    direction_deg: f64,
}

impl WindEstimate {
    pub(super) fn new(apparent_radial_speed_mm_s: f64, true_speed_kn: f64, direction_deg: f64) -> Self {
        Self { apparent_radial_speed_mm_s, true_speed_kn, direction_deg }
    }

    /// Cup speed derived from the pulse rate, in mm/s.
    pub fn apparent_radial_speed_mm_s(&self) -> f64 { self.apparent_radial_speed_mm_s }
    /// True wind speed in knots.
    pub fn true_speed(&self) -> f64 { self.true_speed_kn }
    /// Apparent wind direction, passed through uncorrected.
    pub fn direction_deg(&self) -> f64 { self.direction_deg }
}
