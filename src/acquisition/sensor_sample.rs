use strum_macros::Display;

/// Outcome of one instrument acquisition.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum AcquisitionStatus {
    Ok,
    Failed,
}

/// One reading of the remote anemometer, produced once per cycle.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SensorSample {
    /// Pulses accumulated since the previous reading.
    rotation_count: u32,
    /// Apparent wind direction relative to the track, normalised to `[0, 360)`.
    apparent_direction_deg: f64,
    /// Reserved word of the instrument reply, carried into the sample log.
    reserved: i32,
    status: AcquisitionStatus,
}

impl SensorSample {
    pub fn new(rotation_count: u32, apparent_direction_deg: f64, reserved: i32) -> Self {
        Self {
            rotation_count,
            apparent_direction_deg: normalize_deg(apparent_direction_deg),
            reserved,
            status: AcquisitionStatus::Ok,
        }
    }

    /// A failed acquisition carrying conservative zero values.
    pub fn failed() -> Self {
        Self {
            rotation_count: 0,
            apparent_direction_deg: 0.0,
            reserved: 0,
            status: AcquisitionStatus::Failed,
        }
    }

    pub fn rotation_count(&self) -> u32 { self.rotation_count }
    pub fn apparent_direction_deg(&self) -> f64 { self.apparent_direction_deg }
    pub fn reserved(&self) -> i32 { self.reserved }
    pub fn status(&self) -> AcquisitionStatus { self.status }
    pub fn is_ok(&self) -> bool { self.status == AcquisitionStatus::Ok }
}

/// Maps any finite angle into `[0, 360)`. Non-finite angles map to 0.
pub fn normalize_deg(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
