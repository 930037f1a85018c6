//! Per-subsystem tri-state health tracking. Health values gate the sample log
//! and drive the status glyphs on the display.

mod health_status;
mod health_tracker;

pub(crate) use health_status::{HealthStatus, Subsystem};
pub(crate) use health_tracker::HealthTracker;
