use std::time::Duration;
use tokio::time::Instant;

/// Latest ground speed / heading reading of the positioning receiver.
///
/// Values are immutable once published; the watcher swaps in a new fix
/// instead of mutating the current one.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct PositionFix {
    ground_speed_mps: f64,
    heading_deg: f64,
    valid: bool,
    /// Monotonic publish time, `None` for the zero default.
    updated_at: Option<Instant>,
}

impl PositionFix {
    pub fn new(ground_speed_mps: f64, heading_deg: f64, updated_at: Instant) -> Self {
        Self { ground_speed_mps: ground_speed_mps.max(0.0), heading_deg, valid: true, updated_at: Some(updated_at) }
    }

    /// A receiver report without a usable fix.
    pub fn no_fix(updated_at: Instant) -> Self {
        Self { updated_at: Some(updated_at), ..Self::default() }
    }

    pub fn ground_speed_mps(&self) -> f64 { self.ground_speed_mps }
    pub fn heading_deg(&self) -> f64 { self.heading_deg }
    pub fn is_valid(&self) -> bool { self.valid }
    pub fn updated_at(&self) -> Option<Instant> { self.updated_at }

    /// Returns this fix, marked invalid if it is older than `max_age` at `now`.
    pub fn expired_after(self, max_age: Duration, now: Instant) -> Self {
        match self.updated_at {
            Some(t) if now.saturating_duration_since(t) <= max_age => self,
            _ => Self { valid: false, ..self },
        }
    }
}
