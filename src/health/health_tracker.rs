use super::{HealthStatus, Subsystem};
use crate::{info, warn};
use std::sync::atomic::{AtomicU8, Ordering};

/// Tracks the [`HealthStatus`] of every [`Subsystem`].
///
/// Each subsystem lives in its own atomic cell, so a report for one subsystem
/// never contends with reads or writes of another. Statuses start as
/// [`HealthStatus::Unknown`] and only change on explicit reports.
#[derive(Debug, Default)]
pub struct HealthTracker {
    cells: [AtomicU8; 3],
}

impl HealthTracker {
    pub fn new() -> Self { Self::default() }

    /// Current status of `subsystem`.
    pub fn status(&self, subsystem: Subsystem) -> HealthStatus {
        HealthStatus::from(self.cells[subsystem.index()].load(Ordering::Acquire))
    }

    /// Records a successful operation of `subsystem`.
    ///
    /// # Returns
    /// The status before the report.
    pub fn report_success(&self, subsystem: Subsystem) -> HealthStatus {
        let prev = self.swap(subsystem, HealthStatus::Ok);
        if prev != HealthStatus::Ok {
            info!("{subsystem} link is up ({prev} -> Ok).");
        }
        prev
    }

    /// Records a failed operation of `subsystem`.
    ///
    /// # Returns
    /// The status before the report.
    pub fn report_failure(&self, subsystem: Subsystem) -> HealthStatus {
        let prev = self.swap(subsystem, HealthStatus::Failed);
        if prev != HealthStatus::Failed {
            warn!("{subsystem} link failed ({prev} -> Failed).");
        }
        prev
    }

    /// Reports success or failure depending on `ok`.
    pub fn report(&self, subsystem: Subsystem, ok: bool) -> HealthStatus {
        if ok { self.report_success(subsystem) } else { self.report_failure(subsystem) }
    }

    fn swap(&self, subsystem: Subsystem, status: HealthStatus) -> HealthStatus {
        HealthStatus::from(self.cells[subsystem.index()].swap(u8::from(status), Ordering::AcqRel))
    }
}
