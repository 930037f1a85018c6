use super::{BusError, InstrumentBus, LinkStatus, SensorSample};
use crate::event;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use strum_macros::Display;

#[derive(Debug, Display)]
pub enum AcquisitionError {
    /// No reply within the acquisition bound; the worker was abandoned.
    Timeout,
    /// The instrument replied with a failure status.
    LinkFailure,
    /// A previously abandoned read is still outstanding.
    WorkerBusy,
    WorkerPanicked,
    Bus(BusError),
}

impl std::error::Error for AcquisitionError {}

impl From<BusError> for AcquisitionError {
    fn from(value: BusError) -> Self { AcquisitionError::Bus(value) }
}

/// Clears the in-flight flag when the blocking worker finishes, panics included.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}

/// Issues one bounded-time instrument request per cycle.
///
/// The blocking bus read runs on a worker thread joined with a timeout. A worker
/// that overruns is abandoned and its late result discarded; until it returns,
/// further acquisitions fail fast so that at most one worker is ever alive.
pub struct InstrumentLink {
    bus: Arc<dyn InstrumentBus>,
    in_flight: Arc<AtomicBool>,
}

impl InstrumentLink {
    pub fn new(bus: Arc<dyn InstrumentBus>) -> Self {
        Self { bus, in_flight: Arc::new(AtomicBool::new(false)) }
    }

    /// Reads one sample, never waiting longer than `timeout`.
    ///
    /// # Returns
    /// The sample, or [`SensorSample::failed`] on timeout or failure.
    pub async fn acquire(&self, timeout: Duration) -> SensorSample {
        match self.try_acquire(timeout).await {
            Ok(sample) => sample,
            Err(e) => {
                event!("Instrument acquisition failed: {e}");
                SensorSample::failed()
            }
        }
    }

    /// Whether an abandoned worker is still blocked on the bus.
    pub fn is_busy(&self) -> bool { self.in_flight.load(Ordering::Acquire) }

    pub async fn try_acquire(&self, timeout: Duration) -> Result<SensorSample, AcquisitionError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(AcquisitionError::WorkerBusy);
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let bus = Arc::clone(&self.bus);
        let worker = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            bus.read()
        });

        let reading = match tokio::time::timeout(timeout, worker).await {
            Err(_) => return Err(AcquisitionError::Timeout),
            Ok(Err(_)) => return Err(AcquisitionError::WorkerPanicked),
            Ok(Ok(res)) => res?,
        };
        match reading.status {
            LinkStatus::Ok => {
                Ok(SensorSample::new(reading.rotations, reading.direction_deg, reading.reserved))
            }
            LinkStatus::Fail => Err(AcquisitionError::LinkFailure),
        }
    }
}
