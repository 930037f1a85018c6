//! Simulated instrument and receiver for running the loop without hardware.

use crate::acquisition::{BusError, InstrumentBus, LinkStatus, RawReading};
use crate::position::{GroundTrack, PositionError, PositionFeed, PositionSource};
use async_trait::async_trait;
use rand::Rng;
use std::{sync::Mutex, time::Duration};
use tokio::time::Instant;

/// Anemometer producing noisy pulses around a slowly veering wind.
pub struct SimulatedBus {
    last_read: Mutex<Option<Instant>>,
}

impl SimulatedBus {
    /// Mean rotation rate of the simulated cups.
    const MEAN_RPS: f64 = 6.0;
    const FAILURE_RATE: f64 = 0.02;

    pub fn new() -> Self { Self { last_read: Mutex::new(None) } }
}

impl InstrumentBus for SimulatedBus {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn read(&self) -> Result<RawReading, BusError> {
        let mut rng = rand::rng();
        let mut last = self.last_read.lock().map_err(|_| BusError::Unavailable)?;
        let now = Instant::now();
        let dt = last.map_or(0.5, |t| now.duration_since(t).as_secs_f64());
        *last = Some(now);
        std::thread::sleep(Duration::from_millis(rng.random_range(5..40)));

        if rng.random_bool(Self::FAILURE_RATE) {
            return Ok(RawReading { direction_deg: 0.0, rotations: 0, reserved: 0, status: LinkStatus::Fail });
        }
        let rps = (Self::MEAN_RPS + rng.random_range(-1.5..1.5)).max(0.0);
        Ok(RawReading {
            direction_deg: (45.0 + rng.random_range(-20.0..20.0_f64)).round(),
            rotations: (rps * 2.0 * dt).round() as u32,
            reserved: 0,
            status: LinkStatus::Ok,
        })
    }
}

/// Receiver reporting one fix per second around a cruising speed.
pub struct SimulatedSource {
    cruise_mps: f64,
}

impl SimulatedSource {
    pub fn new(cruise_mps: f64) -> Self { Self { cruise_mps } }
}

#[async_trait]
impl PositionSource for SimulatedSource {
    async fn open(&self) -> Result<Box<dyn PositionFeed>, PositionError> {
        Ok(Box::new(SimulatedFeed { cruise_mps: self.cruise_mps, track_deg: 90.0 }))
    }
}

struct SimulatedFeed {
    cruise_mps: f64,
    track_deg: f64,
}

impl SimulatedFeed {
    const REPORT_INTERVAL: Duration = Duration::from_secs(1);
}

#[async_trait]
impl PositionFeed for SimulatedFeed {
    async fn next_report(&mut self) -> Result<Option<GroundTrack>, PositionError> {
        tokio::time::sleep(Self::REPORT_INTERVAL).await;
        let (speed, turn) = {
            let mut rng = rand::rng();
            (self.cruise_mps + rng.random_range(-0.3..0.3), rng.random_range(-2.0..2.0))
        };
        self.track_deg = (self.track_deg + turn).rem_euclid(360.0);
        Ok(Some(GroundTrack { speed_mps: speed.max(0.0), track_deg: self.track_deg }))
    }
}
