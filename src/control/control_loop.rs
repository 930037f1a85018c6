use super::{LoopExit, LoopState};
use crate::acquisition::{InstrumentLink, SensorSample};
use crate::config::Config;
use crate::fusion::{WindEstimate, WindFusion};
use crate::health::{HealthTracker, Subsystem};
use crate::keychain::Keychain;
use crate::output::{DisplayAdapter, SampleRecord, SampleSink};
use crate::position::PositionWatcher;
use crate::{event, info, warn};
use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Monotonic time of the previous cycle end.
struct LoopClock {
    last_cycle_end: Instant,
}

impl LoopClock {
    fn new() -> Self { Self { last_cycle_end: Instant::now() } }

    /// Interval since the previous lap, restarting the clock at `now`.
    fn lap(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_cycle_end);
        self.last_cycle_end = now;
        elapsed
    }
}

/// Outcome of a single cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    sample: SensorSample,
    elapsed: Duration,
    estimate: WindEstimate,
    logged: bool,
}

impl CycleReport {
    pub fn sample(&self) -> &SensorSample { &self.sample }
    pub fn elapsed(&self) -> Duration { self.elapsed }
    pub fn estimate(&self) -> &WindEstimate { &self.estimate }
    /// Whether a record reached the sample log this cycle.
    pub fn logged(&self) -> bool { self.logged }
}

/// Drives acquisition, fusion, display and logging at a fixed cadence.
///
/// Subsystem failures only ever change health; the loop itself stops solely on
/// cancellation of the shutdown token.
pub struct ControlLoop {
    config: Arc<Config>,
    health: Arc<HealthTracker>,
    instrument: Arc<InstrumentLink>,
    position: Arc<PositionWatcher>,
    sink: Arc<dyn SampleSink>,
    display: DisplayAdapter,
    fusion: WindFusion,
    clock: LoopClock,
    state: LoopState,
    cycles: u64,
    logged: u64,
}

impl ControlLoop {
    pub fn new(keychain: Keychain) -> Self {
        let config = keychain.config();
        let fusion = WindFusion::from_config(&config);
        Self {
            health: keychain.health(),
            instrument: keychain.instrument(),
            position: keychain.position(),
            sink: keychain.sink(),
            display: keychain.into_display(),
            config,
            fusion,
            clock: LoopClock::new(),
            state: LoopState::Starting,
            cycles: 0,
            logged: 0,
        }
    }

    pub fn state(&self) -> LoopState { self.state }

    pub fn health(&self) -> &HealthTracker { &self.health }

    /// Makes one initialization attempt per subsystem and enters `Running`.
    pub async fn start(&mut self) {
        if self.state != LoopState::Starting {
            return;
        }
        let display_ok = self.display.initialize().is_ok();
        self.health.report(Subsystem::Display, display_ok);
        if let Err(e) = self.position.start().await {
            warn!("Position receiver unavailable at startup: {e}");
        }
        self.clock = LoopClock::new();
        self.state = LoopState::Running;
        info!("Control loop running at {}ms cadence.", self.config.cadence_ms);
    }

    /// Runs a single acquire-fuse-render-log cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let sample = self.instrument.acquire(self.config.acquisition_timeout()).await;
        let acquired_at = Instant::now();
        self.health.report(Subsystem::Instrument, sample.is_ok());

        self.position.ensure_running().await;
        let elapsed = self.clock.lap(acquired_at);
        let fix = self.position.snapshot().expired_after(self.config.max_fix_age(), acquired_at);
        let estimate = self.fusion.fuse(&sample, elapsed, &fix);
        event!(
            "Cycle {}: {} rotations in {:.3}s, {:.2}kn true at {:.0} deg (fix valid: {})",
            self.cycles,
            sample.rotation_count(),
            elapsed.as_secs_f64(),
            estimate.true_speed(),
            estimate.direction_deg(),
            fix.is_valid()
        );

        self.display.refresh(&estimate, &self.health);

        let mut logged = false;
        if sample.is_ok() {
            match self.sink.append(&SampleRecord::new(&sample, &estimate)).await {
                Ok(()) => logged = true,
                Err(e) => warn!("Could not append sample: {e}"),
            }
        }
        self.cycles += 1;
        self.logged += u64::from(logged);
        CycleReport { sample, elapsed, estimate, logged }
    }

    /// Runs cycles until `shutdown` is cancelled, then shuts down.
    ///
    /// Cycles start every `cadence`; an overrunning cycle delays the next one
    /// instead of queueing catch-up cycles.
    pub async fn run(mut self, shutdown: CancellationToken) -> LoopExit {
        self.start().await;
        let mut ticker = interval(self.config.cadence());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.run_cycle().await;
        }
        self.shut_down().await;
        LoopExit { cycles: self.cycles, logged: self.logged, state: self.state }
    }

    async fn shut_down(&mut self) {
        self.state = LoopState::ShuttingDown;
        info!("Shutting down after {} cycles ({} samples logged).", self.cycles, self.logged);
        self.position.stop().await;
        self.display.farewell(&self.health);
        self.state = LoopState::Stopped;
    }
}
