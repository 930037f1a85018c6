use crate::acquisition::{I2cBus, InstrumentBus, InstrumentLink};
use crate::config::Config;
use crate::health::HealthTracker;
use crate::output::{CharDisplay, ConsoleDisplay, CsvSampleLog, DisplayAdapter, SampleSink};
use crate::position::{GpsdSource, PositionSource, PositionWatcher};
use crate::sim::{SimulatedBus, SimulatedSource};
use crate::info;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Struct holding the key components of the application. It is built once at
/// startup and handed to the control loop, replacing any process-wide handles.
///
/// # Fields
/// - `config`: The validated runtime configuration.
/// - `health`: The per-subsystem health tracker shared by all components.
/// - `instrument`: The bounded-time link to the remote anemometer.
/// - `position`: The background watcher publishing ground speed fixes.
/// - `display`: The adapter rendering estimates on the character display.
/// - `sink`: The append-only destination of accepted samples.
pub struct Keychain {
    /// The configuration every component was built from.
    config: Arc<Config>,
    /// The health tracker, written by the components and read by the loop.
    health: Arc<HealthTracker>,
    /// The instrument link issuing one bounded request per cycle.
    instrument: Arc<InstrumentLink>,
    /// The position watcher owning the latest fix.
    position: Arc<PositionWatcher>,
    /// The display adapter, exclusively used by the control loop.
    display: DisplayAdapter,
    /// The sample log.
    sink: Arc<dyn SampleSink>,
}

impl Keychain {
    /// Cruising speed of the simulated vessel in m/s.
    const SIM_CRUISE_MPS: f64 = 3.5;

    /// Creates a new `Keychain` wired to the hardware collaborators named in
    /// `config`, or to simulated ones when `config.simulate` is set.
    ///
    /// # Arguments
    /// - `config`: The validated configuration.
    /// - `shutdown`: The process cancellation token.
    ///
    /// # Returns
    /// A `Keychain` whose position watcher is not yet started.
    pub fn new(config: Config, shutdown: &CancellationToken) -> Self {
        let (bus, source): (Arc<dyn InstrumentBus>, Arc<dyn PositionSource>) = if config.simulate {
            info!("Running with simulated instrument and receiver.");
            (Arc::new(SimulatedBus::new()), Arc::new(SimulatedSource::new(Self::SIM_CRUISE_MPS)))
        } else {
            info!(
                "Instrument on {} @ {:#04x}, receiver at {}.",
                config.bus_device, config.bus_address, config.gpsd_addr
            );
            (
                Arc::new(I2cBus::new(config.bus_device.as_str(), config.bus_address)),
                Arc::new(GpsdSource::new(&config.gpsd_addr)),
            )
        };
        let sink = Arc::new(CsvSampleLog::new(config.log_path.as_str()));
        Self::from_parts(config, bus, source, Box::new(ConsoleDisplay), sink, shutdown)
    }

    /// Assembles a `Keychain` from explicit collaborators.
    pub fn from_parts(
        config: Config,
        bus: Arc<dyn InstrumentBus>,
        source: Arc<dyn PositionSource>,
        display: Box<dyn CharDisplay>,
        sink: Arc<dyn SampleSink>,
        shutdown: &CancellationToken,
    ) -> Self {
        let health = Arc::new(HealthTracker::new());
        let instrument = Arc::new(InstrumentLink::new(bus));
        let position = Arc::new(PositionWatcher::new(
            source,
            Arc::clone(&health),
            shutdown.clone(),
            config.position_connect_timeout(),
            config.position_retry(),
        ));
        let display = DisplayAdapter::new(display, config.display_width);
        Self { config: Arc::new(config), health, instrument, position, display, sink }
    }

    /// Provides a cloned reference to the configuration.
    pub fn config(&self) -> Arc<Config> { Arc::clone(&self.config) }

    /// Provides a cloned reference to the health tracker.
    pub fn health(&self) -> Arc<HealthTracker> { Arc::clone(&self.health) }

    /// Provides a cloned reference to the instrument link.
    pub fn instrument(&self) -> Arc<InstrumentLink> { Arc::clone(&self.instrument) }

    /// Provides a cloned reference to the position watcher.
    pub fn position(&self) -> Arc<PositionWatcher> { Arc::clone(&self.position) }

    /// Provides a cloned reference to the sample sink.
    pub fn sink(&self) -> Arc<dyn SampleSink> { Arc::clone(&self.sink) }

    /// Splits off the display adapter, which has a single owner.
    pub fn into_display(self) -> DisplayAdapter { self.display }
}
