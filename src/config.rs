use serde::Deserialize;
use std::{path::Path, time::Duration};
use strum_macros::Display;

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "TRUEWIND_CONFIG";
/// Environment variable forcing simulated collaborators.
pub const SIMULATE_VAR: &str = "TRUEWIND_SIMULATE";
const DEFAULT_CONFIG_PATH: &str = "truewind.toml";

/// Runtime configuration of the acquisition-fusion loop and its collaborators.
///
/// Every field has a default, so an empty (or absent) configuration file yields
/// a working setup for the reference hardware.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target interval between the starts of two consecutive cycles.
    pub cadence_ms: u64,
    /// Upper bound for a single instrument read.
    pub acquisition_timeout_ms: u64,
    /// Shortest interval for which a pulse rate is derived from the counts.
    pub min_rate_interval_ms: u64,
    /// Rotations per second assumed when the interval is too short.
    pub fallback_rps: f64,
    /// Anemometer cup radius in millimetres.
    pub radius_mm: f64,
    /// Pulses emitted per physical rotation.
    pub pulses_per_rotation: f64,
    /// Character device of the instrument bus.
    pub bus_device: String,
    /// Device address of the remote instrument.
    pub bus_address: u16,
    /// Address of the position daemon.
    pub gpsd_addr: String,
    pub position_connect_timeout_ms: u64,
    pub position_retry_ms: u64,
    /// Fixes older than this are not trusted for fusion.
    pub max_fix_age_ms: u64,
    /// Destination of the append-only sample log.
    pub log_path: String,
    /// Characters per display line.
    pub display_width: usize,
    /// Replace instrument and position hardware by simulated collaborators.
    pub simulate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cadence_ms: 500,
            acquisition_timeout_ms: 1000,
            min_rate_interval_ms: 400,
            fallback_rps: 10.0,
            radius_mm: 70.0,
            pulses_per_rotation: 2.0,
            bus_device: String::from("/dev/i2c-1"),
            bus_address: 0x25,
            gpsd_addr: String::from("127.0.0.1:2947"),
            position_connect_timeout_ms: 1000,
            position_retry_ms: 10_000,
            max_fix_age_ms: 5000,
            log_path: String::from("windlog.csv"),
            display_width: 16,
            simulate: false,
        }
    }
}

#[derive(Debug, Display)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self { ConfigError::Io(value) }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self { ConfigError::Parse(value) }
}

impl Config {
    /// Loads the configuration named by [`CONFIG_PATH_VAR`], falling back to
    /// `truewind.toml` in the working directory.
    ///
    /// A missing default file yields the built-in defaults, a missing file that
    /// was named explicitly is an error.
    ///
    /// # Returns
    /// The validated configuration with environment overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        if std::env::var(SIMULATE_VAR).is_ok_and(|v| v != "0") {
            config.simulate = true;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(raw)?) }

    /// Rejects values that would stall the loop or break the fusion arithmetic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cadence_ms == 0 {
            return Err(ConfigError::Invalid("cadence_ms must be positive"));
        }
        if self.acquisition_timeout_ms == 0 {
            return Err(ConfigError::Invalid("acquisition_timeout_ms must be positive"));
        }
        if !(self.radius_mm.is_finite() && self.pulses_per_rotation.is_finite() && self.fallback_rps.is_finite()) {
            return Err(ConfigError::Invalid("radius_mm, pulses_per_rotation and fallback_rps must be finite"));
        }
        if self.radius_mm <= 0.0 || self.pulses_per_rotation <= 0.0 {
            return Err(ConfigError::Invalid("radius_mm and pulses_per_rotation must be positive"));
        }
        if self.fallback_rps < 0.0 {
            return Err(ConfigError::Invalid("fallback_rps must not be negative"));
        }
        if self.display_width == 0 {
            return Err(ConfigError::Invalid("display_width must be positive"));
        }
        Ok(())
    }

    pub fn cadence(&self) -> Duration { Duration::from_millis(self.cadence_ms) }
    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_millis(self.acquisition_timeout_ms)
    }
    pub fn min_rate_interval(&self) -> Duration { Duration::from_millis(self.min_rate_interval_ms) }
    pub fn position_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.position_connect_timeout_ms)
    }
    pub fn position_retry(&self) -> Duration { Duration::from_millis(self.position_retry_ms) }
    pub fn max_fix_age(&self) -> Duration { Duration::from_millis(self.max_fix_age_ms) }
}
