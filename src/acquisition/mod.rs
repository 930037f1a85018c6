//! Bounded-time acquisition of anemometer readings over the instrument bus.

mod bus;
mod instrument_link;
mod sensor_sample;

pub(crate) use bus::{BusError, I2cBus, InstrumentBus, LinkStatus, RawReading};
pub(crate) use instrument_link::{AcquisitionError, InstrumentLink};
pub(crate) use sensor_sample::{AcquisitionStatus, SensorSample, normalize_deg};
