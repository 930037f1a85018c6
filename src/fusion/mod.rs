//! Wind-triangle fusion of anemometer pulses and ground speed.

mod wind_estimate;
mod wind_fusion;
#[cfg(test)]
mod tests;

pub(crate) use wind_estimate::WindEstimate;
pub(crate) use wind_fusion::WindFusion;
