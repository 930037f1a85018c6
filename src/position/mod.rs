//! Ground speed / heading acquisition from the positioning receiver.
//!
//! A long-lived [`PositionWatcher`] task polls a [`PositionSource`] and publishes
//! immutable [`PositionFix`] snapshots that the control loop copies on read.

mod gpsd_source;
mod position_fix;
mod position_source;
mod position_watcher;

pub(crate) use gpsd_source::{GpsdMessage, GpsdSource};
pub(crate) use position_fix::PositionFix;
pub(crate) use position_source::{GroundTrack, PositionError, PositionFeed, PositionSource};
pub(crate) use position_watcher::PositionWatcher;
