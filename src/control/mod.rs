//! The fixed-cadence acquisition-fusion loop and its lifecycle.

mod control_loop;
mod loop_state;

pub(crate) use control_loop::{ControlLoop, CycleReport};
pub(crate) use loop_state::{LoopExit, LoopState};
