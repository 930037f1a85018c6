use strum_macros::Display;

/// Lifecycle of the [`ControlLoop`](super::ControlLoop).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum LoopState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

/// Summary returned once the loop reached [`LoopState::Stopped`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LoopExit {
    pub cycles: u64,
    pub logged: u64,
    pub state: LoopState,
}
