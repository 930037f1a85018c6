use strum_macros::{Display, EnumIter};

/// The three loosely coupled subsystems whose health is tracked independently.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter)]
pub enum Subsystem {
    Instrument,
    Position,
    Display,
}

impl Subsystem {
    pub(super) fn index(self) -> usize {
        match self {
            Subsystem::Instrument => 0,
            Subsystem::Position => 1,
            Subsystem::Display => 2,
        }
    }
}

/// Operational state of a single [`Subsystem`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum HealthStatus {
    Unknown,
    Ok,
    Failed,
}

impl HealthStatus {
    /// Display glyph: `*` for a healthy subsystem, `_` otherwise.
    pub fn glyph(self) -> char {
        match self {
            HealthStatus::Ok => '*',
            HealthStatus::Unknown | HealthStatus::Failed => '_',
        }
    }

    pub fn is_ok(self) -> bool { self == HealthStatus::Ok }
}

impl From<u8> for HealthStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => HealthStatus::Ok,
            2 => HealthStatus::Failed,
            _ => HealthStatus::Unknown,
        }
    }
}

impl From<HealthStatus> for u8 {
    fn from(value: HealthStatus) -> Self {
        match value {
            HealthStatus::Unknown => 0,
            HealthStatus::Ok => 1,
            HealthStatus::Failed => 2,
        }
    }
}
