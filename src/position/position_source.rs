use async_trait::async_trait;
use strum_macros::Display;

/// Ground speed and course over ground of one receiver report.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct GroundTrack {
    pub speed_mps: f64,
    pub track_deg: f64,
}

#[derive(Debug, Display)]
pub enum PositionError {
    /// The receiver (or its daemon) could not be reached.
    Unreachable(std::io::Error),
    Timeout,
    /// The report stream ended.
    Closed,
    Io(std::io::Error),
    /// A receiver line that is not a valid protocol message.
    Malformed(serde_json::Error),
}

impl std::error::Error for PositionError {}

impl From<std::io::Error> for PositionError {
    fn from(value: std::io::Error) -> Self { PositionError::Io(value) }
}

/// Connection factory for a positioning receiver.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Attaches to the receiver and starts its report stream.
    async fn open(&self) -> Result<Box<dyn PositionFeed>, PositionError>;
}

/// A live stream of receiver reports.
#[async_trait]
pub trait PositionFeed: Send {
    /// Waits for the next report.
    ///
    /// # Returns
    /// * `Ok(Some(track))` for a report carrying a fix.
    /// * `Ok(None)` for a report without a fix.
    /// * `Err(_)` when the stream failed or ended.
    async fn next_report(&mut self) -> Result<Option<GroundTrack>, PositionError>;
}
