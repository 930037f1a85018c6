use crate::fusion::WindEstimate;
use crate::health::{HealthStatus, HealthTracker, Subsystem};
use std::io::Write;
use strum_macros::Display;

/// A character display accepting two text lines.
pub trait CharDisplay: Send {
    fn initialize(&mut self) -> std::io::Result<()>;
    fn plot(&mut self, top: &str, bottom: &str) -> std::io::Result<()>;
}

#[derive(Debug, Display)]
pub enum DisplayError {
    Io(std::io::Error),
}

impl std::error::Error for DisplayError {}

impl From<std::io::Error> for DisplayError {
    fn from(value: std::io::Error) -> Self { DisplayError::Io(value) }
}

/// Renders the latest estimate and link glyphs on a [`CharDisplay`].
///
/// Display failures are contained here: [`DisplayAdapter::refresh`] turns them
/// into Display health transitions and re-initializes the device on the next
/// cycle.
pub struct DisplayAdapter {
    display: Box<dyn CharDisplay>,
    width: usize,
}

impl DisplayAdapter {
    const FAREWELL: &'static str = "Quitting, bye!";

    pub fn new(display: Box<dyn CharDisplay>, width: usize) -> Self { Self { display, width } }

    pub fn initialize(&mut self) -> Result<(), DisplayError> { Ok(self.display.initialize()?) }

    pub fn render(&mut self, estimate: &WindEstimate, health: &HealthTracker) -> Result<(), DisplayError> {
        let (top, bottom) = self.format_lines(
            estimate,
            health.status(Subsystem::Instrument),
            health.status(Subsystem::Position),
        );
        Ok(self.display.plot(&top, &bottom)?)
    }

    /// Initializes the display if it is not known to be healthy, then renders.
    ///
    /// The outcome is reported as Display health and never propagated.
    pub fn refresh(&mut self, estimate: &WindEstimate, health: &HealthTracker) {
        let res = if health.status(Subsystem::Display).is_ok() {
            self.render(estimate, health)
        } else {
            self.initialize().and_then(|()| self.render(estimate, health))
        };
        health.report(Subsystem::Display, res.is_ok());
    }

    /// Shows the farewell screen if the display is healthy.
    pub fn farewell(&mut self, health: &HealthTracker) {
        if !health.status(Subsystem::Display).is_ok() {
            return;
        }
        if self.display.plot(Self::FAREWELL, "").is_err() {
            health.report_failure(Subsystem::Display);
        }
    }

    /// Formats the two display lines, each clipped to the display width.
    #[allow(clippy::cast_possible_truncation)]
    pub fn format_lines(
        &self,
        estimate: &WindEstimate,
        instrument: HealthStatus,
        position: HealthStatus,
    ) -> (String, String) {
        let top = format!("Wsp: {:02.2}  A{}", estimate.true_speed(), instrument.glyph());
        let bottom = format!("Wdr: {:05} G{}", estimate.direction_deg() as i64, position.glyph());
        (self.clip(&top), self.clip(&bottom))
    }

    fn clip(&self, line: &str) -> String { line.chars().take(self.width).collect() }
}

/// Stand-in for the character LCD that prints frames to standard output.
#[derive(Default)]
pub struct ConsoleDisplay;

impl CharDisplay for ConsoleDisplay {
    fn initialize(&mut self) -> std::io::Result<()> { std::io::stdout().flush() }

    fn plot(&mut self, top: &str, bottom: &str) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "\x1b[1m[LCD]\x1b[0m  {top}")?;
        writeln!(out, "\x1b[1m[LCD]\x1b[0m  {bottom}")?;
        out.flush()
    }
}
