//! Outward-facing adapters: the two-line status display and the sample log.

mod display_adapter;
mod sample_logger;
#[cfg(test)]
mod tests;

pub(crate) use display_adapter::{CharDisplay, ConsoleDisplay, DisplayAdapter, DisplayError};
pub(crate) use sample_logger::{CsvSampleLog, SampleRecord, SampleSink, SinkError};
