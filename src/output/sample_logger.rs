use crate::acquisition::SensorSample;
use crate::fusion::WindEstimate;
use async_trait::async_trait;
use std::{fmt, path::PathBuf};
use strum_macros::Display;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// One accepted sample as written to the log: `direction,speed,extra`.
///
/// Values are truncated toward zero.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SampleRecord {
    direction: i64,
    speed: i64,
    extra: i64,
}

impl SampleRecord {
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(sample: &SensorSample, estimate: &WindEstimate) -> Self {
        Self {
            direction: estimate.direction_deg() as i64,
            speed: estimate.true_speed() as i64,
            extra: i64::from(sample.reserved()),
        }
    }
}

impl fmt::Display for SampleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.direction, self.speed, self.extra)
    }
}

#[derive(Debug, Display)]
pub enum SinkError {
    Io(std::io::Error),
}

impl std::error::Error for SinkError {}

impl From<std::io::Error> for SinkError {
    fn from(value: std::io::Error) -> Self { SinkError::Io(value) }
}

/// Append-only destination for accepted samples.
#[async_trait]
pub trait SampleSink: Send + Sync {
    async fn append(&self, record: &SampleRecord) -> Result<(), SinkError>;
}

/// Line-per-record CSV log file, opened lazily in append mode.
pub struct CsvSampleLog {
    path: PathBuf,
    file: Mutex<Option<tokio::fs::File>>,
}

impl CsvSampleLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self { Self { path: path.into(), file: Mutex::new(None) } }

    pub fn path(&self) -> &PathBuf { &self.path }
}

#[async_trait]
impl SampleSink for CsvSampleLog {
    async fn append(&self, record: &SampleRecord) -> Result<(), SinkError> {
        let mut file_lock = self.file.lock().await;
        if file_lock.is_none() {
            let opened = OpenOptions::new().create(true).append(true).open(&self.path).await?;
            *file_lock = Some(opened);
        }
        let Some(file) = file_lock.as_mut() else {
            return Err(SinkError::Io(std::io::ErrorKind::NotFound.into()));
        };
        let line = format!("{record}\n");
        let res = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if res.is_err() {
            // reopen on the next append
            *file_lock = None;
        }
        Ok(res?)
    }
}
