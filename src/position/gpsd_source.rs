use super::{GroundTrack, PositionError, PositionFeed, PositionSource};
use crate::event;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::TcpStream,
};

/// Position source backed by a `gpsd` daemon speaking its JSON protocol.
pub struct GpsdSource {
    addr: String,
}

/// Relevant subset of a gpsd report object.
#[derive(Debug, Deserialize)]
struct GpsdReport {
    class: String,
    #[serde(default)]
    mode: u8,
    speed: Option<f64>,
    track: Option<f64>,
}

/// Classification of one gpsd protocol line.
#[derive(Debug, PartialEq)]
pub enum GpsdMessage {
    /// A time-position-velocity report, with a ground track if it holds a fix.
    Tpv(Option<GroundTrack>),
    Other,
}

impl GpsdMessage {
    /// Lowest `mode` value of a TPV report that denotes a fix.
    const MIN_FIX_MODE: u8 = 2;

    /// Classifies one line of the gpsd JSON protocol.
    ///
    /// # Errors
    /// [`PositionError::Malformed`] if the line is not a JSON report object.
    pub fn parse(line: &str) -> Result<Self, PositionError> {
        let report = serde_json::from_str::<GpsdReport>(line).map_err(PositionError::Malformed)?;
        if report.class != "TPV" {
            return Ok(GpsdMessage::Other);
        }
        Ok(match report.speed {
            Some(speed) if report.mode >= Self::MIN_FIX_MODE => GpsdMessage::Tpv(Some(GroundTrack {
                speed_mps: speed,
                track_deg: report.track.unwrap_or(0.0),
            })),
            _ => GpsdMessage::Tpv(None),
        })
    }
}

impl GpsdSource {
    const WATCH_CMD: &'static [u8] = b"?WATCH={\"enable\":true,\"json\":true}\n";

    pub fn new(addr: &str) -> Self { Self { addr: String::from(addr) } }
}

#[async_trait]
impl PositionSource for GpsdSource {
    async fn open(&self) -> Result<Box<dyn PositionFeed>, PositionError> {
        let mut stream = TcpStream::connect(&self.addr).await.map_err(PositionError::Unreachable)?;
        stream.write_all(Self::WATCH_CMD).await?;
        Ok(Box::new(GpsdFeed { lines: BufReader::new(stream).lines() }))
    }
}

struct GpsdFeed {
    lines: Lines<BufReader<TcpStream>>,
}

#[async_trait]
impl PositionFeed for GpsdFeed {
    async fn next_report(&mut self) -> Result<Option<GroundTrack>, PositionError> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Err(PositionError::Closed);
            };
            match GpsdMessage::parse(&line) {
                Ok(GpsdMessage::Tpv(track)) => return Ok(track),
                Ok(GpsdMessage::Other) => {}
                Err(e) => event!("Skipping gpsd line: {e}"),
            }
        }
    }
}
