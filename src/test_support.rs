//! Scripted in-memory collaborators shared by the module tests.

use crate::acquisition::{BusError, InstrumentBus, LinkStatus, RawReading};
use crate::output::{CharDisplay, SampleRecord, SampleSink, SinkError};
use crate::position::{GroundTrack, PositionError, PositionFeed, PositionSource};
use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

/// One scripted instrument reply.
#[derive(Clone, Copy)]
pub enum BusReply {
    Reading { direction: f64, rotations: u32, reserved: i32 },
    Fail,
    Hang(Duration),
}

/// Instrument bus replaying a script; repeats the last reply once exhausted.
pub struct ScriptedBus {
    script: Mutex<VecDeque<BusReply>>,
    last: Mutex<BusReply>,
}

impl ScriptedBus {
    pub fn new<I: IntoIterator<Item = BusReply>>(script: I) -> Arc<Self> {
        let script: VecDeque<BusReply> = script.into_iter().collect();
        let last = *script.back().unwrap_or(&BusReply::Fail);
        Arc::new(Self { script: Mutex::new(script), last: Mutex::new(last) })
    }
}

impl InstrumentBus for ScriptedBus {
    fn read(&self) -> Result<RawReading, BusError> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            let next = script.pop_front();
            next.unwrap_or(*self.last.lock().unwrap())
        };
        match reply {
            BusReply::Reading { direction, rotations, reserved } => Ok(RawReading {
                direction_deg: direction,
                rotations,
                reserved,
                status: LinkStatus::Ok,
            }),
            BusReply::Fail => Ok(RawReading {
                direction_deg: 0.0,
                rotations: 0,
                reserved: 0,
                status: LinkStatus::Fail,
            }),
            BusReply::Hang(d) => {
                std::thread::sleep(d);
                Err(BusError::Unavailable)
            }
        }
    }
}

type Report = Result<Option<GroundTrack>, PositionError>;

/// Position source whose single feed is driven through a channel.
///
/// Dropping the sender ends the feed. Later opens fail as unreachable.
pub struct ChannelSource {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Report>>>,
    pub opens: AtomicUsize,
}

impl ChannelSource {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<Report>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { rx: Mutex::new(Some(rx)), opens: AtomicUsize::new(0) }), tx)
    }

    pub fn opens(&self) -> usize { self.opens.load(Ordering::SeqCst) }
}

#[async_trait]
impl PositionSource for ChannelSource {
    async fn open(&self) -> Result<Box<dyn PositionFeed>, PositionError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let rx = self.rx.lock().unwrap().take();
        match rx {
            Some(rx) => Ok(Box::new(ChannelFeed { rx })),
            None => Err(PositionError::Unreachable(std::io::ErrorKind::NotFound.into())),
        }
    }
}

struct ChannelFeed {
    rx: mpsc::UnboundedReceiver<Report>,
}

#[async_trait]
impl PositionFeed for ChannelFeed {
    async fn next_report(&mut self) -> Result<Option<GroundTrack>, PositionError> {
        self.rx.recv().await.unwrap_or(Err(PositionError::Closed))
    }
}

/// Position source for a receiver that is never attached.
#[derive(Default)]
pub struct AbsentSource {
    pub opens: AtomicUsize,
}

impl AbsentSource {
    pub fn opens(&self) -> usize { self.opens.load(Ordering::SeqCst) }
}

#[async_trait]
impl PositionSource for AbsentSource {
    async fn open(&self) -> Result<Box<dyn PositionFeed>, PositionError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Err(PositionError::Unreachable(std::io::ErrorKind::ConnectionRefused.into()))
    }
}

/// Display recording every plotted frame. Fails while `broken` is non-zero.
#[derive(Default)]
pub struct MemoryDisplay {
    pub frames: Mutex<Vec<(String, String)>>,
    pub inits: AtomicUsize,
    pub broken: AtomicUsize,
}

impl MemoryDisplay {
    pub fn frames(&self) -> Vec<(String, String)> { self.frames.lock().unwrap().clone() }
    pub fn inits(&self) -> usize { self.inits.load(Ordering::SeqCst) }
    pub fn set_broken(&self, broken: bool) { self.broken.store(usize::from(broken), Ordering::SeqCst) }

    fn check(&self) -> std::io::Result<()> {
        if self.broken.load(Ordering::SeqCst) > 0 {
            Err(std::io::ErrorKind::BrokenPipe.into())
        } else {
            Ok(())
        }
    }
}

impl CharDisplay for Arc<MemoryDisplay> {
    fn initialize(&mut self) -> std::io::Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    fn plot(&mut self, top: &str, bottom: &str) -> std::io::Result<()> {
        self.check()?;
        self.frames.lock().unwrap().push((String::from(top), String::from(bottom)));
        Ok(())
    }
}

/// Sample sink keeping records in memory.
#[derive(Default)]
pub struct MemorySink {
    pub records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<String> { self.records.lock().unwrap().clone() }
}

#[async_trait]
impl SampleSink for MemorySink {
    async fn append(&self, record: &SampleRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.to_string());
        Ok(())
    }
}
