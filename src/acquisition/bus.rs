use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    os::fd::AsRawFd,
    path::PathBuf,
    sync::Mutex,
};
use strum_macros::Display;

/// Link status word reported by the remote instrument.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum LinkStatus {
    Ok,
    Fail,
}

/// Decoded instrument reply: `(direction, rotations, reserved, status)`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct RawReading {
    pub direction_deg: f64,
    pub rotations: u32,
    pub reserved: i32,
    pub status: LinkStatus,
}

#[derive(Debug, Display)]
pub enum BusError {
    Io(std::io::Error),
    ShortFrame(usize),
    Unavailable,
}

impl std::error::Error for BusError {}

impl From<std::io::Error> for BusError {
    fn from(value: std::io::Error) -> Self {
        if value.kind() == std::io::ErrorKind::UnexpectedEof {
            BusError::ShortFrame(0)
        } else {
            BusError::Io(value)
        }
    }
}

/// Blocking request/response access to the remote instrument.
///
/// Implementations may block; callers bound the latency themselves.
pub trait InstrumentBus: Send + Sync + 'static {
    fn read(&self) -> Result<RawReading, BusError>;
}

/// Instrument bus on a Linux I2C character device.
///
/// The device is opened lazily and reopened after an I/O error, so a detached
/// bus shows up as failed reads instead of a startup error. The reply frame
/// consists of four little-endian `i16` words.
pub struct I2cBus {
    path: PathBuf,
    address: u16,
    device: Mutex<Option<File>>,
}

impl I2cBus {
    /// `I2C_SLAVE` request code from `linux/i2c-dev.h`.
    const I2C_SLAVE: u16 = 0x0703;
    const REQUEST_CMD: u8 = 0x01;
    const FRAME_LEN: usize = 8;
    const STATUS_OK: i16 = 1;

    pub fn new<P: Into<PathBuf>>(path: P, address: u16) -> Self {
        Self { path: path.into(), address, device: Mutex::new(None) }
    }

    /// Opens the character device and binds it to the instrument address.
    fn open_device(&self) -> Result<File, BusError> {
        let device = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let res = unsafe {
            libc::ioctl(device.as_raw_fd(), Self::I2C_SLAVE.into(), libc::c_ulong::from(self.address))
        };
        if res < 0 {
            return Err(BusError::Io(std::io::Error::last_os_error()));
        }
        Ok(device)
    }

    fn transact(device: &mut File) -> Result<RawReading, BusError> {
        device.write_all(&[Self::REQUEST_CMD])?;
        let mut frame = [0u8; Self::FRAME_LEN];
        device.read_exact(&mut frame)?;
        Self::decode(&frame)
    }

    /// Decodes a reply frame.
    pub fn decode(frame: &[u8]) -> Result<RawReading, BusError> {
        if frame.len() < Self::FRAME_LEN {
            return Err(BusError::ShortFrame(frame.len()));
        }
        let word = |i: usize| i16::from_le_bytes([frame[2 * i], frame[2 * i + 1]]);
        let status = if word(3) == Self::STATUS_OK { LinkStatus::Ok } else { LinkStatus::Fail };
        Ok(RawReading {
            direction_deg: f64::from(word(0)),
            rotations: u32::try_from(word(1)).unwrap_or(0),
            reserved: i32::from(word(2)),
            status,
        })
    }
}

impl InstrumentBus for I2cBus {
    fn read(&self) -> Result<RawReading, BusError> {
        let mut device_lock = self.device.lock().map_err(|_| BusError::Unavailable)?;
        if device_lock.is_none() {
            *device_lock = Some(self.open_device()?);
        }
        let Some(device) = device_lock.as_mut() else {
            return Err(BusError::Unavailable);
        };
        let res = Self::transact(device);
        if matches!(res, Err(BusError::Io(_))) {
            *device_lock = None;
        }
        res
    }
}
