//! LED and switch endpoints.
//!
//! Both kinds share the open/release path through the [SessionTracker]; they
//! differ only in which of read and write they provide, recorded in
//! [FileCaps].
//!
//! The LED accepts `'1'` and `'0'` as the first byte of a write and ignores any
//! other byte while still consuming it. The switch yields one `"<level>\n"`
//! record per offset reset, then end-of-stream.

use crate::{
    debug_ex,
    dev::{
        chrdev::DevNum,
        gpio::{Level, PinController, PinId},
        io_buffer::{IoBufferReader, IoBufferWriter},
        session::{SessionToken, SessionTracker},
    },
    error::{Error, Result},
};
use alloc::sync::Arc;
use bitflags::bitflags;
use config::dev::{DEVNAME_LED, DEVNAME_SWITCH, MAX_BUFLEN};
use core::{
    fmt::Write,
    sync::atomic::{AtomicBool, Ordering},
};
use num_enum::TryFromPrimitive;

bitflags! {
    /// Handlers an endpoint provides.
    pub struct FileCaps: u8 {
        const OPEN    = 0b0001;
        const READ    = 0b0010;
        const WRITE   = 0b0100;
        const RELEASE = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Led,
    Switch,
}

impl EndpointKind {
    pub fn caps(self) -> FileCaps {
        match self {
            EndpointKind::Led => FileCaps::OPEN | FileCaps::WRITE | FileCaps::RELEASE,
            EndpointKind::Switch => FileCaps::OPEN | FileCaps::READ | FileCaps::RELEASE,
        }
    }

    /// Class name, also the prefix of each node name.
    pub fn name(self) -> &'static str {
        match self {
            EndpointKind::Led => DEVNAME_LED,
            EndpointKind::Switch => DEVNAME_SWITCH,
        }
    }
}

/// Byte understood by the LED endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
enum LedCommand {
    Off = b'0',
    On = b'1',
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Lit,
    Unlit,
}

impl From<Level> for LedState {
    fn from(level: Level) -> Self {
        match level {
            Level::High => LedState::Lit,
            Level::Low => LedState::Unlit,
        }
    }
}

pub struct Endpoint {
    kind: EndpointKind,
    pin: PinId,
    pins: PinController,
    sessions: Arc<SessionTracker>,
    /// Cleared by [Endpoint::retire] before the pin is released.
    live: AtomicBool,
}

impl Endpoint {
    pub fn new(kind: EndpointKind, pin: PinId, pins: PinController, sessions: Arc<SessionTracker>) -> Endpoint {
        Endpoint {
            kind,
            pin,
            pins,
            sessions,
            live: AtomicBool::new(true),
        }
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn caps(&self) -> FileCaps {
        self.kind.caps()
    }

    pub fn open(&self, dev: DevNum) -> Result<SessionToken> {
        self.check_live()?;
        self.sessions.on_open(dev.minor())
    }

    /// Cut the endpoint off from its pin. Sessions still open afterwards get
    /// [Error::NoDevice] from every read and write.
    pub fn retire(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn check_live(&self) -> Result<()> {
        if self.is_live() { Ok(()) } else { Err(Error::NoDevice) }
    }

    pub fn release(&self, token: SessionToken) {
        self.sessions.on_release(token)
    }

    /// Read at `*pos`, advancing it by the bytes produced.
    pub fn read(&self, pos: &mut u64, writer: &mut impl IoBufferWriter) -> Result<usize> {
        self.check_live()?;
        match self.kind {
            EndpointKind::Switch => self.read_switch(pos, writer),
            EndpointKind::Led => Err(Error::NotSupported),
        }
    }

    pub fn write(&self, reader: &mut impl IoBufferReader) -> Result<usize> {
        self.check_live()?;
        match self.kind {
            EndpointKind::Led => self.write_led(reader),
            EndpointKind::Switch => Err(Error::NotSupported),
        }
    }

    /// Current LED state as driven on the pin; `None` for a switch or a
    /// retired endpoint.
    pub fn led_state(&self) -> Option<LedState> {
        match self.kind {
            EndpointKind::Led if self.is_live() => Some(LedState::from(self.pins.read(self.pin))),
            _ => None,
        }
    }

    fn write_led(&self, reader: &mut impl IoBufferReader) -> Result<usize> {
        if reader.is_empty() {
            return Ok(0);
        }
        let mut byte = [0u8; 1];
        reader.read_slice(&mut byte)?;
        match LedCommand::try_from(byte[0]) {
            Ok(LedCommand::On) => self.pins.write(self.pin, Level::High),
            Ok(LedCommand::Off) => self.pins.write(self.pin, Level::Low),
            Err(_) => debug_ex!("LED: ignoring byte {:#04x}.", byte[0]),
        }
        Ok(1)
    }

    fn read_switch(&self, pos: &mut u64, writer: &mut impl IoBufferWriter) -> Result<usize> {
        if *pos > 0 {
            return Ok(0); // End of file
        }
        let level = self.pins.read(self.pin);
        let mut record = heapless::String::<MAX_BUFLEN>::new();
        writeln!(record, "{}", u8::from(level)).map_err(|_| Error::OutOfMemory)?;
        if let Err(err) = writer.write_slice(record.as_bytes()) {
            log::warn!(
                "switch: copying {:?} to the reader failed ({}), reporting an empty read.",
                record.as_str(),
                err
            );
            return Ok(0);
        }
        *pos += record.len() as u64;
        Ok(record.len())
    }
}
