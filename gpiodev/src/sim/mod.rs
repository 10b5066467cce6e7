//! In-memory platform for host-side testing.
//!
//! [SimPlatform] bundles a GPIO chip ([SimGpio]) and a character-device
//! registrar ([SimCharDevs]) that share one [EventLog], so tests can assert
//! the exact order in which the driver touched hardware and registrations.
//! Both halves can be told to fail specific steps.

mod chrdev;
mod gpio;

pub use chrdev::{SimCharDevs, SimFault};
pub use gpio::SimGpio;

use crate::{
    dev::{
        chrdev::{CharDevRegistrar, ClassId, DevNum},
        gpio::{GpioChip, Level, PinId},
        io_buffer::{IoBufferReader, IoBufferWriter},
    },
    error::{Error, Result},
};
use alloc::{sync::Arc, vec::Vec};
use core::mem::take;
use spin::Mutex;

/// One observable platform call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Request(PinId),
    DirectionOutput(PinId, Level),
    DirectionInput(PinId),
    Debounce(PinId, u32),
    SetValue(PinId, Level),
    Export(PinId),
    Unexport(PinId),
    Free(PinId),
    AllocRegion(DevNum, u32),
    UnregisterRegion(DevNum, u32),
    CreateClass(ClassId),
    DestroyClass(ClassId),
    AddCdev(DevNum),
    DelCdev(DevNum),
    CreateDevice(ClassId, DevNum),
    DestroyDevice(ClassId, DevNum),
}

#[derive(Default)]
pub struct EventLog {
    inner: Mutex<Vec<SimEvent>>,
}

impl EventLog {
    fn push(&self, event: SimEvent) {
        self.inner.lock().push(event);
    }

    /// Drain the events recorded so far.
    pub fn take(&self) -> Vec<SimEvent> {
        take(&mut *self.inner.lock())
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

pub struct SimPlatform {
    events: Arc<EventLog>,
    gpio: Arc<SimGpio>,
    devices: Arc<SimCharDevs>,
}

impl SimPlatform {
    pub fn new() -> SimPlatform {
        let events = Arc::new(EventLog::default());
        SimPlatform {
            gpio: Arc::new(SimGpio::new(events.clone())),
            devices: Arc::new(SimCharDevs::new(events.clone())),
            events,
        }
    }

    pub fn chip(&self) -> Arc<dyn GpioChip> {
        self.gpio.clone()
    }

    pub fn registrar(&self) -> Arc<dyn CharDevRegistrar> {
        self.devices.clone()
    }

    pub fn gpio(&self) -> &SimGpio {
        &self.gpio
    }

    pub fn devices(&self) -> &SimCharDevs {
        &self.devices
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller buffer whose memory is unmapped: every copy faults.
pub struct FaultyBuffer {
    len: usize,
}

impl FaultyBuffer {
    /// `len` is the size the caller claims the buffer has.
    pub fn new(len: usize) -> FaultyBuffer {
        FaultyBuffer { len }
    }
}

impl IoBufferReader for FaultyBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn read_slice(&mut self, _out: &mut [u8]) -> Result<()> {
        Err(Error::IoFault)
    }
}

impl IoBufferWriter for FaultyBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn write_slice(&mut self, _data: &[u8]) -> Result<()> {
        Err(Error::IoFault)
    }
}
