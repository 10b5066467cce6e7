//! LED and switch GPIO lines exposed as character devices.
//!
//! [GpioDevices::load] claims both lines and registers the `myled` and
//! `myswitch` endpoints with the platform; dropping the returned value (or
//! calling [GpioDevices::unload]) tears everything down again. The platform is
//! reached only through the [GpioChip] and [CharDevRegistrar] traits.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub mod console;
#[macro_use]
pub mod logging;
pub mod params;
pub mod dev;
pub mod error;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use params::DriverConfig;
pub use dev::{
    chrdev::{CharDevRegistrar, DevNum},
    gpio::{GpioChip, Level, PinId},
    registry::GpioDevices,
};
pub use error::{Error, Result};
