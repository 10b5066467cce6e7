//! Error types surfaced by the driver.
//!
//! Every error maps to a negative status code through [Error::errno], which is
//! what a failed load or I/O call reports to the caller.

use crate::dev::{chrdev::RegistrationError, gpio::{GpioError, PinId}};
use core::fmt::{Debug, Display};

/// Status codes reported to callers (negated).
pub mod errno {
    pub const ENOMEM: i32 = 12;
    pub const EFAULT: i32 = 14;
    pub const EBUSY: i32 = 16;
    pub const EEXIST: i32 = 17;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A GPIO line could not be used.
    ResourceUnavailable { pin: PinId, cause: Unavailable },
    /// Copying from or to the caller's buffer failed.
    IoFault,
    /// A session token or control block could not be allocated.
    OutOfMemory,
    /// The endpoint has no handler for the requested operation.
    NotSupported,
    /// The device identity is not (or no longer) registered.
    NoDevice,
    /// The platform refused a registration step.
    Registration(RegistrationError),
}

/// Why a pin could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The platform does not know this line.
    Invalid,
    /// Another consumer holds the line.
    Claimed,
    /// The line exists but refused the requested configuration.
    Rejected,
}

impl Error {
    /// Negative status code for this error.
    pub fn errno(&self) -> i32 {
        let code = match self {
            Error::ResourceUnavailable { cause: Unavailable::Invalid, .. } => errno::ENODEV,
            Error::ResourceUnavailable { .. } => errno::EBUSY,
            Error::IoFault => errno::EFAULT,
            Error::OutOfMemory => errno::ENOMEM,
            Error::NotSupported => errno::EINVAL,
            Error::NoDevice => errno::ENODEV,
            Error::Registration(err) => err.code(),
        };
        -code
    }

    pub(crate) fn pin(pin: PinId, err: GpioError) -> Error {
        let cause = match err {
            GpioError::InvalidLine => Unavailable::Invalid,
            GpioError::Busy => Unavailable::Claimed,
            GpioError::Unsupported => Unavailable::Rejected,
        };
        Error::ResourceUnavailable { pin, cause }
    }
}

impl From<RegistrationError> for Error {
    fn from(err: RegistrationError) -> Self {
        Error::Registration(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::ResourceUnavailable { pin, cause } => {
                write!(f, "GPIO {} unavailable ({:?})", pin, cause)
            }
            Error::IoFault => f.write_str("bad user buffer"),
            Error::OutOfMemory => f.write_str("out of memory"),
            Error::NotSupported => f.write_str("operation not supported"),
            Error::NoDevice => f.write_str("no such device"),
            Error::Registration(err) => write!(f, "registration failed: {:?}", err),
        }?;
        write!(f, " [{}]", self.errno())
    }
}
