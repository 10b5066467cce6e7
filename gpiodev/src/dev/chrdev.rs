//! Device identities and the platform's character-device registration
//! capability.

use crate::{dev::{endpoint::Endpoint, handle::HandleRef}, error::errno};
use core::fmt::Display;
use utils::define_id;

define_id!(
    /// Driver number shared by all minors of one allocated range.
    Major, u32
);
define_id!(
    /// Instance number within a range.
    Minor, u32
);
define_id!(
    /// Platform handle of a device class.
    ClassId, usize
);

/// (major, minor) pair naming one registered endpoint instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DevNum {
    major: Major,
    minor: Minor,
}

impl DevNum {
    pub const fn new(major: Major, minor: Minor) -> DevNum {
        DevNum { major, minor }
    }

    pub const fn major(self) -> Major {
        self.major
    }

    pub const fn minor(self) -> Minor {
        self.minor
    }

    /// Identity `n` minors after this one, same major. `None` past the last
    /// minor.
    pub const fn offset(self, n: u32) -> Option<DevNum> {
        match self.minor.value().checked_add(n) {
            Some(minor) => Some(DevNum {
                major: self.major,
                minor: Minor::new(minor),
            }),
            None => None,
        }
    }
}

impl Display for DevNum {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Reasons the platform refuses a registration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// No free major, or the requested minors are taken.
    NoSpace,
    /// A class, cdev or node with this name or number exists.
    AlreadyExists,
    InvalidName,
    OutOfMemory,
}

impl RegistrationError {
    /// Positive status code for this error.
    pub fn code(&self) -> i32 {
        match self {
            RegistrationError::NoSpace => errno::EBUSY,
            RegistrationError::AlreadyExists => errno::EEXIST,
            RegistrationError::InvalidName => errno::EINVAL,
            RegistrationError::OutOfMemory => errno::ENOMEM,
        }
    }
}

/// Device-registration capability provided by the platform.
///
/// The platform dispatches opens on a registered identity to the endpoint
/// behind the [HandleRef] it was given in [CharDevRegistrar::add_cdev].
pub trait CharDevRegistrar: Send + Sync {
    /// Reserve `count` consecutive minors from `base_minor` under a major the
    /// platform picks. Returns the first identity of the range.
    fn alloc_region(&self, base_minor: Minor, count: u32, name: &str) -> Result<DevNum, RegistrationError>;
    fn unregister_region(&self, first: DevNum, count: u32);
    fn create_class(&self, name: &str) -> Result<ClassId, RegistrationError>;
    fn destroy_class(&self, class: ClassId);
    /// Make `dev` live: opens on it reach `endpoint`.
    fn add_cdev(&self, dev: DevNum, endpoint: HandleRef<Endpoint>) -> Result<(), RegistrationError>;
    fn del_cdev(&self, dev: DevNum);
    /// Expose a node called `name` for `dev` under `class`.
    fn create_device(&self, class: ClassId, dev: DevNum, name: &str) -> Result<(), RegistrationError>;
    fn destroy_device(&self, class: ClassId, dev: DevNum);
}
