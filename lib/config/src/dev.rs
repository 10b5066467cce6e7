//! Fixed identity of the exposed devices.

/// Class and node prefix of the LED endpoint.
pub const DEVNAME_LED: &str = "myled";
/// Class and node prefix of the switch endpoint.
pub const DEVNAME_SWITCH: &str = "myswitch";

/// First minor handed out in each class.
pub const DEV_MINOR: u32 = 0;

/// Number of LED endpoint instances.
pub const NUM_DEV_LED: u32 = 1;
/// Number of switch endpoint instances.
pub const NUM_DEV_SWITCH: u32 = 1;
/// Control blocks needed for all endpoint instances.
pub const NUM_DEV_TOTAL: u32 = NUM_DEV_LED + NUM_DEV_SWITCH;

/// Sessions that may be open at once across all endpoints.
pub const MAX_SESSIONS: usize = 1024;

/// Upper bound on a rendered switch record.
pub const MAX_BUFLEN: usize = 64;
