//! Character devices backed by GPIO lines.

pub mod chrdev;
pub mod endpoint;
pub mod file;
pub mod gpio;
pub mod handle;
pub mod io_buffer;
pub mod registry;
pub mod session;
