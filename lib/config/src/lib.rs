//! Compile-time configuration of the GPIO character devices.
//!
//! Board wiring is generated by the build script from `boards.json`; pick a
//! board with the `GPIODEV_BOARD` variable at build time.

#![no_std]
#![deny(missing_docs)]

/// Pin wiring of the selected board.
pub mod board {
    include!(concat!(env!("OUT_DIR"), "/board.rs"));
}

pub mod dev;
