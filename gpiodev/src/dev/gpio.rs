//! Pin controller: validates GPIO lines, claims and configures them, and
//! reads or drives their level.
//!
//! The platform side is the [GpioChip] trait. [PinController] is a thin,
//! cloneable wrapper over a chip; claiming a line through it yields a
//! [ClaimedPin] guard that gives the line back when dropped. Output lines are
//! driven low before they are released so an LED never stays lit.

use crate::{
    debug_ex,
    error::{Error, Result},
};
use alloc::sync::Arc;
use core::fmt::Debug;
use num_enum::IntoPrimitive;
use utils::define_id;

define_id!(
    /// Platform number of a GPIO line.
    PinId, u32
);

/// Logic level of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum Level {
    Low = 0,
    High = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Failures reported by a [GpioChip].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The line number does not exist on this platform.
    InvalidLine,
    /// The line is claimed by another consumer.
    Busy,
    /// The chip cannot perform the requested configuration.
    Unsupported,
}

/// GPIO capability provided by the platform.
///
/// Implementations must make single-line reads and writes atomic; nothing
/// above this trait serialises access to a line.
pub trait GpioChip: Send + Sync {
    fn is_valid(&self, pin: PinId) -> bool;
    fn request(&self, pin: PinId, label: &str) -> core::result::Result<(), GpioError>;
    fn direction_output(&self, pin: PinId, level: Level) -> core::result::Result<(), GpioError>;
    fn direction_input(&self, pin: PinId) -> core::result::Result<(), GpioError>;
    fn set_debounce(&self, pin: PinId, debounce_ms: u32) -> core::result::Result<(), GpioError>;
    /// Post-debounce level of the line.
    fn get_value(&self, pin: PinId) -> Level;
    fn set_value(&self, pin: PinId, level: Level);
    /// Publish the line to userspace inspection; direction changes stay locked.
    fn export(&self, pin: PinId) -> core::result::Result<(), GpioError>;
    fn unexport(&self, pin: PinId);
    fn free(&self, pin: PinId);
}

#[derive(Clone)]
pub struct PinController {
    chip: Arc<dyn GpioChip>,
    label: &'static str,
}

impl PinController {
    /// `label` names the consumer when lines are claimed.
    pub fn new(chip: Arc<dyn GpioChip>, label: &'static str) -> PinController {
        PinController { chip, label }
    }

    pub fn validate(&self, pin: PinId) -> Result<()> {
        if self.chip.is_valid(pin) {
            Ok(())
        } else {
            Err(Error::pin(pin, GpioError::InvalidLine))
        }
    }

    /// Claim `pin` as an output driven low.
    pub fn configure_output(&self, pin: PinId) -> Result<ClaimedPin> {
        let mut claim = self.claim(pin)?;
        self.chip
            .direction_output(pin, Level::Low)
            .map_err(|err| Error::pin(pin, err))?;
        claim.direction = Some(Direction::Output);
        claim.export();
        debug_ex!("GPIO {} configured as output.", pin);
        Ok(claim)
    }

    /// Claim `pin` as an input filtered by `debounce_ms`.
    ///
    /// A chip without debounce support still yields a usable input.
    pub fn configure_input(&self, pin: PinId, debounce_ms: u32) -> Result<ClaimedPin> {
        let mut claim = self.claim(pin)?;
        self.chip
            .direction_input(pin)
            .map_err(|err| Error::pin(pin, err))?;
        claim.direction = Some(Direction::Input);
        match self.chip.set_debounce(pin, debounce_ms) {
            Ok(()) => claim.debounce_ms = Some(debounce_ms),
            Err(GpioError::Unsupported) => {
                log::warn!("GPIO {}: debounce of {} ms not supported.", pin, debounce_ms)
            }
            Err(err) => return Err(Error::pin(pin, err)),
        }
        claim.export();
        debug_ex!("GPIO {} configured as input.", pin);
        Ok(claim)
    }

    pub fn read(&self, pin: PinId) -> Level {
        self.chip.get_value(pin)
    }

    pub fn write(&self, pin: PinId, level: Level) {
        self.chip.set_value(pin, level)
    }

    fn claim(&self, pin: PinId) -> Result<ClaimedPin> {
        self.validate(pin)?;
        self.chip
            .request(pin, self.label)
            .map_err(|err| Error::pin(pin, err))?;
        Ok(ClaimedPin {
            ctl: self.clone(),
            pin,
            direction: None,
            debounce_ms: None,
            exported: false,
        })
    }
}

/// A line held by this driver. Dropping it releases the line.
pub struct ClaimedPin {
    ctl: PinController,
    pin: PinId,
    direction: Option<Direction>,
    debounce_ms: Option<u32>,
    exported: bool,
}

impl ClaimedPin {
    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Debounce applied to an input line, if the chip accepted it.
    pub fn debounce_ms(&self) -> Option<u32> {
        self.debounce_ms
    }

    pub fn release(self) {}

    fn export(&mut self) {
        match self.ctl.chip.export(self.pin) {
            Ok(()) => self.exported = true,
            Err(err) => log::warn!("GPIO {}: export failed ({:?}).", self.pin, err),
        }
    }
}

impl Drop for ClaimedPin {
    fn drop(&mut self) {
        let chip = &self.ctl.chip;
        if self.direction == Some(Direction::Output) {
            chip.set_value(self.pin, Level::Low);
        }
        if self.exported {
            chip.unexport(self.pin);
        }
        chip.free(self.pin);
        debug_ex!("GPIO {} released.", self.pin);
    }
}

impl Debug for ClaimedPin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClaimedPin")
            .field("pin", &self.pin)
            .field("direction", &self.direction)
            .field("debounce_ms", &self.debounce_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Unavailable,
        sim::{SimEvent, SimPlatform},
    };

    const LED: PinId = PinId::new(13);
    const SW: PinId = PinId::new(17);

    fn controller() -> (SimPlatform, PinController) {
        let sim = SimPlatform::new();
        let ctl = PinController::new(sim.chip(), "test");
        (sim, ctl)
    }

    #[test]
    fn output_starts_low_and_is_exported() {
        let (sim, ctl) = controller();
        sim.gpio().drive(LED, Level::High);
        let led = ctl.configure_output(LED).unwrap();
        assert_eq!(led.direction(), Some(Direction::Output));
        assert_eq!(sim.gpio().level(LED), Level::Low);
        assert!(sim.gpio().is_claimed(LED));
        assert!(sim.gpio().is_exported(LED));
    }

    #[test]
    fn write_then_hardware_readback_round_trips() {
        let (sim, ctl) = controller();
        let _led = ctl.configure_output(LED).unwrap();
        for level in [Level::High, Level::Low, Level::High] {
            ctl.write(LED, level);
            assert_eq!(sim.gpio().level(LED), level);
        }
    }

    #[test]
    fn input_applies_debounce_and_reads_line() {
        let (sim, ctl) = controller();
        let sw = ctl.configure_input(SW, 50).unwrap();
        assert_eq!(sw.debounce_ms(), Some(50));
        assert_eq!(sim.gpio().debounce_ms(SW), Some(50));
        sim.gpio().drive(SW, Level::High);
        assert_eq!(ctl.read(SW), Level::High);
        sim.gpio().drive(SW, Level::Low);
        assert_eq!(ctl.read(SW), Level::Low);
    }

    #[test]
    fn missing_debounce_support_is_not_fatal() {
        let (sim, ctl) = controller();
        sim.gpio().set_debounce_supported(false);
        let sw = ctl.configure_input(SW, 50).unwrap();
        assert_eq!(sw.debounce_ms(), None);
        assert_eq!(sw.direction(), Some(Direction::Input));
    }

    #[test]
    fn invalid_line_is_unavailable() {
        let (_sim, ctl) = controller();
        let err = ctl.configure_output(PinId::new(999)).unwrap_err();
        assert_eq!(
            err,
            Error::ResourceUnavailable { pin: PinId::new(999), cause: Unavailable::Invalid }
        );
        assert_eq!(err.errno(), -19);
    }

    #[test]
    fn claimed_line_is_unavailable() {
        let (_sim, ctl) = controller();
        let _first = ctl.configure_output(LED).unwrap();
        let err = ctl.configure_output(LED).unwrap_err();
        assert_eq!(
            err,
            Error::ResourceUnavailable { pin: LED, cause: Unavailable::Claimed }
        );
        assert_eq!(err.errno(), -16);
    }

    #[test]
    fn failed_direction_gives_the_line_back() {
        let (sim, ctl) = controller();
        sim.gpio().reject_direction(SW);
        assert!(ctl.configure_input(SW, 50).is_err());
        assert!(!sim.gpio().is_claimed(SW));
    }

    #[test]
    fn releasing_output_drives_low_first() {
        let (sim, ctl) = controller();
        let led = ctl.configure_output(LED).unwrap();
        ctl.write(LED, Level::High);
        sim.events().clear();
        led.release();
        assert_eq!(
            sim.events().take(),
            [
                SimEvent::SetValue(LED, Level::Low),
                SimEvent::Unexport(LED),
                SimEvent::Free(LED),
            ]
        );
        assert_eq!(sim.gpio().level(LED), Level::Low);
        assert!(!sim.gpio().is_claimed(LED));
    }

    #[test]
    fn releasing_input_leaves_level_alone() {
        let (sim, ctl) = controller();
        let sw = ctl.configure_input(SW, 50).unwrap();
        sim.events().clear();
        drop(sw);
        assert_eq!(sim.events().take(), [SimEvent::Unexport(SW), SimEvent::Free(SW)]);
    }
}
