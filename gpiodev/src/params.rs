//! Driver configuration assembled from the compile-time board constants.

use crate::{
    dev::{chrdev::Minor, endpoint::EndpointKind, gpio::PinId},
    error::{Error, Result},
};
use config::{board, dev};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Consumer label used when claiming lines.
    pub label: &'static str,
    pub led_pin: PinId,
    pub switch_pin: PinId,
    pub debounce_ms: u32,
    /// First minor of each class.
    pub base_minor: Minor,
    pub led_count: u32,
    pub switch_count: u32,
    /// Opens beyond this many live sessions fail.
    pub max_sessions: usize,
}

impl DriverConfig {
    pub fn pin(&self, kind: EndpointKind) -> PinId {
        match kind {
            EndpointKind::Led => self.led_pin,
            EndpointKind::Switch => self.switch_pin,
        }
    }

    /// Endpoint instances of `kind`.
    pub fn count(&self, kind: EndpointKind) -> u32 {
        match kind {
            EndpointKind::Led => self.led_count,
            EndpointKind::Switch => self.switch_count,
        }
    }

    /// Instances across both kinds; [Error::OutOfMemory] if that does not
    /// fit a `u32`.
    pub fn total(&self) -> Result<u32> {
        self.led_count
            .checked_add(self.switch_count)
            .ok_or(Error::OutOfMemory)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            label: board::BOARD_LABEL,
            led_pin: PinId::new(board::LED_PIN),
            switch_pin: PinId::new(board::SWITCH_PIN),
            debounce_ms: board::DEBOUNCE_MS,
            base_minor: Minor::new(dev::DEV_MINOR),
            led_count: dev::NUM_DEV_LED,
            switch_count: dev::NUM_DEV_SWITCH,
            max_sessions: dev::MAX_SESSIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_board_wiring() {
        let config = DriverConfig::default();
        assert_eq!(config.pin(EndpointKind::Led), PinId::new(board::LED_PIN));
        assert_eq!(config.pin(EndpointKind::Switch), PinId::new(board::SWITCH_PIN));
        assert_eq!(config.debounce_ms, board::DEBOUNCE_MS);
        assert_eq!(config.base_minor, Minor::new(0));
        assert_eq!(config.total(), Ok(dev::NUM_DEV_TOTAL));
    }

    #[test]
    fn total_overflow_is_out_of_memory() {
        let config = DriverConfig {
            led_count: u32::MAX,
            switch_count: 1,
            ..DriverConfig::default()
        };
        assert_eq!(config.total(), Err(Error::OutOfMemory));
    }
}
