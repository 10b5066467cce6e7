use super::{EventLog, SimEvent};
use crate::dev::gpio::{Direction, GpioChip, GpioError, Level, PinId};
use alloc::{
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::String,
    sync::Arc,
};
use spin::Mutex;

/// Lines `0..DEFAULT_NGPIO` exist unless changed with [SimGpio::set_ngpio].
const DEFAULT_NGPIO: u32 = 256;

#[derive(Default)]
struct Line {
    owner: Option<String>,
    direction: Option<Direction>,
    level: Option<Level>,
    debounce_ms: Option<u32>,
    exported: bool,
}

struct GpioState {
    ngpio: u32,
    lines: BTreeMap<PinId, Line>,
    debounce_supported: bool,
    rejected: BTreeSet<PinId>,
}

/// Simulated GPIO controller.
pub struct SimGpio {
    state: Mutex<GpioState>,
    events: Arc<EventLog>,
}

impl SimGpio {
    pub(super) fn new(events: Arc<EventLog>) -> SimGpio {
        SimGpio {
            state: Mutex::new(GpioState {
                ngpio: DEFAULT_NGPIO,
                lines: BTreeMap::new(),
                debounce_supported: true,
                rejected: BTreeSet::new(),
            }),
            events,
        }
    }

    /// Set the physical level of a line, as a wire or a pressed switch would.
    pub fn drive(&self, pin: PinId, level: Level) {
        self.state.lock().lines.entry(pin).or_default().level = Some(level);
    }

    /// Hardware readback of a line. Lines never driven read low.
    pub fn level(&self, pin: PinId) -> Level {
        self.state
            .lock()
            .lines
            .get(&pin)
            .and_then(|line| line.level)
            .unwrap_or(Level::Low)
    }

    pub fn is_claimed(&self, pin: PinId) -> bool {
        self.with_line(pin, |line| line.owner.is_some())
    }

    pub fn owner(&self, pin: PinId) -> Option<String> {
        self.with_line(pin, |line| line.owner.clone())
    }

    pub fn is_exported(&self, pin: PinId) -> bool {
        self.with_line(pin, |line| line.exported)
    }

    pub fn direction(&self, pin: PinId) -> Option<Direction> {
        self.with_line(pin, |line| line.direction)
    }

    pub fn debounce_ms(&self, pin: PinId) -> Option<u32> {
        self.with_line(pin, |line| line.debounce_ms)
    }

    /// Only lines below `ngpio` are valid.
    pub fn set_ngpio(&self, ngpio: u32) {
        self.state.lock().ngpio = ngpio;
    }

    pub fn set_debounce_supported(&self, supported: bool) {
        self.state.lock().debounce_supported = supported;
    }

    /// Make every direction change on `pin` fail.
    pub fn reject_direction(&self, pin: PinId) {
        self.state.lock().rejected.insert(pin);
    }

    /// Claim `pin` on behalf of another consumer.
    pub fn claim_externally(&self, pin: PinId, owner: &str) {
        self.state.lock().lines.entry(pin).or_default().owner = Some(String::from(owner));
    }

    fn with_line<R: Default>(&self, pin: PinId, f: impl FnOnce(&Line) -> R) -> R {
        self.state.lock().lines.get(&pin).map(f).unwrap_or_default()
    }

    fn set_direction(&self, pin: PinId, direction: Direction) -> Result<(), GpioError> {
        let mut state = self.state.lock();
        if state.rejected.contains(&pin) {
            return Err(GpioError::Unsupported);
        }
        state.lines.entry(pin).or_default().direction = Some(direction);
        Ok(())
    }
}

impl GpioChip for SimGpio {
    fn is_valid(&self, pin: PinId) -> bool {
        pin.value() < self.state.lock().ngpio
    }

    fn request(&self, pin: PinId, label: &str) -> Result<(), GpioError> {
        if !self.is_valid(pin) {
            return Err(GpioError::InvalidLine);
        }
        {
            let mut state = self.state.lock();
            let line = state.lines.entry(pin).or_default();
            if line.owner.is_some() {
                return Err(GpioError::Busy);
            }
            line.owner = Some(String::from(label));
        }
        self.events.push(SimEvent::Request(pin));
        Ok(())
    }

    fn direction_output(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        self.set_direction(pin, Direction::Output)?;
        self.drive(pin, level);
        self.events.push(SimEvent::DirectionOutput(pin, level));
        Ok(())
    }

    fn direction_input(&self, pin: PinId) -> Result<(), GpioError> {
        self.set_direction(pin, Direction::Input)?;
        self.events.push(SimEvent::DirectionInput(pin));
        Ok(())
    }

    fn set_debounce(&self, pin: PinId, debounce_ms: u32) -> Result<(), GpioError> {
        {
            let mut state = self.state.lock();
            if !state.debounce_supported {
                return Err(GpioError::Unsupported);
            }
            state.lines.entry(pin).or_default().debounce_ms = Some(debounce_ms);
        }
        self.events.push(SimEvent::Debounce(pin, debounce_ms));
        Ok(())
    }

    fn get_value(&self, pin: PinId) -> Level {
        self.level(pin)
    }

    fn set_value(&self, pin: PinId, level: Level) {
        self.drive(pin, level);
        self.events.push(SimEvent::SetValue(pin, level));
    }

    fn export(&self, pin: PinId) -> Result<(), GpioError> {
        self.state.lock().lines.entry(pin).or_default().exported = true;
        self.events.push(SimEvent::Export(pin));
        Ok(())
    }

    fn unexport(&self, pin: PinId) {
        self.state.lock().lines.entry(pin).or_default().exported = false;
        self.events.push(SimEvent::Unexport(pin));
    }

    fn free(&self, pin: PinId) {
        if let Some(line) = self.state.lock().lines.get_mut(&pin) {
            line.owner = None;
            line.direction = None;
            line.debounce_ms = None;
        }
        self.events.push(SimEvent::Free(pin));
    }
}
