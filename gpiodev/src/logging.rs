use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, set_logger, set_max_level};

use crate::console::{Console, set_console};

/// Prefix printed before every driver log line.
const LOG_PREFIX: &str = "gpiodev";

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // Red
            Level::Warn => 93,  // BrightYellow
            Level::Info => 20,  // White
            Level::Debug => 32, // Green
            Level::Trace => 90, // BrightBlack
        };
        crate::kprintln!(
            "\u{1B}[{}m[{:}] {}: {}\u{1B}[0m",
            color,
            record.level(),
            LOG_PREFIX,
            record.args(),
        );
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

/// Route `log` records to `console`, keeping records up to `level`.
///
/// Fails if another logger was installed first.
pub fn try_init(console: &'static dyn Console, level: LevelFilter) -> Result<(), SetLoggerError> {
    set_console(console);
    set_logger(&LOGGER)?;
    set_max_level(level);
    Ok(())
}

/// Improved debug macro,
/// only compiled in debug mode.
#[macro_export]
macro_rules! debug_ex {
    ($($arg:tt)+) => {{
        #[cfg(debug_assertions)]
        log::debug!($($arg)+);
    }}
}
