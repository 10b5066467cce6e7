//! Output sink for log lines.
//!
//! The hosting environment registers a [Console] once; until then everything
//! printed is discarded.

use core::fmt::{Arguments, Error, Write};
use spin::Once;

pub trait Console: Sync {
    fn put_str(&self, s: &str);
}

static CONSOLE: Once<&'static dyn Console> = Once::new();

/// Install the console. Later calls keep the first console.
pub fn set_console(console: &'static dyn Console) {
    CONSOLE.call_once(|| console);
}

struct ConsoleOut(&'static dyn Console);

impl Write for ConsoleOut {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.put_str(s);
        Ok(())
    }
}

pub fn console_print(args: Arguments) -> Result<(), Error> {
    match CONSOLE.get() {
        Some(console) => ConsoleOut(*console).write_fmt(args),
        None => Ok(()),
    }
}

#[macro_export]
macro_rules! kprintln {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        let _ = $crate::console::console_print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?));
    }
}
