//! Console logging for the wind loop.
//!
//! Every line carries a colored level tag and a UTC wall-clock stamp with
//! millisecond resolution, so cycle-level `event!` traces at sub-second cadence
//! stay ordered when read back. `error!` goes to standard error, all other levels
//! to standard output. `fatal!` panics after formatting its message.
use std::{fmt, sync::OnceLock};

/// Environment variable enabling per-cycle [`event!`] output.
pub const EVENT_LOG_VAR: &str = "TRUEWIND_LOG_EVENTS";

/// Whether [`event!`] lines are printed. Read once per process.
pub fn events_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os(EVENT_LOG_VAR).is_some_and(|v| v != "0"))
}

/// Builds one log line from an ANSI color code, a level tag and the message.
pub fn format_line(color: &str, level: &str, msg: fmt::Arguments<'_>) -> String {
    format!("\x1b[{color}m{level:<5}|{}|\x1b[0m {msg}", chrono::Utc::now().format("%H:%M:%S%.3f"))
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("{}", $crate::logger::format_line("32", "INFO", format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("{}", $crate::logger::format_line("33", "LOG", format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("{}", $crate::logger::format_line("35", "WARN", format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        eprintln!("{}", $crate::logger::format_line("31", "ERROR", format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("{}", $crate::logger::format_line("1;31", "FATAL", format_args!($($arg)*)))
    };
}

/// Per-cycle trace, printed only if [`EVENT_LOG_VAR`] is set to anything but `0`.
#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if $crate::logger::events_enabled() {
            println!("{}", $crate::logger::format_line("36", "EVENT", format_args!($($arg)*)))
        }
    };
}
