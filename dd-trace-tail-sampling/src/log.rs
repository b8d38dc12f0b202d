// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Leveled diagnostics for policy evaluation.
//!
//! Logging is best effort: nothing emitted here can fail an evaluation. The level is
//! process wide and defaults to [`LevelFilter::Error`].

use std::{
    fmt::{self, Display},
    io,
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde::{Deserialize, Deserializer};

static MAX_LOG_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Error as usize);

/// Sets the most verbose level that will be printed.
pub fn set_max_level(lvl: LevelFilter) {
    MAX_LOG_LEVEL.store(lvl as usize, Ordering::Relaxed)
}

pub fn max_level() -> LevelFilter {
    LevelFilter::from_usize(MAX_LOG_LEVEL.load(Ordering::Relaxed))
}

/// Serializes tests that change the process wide level
#[cfg(test)]
pub(crate) static MAX_LEVEL_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[repr(usize)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
/// The level at which the library will log
pub enum LevelFilter {
    Off,
    #[default]
    Error,
    Warn,
    Info,
    Debug,
}

impl LevelFilter {
    fn from_usize(value: usize) -> Self {
        match value {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

impl FromStr for LevelFilter {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("debug") {
            Ok(LevelFilter::Debug)
        } else if s.eq_ignore_ascii_case("info") {
            Ok(LevelFilter::Info)
        } else if s.eq_ignore_ascii_case("warn") {
            Ok(LevelFilter::Warn)
        } else if s.eq_ignore_ascii_case("error") {
            Ok(LevelFilter::Error)
        } else if s.eq_ignore_ascii_case("off") {
            Ok(LevelFilter::Off)
        } else {
            Err("log level filter should be one of DEBUG, INFO, WARN, ERROR, OFF")
        }
    }
}

impl Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = match self {
            LevelFilter::Debug => "DEBUG",
            LevelFilter::Info => "INFO",
            LevelFilter::Warn => "WARN",
            LevelFilter::Error => "ERROR",
            LevelFilter::Off => "OFF",
        };

        write!(f, "{filter}")
    }
}

impl<'de> Deserialize<'de> for LevelFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for LevelFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[repr(usize)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Level {
    Error = 1, // this value must match with LevelFilter::Error
    Warn,
    Info,
    Debug,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };

        write!(f, "{level}")
    }
}

impl PartialEq<LevelFilter> for Level {
    #[inline]
    fn eq(&self, other: &LevelFilter) -> bool {
        (*self as usize) == (*other as usize)
    }
}

impl PartialOrd<LevelFilter> for Level {
    #[inline]
    fn partial_cmp(&self, other: &LevelFilter) -> Option<std::cmp::Ordering> {
        Some((*self as usize).cmp(&(*other as usize)))
    }
}

#[cfg(test)]
pub(crate) mod test_logger {
    //! Thread local log capture for tests.
    use std::{
        cell::RefCell,
        sync::{Arc, Mutex, PoisonError},
    };

    use super::Level;

    #[derive(Default)]
    struct TestLogger(Mutex<Vec<(Level, String)>>);

    thread_local! {
        static LOCAL_LOGGER: RefCell<Option<Arc<TestLogger>>> = const { RefCell::new(None) };
    }

    pub fn record(lvl: Level, log: std::fmt::Arguments) {
        let _ = LOCAL_LOGGER.try_with(|l| {
            if let Some(l) = &*l.borrow() {
                l.0.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((lvl, log.to_string()))
            }
        });
    }

    pub struct LoggerGuard {
        prev: Option<Arc<TestLogger>>,
    }

    impl Drop for LoggerGuard {
        fn drop(&mut self) {
            LOCAL_LOGGER.set(self.prev.take());
        }
    }

    pub fn activate_test_logger() -> LoggerGuard {
        let prev = LOCAL_LOGGER.replace(Some(Arc::new(TestLogger::default())));
        LoggerGuard { prev }
    }

    pub fn take_test_logs() -> Option<Vec<(Level, String)>> {
        LOCAL_LOGGER
            .try_with(|l| {
                l.borrow().as_deref().map(|l| {
                    std::mem::take(&mut *l.0.lock().unwrap_or_else(PoisonError::into_inner))
                })
            })
            .ok()
            .flatten()
    }
}

/// Forwards to the test logger in this crate's unit tests, no-op otherwise
#[doc(hidden)]
#[inline]
pub fn capture(lvl: Level, log: fmt::Arguments) {
    #[cfg(test)]
    test_logger::record(lvl, log);
    #[cfg(not(test))]
    let _ = (lvl, log);
}

/// Write errors are dropped, a closed stdout must not take the caller down
pub fn print_log(lvl: Level, log: fmt::Arguments, file: &str, line: u32) {
    if lvl == LevelFilter::Error {
        write_log(&mut io::stderr().lock(), "\x1b[91m", lvl, log, file, line);
    } else {
        write_log(&mut io::stdout().lock(), "\x1b[93m", lvl, log, file, line);
    }
}

fn write_log<W: io::Write>(
    out: &mut W,
    color: &str,
    lvl: Level,
    log: fmt::Arguments,
    file: &str,
    line: u32,
) {
    let _ = writeln!(out, "{color}{lvl}\x1b[0m {file}:{line} - {log}");
}

#[macro_export]
macro_rules! dd_debug {
    // dd_debug!("a {} event", "log")
    ($($arg:tt)+) => {
        $crate::dd_log!($crate::log::Level::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! dd_warn {
    // dd_warn!("a {} event", "log")
    ($($arg:tt)+) => {
        $crate::dd_log!($crate::log::Level::Warn, $($arg)*)
    };
}

#[macro_export]
macro_rules! dd_log {
    ($lvl:expr, $($arg:tt)+) => {{
        let lvl = $lvl;
        if lvl <= $crate::log::max_level() {
            $crate::log::print_log(lvl, format_args!($($arg)+), file!(), line!());
        }
        $crate::log::capture(lvl, format_args!($($arg)+));
    }};
}
