//! Configuration types.
//!
//! This module defines enums and structs used for configuration, shared by the
//! library and the CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DB_PATH, DEFAULT_CHECK_INTERVAL, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_LOCK_WAIT_MS,
    DEFAULT_MAX_STOP_SIGNALS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SHOW_PING_COUNT,
    DEFAULT_SHOW_SERVER_EVENTS, MIN_CHECK_INTERVAL,
};
use crate::error_handling::InitializationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Connect and read timeouts applied to every outbound request.
///
/// The same pair is used for the page probe and for every resource fetch made
/// while profiling that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Timeouts {
    pub fn from_millis(connect_ms: u64, read_ms: u64) -> Self {
        Self {
            connect: Duration::from_millis(connect_ms),
            read: Duration::from_millis(read_ms),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_millis(DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS)
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use phish_track::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("trackers.db"),
///     max_stop_signals: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Consecutive stop signals before a site is marked down
    pub max_stop_signals: u32,

    /// Time between survey passes
    pub check_interval: Duration,

    /// Bounded wait for record locks on administrative operations
    pub lock_wait: Duration,

    /// Probe connect/read timeouts
    pub timeouts: Timeouts,

    /// Trailing pings shown per site in reports
    pub show_ping_count: usize,

    /// Recent server events retained in memory
    pub show_server_events: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            max_stop_signals: DEFAULT_MAX_STOP_SIGNALS,
            check_interval: DEFAULT_CHECK_INTERVAL,
            lock_wait: Duration::from_millis(DEFAULT_LOCK_WAIT_MS),
            timeouts: Timeouts::default(),
            show_ping_count: DEFAULT_SHOW_PING_COUNT,
            show_server_events: DEFAULT_SHOW_SERVER_EVENTS,
        }
    }
}

impl Config {
    /// Checks the values the survey loop and state machine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConfigError` for a zero stop-signal
    /// threshold or a check interval below one second.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if self.max_stop_signals == 0 {
            return Err(InitializationError::ConfigError(
                "max_stop_signals must be at least 1",
            ));
        }
        if self.check_interval < MIN_CHECK_INTERVAL {
            return Err(InitializationError::ConfigError(
                "check_interval must be at least one second",
            ));
        }
        Ok(())
    }
}
