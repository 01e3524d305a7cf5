//! Command-line interface.
//!
//! Global options map onto [`Config`]; each subcommand is one survey or
//! administrative action.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::constants::{
    DB_PATH, DEFAULT_CHECK_INTERVAL, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_LOCK_WAIT_MS, DEFAULT_MAX_STOP_SIGNALS,
    DEFAULT_READ_TIMEOUT_MS, DEFAULT_SHOW_PING_COUNT, DEFAULT_SHOW_SERVER_EVENTS,
};
use crate::config::types::{Config, LogFormat, LogLevel, Timeouts};

#[derive(Debug, Parser)]
#[command(
    name = "phish_track",
    version,
    about = "Tracks phishing sites until they are taken down"
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,

    /// SQLite database holding tracked and archived sites
    #[arg(long, default_value = DB_PATH, global = true)]
    pub db_path: PathBuf,

    /// Consecutive stop signals before a site is declared down
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_STOP_SIGNALS,
        value_parser = clap::value_parser!(u32).range(1..),
        global = true
    )]
    pub max_stop_signals: u32,

    /// Seconds between survey passes
    #[arg(
        long,
        default_value_t = DEFAULT_CHECK_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub check_interval_secs: u64,

    /// Milliseconds to wait for a record lock on administrative actions
    #[arg(long, default_value_t = DEFAULT_LOCK_WAIT_MS, global = true)]
    pub lock_wait_ms: u64,

    /// Connect timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_MS, global = true)]
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_MS, global = true)]
    pub read_timeout_ms: u64,

    /// Trailing pings shown per site by `list`
    #[arg(long, default_value_t = DEFAULT_SHOW_PING_COUNT, global = true)]
    pub show_pings: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run survey passes on the configured interval until interrupted
    Run,
    /// Run a single survey pass and exit
    SurveyOnce,
    /// Start tracking a site
    Add {
        /// Descriptive label
        #[arg(long)]
        label: String,
        /// URL of the phishing page
        #[arg(long)]
        url: String,
        /// When the phishing message was received, e.g. "05 Aug 2006 18:44 EDT"; defaults to now
        #[arg(long)]
        start_time: Option<String>,
    },
    /// Stop tracking a site and move it to the archive
    Archive { id: String },
    /// Move an archived site back to the active list and restart it
    Unarchive { id: String },
    /// Restart a stopped site on the active list
    Reactivate { id: String },
    /// Delete a site from the archive
    Remove { id: String },
    /// Drop a site's content profile so the next capture rebuilds it
    ClearProfile { id: String },
    /// Print a report of tracked (or archived) sites
    List {
        #[arg(long)]
        archived: bool,
    },
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            log_level: cli.log_level.clone(),
            log_format: cli.log_format.clone(),
            db_path: cli.db_path.clone(),
            max_stop_signals: cli.max_stop_signals,
            check_interval: Duration::from_secs(cli.check_interval_secs),
            lock_wait: Duration::from_millis(cli.lock_wait_ms),
            timeouts: Timeouts::from_millis(cli.connect_timeout_ms, cli.read_timeout_ms),
            show_ping_count: cli.show_pings,
            show_server_events: DEFAULT_SHOW_SERVER_EVENTS,
        }
    }
}
