//! Utility functions.
//!
//! This module provides:
//! - Timestamp formatting and parsing in the operator-facing date pattern
//! - Human-readable uptime durations

mod time;

pub use time::{format_timestamp, hours_and_minutes, parse_timestamp};
