//! Configuration constants.
//!
//! This module defines the defaults used when no CLI override is given, plus the
//! fixed strings that show up in recorded pings and content profiles.

use std::time::Duration;

/// Consecutive stop signals after which a site is declared down.
pub const DEFAULT_MAX_STOP_SIGNALS: u32 = 4;
/// Time between survey passes (7 minutes).
///
/// A pass is assumed to finish well inside this window; nothing enforces it.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(7 * 60);
/// Maximum wait for a record lock on administrative operations, in milliseconds.
pub const DEFAULT_LOCK_WAIT_MS: u64 = 2_000;
/// TCP connect timeout for probes and resource fetches, in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 20_000;
/// Read timeout for probes and resource fetches, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 60_000;
/// Number of trailing pings shown per site in reports.
pub const DEFAULT_SHOW_PING_COUNT: usize = 5;
/// Number of recent server events kept for reports.
pub const DEFAULT_SHOW_SERVER_EVENTS: usize = 25;
pub const DB_PATH: &str = "./phish_track.db";

/// DNS query timeout in seconds (host annotation in content profiles).
pub const DNS_TIMEOUT_SECS: u64 = 3;

/// Timestamp pattern for display and for operator-entered start times.
///
/// Renders as e.g. `05 Aug 2006 18:44 UTC`.
pub const DATE_FORMAT: &str = "%d %b %Y %H:%M %Z";

/// Result code recorded for pings that never got an HTTP status.
pub const TRANSPORT_FAILURE_CODE: i32 = -1;
/// HTTP status that counts as a successful capture.
pub const HTTP_OK: i32 = 200;
/// Title recorded when a 200 page carries no `<title>` element.
pub const TITLE_NOT_FOUND: &str = "title not found";
/// Profile bucket that collects anchor links (counted, never fetched).
pub const HYPERLINK_BUCKET: &str = "hyperlinks to other pages";

/// Lifetime of a record lock lease. A lease older than this is treated as
/// abandoned by a crashed process and may be taken over.
pub const LOCK_LEASE_TTL: Duration = Duration::from_secs(60 * 60);
/// Delay between attempts while waiting for a held record lock.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(25);
/// Shortest accepted time between survey passes.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);
