//! Probe history entries and site status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TRANSPORT_FAILURE_CODE;
use crate::probe::ProbeResult;
use crate::utils::format_timestamp;

/// One recorded probe outcome. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    /// HTTP status, or `-1` for transport failures
    pub code: i32,
    pub timestamp: DateTime<Utc>,
    /// Page title, or the diagnostic for a transport failure
    pub title: String,
}

impl Ping {
    pub fn is_transport_failure(&self) -> bool {
        self.code == TRANSPORT_FAILURE_CODE
    }
}

impl From<&ProbeResult> for Ping {
    fn from(result: &ProbeResult) -> Self {
        Self {
            code: result.code,
            timestamp: result.probed_at,
            title: result.title.clone(),
        }
    }
}

impl fmt::Display for Ping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", format_timestamp(self.timestamp), self.code, self.title)
    }
}

/// Lifecycle state of a tracked site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteStatus {
    Running,
    Stopped,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Running => "running",
            SiteStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
