//! Shared resources for probing and profiling.

use std::sync::Arc;

use crate::events::EventLog;
use crate::profile::HostResolver;

use super::Fetcher;

/// Everything `record_ping` and the survey loop need besides the record itself.
///
/// Cloning is cheap; all members are shared handles.
#[derive(Clone)]
pub struct ProbeContext {
    /// Outbound HTTP for pages and embedded resources
    pub fetcher: Arc<dyn Fetcher>,
    /// DNS lookups for profile annotations
    pub resolver: Arc<dyn HostResolver>,
    /// Recent-event buffer
    pub events: EventLog,
}

impl ProbeContext {
    pub fn new(fetcher: Arc<dyn Fetcher>, resolver: Arc<dyn HostResolver>, events: EventLog) -> Self {
        Self {
            fetcher,
            resolver,
            events,
        }
    }
}
