//! Submission notifications.

use crate::tracked::TrackedSite;
use crate::utils::format_timestamp;

/// Told about every site an operator submits.
pub trait Notifier: Send + Sync {
    fn site_submitted(&self, site: &TrackedSite);
}

/// Writes submissions to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn site_submitted(&self, site: &TrackedSite) {
        log::info!(
            "New submission {}: label={} url={} start={}",
            site.unique_id(),
            site.label(),
            site.url(),
            format_timestamp(site.start_time())
        );
    }
}
