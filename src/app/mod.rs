//! Main application modules.
//!
//! Reporting, uptime statistics and shutdown handling used by the binary.

pub mod report;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use report::{render_report, render_site, CollectionReport, SiteReport, SiteState};
pub use shutdown::{cancel_on_ctrl_c, shutdown_gracefully};
pub use statistics::{median, print_survey_statistics, uptime_summary, UptimeSummary};
