//! phish_track library: phishing site lifecycle tracking
//!
//! This library periodically probes tracked phishing URLs, decides when a site
//! has really gone offline (tolerating transient failures such as stale DNS),
//! and profiles how the captured page's content is spread across hosting
//! servers.
//!
//! # Example
//!
//! ```no_run
//! use phish_track::{init_services, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let services = init_services(Config::default()).await?;
//! services
//!     .admin()
//!     .add_site("bank clone", "http://phish.example/login", None)
//!     .await?;
//!
//! let summary = services
//!     .surveyor()
//!     .survey_pass(&CancellationToken::new())
//!     .await?;
//! println!("probed {} sites", summary.probed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod admin;
pub mod app;
pub mod config;
pub mod error_handling;
pub mod events;
pub mod initialization;
pub mod probe;
pub mod profile;
mod run;
pub mod storage;
pub mod survey;
pub mod tracked;
pub mod user_agent;
mod utils;

// Re-export public API
pub use admin::Admin;
pub use config::{Config, LogFormat, LogLevel, Timeouts};
pub use error_handling::{AdminError, ProfileError};
pub use events::EventLog;
pub use probe::{probe, Fetcher, HttpFetcher, ProbeContext, ProbeResult};
pub use profile::{ContentProfile, HostResolver};
pub use run::{init_services, init_services_with, run_tracker, Services};
pub use storage::{Collection, RecordGuard, RecordLocks, SiteStore};
pub use survey::{PassSummary, Surveyor};
pub use tracked::{Ping, SiteStatus, TrackedSite};
pub use utils::{format_timestamp, hours_and_minutes, parse_timestamp};
