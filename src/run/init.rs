//! Service initialization.
//!
//! Opens the database, runs migrations and wires the shared handles that the
//! survey loop and administrative commands use.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::admin::{Admin, LogNotifier};
use crate::config::Config;
use crate::events::EventLog;
use crate::initialization::init_resolver;
use crate::probe::{Fetcher, HttpFetcher, ProbeContext};
use crate::profile::{DnsHostResolver, HostResolver};
use crate::storage::{init_db_pool_with_path, run_migrations, RecordLocks, SiteStore};
use crate::survey::Surveyor;

/// Shared handles for one process.
///
/// The store and event log are shared between the survey loop and
/// administrative actions. Record locks live in the database, so a record
/// locked by one process is seen as locked by every other process on the same
/// file.
#[derive(Clone)]
pub struct Services {
    pub config: Config,
    pub store: SiteStore,
    pub locks: RecordLocks,
    pub events: EventLog,
    pub ctx: ProbeContext,
}

impl Services {
    /// Administrative actions with submissions sent to the log.
    pub fn admin(&self) -> Admin {
        Admin::new(
            self.store.clone(),
            self.locks.clone(),
            self.events.clone(),
            self.config.lock_wait,
            self.config.max_stop_signals,
        )
        .with_notifier(Arc::new(LogNotifier))
    }

    pub fn surveyor(&self) -> Surveyor {
        Surveyor::new(self.store.clone(), self.locks.clone(), self.ctx.clone())
    }
}

/// Initializes services with network-backed HTTP and DNS.
///
/// # Errors
///
/// Returns an error if the HTTP client, the database or the migrations fail.
pub async fn init_services(config: Config) -> Result<Services> {
    let fetcher =
        HttpFetcher::new(config.timeouts).context("Failed to initialize HTTP client")?;
    let resolver = DnsHostResolver::new(init_resolver());
    init_services_with(config, Arc::new(fetcher), Arc::new(resolver)).await
}

/// Initializes services with the given HTTP and DNS implementations.
pub async fn init_services_with(
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    resolver: Arc<dyn HostResolver>,
) -> Result<Services> {
    config.validate().context("Invalid configuration")?;
    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Using database {}", config.db_path.display());

    let events = EventLog::new(config.show_server_events);
    Ok(Services {
        store: SiteStore::new(pool.clone()),
        locks: RecordLocks::new(pool),
        ctx: ProbeContext::new(fetcher, resolver, events.clone()),
        events,
        config,
    })
}
