//! Survey scheduler.
//!
//! One worker runs a pass over all running sites once per interval. Sites are
//! probed one after another; each is handled under its record lock and
//! persisted before the lock is released. Cancellation is honored between
//! sites, never in the middle of a probe.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::MIN_CHECK_INTERVAL;
use crate::error_handling::{DatabaseError, SurveyOutcome, SurveyStats};
use crate::probe::{probe, ProbeContext};
use crate::storage::{Collection, RecordGuard, RecordLocks, SiteStore};

async fn release(guard: RecordGuard) {
    let key = guard.key().to_string();
    if let Err(e) = guard.release().await {
        log::warn!("Failed to release lock on {}: {}", key, e);
    }
}

/// Counts for one survey pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub probed: usize,
    pub skipped: usize,
    pub stopped: usize,
}

/// Drives probes against every running site.
pub struct Surveyor {
    store: SiteStore,
    locks: RecordLocks,
    ctx: ProbeContext,
    stats: Arc<SurveyStats>,
}

impl Surveyor {
    pub fn new(store: SiteStore, locks: RecordLocks, ctx: ProbeContext) -> Self {
        Self {
            store,
            locks,
            ctx,
            stats: Arc::new(SurveyStats::new()),
        }
    }

    /// Outcome counters accumulated over all passes.
    pub fn stats(&self) -> &Arc<SurveyStats> {
        &self.stats
    }

    /// Probes every running active site once.
    ///
    /// A site whose lock is held is skipped without recording anything. A
    /// failure to persist one site is logged and does not end the pass.
    ///
    /// # Errors
    ///
    /// Returns an error only if the site list cannot be read.
    pub async fn survey_pass(&self, cancel: &CancellationToken) -> Result<PassSummary, DatabaseError> {
        let sites = self.store.all(Collection::Active).await?;
        let mut summary = PassSummary::default();

        for listed in sites.iter().filter(|s| s.is_running()) {
            if cancel.is_cancelled() {
                log::info!("Survey pass cancelled");
                break;
            }

            let id = listed.unique_id();
            let guard = match self.locks.try_lock(id).await {
                Ok(Some(guard)) => guard,
                Ok(None) => {
                    log::debug!("{} is locked, skipping this pass", id);
                    self.stats.increment(SurveyOutcome::SkippedLocked);
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    log::error!("Failed to lock {}: {}", id, e);
                    continue;
                }
            };

            if let Some(outcome) = self.survey_site(id).await {
                self.stats.increment(outcome);
                summary.probed += 1;
                if outcome == SurveyOutcome::Stopped {
                    summary.stopped += 1;
                }
            }
            release(guard).await;
        }

        Ok(summary)
    }

    /// Probes one site whose lock is held and saves the result.
    ///
    /// Returns `None` when the site was not probed.
    async fn survey_site(&self, id: &str) -> Option<SurveyOutcome> {
        // The listing may be stale by the time the lock is ours
        let mut site = match self.store.get(Collection::Active, id).await {
            Ok(Some(site)) if site.is_running() => site,
            Ok(_) => return None,
            Err(e) => {
                log::error!("Failed to reload {}: {}", id, e);
                return None;
            }
        };

        let result = probe(self.ctx.fetcher.as_ref(), site.url()).await;
        let url = site.url().to_string();
        let outcome = site.record_ping(&result, &url, &self.ctx).await;

        match self.store.update(Collection::Active, &site).await {
            Ok(true) => {}
            Ok(false) => log::warn!("{} left the active list during its probe; result dropped", id),
            Err(e) => log::error!("Failed to save {}: {}", id, e),
        }
        Some(outcome)
    }

    /// Runs a pass every `interval` until `cancel` fires.
    ///
    /// An `interval` below [`MIN_CHECK_INTERVAL`] is raised to it. The first
    /// pass starts immediately. A pass in flight when `cancel` fires finishes
    /// its current site before the loop exits.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval.max(MIN_CHECK_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.survey_pass(&cancel).await {
                        Ok(summary) => self.ctx.events.record(format!(
                            "Survey pass: {} probed, {} skipped, {} declared down",
                            summary.probed, summary.skipped, summary.stopped
                        )),
                        Err(e) => log::error!("Survey pass failed: {}", e),
                    }
                }
                _ = cancel.cancelled() => {
                    log::debug!("Survey loop shutting down");
                    break;
                }
            }
        }
    }
}
