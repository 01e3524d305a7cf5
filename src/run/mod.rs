//! Running the tracker.

mod init;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::{print_survey_statistics, shutdown_gracefully};

pub use init::{init_services, init_services_with, Services};

/// Runs the survey loop until `cancel` fires, then prints outcome counts.
///
/// Returns after the pass in flight has persisted its current site.
pub async fn run_tracker(services: &Services, cancel: CancellationToken) -> Result<()> {
    let surveyor = services.surveyor();
    let stats = surveyor.stats().clone();
    let interval = services.config.check_interval;
    log::info!(
        "Surveying every {}s with {} stop signals to declare a site down",
        interval.as_secs(),
        services.config.max_stop_signals
    );

    let loop_cancel = cancel.child_token();
    let survey_task = tokio::spawn(async move { surveyor.run(interval, loop_cancel).await });

    cancel.cancelled().await;
    shutdown_gracefully(cancel, survey_task).await;
    print_survey_statistics(&stats);
    Ok(())
}
