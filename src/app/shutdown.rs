//! Graceful shutdown handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on Ctrl-C.
///
/// Returns once the signal arrives or the token is cancelled by someone else.
pub async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => log::info!("Ctrl-C received, finishing current survey pass"),
                Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
            }
            cancel.cancel();
        }
        _ = cancel.cancelled() => {}
    }
}

/// Stops the survey loop and waits for it to finish.
///
/// The loop notices cancellation between sites, so a probe in flight is
/// completed and persisted before this returns.
pub async fn shutdown_gracefully(cancel: CancellationToken, survey_task: JoinHandle<()>) {
    cancel.cancel();
    if let Err(e) = survey_task.await {
        log::warn!("Survey task ended abnormally: {:?}", e);
    }
}
