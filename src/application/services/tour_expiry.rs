//! Background task that periodically expires overdue tour requests.
//!
//! Pending requests nobody answered before `expires_at` move to `expired`.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Duration;
use tracing::{info, warn};

use super::TourRequestService;
use crate::shared::shutdown::ShutdownSignal;

/// Start the tour expiry background task.
///
/// Checks every `check_interval_secs` and stops on shutdown.
pub fn start_tour_expiry_task(
    service: Arc<TourRequestService>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(check_interval = check_interval_secs, "Tour expiry task started");

        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match service.expire_overdue(Utc::now()).await {
                        Ok(0) => {}
                        Ok(count) => info!(count, "Expired overdue tour requests"),
                        Err(e) => warn!(error = %e, "Tour expiry check error"),
                    }
                }
                _ = shutdown.wait() => {
                    info!("Tour expiry task shutting down");
                    break;
                }
            }
        }

        info!("Tour expiry task stopped");
    })
}
