//! Reconciliation of remote declines into the local guest lists.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use rsvp_core::friday::normalize_email;
use rsvp_core::gateway::GatewayError;

use super::{Engine, Result};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub fridays_checked: usize,
    pub guests_removed: usize,
    pub failures: usize,
}

impl Engine {
    /// Removes every local guest the remote calendar reports as declined.
    ///
    /// Does nothing when calendar integration is disabled. Only listing the
    /// Fridays can fail the pass. Per-Friday errors are
    /// logged and counted; the pass moves on to the next Friday.
    pub async fn reconcile_once(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let Some(calendar) = self.calendar() else {
            return Ok(report);
        };

        let fridays = self
            .store
            .get_upcoming_fridays_after(Utc::now(), self.config.lookahead_days)
            .await?;

        for friday in fridays {
            report.fridays_checked += 1;
            let event_id = friday.id().event_id();

            let event = match calendar.get_event(&event_id).await {
                Ok(event) => event,
                Err(GatewayError::EventNotFound(_)) => {
                    debug!(event_id = %event_id, "No calendar event yet");
                    continue;
                }
                Err(err) => {
                    warn!(event_id = %event_id, error = %err, "Failed to fetch calendar event");
                    report.failures += 1;
                    continue;
                }
            };

            for email in event.declined().map(normalize_email) {
                if !friday.has_guest(&email) {
                    continue;
                }
                match self.store.remove_friend_from_friday(&email, friday.date).await {
                    Ok(()) => {
                        info!(event_id = %event_id, email = %email, "Removed declined guest");
                        report.guests_removed += 1;
                    }
                    Err(err) => {
                        warn!(event_id = %event_id, email = %email, error = %err, "Failed to remove declined guest");
                        report.failures += 1;
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Runs reconciliation passes until `shutdown` fires.
///
/// The first pass starts immediately. A pass that fails outright is retried
/// after `retry_delay` instead of the full period.
pub async fn run_reconciler(engine: Engine, mut shutdown: broadcast::Receiver<()>) {
    let mut delay = Duration::ZERO;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.recv() => {
                info!("Reconciler shutting down");
                return;
            }
        }

        delay = match engine.reconcile_once().await {
            Ok(report) => {
                info!(
                    fridays_checked = report.fridays_checked,
                    guests_removed = report.guests_removed,
                    failures = report.failures,
                    "Reconciliation pass complete"
                );
                engine.config.reconciliation_period
            }
            Err(err) => {
                error!(error = %err, "Reconciliation pass failed");
                engine.config.retry_delay
            }
        };
    }
}
