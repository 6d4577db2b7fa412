//! Periodic refresh of the admin dashboard metrics.
//!
//! A poller is owned by the view that displays the metrics. Dropping it stops
//! the refresh loop: no new refresh starts after the owner is gone, while a
//! refresh already in flight is allowed to complete and its result discarded.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::Serialize;
use tokio::{
    sync::watch,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{records::DashboardMetrics, Portal};

/// Latest known dashboard state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardState {
    /// First refresh has not completed yet.
    Loading,

    Ready {
        metrics: DashboardMetrics,

        /// UNIX timestamp of the refresh, in seconds.
        refreshed_at: u64,
    },

    /// Metrics can't be refreshed until the contract is deployed.
    Unavailable { reason: String },
}

/// Dashboard metrics refresh loop.
pub struct DashboardPoller {
    shutdown: CancellationToken,
    state: watch::Receiver<DashboardState>,
}

impl DashboardPoller {
    /// Spawn a refresh loop, refreshing immediately and then every `period`.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn spawn(portal: Arc<Portal>, period: Duration) -> Self {
        let shutdown = CancellationToken::new();
        let (sender, state) = watch::channel(DashboardState::Loading);

        tokio::spawn(run(portal, period, sender, shutdown.clone()));

        Self { shutdown, state }
    }

    /// Subscribe to dashboard state changes.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }
}

impl Drop for DashboardPoller {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run(
    portal: Arc<Portal>,
    period: Duration,
    sender: watch::Sender<DashboardState>,
    shutdown: CancellationToken,
) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        match portal.dashboard_metrics().await {
            Ok(metrics) => {
                // Owner may be gone while the refresh was in flight.
                if shutdown.is_cancelled() {
                    break;
                }

                sender.send_replace(DashboardState::Ready {
                    metrics,
                    refreshed_at: unix_now(),
                });
            }
            Err(err) if err.is_terminal() => {
                warn!(%err, "dashboard metrics are unavailable");
                sender.send_replace(DashboardState::Unavailable {
                    reason: err.to_string(),
                });
                break;
            }
            // Last known metrics stay displayed.
            Err(err) => warn!(%err, "unable to refresh dashboard metrics"),
        }
    }

    debug!("dashboard poller stopped");
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default()
}
