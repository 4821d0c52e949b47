//! Async refresh orchestrator.
//!
//! Moves a [`Dashboard`] into a tokio task that ticks it on a fixed interval
//! and sends a [`DashboardView`] through an `mpsc` channel whenever the
//! display changes, so renderers never share mutable state with the loop.

use std::time::Duration;

use monitor_core::synthetic::SyntheticSource;
use tokio::sync::mpsc;
use tokio::time;

use crate::dashboard::Dashboard;
use crate::state::DashboardView;
use crate::store::KvStore;

/// Default refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Shortest interval the loop will tick at.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

// ── RefreshOrchestrator ───────────────────────────────────────────────────────

/// Background refresh coordinator.
///
/// Call [`RefreshOrchestrator::start`] to spin up the loop and receive the
/// channel end for [`DashboardView`] updates.
#[derive(Debug, Clone, Copy)]
pub struct RefreshOrchestrator {
    interval: Duration,
}

impl Default for RefreshOrchestrator {
    fn default() -> Self {
        Self::from_secs(DEFAULT_REFRESH_SECS)
    }
}

impl RefreshOrchestrator {
    /// Intervals below [`MIN_REFRESH_INTERVAL`] (including zero) are raised to it.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_REFRESH_INTERVAL),
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the refresh loop.
    ///
    /// The current view is sent immediately, then again after every tick
    /// that changed the display. The loop exits once the receiver is dropped.
    pub fn start<S, R>(self, dashboard: Dashboard<S, R>) -> (mpsc::Receiver<DashboardView>, RefreshHandle)
    where
        S: KvStore + Send + 'static,
        R: SyntheticSource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.refresh_loop(dashboard, tx).await;
        });

        (rx, RefreshHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    async fn refresh_loop<S, R>(self, mut dashboard: Dashboard<S, R>, tx: mpsc::Sender<DashboardView>)
    where
        S: KvStore,
        R: SyntheticSource,
    {
        if tx.send(dashboard.view()).await.is_err() {
            return;
        }

        let mut interval = time::interval(self.interval);
        // First tick fires immediately; the initial view already went out.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("refresh channel closed; exiting loop");
                break;
            }

            if !dashboard.tick() {
                continue;
            }

            if let Err(e) = tx.send(dashboard.view()).await {
                tracing::debug!(error = %e, "receiver dropped; exiting loop");
                break;
            }
        }
    }
}

// ── RefreshHandle ─────────────────────────────────────────────────────────────

/// Handle to the background refresh task.
pub struct RefreshHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the loop immediately.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
