//! Dashboard controller.
//!
//! Owns the [`AppState`], the key-value store and the synthetic-data source,
//! and applies the dashboard's policies on top of the pure ingestor:
//!
//! * a log that fails to parse is replaced by placeholder data, so the
//!   display is never left half-initialised or stale;
//! * the last uploaded log and the auto-refresh flag survive restarts;
//! * with auto-refresh on, every tick resimulates the stored log's sensors.

use chrono::Utc;
use monitor_core::error::ParseError;
use monitor_core::models::SourceTag;
use monitor_core::synthetic::SyntheticSource;
use monitor_data::csv_log::parse_log;
use monitor_data::simulation::{generate_mock_snapshot, simulate_snapshot};

use crate::state::{AppState, DashboardView};
use crate::store::{KvStore, AUTO_REFRESH_KEY, CSV_CONTENT_KEY};

/// Dashboard state plus the collaborators it is persisted and simulated with.
pub struct Dashboard<S, R> {
    store: S,
    synthetic: R,
    state: AppState,
}

impl<S: KvStore, R: SyntheticSource> Dashboard<S, R> {
    /// Create a controller showing placeholder data. Call
    /// [`Dashboard::initialize`] to restore the stored log.
    pub fn new(store: S, mut synthetic: R) -> Self {
        let state = AppState::new(generate_mock_snapshot(&mut synthetic));
        Self {
            store,
            synthetic,
            state,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> DashboardView {
        self.state.view()
    }

    /// Restore the last uploaded log and auto-refresh flag from the store.
    ///
    /// Without a stored log the dashboard shows placeholder data. The
    /// auto-refresh flag is only restored together with a log. Returns the
    /// stored log's parse error, if it had one.
    pub fn initialize(&mut self) -> Result<(), ParseError> {
        let Some(content) = self.store.get(CSV_CONTENT_KEY).filter(|c| !c.is_empty()) else {
            tracing::info!("no stored log; showing placeholder data");
            self.apply_fallback();
            return Ok(());
        };

        tracing::info!(bytes = content.len(), "restoring stored log");
        let result = self.process(&content);
        self.state.uploaded_content = Some(content);

        if self.store.get(AUTO_REFRESH_KEY).as_deref() == Some("true") {
            self.state.auto_refresh = true;
        }

        result
    }

    /// Store `content` as the current log and display it.
    ///
    /// The content is kept even when it does not parse; the returned error
    /// is meant for the user, and the display already holds placeholder data.
    pub fn upload(&mut self, content: String) -> Result<(), ParseError> {
        if let Err(e) = self.store.set(CSV_CONTENT_KEY, &content) {
            tracing::warn!(error = %e, "failed to persist uploaded log");
        }
        let result = self.process(&content);
        self.state.uploaded_content = Some(content);
        result
    }

    /// Parse `content` and display it, or fall back to placeholder data.
    pub fn process(&mut self, content: &str) -> Result<(), ParseError> {
        match parse_log(content, SourceTag::UploadedFile) {
            Ok(snapshot) => {
                tracing::info!(
                    sensors = snapshot.metrics.discovered_sensor_count,
                    declared = snapshot.metrics.total_sensor_count,
                    samples = snapshot.sample_count,
                    avg = snapshot.metrics.average_temperature,
                    max = snapshot.metrics.max_temperature,
                    "log loaded"
                );
                if snapshot.metrics.sensor_count_mismatch() {
                    tracing::debug!(
                        declared = snapshot.metrics.total_sensor_count,
                        discovered = snapshot.metrics.discovered_sensor_count,
                        "declared sensor count differs from discovered columns"
                    );
                }
                self.state.snapshot = snapshot;
                self.state.is_connected = true;
                self.state.last_error = None;
                self.state.last_update = Utc::now();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "log rejected; showing placeholder data");
                self.state.last_error = Some(e.to_string());
                self.apply_fallback();
                Err(e)
            }
        }
    }

    /// Turn periodic resimulation on or off and remember the choice.
    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.state.auto_refresh = enabled;
        let value = if enabled { "true" } else { "false" };
        if let Err(e) = self.store.set(AUTO_REFRESH_KEY, value) {
            tracing::warn!(error = %e, "failed to persist auto-refresh flag");
        }
    }

    /// One refresh cycle. Returns `true` when the display changed.
    ///
    /// Does nothing unless auto-refresh is on and a log is stored. A stored
    /// log without a header leaves the display untouched.
    pub fn tick(&mut self) -> bool {
        if !self.state.auto_refresh {
            return false;
        }
        let Some(content) = self.state.uploaded_content.as_deref() else {
            return false;
        };

        match simulate_snapshot(content, &mut self.synthetic) {
            Ok(snapshot) => {
                tracing::debug!(sensors = snapshot.series.len(), "resimulated readings");
                self.state.snapshot = snapshot;
                self.state.last_update = Utc::now();
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "stored log cannot be resimulated");
                false
            }
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn apply_fallback(&mut self) {
        self.state.snapshot = generate_mock_snapshot(&mut self.synthetic);
        self.state.is_connected = false;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use monitor_core::synthetic::SequenceSource;

    const LOG: &str = "\
Date,Time,UpTime,CPU,HDD1
,,,°C,°C
6/5/2025,4:36:36 PM,05:04:42,48,36
6/5/2025,4:36:37 PM,05:04:43,54,36
";

    fn dashboard(store: MemoryStore) -> Dashboard<MemoryStore, SequenceSource> {
        Dashboard::new(store, SequenceSource::constant(0.5))
    }

    // ── initialize ────────────────────────────────────────────────────────

    #[test]
    fn test_initialize_without_stored_log_shows_fallback() {
        let mut dash = dashboard(MemoryStore::new());
        assert!(dash.initialize().is_ok());

        let state = dash.state();
        assert_eq!(state.snapshot.metrics.source, SourceTag::Fallback);
        assert!(!state.is_connected);
        assert!(!state.auto_refresh);
        assert!(state.uploaded_content.is_none());
    }

    #[test]
    fn test_initialize_restores_log_and_auto_refresh() {
        let mut store = MemoryStore::new();
        store.set(CSV_CONTENT_KEY, LOG).unwrap();
        store.set(AUTO_REFRESH_KEY, "true").unwrap();

        let mut dash = dashboard(store);
        assert!(dash.initialize().is_ok());

        let state = dash.state();
        assert_eq!(state.snapshot.metrics.source, SourceTag::UploadedFile);
        assert!(state.is_connected);
        assert!(state.auto_refresh);
        assert_eq!(state.uploaded_content.as_deref(), Some(LOG));
    }

    #[test]
    fn test_initialize_ignores_auto_refresh_without_log() {
        let mut store = MemoryStore::new();
        store.set(AUTO_REFRESH_KEY, "true").unwrap();

        let mut dash = dashboard(store);
        dash.initialize().unwrap();
        assert!(!dash.state().auto_refresh);
    }

    #[test]
    fn test_initialize_with_broken_stored_log() {
        let mut store = MemoryStore::new();
        store.set(CSV_CONTENT_KEY, "not a log").unwrap();

        let mut dash = dashboard(store);
        assert_eq!(dash.initialize(), Err(ParseError::HeaderNotFound));
        assert_eq!(dash.state().snapshot.metrics.source, SourceTag::Fallback);
        assert!(dash.state().last_error.is_some());
    }

    // ── upload / process ──────────────────────────────────────────────────

    #[test]
    fn test_upload_persists_and_displays() {
        let mut dash = dashboard(MemoryStore::new());
        dash.initialize().unwrap();

        dash.upload(LOG.to_string()).unwrap();

        assert_eq!(dash.store.get(CSV_CONTENT_KEY).as_deref(), Some(LOG));
        let state = dash.state();
        assert!(state.is_connected);
        assert!(state.last_error.is_none());
        assert_eq!(state.snapshot.series[0].readings, vec![48.0, 54.0]);
        assert_eq!(state.snapshot.metrics.max_temperature, 54.0);
    }

    #[test]
    fn test_upload_failure_falls_back_and_keeps_content() {
        let mut dash = dashboard(MemoryStore::new());
        dash.upload(LOG.to_string()).unwrap();

        let bad = "Date,Time,UpTime,CPU\n,,,°C\nd,t,u,0\n".to_string();
        assert_eq!(dash.upload(bad.clone()), Err(ParseError::NoValidData));

        let state = dash.state();
        assert_eq!(state.snapshot.metrics.source, SourceTag::Fallback);
        assert!(!state.is_connected);
        assert_eq!(
            state.last_error.as_deref(),
            Some("No valid temperature data found in log file")
        );
        assert_eq!(state.uploaded_content.as_deref(), Some(bad.as_str()));
        assert_eq!(dash.store.get(CSV_CONTENT_KEY), Some(bad));
    }

    #[test]
    fn test_successful_process_clears_previous_error() {
        let mut dash = dashboard(MemoryStore::new());
        let _ = dash.process("garbage");
        assert!(dash.state().last_error.is_some());

        dash.process(LOG).unwrap();
        assert!(dash.state().last_error.is_none());
    }

    // ── auto-refresh / tick ───────────────────────────────────────────────

    #[test]
    fn test_set_auto_refresh_persists() {
        let mut dash = dashboard(MemoryStore::new());
        dash.set_auto_refresh(true);
        assert!(dash.state().auto_refresh);
        assert_eq!(dash.store.get(AUTO_REFRESH_KEY).as_deref(), Some("true"));

        dash.set_auto_refresh(false);
        assert_eq!(dash.store.get(AUTO_REFRESH_KEY).as_deref(), Some("false"));
    }

    #[test]
    fn test_tick_requires_auto_refresh_and_content() {
        let mut dash = dashboard(MemoryStore::new());
        assert!(!dash.tick());

        dash.set_auto_refresh(true);
        assert!(!dash.tick(), "no stored log yet");

        dash.upload(LOG.to_string()).unwrap();
        assert!(dash.tick());

        let snap = &dash.state().snapshot;
        assert_eq!(snap.metrics.source, SourceTag::Simulated);
        assert_eq!(snap.sensor_names(), vec!["CPU", "HDD1"]);
        // Constant 0.5 → baselines without variation.
        assert_eq!(snap.series[0].readings, vec![50.0]);
        assert_eq!(snap.series[1].readings, vec![35.0]);
    }

    #[test]
    fn test_tick_with_headerless_content_keeps_display() {
        let mut dash = dashboard(MemoryStore::new());
        dash.set_auto_refresh(true);
        let _ = dash.upload("garbage".to_string());
        let before = dash.state().snapshot.clone();

        assert!(!dash.tick());
        assert_eq!(dash.state().snapshot, before);
    }
}
