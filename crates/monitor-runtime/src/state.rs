//! Explicit application state.
//!
//! One [`AppState`] is owned by the dashboard controller and lent to whatever
//! renders it; nothing about it is globally reachable.

use chrono::{DateTime, Utc};
use monitor_core::models::ParsedSnapshot;
use serde::Serialize;

/// Everything the dashboard shows, plus the stored log it came from.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Series and metrics currently on display.
    pub snapshot: ParsedSnapshot,
    /// `true` while the snapshot comes from a successfully parsed log.
    pub is_connected: bool,
    pub auto_refresh: bool,
    pub last_update: DateTime<Utc>,
    /// Raw content of the last uploaded log.
    pub uploaded_content: Option<String>,
    /// Message for the user about the last failed upload.
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new(snapshot: ParsedSnapshot) -> Self {
        Self {
            snapshot,
            is_connected: false,
            auto_refresh: false,
            last_update: Utc::now(),
            uploaded_content: None,
            last_error: None,
        }
    }

    /// Immutable, serialisable copy without the raw log content.
    pub fn view(&self) -> DashboardView {
        DashboardView {
            snapshot: self.snapshot.clone(),
            is_connected: self.is_connected,
            auto_refresh: self.auto_refresh,
            last_update: self.last_update,
            has_upload: self.uploaded_content.is_some(),
            last_error: self.last_error.clone(),
        }
    }
}

/// What gets published to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub snapshot: ParsedSnapshot,
    pub is_connected: bool,
    pub auto_refresh: bool,
    pub last_update: DateTime<Utc>,
    pub has_upload: bool,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::models::{SensorSeries, SourceTag};

    fn snapshot() -> ParsedSnapshot {
        ParsedSnapshot::from_series(
            vec![SensorSeries::with_reading("CPU", 50.0)],
            SourceTag::Fallback,
        )
    }

    #[test]
    fn test_new_state_defaults() {
        let state = AppState::new(snapshot());
        assert!(!state.is_connected);
        assert!(!state.auto_refresh);
        assert!(state.uploaded_content.is_none());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_view_omits_content() {
        let mut state = AppState::new(snapshot());
        state.uploaded_content = Some("Date,Time,UpTime,CPU".to_string());
        state.last_error = Some("bad file".to_string());

        let view = state.view();
        assert!(view.has_upload);
        assert_eq!(view.last_error.as_deref(), Some("bad file"));
        assert_eq!(view.snapshot, state.snapshot);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("uploaded_content").is_none());
        assert_eq!(json["snapshot"]["metrics"]["source"], "fallback");
    }
}
