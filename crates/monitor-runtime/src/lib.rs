//! Runtime layer for the lab temperature monitor.
//!
//! Holds the explicit application state, the dashboard controller that
//! applies upload and fallback policies to it, persistence of the last log,
//! and the async refresh loop.

pub mod dashboard;
pub mod orchestrator;
pub mod state;
pub mod store;

pub use dashboard::Dashboard;
pub use orchestrator::{RefreshHandle, RefreshOrchestrator};
pub use state::{AppState, DashboardView};
pub use store::{JsonFileStore, KvStore, MemoryStore};

pub use monitor_core as core;
pub use monitor_data as data;
