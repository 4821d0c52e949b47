//! Data ingestion layer for the lab monitor.
//!
//! Parses AIDA64 CSV logs into sensor series, synthesises resimulated and
//! placeholder readings, and turns cloud feed snapshots into device, lab and
//! environment views.

pub mod csv_log;
pub mod feeds;
pub mod reader;
pub mod simulation;

pub use monitor_core as core;
