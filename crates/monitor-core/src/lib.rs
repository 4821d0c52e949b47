//! Core types for the lab monitor.
//!
//! Holds the sensor data model, the error taxonomy, rounding and formatting
//! helpers, the pluggable synthetic-data source and the CLI settings shared
//! by the data, runtime and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod synthetic;
