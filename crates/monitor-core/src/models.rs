use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::formatting::round1;

/// Number of sensors the dashboard declares regardless of how many columns a
/// log actually carries. Reported next to the discovered count.
pub const DECLARED_SENSOR_COUNT: usize = 5;

/// Where a snapshot's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Parsed from an uploaded AIDA64 CSV log.
    UploadedFile,
    /// Regenerated around the uploaded log's sensor names on a refresh tick.
    Simulated,
    /// Synthetic placeholder data shown when nothing valid is loaded.
    Fallback,
}

impl SourceTag {
    /// Label shown to the user next to the metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SourceTag::UploadedFile => "AIDA64 CSV",
            SourceTag::Simulated => "AIDA64 CSV (Live)",
            SourceTag::Fallback => "Mock Data",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Temperature band used for colouring / labelling readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureStatus {
    Critical,
    Warning,
    Normal,
    Cool,
}

impl TemperatureStatus {
    /// Bands for CPU log sensors: `> 80` critical, `> 70` warning.
    pub fn for_sensor(temperature: f64) -> Self {
        if temperature > 80.0 {
            TemperatureStatus::Critical
        } else if temperature > 70.0 {
            TemperatureStatus::Warning
        } else {
            TemperatureStatus::Normal
        }
    }

    /// Bands for device feed readings; adds `< 50` cool.
    pub fn for_device(temperature: f64) -> Self {
        match Self::for_sensor(temperature) {
            TemperatureStatus::Normal if temperature < 50.0 => TemperatureStatus::Cool,
            other => other,
        }
    }
}

impl fmt::Display for TemperatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemperatureStatus::Critical => "Critical",
            TemperatureStatus::Warning => "Warning",
            TemperatureStatus::Normal => "Normal",
            TemperatureStatus::Cool => "Cool",
        };
        f.write_str(s)
    }
}

/// Comfort band of the lab room's air temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Warning,
    Caution,
    Normal,
}

impl RoomStatus {
    /// `> 26` warning, `> 25` caution.
    pub fn for_temperature(temperature: f64) -> Self {
        if temperature > 26.0 {
            RoomStatus::Warning
        } else if temperature > 25.0 {
            RoomStatus::Caution
        } else {
            RoomStatus::Normal
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomStatus::Warning => "Warning",
            RoomStatus::Caution => "Caution",
            RoomStatus::Normal => "Normal",
        };
        f.write_str(s)
    }
}

/// What the room's air conditioning should be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcAction {
    Cooling,
    Standby,
}

impl AcAction {
    /// Cooling above 25 °C.
    pub fn for_temperature(temperature: f64) -> Self {
        if temperature > 25.0 {
            AcAction::Cooling
        } else {
            AcAction::Standby
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcAction::Cooling => "AC ON - Cooling",
            AcAction::Standby => "AC OFF - Standby",
        }
    }
}

impl fmt::Display for AcAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One monitored quantity (a log column) for the duration of one log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSeries {
    /// Slug of `name`, stable across refreshes.
    pub id: String,
    /// Header cell, verbatim.
    pub name: String,
    /// Samples in file order; every value is finite and `> 0`.
    pub readings: Vec<f64>,
    /// Display heuristic derived from `name`, not measured hardware data.
    pub core_count: u32,
}

impl SensorSeries {
    /// Create an empty series for the given header name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: sensor_id(&name),
            core_count: core_count_for(&name),
            name,
            readings: Vec::new(),
        }
    }

    /// Create a series holding a single sample.
    pub fn with_reading(name: impl Into<String>, reading: f64) -> Self {
        let mut series = Self::new(name);
        series.readings.push(reading);
        series
    }

    /// Mean of the readings, rounded to one decimal. `0.0` when empty.
    pub fn average(&self) -> f64 {
        if self.readings.is_empty() {
            return 0.0;
        }
        round1(self.readings.iter().sum::<f64>() / self.readings.len() as f64)
    }

    /// Largest reading, rounded to one decimal. `0.0` when empty.
    pub fn max(&self) -> f64 {
        self.readings
            .iter()
            .copied()
            .reduce(f64::max)
            .map(round1)
            .unwrap_or(0.0)
    }

    /// Most recent reading.
    pub fn current(&self) -> Option<f64> {
        self.readings.last().copied()
    }

    /// Status band of the average temperature.
    pub fn status(&self) -> TemperatureStatus {
        TemperatureStatus::for_sensor(self.average())
    }

    /// Flatten the derived statistics into a serialisable row.
    pub fn summary(&self) -> SensorSummary {
        SensorSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            current: self.current(),
            average: self.average(),
            max: self.max(),
            samples: self.readings.len(),
            core_count: self.core_count,
            status: self.status(),
        }
    }
}

/// Derived view of a [`SensorSeries`] used by reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSummary {
    pub id: String,
    pub name: String,
    pub current: Option<f64>,
    pub average: f64,
    pub max: f64,
    pub samples: usize,
    pub core_count: u32,
    pub status: TemperatureStatus,
}

/// Summary over every series produced by one parse or simulation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// Always [`DECLARED_SENSOR_COUNT`].
    pub total_sensor_count: usize,
    /// Number of series actually produced.
    pub discovered_sensor_count: usize,
    /// Mean over every individual reading, not over per-sensor means.
    pub average_temperature: f64,
    /// Largest individual reading.
    pub max_temperature: f64,
    pub source: SourceTag,
}

impl AggregateMetrics {
    /// Compute metrics over a flat list of readings.
    pub fn compute(readings: &[f64], discovered_sensor_count: usize, source: SourceTag) -> Self {
        let (average_temperature, max_temperature) = if readings.is_empty() {
            (0.0, 0.0)
        } else {
            let sum: f64 = readings.iter().sum();
            let max = readings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (round1(sum / readings.len() as f64), round1(max))
        };

        Self {
            total_sensor_count: DECLARED_SENSOR_COUNT,
            discovered_sensor_count,
            average_temperature,
            max_temperature,
            source,
        }
    }

    /// `true` when the declared constant disagrees with what was found.
    pub fn sensor_count_mismatch(&self) -> bool {
        self.total_sensor_count != self.discovered_sensor_count
    }
}

/// Complete, immutable result of one ingest or simulation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSnapshot {
    pub series: Vec<SensorSeries>,
    pub metrics: AggregateMetrics,
    /// Length of the flat reading list the metrics were computed over.
    pub sample_count: usize,
}

impl ParsedSnapshot {
    /// Aggregate `series` into a snapshot tagged with `source`.
    pub fn from_series(series: Vec<SensorSeries>, source: SourceTag) -> Self {
        let all: Vec<f64> = series
            .iter()
            .flat_map(|s| s.readings.iter().copied())
            .collect();
        let metrics = AggregateMetrics::compute(&all, series.len(), source);
        Self {
            series,
            metrics,
            sample_count: all.len(),
        }
    }

    /// Names of the series in display order.
    pub fn sensor_names(&self) -> Vec<String> {
        self.series.iter().map(|s| s.name.clone()).collect()
    }

    pub fn summaries(&self) -> Vec<SensorSummary> {
        self.series.iter().map(SensorSeries::summary).collect()
    }
}

/// Heuristic core count from substrings of the sensor name.
///
/// First match wins: `Package` → 8, `IA` → 4, `GT` → 4, `HDD` → 0, else 1.
pub fn core_count_for(name: &str) -> u32 {
    if name.contains("Package") {
        8
    } else if name.contains("IA") || name.contains("GT") {
        4
    } else if name.contains("HDD") {
        0
    } else {
        1
    }
}

/// Lowercase `name` and replace every character outside `[a-z0-9]` with `-`.
///
/// ```
/// use monitor_core::models::sensor_id;
///
/// assert_eq!(sensor_id("CPU IA Cores"), "cpu-ia-cores");
/// assert_eq!(sensor_id("HDD1"), "hdd1");
/// ```
pub fn sensor_id(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]").expect("valid regex"));
    re.replace_all(&name.to_lowercase(), "-").into_owned()
}
