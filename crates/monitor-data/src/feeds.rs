//! Consumption of the cloud database push feeds.
//!
//! The feeds are eventually consistent and carry no ordering or replay
//! guarantees: records may arrive out of order, go missing or disappear with
//! the whole node. Every function here works from one full snapshot of a feed
//! node and never assumes anything about the previous one.
//!
//! Snapshot shapes:
//! * devices (`data_suhu`): `{ <device>: { <push-key>: DeviceReading } }`
//! * lab (`data_suhu/pc_lab1`): `{ <push-key>: DeviceReading }`
//! * environment (`sensor`): `{ <push-key>: EnvironmentSample }`

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use monitor_core::error::{MonitorError, Result};
use monitor_core::formatting::round1;
use monitor_core::models::{AcAction, RoomStatus, TemperatureStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Number of environmental samples kept for the history chart.
pub const ENVIRONMENT_HISTORY_LIMIT: usize = 50;

/// Minutes past the hour at which samples enter the monitoring table.
const TABLE_MINUTES: [u32; 6] = [0, 10, 20, 30, 40, 50];

// ── Feed source ───────────────────────────────────────────────────────────────

/// Anything that can hand over the latest snapshot of a feed node.
///
/// `Ok(None)` means the node does not exist (the feed is disconnected or
/// empty), which consumers treat as a normal state.
pub trait FeedSource {
    fn snapshot(&self) -> Result<Option<Value>>;
}

/// A feed snapshot exported to a JSON file, optionally narrowed to a child
/// node (`data_suhu/pc_lab1`).
#[derive(Debug, Clone)]
pub struct JsonFileFeed {
    path: PathBuf,
    child: Option<String>,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            child: None,
        }
    }

    /// Narrow the snapshot to the node at `child` (slash separated).
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.child = Some(child.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for JsonFileFeed {
    fn snapshot(&self) -> Result<Option<Value>> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| MonitorError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        let root: Value = serde_json::from_str(&content)?;
        Ok(child_node(root, self.child.as_deref()))
    }
}

/// Walk `path` (slash separated) down from `root`; `null` counts as absent.
pub fn child_node(root: Value, path: Option<&str>) -> Option<Value> {
    let mut node = root;
    if let Some(path) = path {
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = match node {
                Value::Object(mut map) => map.remove(segment)?,
                Value::Array(mut items) => {
                    let index: usize = segment.parse().ok()?;
                    if index >= items.len() {
                        return None;
                    }
                    items.swap_remove(index)
                }
                _ => return None,
            };
        }
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One temperature sample pushed by a lab machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    #[serde(rename = "suhu", default)]
    pub temperature: Option<f64>,
    #[serde(rename = "tanggal", default)]
    pub date: String,
    #[serde(rename = "waktu", default)]
    pub time: String,
    #[serde(default)]
    pub timestamp: String,
}

impl DeviceReading {
    /// `timestamp` as UTC, when it is in a recognised format.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_feed_timestamp(&self.timestamp)
    }
}

/// Latest reading of one device, as shown in the device table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// `<device>-firebase`
    pub id: String,
    pub device_id: String,
    pub temperature: Option<f64>,
    pub date: String,
    pub time: String,
    pub timestamp: String,
    pub status: TemperatureStatus,
}

/// One humidity/temperature sample from the lab's environmental sensor.
///
/// A sample missing either reading still counts toward the history averages
/// (as 0) but never reaches the monitoring table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSample {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl EnvironmentSample {
    /// Both readings, when present and physically plausible:
    /// `-50 < temperature < 100` and `0 <= humidity <= 100`.
    pub fn plausible_readings(&self) -> Option<(f64, f64)> {
        let temperature = self.temperature.filter(|t| t.is_finite() && *t > -50.0 && *t < 100.0)?;
        let humidity = self
            .humidity
            .filter(|h| h.is_finite() && (0.0..=100.0).contains(h))?;
        Some((temperature, humidity))
    }
}

/// One line of the room monitoring table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRow {
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub status: RoomStatus,
    pub ac_action: AcAction,
}

/// Averages over the sample history plus the monitoring table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    pub average_temperature: f64,
    pub average_humidity: f64,
    /// Plausible samples taken at ten-minute marks, newest first.
    pub rows: Vec<EnvironmentRow>,
}

// ── Processed feeds ───────────────────────────────────────────────────────────

/// Device table built from the `data_suhu` feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceFeed {
    pub devices: Vec<DeviceStatus>,
    /// Every device id present in the snapshot, including ones without a
    /// usable reading.
    pub connected_devices: Vec<String>,
    pub is_connected: bool,
}

/// Records and mean temperature of a single lab machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabFeed {
    pub records: Vec<DeviceReading>,
    pub average_temperature: f64,
    pub is_connected: bool,
}

/// Recent environmental samples and the newest one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFeed {
    pub latest: Option<EnvironmentSample>,
    pub history: Vec<EnvironmentSample>,
    pub summary: EnvironmentSummary,
    pub is_connected: bool,
}

/// Build the device table from a `data_suhu` snapshot.
///
/// For every device the reading with the greatest parsable timestamp wins,
/// whatever order the records arrived in. Readings whose timestamp cannot be
/// parsed never win; a device with no parsable timestamp gets no row but is
/// still listed as connected.
pub fn process_device_feed(snapshot: Option<&Value>) -> Result<DeviceFeed> {
    let Some(root) = snapshot else {
        return Ok(DeviceFeed::default());
    };
    let Value::Object(devices) = root else {
        return Err(MonitorError::Feed(
            "device feed root is not an object".to_string(),
        ));
    };

    let mut feed = DeviceFeed {
        is_connected: true,
        ..DeviceFeed::default()
    };

    for (device_id, records) in devices {
        feed.connected_devices.push(device_id.clone());

        let latest = typed_children::<DeviceReading>(records)
            .into_iter()
            .filter_map(|r| r.parsed_timestamp().map(|ts| (ts, r)))
            .fold(None::<(DateTime<Utc>, DeviceReading)>, |best, (ts, r)| match best {
                Some((best_ts, _)) if ts <= best_ts => best,
                _ => Some((ts, r)),
            });

        match latest {
            Some((_, reading)) => feed.devices.push(DeviceStatus {
                id: format!("{device_id}-firebase"),
                device_id: device_id.clone(),
                temperature: reading.temperature,
                status: reading
                    .temperature
                    .map(TemperatureStatus::for_device)
                    .unwrap_or(TemperatureStatus::Normal),
                date: reading.date,
                time: reading.time,
                timestamp: reading.timestamp,
            }),
            None => debug!(device_id = %device_id, "no reading with a parsable timestamp"),
        }
    }

    // Object key order depends on serde_json features; keep the table stable.
    feed.connected_devices.sort();
    feed.devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));

    Ok(feed)
}

/// Average the records of one lab machine (`data_suhu/pc_lab1`).
///
/// A record without a temperature counts as 0 °C. The mean is rounded to one
/// decimal; an empty or non-finite result reports 0.
pub fn process_lab_feed(snapshot: Option<&Value>) -> LabFeed {
    let Some(root) = snapshot else {
        return LabFeed::default();
    };

    let records = typed_children::<DeviceReading>(root);
    let average_temperature = if records.is_empty() {
        0.0
    } else {
        let sum: f64 = records.iter().map(|r| r.temperature.unwrap_or(0.0)).sum();
        let avg = sum / records.len() as f64;
        if avg.is_finite() {
            round1(avg)
        } else {
            0.0
        }
    };

    LabFeed {
        records,
        average_temperature,
        is_connected: true,
    }
}

/// Keep the last [`ENVIRONMENT_HISTORY_LIMIT`] samples of the `sensor` feed.
pub fn process_environment_feed(snapshot: Option<&Value>) -> EnvironmentFeed {
    let Some(root) = snapshot else {
        return EnvironmentFeed::default();
    };

    let mut samples = typed_children::<EnvironmentSample>(root);
    if samples.len() > ENVIRONMENT_HISTORY_LIMIT {
        samples.drain(..samples.len() - ENVIRONMENT_HISTORY_LIMIT);
    }

    EnvironmentFeed {
        latest: samples.last().cloned(),
        summary: summarize_environment(&samples),
        history: samples,
        is_connected: true,
    }
}

/// Average the history and build the monitoring table.
///
/// Averages cover every sample, a missing reading counting as 0, and are 0
/// for an empty history. The table keeps only plausible samples whose time
/// falls on a ten-minute mark, newest first.
pub fn summarize_environment(history: &[EnvironmentSample]) -> EnvironmentSummary {
    let mean = |values: Vec<f64>| {
        if values.is_empty() {
            return 0.0;
        }
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        if avg.is_finite() {
            round1(avg)
        } else {
            0.0
        }
    };

    let average_temperature = mean(history.iter().map(|s| s.temperature.unwrap_or(0.0)).collect());
    let average_humidity = mean(history.iter().map(|s| s.humidity.unwrap_or(0.0)).collect());

    let rows = history
        .iter()
        .rev()
        .filter(|s| is_ten_minute_mark(&s.time))
        .filter_map(|s| {
            let (temperature, humidity) = s.plausible_readings()?;
            Some(EnvironmentRow {
                time: s.time.clone(),
                temperature,
                humidity,
                status: RoomStatus::for_temperature(temperature),
                ac_action: AcAction::for_temperature(temperature),
            })
        })
        .collect();

    EnvironmentSummary {
        average_temperature,
        average_humidity,
        rows,
    }
}

/// `true` when the minute field of an `HH:MM[:SS]` time is a multiple of ten.
///
/// Only the leading digits of the minute field count, so `10:20 PM` matches.
pub fn is_ten_minute_mark(time: &str) -> bool {
    let Some(minute_field) = time.split(':').nth(1) else {
        return false;
    };
    let digits: String = minute_field
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits
        .parse::<u32>()
        .map(|minute| TABLE_MINUTES.contains(&minute))
        .unwrap_or(false)
}

/// Parse a feed timestamp: RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM:SS`
/// taken as UTC.
pub fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Deserialize the children of an object (in key order) or array, skipping
/// `null` holes and records that do not fit `T`.
fn typed_children<T: DeserializeOwned>(node: &Value) -> Vec<T> {
    let children: Vec<&Value> = match node {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        other => {
            warn!(kind = %value_kind(other), "feed node has no children");
            return Vec::new();
        }
    };

    children
        .into_iter()
        .filter(|v| !v.is_null())
        .filter_map(|v| match T::deserialize(v) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "skipping malformed feed record");
                None
            }
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
