//! Plain-text rendering of dashboard views and feed tables.

use std::fmt::Write;

use monitor_core::formatting::{
    format_humidity, format_optional_temperature, format_temperature, pad_cell,
};
use monitor_data::feeds::{DeviceFeed, EnvironmentFeed, LabFeed};
use monitor_runtime::DashboardView;

const NAME_WIDTH: usize = 24;
const VALUE_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 9;

fn connection_label(connected: bool) -> &'static str {
    if connected {
        "connected"
    } else {
        "disconnected"
    }
}

fn rule(width: usize) -> String {
    "─".repeat(width)
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// Render the metrics header and the per-sensor table.
pub fn render_dashboard(view: &DashboardView) -> String {
    let metrics = &view.snapshot.metrics;
    let mut out = String::new();

    let _ = writeln!(out, "Source:        {} ({})", metrics.source, connection_label(view.is_connected));
    let _ = writeln!(
        out,
        "Last update:   {}",
        view.last_update.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Auto-refresh:  {}",
        if view.auto_refresh { "on" } else { "off" }
    );
    let _ = writeln!(
        out,
        "Sensors:       {} declared, {} discovered",
        metrics.total_sensor_count, metrics.discovered_sensor_count
    );
    let _ = writeln!(out, "Average:       {}", format_temperature(metrics.average_temperature));
    let _ = writeln!(out, "Maximum:       {}", format_temperature(metrics.max_temperature));
    let _ = writeln!(out, "Samples:       {}", view.snapshot.sample_count);
    out.push('\n');

    let header = format!(
        "{}{}{}{}{}{}",
        pad_cell("Sensor", NAME_WIDTH),
        pad_cell("Current", VALUE_WIDTH),
        pad_cell("Average", VALUE_WIDTH),
        pad_cell("Max", VALUE_WIDTH),
        pad_cell("Cores", 6),
        pad_cell("Status", STATUS_WIDTH),
    );
    let width = header.chars().count();
    let _ = writeln!(out, "{}", header.trim_end());
    let _ = writeln!(out, "{}", rule(width));

    for summary in view.snapshot.summaries() {
        let line = format!(
            "{}{}{}{}{}{}",
            pad_cell(&summary.name, NAME_WIDTH),
            pad_cell(&format_optional_temperature(summary.current), VALUE_WIDTH),
            pad_cell(&format_temperature(summary.average), VALUE_WIDTH),
            pad_cell(&format_temperature(summary.max), VALUE_WIDTH),
            pad_cell(&summary.core_count.to_string(), 6),
            pad_cell(&summary.status.to_string(), STATUS_WIDTH),
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }

    if let Some(error) = &view.last_error {
        let _ = writeln!(out, "\n! {error}; showing placeholder data");
    }

    out
}

// ── Feeds ─────────────────────────────────────────────────────────────────────

/// Render the latest reading per device.
pub fn render_device_feed(feed: &DeviceFeed) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Devices: {} ({})",
        feed.connected_devices.len(),
        connection_label(feed.is_connected)
    );
    if feed.devices.is_empty() {
        let _ = writeln!(out, "No device readings.");
        return out;
    }

    let header = format!(
        "{}{}{}{}",
        pad_cell("Device", 16),
        pad_cell("Temp", VALUE_WIDTH),
        pad_cell("Status", STATUS_WIDTH),
        "Reported",
    );
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", rule(header.chars().count() + 12));

    for device in &feed.devices {
        let line = format!(
            "{}{}{}{} {}",
            pad_cell(&device.device_id, 16),
            pad_cell(&format_optional_temperature(device.temperature), VALUE_WIDTH),
            pad_cell(&device.status.to_string(), STATUS_WIDTH),
            device.date,
            device.time,
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Render the lab room's average over its records.
pub fn render_lab_feed(feed: &LabFeed) -> String {
    format!(
        "Lab: {} records, average {} ({})\n",
        feed.records.len(),
        format_temperature(feed.average_temperature),
        connection_label(feed.is_connected)
    )
}

fn format_optional_humidity(percent: Option<f64>) -> String {
    percent.map(format_humidity).unwrap_or_else(|| "--".to_string())
}

/// Render the latest environmental sample, the history averages and the
/// ten-minute monitoring table.
pub fn render_environment_feed(feed: &EnvironmentFeed) -> String {
    let mut out = String::new();
    match &feed.latest {
        Some(latest) => {
            let _ = writeln!(
                out,
                "Environment: {} / {} at {} ({})",
                format_optional_temperature(latest.temperature),
                format_optional_humidity(latest.humidity),
                latest.time,
                connection_label(feed.is_connected)
            );
        }
        None => {
            let _ = writeln!(out, "Environment: no samples ({})", connection_label(feed.is_connected));
        }
    }

    let summary = &feed.summary;
    let _ = writeln!(
        out,
        "Averages:    {} / {} over {} samples",
        format_temperature(summary.average_temperature),
        format_humidity(summary.average_humidity),
        feed.history.len()
    );

    for row in &summary.rows {
        let line = format!(
            "  {}{}{}{}{}",
            pad_cell(&row.time, 12),
            pad_cell(&format_temperature(row.temperature), VALUE_WIDTH),
            pad_cell(&format_humidity(row.humidity), VALUE_WIDTH),
            pad_cell(&row.status.to_string(), STATUS_WIDTH),
            row.ac_action,
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
