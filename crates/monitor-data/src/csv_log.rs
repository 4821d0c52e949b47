//! AIDA64 CSV log ingestion.
//!
//! A log is a handful of metadata lines, a header row
//! (`Date,Time,UpTime,<sensor>...`), a units row (`,,,°C,...`) and one data
//! row per sample. [`parse_log`] turns the whole buffered file into one
//! [`ParsedSnapshot`]; malformed cells are dropped one by one, a missing header
//! or an empty result fails the whole pass.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord};
use monitor_core::error::ParseError;
use monitor_core::models::{ParsedSnapshot, SensorSeries, SourceTag};
use tracing::debug;

/// One CSV line exactly as read, before interpretation.
pub type RawLogRow = StringRecord;

/// Columns before the first sensor: Date, Time, UpTime.
pub const STRUCTURAL_COLUMNS: usize = 3;

/// Substring that identifies a header row when the first cell is not `Date`.
const HEADER_SIGNATURE: &str = "Date,Time,UpTime,CPU";

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse a complete AIDA64 log into per-sensor series and aggregate metrics.
///
/// Every header column from index 3 onward is a sensor. For each data row with
/// at least four cells, a sensor cell contributes a reading when it parses as a
/// finite number greater than zero. Columns sharing a name feed the same
/// series. Series appear in the order their first reading was accepted.
///
/// # Errors
///
/// * [`ParseError::HeaderNotFound`] when no header row exists.
/// * [`ParseError::NoValidData`] when no cell yielded a reading.
pub fn parse_log(content: &str, source: SourceTag) -> Result<ParsedSnapshot, ParseError> {
    let rows = read_rows(content);
    let header_index = find_header_row(&rows).ok_or(ParseError::HeaderNotFound)?;
    let sensor_names: Vec<&str> = rows[header_index]
        .iter()
        .skip(STRUCTURAL_COLUMNS)
        .collect();

    let mut series: Vec<SensorSeries> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut accepted = 0usize;
    let mut dropped_cells = 0usize;
    let mut short_rows = 0usize;

    // The units row right after the header is skipped without inspection.
    for row in rows.iter().skip(header_index + 2) {
        if row.len() <= STRUCTURAL_COLUMNS {
            short_rows += 1;
            continue;
        }

        for (offset, name) in sensor_names.iter().enumerate() {
            let Some(value) = row.get(STRUCTURAL_COLUMNS + offset).and_then(parse_reading) else {
                dropped_cells += 1;
                continue;
            };

            let slot = *slots.entry(*name).or_insert_with(|| {
                series.push(SensorSeries::new(*name));
                series.len() - 1
            });
            series[slot].readings.push(value);
            accepted += 1;
        }
    }

    debug!(
        rows = rows.len(),
        header_index,
        columns = sensor_names.len(),
        sensors = series.len(),
        accepted,
        dropped_cells,
        short_rows,
        "parsed AIDA64 log"
    );

    if accepted == 0 {
        return Err(ParseError::NoValidData);
    }

    Ok(ParsedSnapshot::from_series(series, source))
}

/// Sensor names of the log's header row, verbatim and in column order.
///
/// Duplicated names are kept; this is the name list the resimulation works
/// from.
pub fn discover_sensor_names(content: &str) -> Result<Vec<String>, ParseError> {
    let rows = read_rows(content);
    let header_index = find_header_row(&rows).ok_or(ParseError::HeaderNotFound)?;
    Ok(rows[header_index]
        .iter()
        .skip(STRUCTURAL_COLUMNS)
        .map(str::to_string)
        .collect())
}

/// Index of the first header row: first cell is exactly `Date`, or the cells
/// joined by commas contain `Date,Time,UpTime,CPU`.
pub fn find_header_row(rows: &[RawLogRow]) -> Option<usize> {
    rows.iter().position(|row| {
        row.get(0) == Some("Date")
            || row
                .iter()
                .collect::<Vec<_>>()
                .join(",")
                .contains(HEADER_SIGNATURE)
    })
}

/// Split `content` into records with standard CSV quoting.
///
/// Rows may have any length; blank lines are skipped. A leading UTF-8 BOM is
/// ignored.
pub fn read_rows(content: &str) -> Vec<RawLogRow> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        match record {
            Ok(r) if is_blank(&r) => continue,
            Ok(r) => rows.push(r),
            Err(e) => debug!(index, error = %e, "skipping unreadable CSV record"),
        }
    }
    rows
}

/// A cell's reading, when it is a finite number strictly greater than zero.
///
/// AIDA64 never writes a sign on positive values, so a leading `+` is
/// treated as non-numeric.
pub fn parse_reading(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.starts_with('+') {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(str::is_empty)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
