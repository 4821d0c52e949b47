//! Synthetic readings: periodic resimulation of an uploaded log's sensors and
//! the placeholder data set shown when nothing valid is loaded.

use monitor_core::error::ParseError;
use monitor_core::formatting::round1;
use monitor_core::models::{ParsedSnapshot, SensorSeries, SourceTag};
use monitor_core::synthetic::SyntheticSource;

use crate::csv_log::discover_sensor_names;

/// Half-width of the uniform noise added on each resimulation.
pub const RESIMULATION_NOISE: f64 = 3.0;

/// Lowest temperature a resimulated sensor can report.
pub const RESIMULATION_FLOOR: f64 = 25.0;

/// Half-width of the uniform noise used for placeholder data.
pub const MOCK_NOISE: f64 = 7.5;

/// Sensor names of the placeholder data set.
pub const MOCK_SENSORS: [&str; 5] = ["CPU", "CPU Package", "CPU IA Cores", "CPU GT Cores", "HDD1"];

/// Baseline around which a resimulated sensor varies.
///
/// HDD-like names sit at 35 °C, CPU-like names at 50 °C, anything else at 45 °C.
pub fn resimulation_baseline(name: &str) -> f64 {
    if name.contains("HDD") {
        35.0
    } else if name.contains("CPU") {
        50.0
    } else {
        45.0
    }
}

/// Fresh one-sample series for every name.
///
/// Each reading is the name's baseline plus uniform noise in `[-3, +3)`,
/// floored at 25 °C and rounded to one decimal. Nothing from earlier passes
/// is reused.
pub fn resimulate<R>(sensor_names: &[String], source: &mut R) -> Vec<SensorSeries>
where
    R: SyntheticSource + ?Sized,
{
    sensor_names
        .iter()
        .map(|name| {
            let variation = source.uniform(-RESIMULATION_NOISE, RESIMULATION_NOISE);
            let reading = round1((resimulation_baseline(name) + variation).max(RESIMULATION_FLOOR));
            SensorSeries::with_reading(name.as_str(), reading)
        })
        .collect()
}

/// Resimulate the sensors named in `content`'s header into a snapshot tagged
/// [`SourceTag::Simulated`].
pub fn simulate_snapshot<R>(content: &str, source: &mut R) -> Result<ParsedSnapshot, ParseError>
where
    R: SyntheticSource + ?Sized,
{
    let names = discover_sensor_names(content)?;
    let series = resimulate(&names, source);
    Ok(ParsedSnapshot::from_series(series, SourceTag::Simulated))
}

/// Placeholder snapshot tagged [`SourceTag::Fallback`].
///
/// HDD sensors vary around 35 °C, the others around 65 °C, by up to ±7.5 °C.
pub fn generate_mock_snapshot<R>(source: &mut R) -> ParsedSnapshot
where
    R: SyntheticSource + ?Sized,
{
    let series = MOCK_SENSORS
        .iter()
        .map(|name| {
            let baseline = if name.contains("HDD") { 35.0 } else { 65.0 };
            let reading = round1(baseline + source.uniform(-MOCK_NOISE, MOCK_NOISE));
            SensorSeries::with_reading(*name, reading)
        })
        .collect();
    ParsedSnapshot::from_series(series, SourceTag::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::synthetic::{RandomSource, SequenceSource};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ── resimulation_baseline ─────────────────────────────────────────────────

    #[test]
    fn test_baselines() {
        assert_eq!(resimulation_baseline("HDD1"), 35.0);
        assert_eq!(resimulation_baseline("CPU Package"), 50.0);
        assert_eq!(resimulation_baseline("GPU Diode"), 45.0);
        // HDD is checked before CPU.
        assert_eq!(resimulation_baseline("CPU HDD Bridge"), 35.0);
    }

    // ── resimulate ────────────────────────────────────────────────────────────

    #[test]
    fn test_resimulate_deterministic_values() {
        // 0.5 → no variation, 0.0 → -3, 0.75 → +1.5
        let mut src = SequenceSource::new(vec![0.5, 0.0, 0.75]);
        let series = resimulate(&names(&["CPU", "HDD1", "Chipset"]), &mut src);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].readings, vec![50.0]);
        assert_eq!(series[1].readings, vec![32.0]);
        assert_eq!(series[2].readings, vec![46.5]);
        assert_eq!(series[0].id, "cpu");
        assert_eq!(series[1].core_count, 0);
    }

    #[test]
    fn test_resimulate_stays_within_bounds() {
        let mut src = RandomSource::seeded(11);
        let list = names(&["CPU", "HDD1", "Other"]);
        for _ in 0..500 {
            for s in resimulate(&list, &mut src) {
                let base = resimulation_baseline(&s.name);
                let v = s.readings[0];
                assert_eq!(s.readings.len(), 1);
                assert!(v >= RESIMULATION_FLOOR);
                assert!(v >= base - RESIMULATION_NOISE - 0.05);
                assert!(v <= base + RESIMULATION_NOISE + 0.05);
            }
        }
    }

    #[test]
    fn test_resimulate_is_fresh_each_call() {
        let mut src = SequenceSource::new(vec![0.1, 0.9]);
        let list = names(&["CPU"]);
        let first = resimulate(&list, &mut src);
        let second = resimulate(&list, &mut src);
        assert_eq!(first[0].readings.len(), 1);
        assert_eq!(second[0].readings.len(), 1);
        assert_ne!(first[0].readings, second[0].readings);
    }

    #[test]
    fn test_resimulate_empty_names() {
        let mut src = SequenceSource::constant(0.5);
        assert!(resimulate(&[], &mut src).is_empty());
    }

    // ── simulate_snapshot ─────────────────────────────────────────────────────

    #[test]
    fn test_simulate_snapshot_uses_header_names() {
        let log = "Date,Time,UpTime,CPU,HDD1\n,,,°C,°C\nd,t,u,0,0\n";
        let mut src = SequenceSource::constant(0.5);
        let snap = simulate_snapshot(log, &mut src).unwrap();

        assert_eq!(snap.sensor_names(), vec!["CPU", "HDD1"]);
        assert_eq!(snap.metrics.source, SourceTag::Simulated);
        assert_eq!(snap.metrics.average_temperature, 42.5);
        assert_eq!(snap.metrics.max_temperature, 50.0);
        assert_eq!(snap.metrics.discovered_sensor_count, 2);
        assert_eq!(snap.metrics.total_sensor_count, 5);
    }

    #[test]
    fn test_simulate_snapshot_without_header() {
        let mut src = SequenceSource::constant(0.5);
        assert_eq!(
            simulate_snapshot("garbage", &mut src),
            Err(ParseError::HeaderNotFound)
        );
    }

    // ── generate_mock_snapshot ────────────────────────────────────────────────

    #[test]
    fn test_mock_snapshot_deterministic() {
        let mut src = SequenceSource::constant(0.5);
        let snap = generate_mock_snapshot(&mut src);

        assert_eq!(snap.metrics.source, SourceTag::Fallback);
        assert_eq!(snap.series.len(), MOCK_SENSORS.len());
        assert_eq!(snap.series[0].readings, vec![65.0]);
        assert_eq!(snap.series[4].readings, vec![35.0]);
        // (65 * 4 + 35) / 5 = 59.0
        assert_eq!(snap.metrics.average_temperature, 59.0);
        assert_eq!(snap.metrics.max_temperature, 65.0);
        assert!(!snap.metrics.sensor_count_mismatch());
    }

    #[test]
    fn test_mock_snapshot_bounds() {
        let mut src = RandomSource::seeded(3);
        for _ in 0..200 {
            let snap = generate_mock_snapshot(&mut src);
            for s in &snap.series {
                let base = if s.name.contains("HDD") { 35.0 } else { 65.0 };
                let v = s.readings[0];
                assert!(v >= base - MOCK_NOISE - 0.05 && v <= base + MOCK_NOISE + 0.05);
            }
        }
    }
}
