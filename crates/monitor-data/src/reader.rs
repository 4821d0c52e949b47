//! Loading AIDA64 logs from disk.

use std::borrow::Cow;
use std::path::Path;

use monitor_core::error::{MonitorError, Result};
use monitor_core::models::{ParsedSnapshot, SourceTag};
use tracing::{debug, warn};

use crate::csv_log::parse_log;

/// Read a log file into memory.
///
/// AIDA64 may write the `°` of the units row in a legacy code page, so bytes
/// that are not valid UTF-8 are replaced instead of failing the load.
pub fn load_log_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| MonitorError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let content = match String::from_utf8_lossy(&bytes) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => {
            warn!(path = %path.display(), "log is not valid UTF-8; invalid bytes replaced");
            s
        }
    };

    debug!(path = %path.display(), bytes = bytes.len(), "loaded log file");
    Ok(content)
}

/// Load and parse a log file in one step.
pub fn parse_log_file(path: &Path) -> Result<ParsedSnapshot> {
    let content = load_log_file(path)?;
    Ok(parse_log(&content, SourceTag::UploadedFile)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::error::ParseError;
    use tempfile::TempDir;

    #[test]
    fn test_load_log_file_utf8() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("log.csv");
        std::fs::write(&path, "Date,Time,UpTime,CPU\n,,,°C\nd,t,u,40\n").unwrap();

        let content = load_log_file(&path).unwrap();
        assert!(content.contains("°C"));
    }

    #[test]
    fn test_load_log_file_latin1_units_row() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("log.csv");
        // 0xB0 is '°' in Windows-1252 and invalid on its own in UTF-8.
        let mut bytes = b"Date,Time,UpTime,CPU\n,,,".to_vec();
        bytes.push(0xB0);
        bytes.extend_from_slice(b"C\nd,t,u,40\n");
        std::fs::write(&path, bytes).unwrap();

        let snap = parse_log_file(&path).unwrap();
        assert_eq!(snap.series[0].readings, vec![40.0]);
    }

    #[test]
    fn test_load_log_file_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_log_file(&tmp.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, MonitorError::FileRead { .. }));
    }

    #[test]
    fn test_parse_log_file_propagates_parse_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("empty.csv");
        std::fs::write(&path, "nothing useful\n").unwrap();

        let err = parse_log_file(&path).unwrap_err();
        assert!(matches!(err, MonitorError::Parse(ParseError::HeaderNotFound)));
    }
}
