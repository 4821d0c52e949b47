use std::path::PathBuf;
use thiserror::Error;

/// Failures of the CSV log ingestor.
///
/// Both variants are expected-input failures: the caller decides what to show
/// instead (see the dashboard controller's fallback policy).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No row starting with `Date` (or containing `Date,Time,UpTime,CPU`).
    #[error("Header row not found in log file")]
    HeaderNotFound,

    /// A header was found but no cell yielded a positive numeric reading.
    #[error("No valid temperature data found in log file")]
    NoValidData,
}

/// All errors produced by the lab monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The log content could not be turned into sensor series.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A feed snapshot did not have the expected shape.
    #[error("Feed error: {0}")]
    Feed(String),

    /// A configuration value is out of range or unknown.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the monitor crates.
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            ParseError::HeaderNotFound.to_string(),
            "Header row not found in log file"
        );
        assert_eq!(
            ParseError::NoValidData.to_string(),
            "No valid temperature data found in log file"
        );
    }

    #[test]
    fn test_parse_error_is_transparent_in_monitor_error() {
        let err: MonitorError = ParseError::NoValidData.into();
        assert_eq!(err.to_string(), "No valid temperature data found in log file");
        assert!(matches!(err, MonitorError::Parse(ParseError::NoValidData)));
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = MonitorError::FileRead {
            path: PathBuf::from("/logs/aida64.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/logs/aida64.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_file_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = MonitorError::FileWrite {
            path: PathBuf::from("/state/store.json.tmp"),
            source: io_err,
        };
        assert_eq!(
            err.to_string(),
            "Failed to write file /state/store.json.tmp: read-only"
        );
    }

    #[test]
    fn test_error_display_feed() {
        let err = MonitorError::Feed("expected an object".to_string());
        assert_eq!(err.to_string(), "Feed error: expected an object");
    }

    #[test]
    fn test_error_display_config() {
        let err = MonitorError::Config("refresh rate out of range".to_string());
        assert_eq!(err.to_string(), "Configuration error: refresh rate out of range");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MonitorError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: MonitorError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
