use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::error::{MonitorError, Result};

/// Accepted refresh rates in seconds, on the command line and on disk.
pub const REFRESH_RATE_RANGE: RangeInclusive<u64> = 5..=3600;

const VIEWS: [&str; 3] = ["summary", "watch", "feed"];
const FORMATS: [&str; 2] = ["table", "json"];
const FEED_KINDS: [&str; 3] = ["devices", "lab", "environment"];

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR: &str = ".lab-monitor";

/// Root of the per-user state directory (`~/.lab-monitor`).
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// CPU temperature and lab sensor monitoring from AIDA64 logs and feed exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lab-monitor",
    about = "CPU temperature and lab sensor monitoring from AIDA64 logs and feed exports",
    version
)]
pub struct Settings {
    /// View mode
    #[arg(long, default_value = "summary", value_parser = VIEWS)]
    pub view: String,

    /// AIDA64 CSV log to upload (replaces the stored log)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Exported feed snapshot (JSON) for the feed view
    #[arg(long)]
    pub feed_file: Option<PathBuf>,

    /// Which feed the snapshot holds
    #[arg(long, default_value = "devices", value_parser = FEED_KINDS)]
    pub feed_kind: String,

    /// Child path inside the feed snapshot, e.g. `data_suhu/pc_lab1`
    #[arg(long)]
    pub feed_path: Option<String>,

    /// Enable periodic resimulation of the stored log
    #[arg(long)]
    pub auto_refresh: bool,

    /// Disable periodic resimulation of the stored log
    #[arg(long, conflicts_with = "auto_refresh")]
    pub no_auto_refresh: bool,

    /// Refresh rate in seconds for the watch view (5-3600)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(REFRESH_RATE_RANGE))]
    pub refresh_rate: u64,

    /// Output format
    #[arg(long, default_value = "table", value_parser = FORMATS)]
    pub format: String,

    /// Key-value store path (defaults to ~/.lab-monitor/store.json)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    /// Explicit auto-refresh choice from the command line, if any.
    pub fn auto_refresh_override(&self) -> Option<bool> {
        if self.auto_refresh {
            Some(true)
        } else if self.no_auto_refresh {
            Some(false)
        } else {
            None
        }
    }

    /// Store path, resolved against the default state directory.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| app_dir().join("store.json"))
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.lab-monitor/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_kind: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR).join("last_used.json")
    }

    /// Load persisted params; `Default` when absent or unparsable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> std::io::Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with an explicit argument list
    /// and config path so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear last-used parameters");
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values; persisted values the CLI
        // would reject are dropped.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = accept_persisted(last.view.map(|v| check_choice("view", v, &VIEWS))) {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "refresh_rate") {
            if let Some(v) = accept_persisted(last.refresh_rate.map(check_refresh_rate)) {
                settings.refresh_rate = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = accept_persisted(last.format.map(|v| check_choice("format", v, &FORMATS))) {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "feed_kind") {
            if let Some(v) =
                accept_persisted(last.feed_kind.map(|v| check_choice("feed_kind", v, &FEED_KINDS)))
            {
                settings.feed_kind = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used parameters");
        }

        settings
    }

    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            refresh_rate: Some(s.refresh_rate),
            format: Some(s.format.clone()),
            feed_kind: Some(s.feed_kind.clone()),
        }
    }
}

/// Validate a persisted refresh rate against [`REFRESH_RATE_RANGE`].
pub fn check_refresh_rate(secs: u64) -> Result<u64> {
    if REFRESH_RATE_RANGE.contains(&secs) {
        Ok(secs)
    } else {
        Err(MonitorError::Config(format!(
            "refresh_rate {secs} outside {}..={}",
            REFRESH_RATE_RANGE.start(),
            REFRESH_RATE_RANGE.end()
        )))
    }
}

fn check_choice(name: &str, value: String, allowed: &[&str]) -> Result<String> {
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(MonitorError::Config(format!("unknown {name} {value:?}")))
    }
}

fn accept_persisted<T>(checked: Option<Result<T>>) -> Option<T> {
    match checked? {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring persisted parameter");
            None
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
