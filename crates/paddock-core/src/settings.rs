use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::DEFAULT_MIN_APPEARANCES;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Consolidate per-session telemetry tables into unified datasets
#[derive(Parser, Debug, Clone)]
#[command(
    name = "paddock",
    about = "Consolidate per-session telemetry tables into unified datasets",
    version
)]
pub struct Settings {
    /// Directory holding one folder per session
    #[arg(long, env = "PADDOCK_RAW_DIR", default_value = "data/raw")]
    pub raw_dir: PathBuf,

    /// Directory the consolidated tables are written to
    #[arg(long, env = "PADDOCK_PROCESSED_DIR", default_value = "data/processed")]
    pub processed_dir: PathBuf,

    /// Minimum result rows for a driver to be listed as active
    #[arg(
        long,
        env = "PADDOCK_MIN_APPEARANCES",
        default_value_t = DEFAULT_MIN_APPEARANCES as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub min_appearances: u64,

    /// Process session folders on a worker pool
    #[arg(long)]
    pub parallel: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

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
    /// Roster threshold as a count.
    pub fn threshold(&self) -> usize {
        usize::try_from(self.min_appearances).unwrap_or(usize::MAX)
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used directories saved to `~/.paddock/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_appearances: Option<u64>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".paddock").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings loading ───────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with an explicit argument
    /// list and config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("could not clear {}: {}", config_path.display(), e);
            }
            return settings;
        }

        let last = LastUsedParams::load_from(config_path);

        // clap keys arguments by field name, not by flag spelling.
        if !is_arg_explicitly_set(&matches, "raw_dir") {
            if let Some(v) = last.raw_dir {
                settings.raw_dir = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "processed_dir") {
            if let Some(v) = last.processed_dir {
                settings.processed_dir = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "min_appearances") {
            if let Some(v) = last.min_appearances.filter(|v| *v >= 1) {
                settings.min_appearances = v;
            }
        }

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!("could not persist settings to {}: {}", config_path.display(), e);
        }

        settings
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            raw_dir: Some(s.raw_dir.clone()),
            processed_dir: Some(s.processed_dir.clone()),
            min_appearances: Some(s.min_appearances),
        }
    }
}

/// Returns `true` when `name` was supplied on the command line or through
/// its environment variable (not via default value).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine) | Some(clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
