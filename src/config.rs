//! Export settings
//!
//! The command line only carries the survey name; connection details and
//! tuning knobs come from the environment (a `.env` file is loaded by the CLI).

use crate::error::ExportError;
use crate::scanner::DEFAULT_BATCH_SIZE;
use crate::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const BATCH_SIZE_VAR: &str = "COORDS_BATCH_SIZE";
pub const TIMESTAMP_CUTOFF_VAR: &str = "COORDS_TIMESTAMP_CUTOFF";
pub const OUTPUT_DIR_VAR: &str = "COORDS_OUTPUT_DIR";

/// Timestamps at or before this instant are known-bad legacy data and are
/// ignored when looking for the first coordinate of a survey
pub fn default_timestamp_cutoff() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2017, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Postgres URL; `None` falls back to the `PG*` environment variables
    pub database_url: Option<String>,
    pub batch_size: usize,
    pub timestamp_cutoff: Option<NaiveDateTime>,
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            batch_size: DEFAULT_BATCH_SIZE,
            timestamp_cutoff: default_timestamp_cutoff(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, with defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        config.database_url = value(DATABASE_URL_VAR);

        if let Some(raw) = value(BATCH_SIZE_VAR) {
            config.batch_size = parse_batch_size(&raw)?;
        }

        if let Some(raw) = value(TIMESTAMP_CUTOFF_VAR) {
            config.timestamp_cutoff = parse_cutoff(&raw)?;
        }

        if let Some(raw) = value(OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(raw);
        }

        Ok(config)
    }
}

fn parse_batch_size(raw: &str) -> Result<usize> {
    match raw.parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ExportError::Config(format!(
            "{BATCH_SIZE_VAR} must be a positive integer, got '{raw}'"
        ))),
    }
}

/// `none` disables the cutoff; otherwise a date or date-time
pub fn parse_cutoff(raw: &str) -> Result<Option<NaiveDateTime>> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(ts));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0));
    }

    Err(ExportError::Config(format!(
        "{TIMESTAMP_CUTOFF_VAR} must be 'none' or a date like '2017-01-01 00:00:00', got '{raw}'"
    )))
}
