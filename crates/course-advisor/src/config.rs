use std::path::PathBuf;
use std::str::FromStr;

use course_catalog::catalog::DEFAULT_CATALOG_FILE;
use course_catalog::engine::DEFAULT_SEARCH_LIMIT;
use course_catalog::EngineOptions;
use tracing::Level;

use crate::error::AppError;

const DEFAULT_MAX_LIMIT: usize = 50;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the course data JSON file.
    pub data_path: String,
    /// Page size for `search_courses` when the caller gives none.
    pub default_limit: usize,
    /// Upper bound for any requested page size.
    pub max_limit: usize,
    /// Level for the "search failed" event; engine default when `None`.
    pub search_failure_level: Option<Level>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `COURSE_DATA_PATH` (default: "course_data.json")
    /// - `COURSE_DEFAULT_LIMIT` (default: 5)
    /// - `COURSE_MAX_LIMIT` (default: 50)
    /// - `COURSE_SEARCH_FAILURE_LEVEL`: tracing level name, e.g. "warn"
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let data_path =
            lookup("COURSE_DATA_PATH").unwrap_or_else(|| DEFAULT_CATALOG_FILE.to_string());

        let default_limit = parse_limit(&lookup, "COURSE_DEFAULT_LIMIT", DEFAULT_SEARCH_LIMIT)?;
        let max_limit = parse_limit(&lookup, "COURSE_MAX_LIMIT", DEFAULT_MAX_LIMIT)?;
        if default_limit > max_limit {
            return Err(AppError::Config(format!(
                "COURSE_DEFAULT_LIMIT ({default_limit}) exceeds COURSE_MAX_LIMIT ({max_limit})"
            )));
        }

        let search_failure_level = lookup("COURSE_SEARCH_FAILURE_LEVEL")
            .map(|raw| {
                Level::from_str(raw.trim()).map_err(|_| {
                    AppError::Config(format!(
                        "COURSE_SEARCH_FAILURE_LEVEL must be a log level, got '{raw}'"
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            data_path,
            default_limit,
            max_limit,
            search_failure_level,
        })
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_path)
    }

    pub fn engine_options(&self) -> EngineOptions {
        let mut options = EngineOptions::default();
        if let Some(level) = self.search_failure_level {
            options.log_levels.search_failure = level;
        }
        options
    }

    /// Clamp a requested page size, falling back to `default`.
    pub fn limit(&self, requested: Option<u32>, default: usize) -> usize {
        requested
            .map(|n| n as usize)
            .unwrap_or(default)
            .min(self.max_limit)
    }
}

fn parse_limit(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AppError::Config(format!(
                "{key} must be a positive integer, got '{raw}'"
            ))),
        },
    }
}
