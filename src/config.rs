//! Runtime settings, read from `PGX_LOOKUP_*` environment variables and overridden by CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::transform::merge::EmptyRowPolicy;

pub const DATABASE_ENV: &str = "PGX_LOOKUP_DB";
pub const ANNOTATION_LIMIT_ENV: &str = "PGX_LOOKUP_ANNOTATION_LIMIT";
pub const EMPTY_ROWS_ENV: &str = "PGX_LOOKUP_EMPTY_ROWS";
pub const QUERY_TIMEOUT_ENV: &str = "PGX_LOOKUP_QUERY_TIMEOUT_SECS";

pub const DEFAULT_ANNOTATION_LIMIT: usize = 10;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);
const DATABASE_FILE: &str = "pharmGKB.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub database: PathBuf,
    pub annotation_limit: usize,
    pub empty_rows: EmptyRowPolicy,
    pub query_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            annotation_limit: DEFAULT_ANNOTATION_LIMIT,
            empty_rows: EmptyRowPolicy::default(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

pub fn default_database_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("pgx-lookup").join(DATABASE_FILE),
        None => PathBuf::from(DATABASE_FILE),
    }
}

impl LookupConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup; unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = get(DATABASE_ENV) {
            config.database = PathBuf::from(path);
        }
        if let Some(raw) = get(ANNOTATION_LIMIT_ENV) {
            match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => config.annotation_limit = limit,
                _ => warn!(var = ANNOTATION_LIMIT_ENV, value = %raw, "ignoring invalid value"),
            }
        }
        if let Some(raw) = get(EMPTY_ROWS_ENV) {
            match EmptyRowPolicy::parse(&raw) {
                Some(policy) => config.empty_rows = policy,
                None => warn!(var = EMPTY_ROWS_ENV, value = %raw, "ignoring invalid value"),
            }
        }
        if let Some(raw) = get(QUERY_TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.query_timeout = Duration::from_secs(secs),
                _ => warn!(var = QUERY_TIMEOUT_ENV, value = %raw, "ignoring invalid value"),
            }
        }
        config
    }
}
