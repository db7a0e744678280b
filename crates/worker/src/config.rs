use std::path::PathBuf;
use std::time::Duration;

use pathwise_core::scheduling::JobKind;
use pathwise_pipeline::batch::{DEFAULT_BATCH_PAUSE, DEFAULT_BATCH_SIZE};
use pathwise_pipeline::BatchPlan;

/// Default staleness window for cleanup.
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 30;

/// Default time allowed for in-flight jobs to finish on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Upper bound for every `*_SECS` setting (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Upper bound for `BATCH_PAUSE_MS` (one hour).
pub const MAX_BATCH_PAUSE_MS: u64 = 60 * 60 * 1000;

/// Upper bound for `STALE_AFTER_DAYS` (ten years).
pub const MAX_STALE_AFTER_DAYS: i64 = 3650;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Worker configuration loaded from environment variables.
///
/// Every field has a default suitable for local development.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// PostgreSQL URL. Without it the worker runs on the in-memory store.
    pub database_url: Option<String>,
    /// JSON array of course candidates. Without it the refresh feed is empty.
    pub course_feed_path: Option<PathBuf>,
    pub refresh_interval: Duration,
    pub analyze_interval: Duration,
    pub cleanup_interval: Duration,
    pub health_check_interval: Duration,
    pub batch_size: usize,
    pub batch_pause: Duration,
    pub stale_after_days: i64,
    pub shutdown_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            course_feed_path: None,
            refresh_interval: JobKind::Refresh.default_interval(),
            analyze_interval: JobKind::Analyze.default_interval(),
            cleanup_interval: JobKind::Cleanup.default_interval(),
            health_check_interval: JobKind::HealthCheck.default_interval(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: DEFAULT_BATCH_PAUSE,
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            log_format: LogFormat::Text,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                      | Default          |
    /// |------------------------------|------------------|
    /// | `DATABASE_URL`               | unset (memory)   |
    /// | `COURSE_FEED_PATH`           | unset (empty)    |
    /// | `REFRESH_INTERVAL_SECS`      | `21600`          |
    /// | `ANALYZE_INTERVAL_SECS`      | `7200`           |
    /// | `CLEANUP_INTERVAL_SECS`      | `86400`          |
    /// | `HEALTH_CHECK_INTERVAL_SECS` | `1800`           |
    /// | `BATCH_SIZE`                 | `25`             |
    /// | `BATCH_PAUSE_MS`             | `2000`           |
    /// | `STALE_AFTER_DAYS`           | `30`             |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`             |
    /// | `LOG_FORMAT`                 | `text`           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let secs = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match get(var) {
                None => Ok(default),
                Some(v) => match v.trim().parse::<u64>() {
                    Ok(n) if (1..=MAX_DURATION_SECS).contains(&n) => Ok(Duration::from_secs(n)),
                    _ => Err(ConfigError::Invalid { var, value: v }),
                },
            }
        };

        let batch_size = match get("BATCH_SIZE") {
            None => defaults.batch_size,
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::Invalid { var: "BATCH_SIZE", value: v }),
            },
        };

        let batch_pause = match get("BATCH_PAUSE_MS") {
            None => defaults.batch_pause,
            Some(v) => match v.trim().parse::<u64>() {
                Ok(n) if n <= MAX_BATCH_PAUSE_MS => Duration::from_millis(n),
                _ => return Err(ConfigError::Invalid { var: "BATCH_PAUSE_MS", value: v }),
            },
        };

        let stale_after_days = match get("STALE_AFTER_DAYS") {
            None => defaults.stale_after_days,
            Some(v) => match v.trim().parse::<i64>() {
                Ok(n) if (1..=MAX_STALE_AFTER_DAYS).contains(&n) => n,
                _ => return Err(ConfigError::Invalid { var: "STALE_AFTER_DAYS", value: v }),
            },
        };

        let log_format = match get("LOG_FORMAT").map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => return Err(ConfigError::Invalid { var: "LOG_FORMAT", value: v }),
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            course_feed_path: get("COURSE_FEED_PATH").map(PathBuf::from),
            refresh_interval: secs("REFRESH_INTERVAL_SECS", defaults.refresh_interval)?,
            analyze_interval: secs("ANALYZE_INTERVAL_SECS", defaults.analyze_interval)?,
            cleanup_interval: secs("CLEANUP_INTERVAL_SECS", defaults.cleanup_interval)?,
            health_check_interval: secs("HEALTH_CHECK_INTERVAL_SECS", defaults.health_check_interval)?,
            batch_size,
            batch_pause,
            stale_after_days,
            shutdown_timeout: secs("SHUTDOWN_TIMEOUT_SECS", defaults.shutdown_timeout)?,
            log_format,
        })
    }

    pub fn interval(&self, kind: JobKind) -> Duration {
        match kind {
            JobKind::Refresh => self.refresh_interval,
            JobKind::Analyze => self.analyze_interval,
            JobKind::Cleanup => self.cleanup_interval,
            JobKind::HealthCheck => self.health_check_interval,
        }
    }

    pub fn batch_plan(&self) -> BatchPlan {
        BatchPlan::new(self.batch_size, self.batch_pause)
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::days(self.stale_after_days)
    }
}
