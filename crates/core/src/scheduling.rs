//! Scheduled job vocabulary and the single-flight state machine.
//!
//! This module lives in `core` (zero internal deps) so the worker and any
//! future admin tooling share the same job names, default intervals, and
//! transition rules.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Interval constants
// ---------------------------------------------------------------------------

/// Re-acquire and reclassify the full course feed.
pub const REFRESH_INTERVAL_SECS: u64 = 6 * 60 * 60;

/// Reclassify courses whose refresh time has passed.
pub const ANALYZE_INTERVAL_SECS: u64 = 2 * 60 * 60;

/// Soft-delete stale outdated courses.
pub const CLEANUP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Ping the store and publish course counts.
pub const HEALTH_CHECK_INTERVAL_SECS: u64 = 30 * 60;

// ---------------------------------------------------------------------------
// Job kinds
// ---------------------------------------------------------------------------

/// The four fixed jobs owned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    Refresh,
    Analyze,
    Cleanup,
    HealthCheck,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [Self::Refresh, Self::Analyze, Self::Cleanup, Self::HealthCheck];

    /// Registry key and log name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Analyze => "analyze",
            Self::Cleanup => "cleanup",
            Self::HealthCheck => "health-check",
        }
    }

    pub fn default_interval(self) -> Duration {
        let secs = match self {
            Self::Refresh => REFRESH_INTERVAL_SECS,
            Self::Analyze => ANALYZE_INTERVAL_SECS,
            Self::Cleanup => CLEANUP_INTERVAL_SECS,
            Self::HealthCheck => HEALTH_CHECK_INTERVAL_SECS,
        };
        Duration::from_secs(secs)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Per-job execution state. `Idle -> Running -> Idle` on success or failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    Running,
}

impl JobState {
    pub fn can_transition(self, to: JobState) -> bool {
        matches!((self, to), (Self::Idle, Self::Running) | (Self::Running, Self::Idle))
    }

    /// Validate a transition, returning an error message for invalid ones.
    ///
    /// `Running -> Running` is the single-flight conflict.
    pub fn validate_transition(self, to: JobState) -> Result<(), String> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(format!("Invalid transition: {self:?} -> {to:?}"))
        }
    }
}

/// Observable registry entry for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusSnapshot {
    pub running: bool,
    pub last_run_at: Option<Timestamp>,
    pub error_count: u64,
    pub run_count: u64,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Job kinds
    // -----------------------------------------------------------------------

    #[test]
    fn default_intervals() {
        assert_eq!(JobKind::Refresh.default_interval(), Duration::from_secs(6 * 3600));
        assert_eq!(JobKind::Analyze.default_interval(), Duration::from_secs(2 * 3600));
        assert_eq!(JobKind::Cleanup.default_interval(), Duration::from_secs(24 * 3600));
        assert_eq!(JobKind::HealthCheck.default_interval(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn names_round_trip() {
        for kind in JobKind::ALL {
            assert_eq!(JobKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(JobKind::from_name("reindex"), None);
    }

    #[test]
    fn serde_uses_job_names() {
        let json = serde_json::to_string(&JobKind::HealthCheck).unwrap();
        assert_eq!(json, "\"health-check\"");
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    #[test]
    fn idle_to_running() {
        assert!(JobState::Idle.can_transition(JobState::Running));
    }

    #[test]
    fn running_to_idle() {
        assert!(JobState::Running.can_transition(JobState::Idle));
    }

    #[test]
    fn running_to_running_is_conflict() {
        let err = JobState::Running.validate_transition(JobState::Running).unwrap_err();
        assert!(err.contains("Running -> Running"));
    }

    #[test]
    fn idle_to_idle_invalid() {
        assert!(!JobState::Idle.can_transition(JobState::Idle));
    }
}
