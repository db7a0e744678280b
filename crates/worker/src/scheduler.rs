//! Single-flight job scheduler.
//!
//! Every registered job gets a timer loop that fires on its interval.
//! Scheduled ticks and manual triggers go through the same guard in
//! [`Scheduler::trigger`]: a job that is already running rejects the
//! attempt and nothing is queued.
//!
//! Job bodies run on their own spawned task so a panic is contained and
//! recorded as a failure. All timers and runs are tracked; [`Scheduler::shutdown`]
//! stops the timers, waits for in-flight runs, and clears the registry.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pathwise_core::event_types::{JOB_COMPLETED, JOB_FAILED, JOB_STARTED};
use pathwise_core::scheduling::{JobKind, JobState, JobStatusSnapshot};
use pathwise_events::{BroadcastEvent, Broadcaster};
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::jobs::{Job, JobContext, JobError, JobSummary};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Job {0} is already running")]
    AlreadyRunning(JobKind),

    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Scheduler has been shut down")]
    ShutDown,

    #[error("Job {kind} failed: {source}")]
    Failed {
        kind: JobKind,
        #[source]
        source: JobError,
    },
}

impl SchedulerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyRunning(_) => "JOB_ALREADY_RUNNING",
            Self::UnknownJob(_) => "UNKNOWN_JOB",
            Self::ShutDown => "SCHEDULER_SHUT_DOWN",
            Self::Failed { source, .. } => source.code(),
        }
    }
}

struct Registered {
    job: Arc<dyn Job>,
    interval: Duration,
}

#[derive(Default)]
struct Entry {
    state: JobState,
    status: JobStatusSnapshot,
}

struct Inner {
    jobs: HashMap<JobKind, Registered>,
    registry: Mutex<HashMap<JobKind, Entry>>,
    broadcaster: Arc<Broadcaster>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    started: AtomicBool,
    shutdown_timeout: Duration,
}

/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Build a scheduler for `jobs`, each paired with its timer interval.
    /// A later job with the same kind replaces an earlier one.
    pub fn new(
        jobs: Vec<(Arc<dyn Job>, Duration)>,
        broadcaster: Arc<Broadcaster>,
        shutdown_timeout: Duration,
    ) -> Self {
        let mut registered = HashMap::new();
        let mut registry = HashMap::new();
        for (job, interval) in jobs {
            let kind = job.kind();
            registered.insert(kind, Registered { job, interval });
            registry.insert(kind, Entry::default());
        }

        Self {
            inner: Arc::new(Inner {
                jobs: registered,
                registry: Mutex::new(registry),
                broadcaster,
                cancel: CancellationToken::new(),
                tracker: TaskTracker::new(),
                started: AtomicBool::new(false),
                shutdown_timeout,
            }),
        }
    }

    /// Spawn one timer loop per job. Calling it twice is a no-op.
    ///
    /// The first tick of each job fires one full interval after start. A job
    /// whose interval is zero or overflows the clock gets no timer but can
    /// still be triggered manually.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) || self.inner.cancel.is_cancelled() {
            return;
        }

        for (&kind, registered) in &self.inner.jobs {
            let scheduler = self.clone();
            let cancel = self.inner.cancel.clone();
            let period = registered.interval;
            let Some(first_tick) = Instant::now().checked_add(period).filter(|_| !period.is_zero()) else {
                tracing::error!(job = %kind, ?period, "Interval out of range, timer not started");
                continue;
            };
            self.inner.tracker.spawn(async move {
                let mut ticker = tokio::time::interval_at(first_tick, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => match scheduler.trigger(kind).await {
                            Ok(_) | Err(SchedulerError::Failed { .. }) => {}
                            Err(SchedulerError::AlreadyRunning(_)) => {
                                tracing::debug!(job = %kind, "Tick skipped, previous run still going");
                            }
                            Err(SchedulerError::ShutDown) => break,
                            Err(e) => tracing::error!(job = %kind, error = %e, "Scheduled trigger failed"),
                        },
                    }
                }
                tracing::debug!(job = %kind, "Timer stopped");
            });
        }

        tracing::info!(jobs = self.inner.jobs.len(), "Scheduler started");
    }

    /// Run `kind` now unless it is already running.
    pub async fn trigger(&self, kind: JobKind) -> Result<JobSummary, SchedulerError> {
        let registered = self
            .inner
            .jobs
            .get(&kind)
            .ok_or_else(|| SchedulerError::UnknownJob(kind.name().to_string()))?;

        let handle = {
            let mut registry = self.inner.registry.lock().await;
            if self.inner.cancel.is_cancelled() {
                return Err(SchedulerError::ShutDown);
            }
            let entry = registry.get_mut(&kind).ok_or(SchedulerError::ShutDown)?;
            entry
                .state
                .validate_transition(JobState::Running)
                .map_err(|_| SchedulerError::AlreadyRunning(kind))?;
            entry.state = JobState::Running;
            entry.status.running = true;

            let job = Arc::clone(&registered.job);
            let ctx = JobContext::new(kind, self.inner.cancel.child_token(), Arc::clone(&self.inner.broadcaster));
            let scheduler = self.clone();
            // Spawned under the registry lock so shutdown cannot miss it. The
            // run finishes and resets the entry even if the caller goes away.
            self.inner.tracker.spawn(async move {
                tracing::info!(job = %kind, "Job started");
                scheduler
                    .publish(JOB_STARTED, serde_json::json!({ "job": kind.name() }))
                    .await;
                let result = match tokio::spawn(async move { job.run(ctx).await }).await {
                    Ok(result) => result,
                    Err(join_error) => Err(JobError::Panicked(join_error.to_string())),
                };
                scheduler.finish(kind, result).await
            })
        };

        match handle.await {
            Ok(outcome) => outcome,
            Err(join_error) => Err(SchedulerError::Failed {
                kind,
                source: JobError::Panicked(join_error.to_string()),
            }),
        }
    }

    /// Trigger by registry name.
    pub async fn trigger_by_name(&self, name: &str) -> Result<JobSummary, SchedulerError> {
        let kind = JobKind::from_name(name).ok_or_else(|| SchedulerError::UnknownJob(name.to_string()))?;
        self.trigger(kind).await
    }

    /// Registry snapshot keyed by job name. Empty after shutdown.
    pub async fn status(&self) -> BTreeMap<String, JobStatusSnapshot> {
        self.inner
            .registry
            .lock()
            .await
            .iter()
            .map(|(kind, entry)| (kind.name().to_string(), entry.status.clone()))
            .collect()
    }

    pub async fn is_running(&self, kind: JobKind) -> bool {
        self.inner
            .registry
            .lock()
            .await
            .get(&kind)
            .is_some_and(|e| e.state == JobState::Running)
    }

    /// Stop all timers, wait for in-flight runs, and clear the registry.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        {
            let _registry = self.inner.registry.lock().await;
            self.inner.tracker.close();
        }

        if tokio::time::timeout(self.inner.shutdown_timeout, self.inner.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_secs = self.inner.shutdown_timeout.as_secs(),
                "Timed out waiting for in-flight jobs",
            );
        }

        self.inner.registry.lock().await.clear();
        tracing::info!("Scheduler shut down");
    }

    async fn finish(
        &self,
        kind: JobKind,
        result: Result<JobSummary, JobError>,
    ) -> Result<JobSummary, SchedulerError> {
        let now = Utc::now();
        let error_count = {
            let mut registry = self.inner.registry.lock().await;
            match registry.get_mut(&kind) {
                Some(entry) => {
                    entry.state = JobState::Idle;
                    entry.status.running = false;
                    entry.status.last_run_at = Some(now);
                    entry.status.run_count += 1;
                    match &result {
                        Ok(_) => entry.status.last_error = None,
                        Err(e) => {
                            entry.status.error_count += 1;
                            entry.status.last_error = Some(e.to_string());
                        }
                    }
                    entry.status.error_count
                }
                None => 0,
            }
        };

        match result {
            Ok(summary) => {
                tracing::info!(
                    job = %kind,
                    processed = summary.processed,
                    updated = summary.updated,
                    skipped = summary.skipped,
                    interrupted = summary.interrupted,
                    "Job completed",
                );
                self.publish(
                    JOB_COMPLETED,
                    serde_json::json!({ "job": kind.name(), "summary": summary }),
                )
                .await;
                Ok(summary)
            }
            Err(source) => {
                tracing::error!(job = %kind, error = %source, error_count, "Job failed");
                self.publish(
                    JOB_FAILED,
                    serde_json::json!({
                        "job": kind.name(),
                        "error": source.to_string(),
                        "code": source.code(),
                        "errorCount": error_count,
                    }),
                )
                .await;
                Err(SchedulerError::Failed { kind, source })
            }
        }
    }

    async fn publish(&self, event_type: &str, payload: serde_json::Value) {
        self.inner
            .broadcaster
            .publish(BroadcastEvent::new(event_type).with_payload(payload))
            .await;
    }
}
