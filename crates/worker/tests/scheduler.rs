//! Scheduler behaviour with small in-test jobs and short real durations.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use pathwise_core::event_types::{JOB_COMPLETED, JOB_FAILED, JOB_STARTED};
use pathwise_core::scheduling::JobKind;
use pathwise_events::{Broadcaster, TopicFilter};
use pathwise_pipeline::FeedError;
use pathwise_worker::jobs::{Job, JobContext, JobError, JobSummary};
use pathwise_worker::{Scheduler, SchedulerError};
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// Test jobs
// ---------------------------------------------------------------------------

/// Counts runs and finishes immediately.
struct CountingJob {
    kind: JobKind,
    runs: Arc<AtomicUsize>,
}

#[async_trait]
impl Job for CountingJob {
    fn kind(&self) -> JobKind {
        self.kind
    }

    async fn run(&self, _ctx: JobContext) -> Result<JobSummary, JobError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(JobSummary {
            processed: 1,
            batches: 1,
            ..Default::default()
        })
    }
}

/// Blocks until released or cancelled.
struct GateJob {
    release: Arc<Notify>,
    finished: Arc<AtomicBool>,
}

#[async_trait]
impl Job for GateJob {
    fn kind(&self) -> JobKind {
        JobKind::Refresh
    }

    async fn run(&self, ctx: JobContext) -> Result<JobSummary, JobError> {
        let interrupted = tokio::select! {
            _ = self.release.notified() => false,
            _ = ctx.cancel.cancelled() => true,
        };
        self.finished.store(true, Ordering::SeqCst);
        Ok(JobSummary {
            interrupted,
            ..Default::default()
        })
    }
}

struct FailingJob;

#[async_trait]
impl Job for FailingJob {
    fn kind(&self) -> JobKind {
        JobKind::Analyze
    }

    async fn run(&self, _ctx: JobContext) -> Result<JobSummary, JobError> {
        Err(JobError::Feed(FeedError::Parse {
            path: "feed.json".to_string(),
            reason: "truncated".to_string(),
        }))
    }
}

struct PanickingJob;

#[async_trait]
impl Job for PanickingJob {
    fn kind(&self) -> JobKind {
        JobKind::Cleanup
    }

    async fn run(&self, _ctx: JobContext) -> Result<JobSummary, JobError> {
        panic!("record table corrupted");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const HOUR: Duration = Duration::from_secs(3600);

fn scheduler(jobs: Vec<Arc<dyn Job>>) -> (Scheduler, Arc<Broadcaster>) {
    let broadcaster = Arc::new(Broadcaster::new());
    let jobs = jobs.into_iter().map(|j| (j, HOUR)).collect();
    (
        Scheduler::new(jobs, Arc::clone(&broadcaster), Duration::from_secs(5)),
        broadcaster,
    )
}

fn gate() -> (Arc<dyn Job>, Arc<Notify>, Arc<AtomicBool>) {
    let release = Arc::new(Notify::new());
    let finished = Arc::new(AtomicBool::new(false));
    let job = Arc::new(GateJob {
        release: Arc::clone(&release),
        finished: Arc::clone(&finished),
    });
    (job, release, finished)
}

async fn wait_until_running(scheduler: &Scheduler, kind: JobKind) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !scheduler.is_running(kind).await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("job never started");
}

// ---------------------------------------------------------------------------
// Single-flight
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_trigger_is_rejected_without_queueing() {
    let (job, release, _) = gate();
    let (scheduler, _) = scheduler(vec![job]);

    let first = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.trigger(JobKind::Refresh).await })
    };
    wait_until_running(&scheduler, JobKind::Refresh).await;

    let err = scheduler.trigger(JobKind::Refresh).await.unwrap_err();
    assert_matches!(err, SchedulerError::AlreadyRunning(JobKind::Refresh));
    assert_eq!(err.code(), "JOB_ALREADY_RUNNING");

    release.notify_one();
    let summary = first.await.unwrap().unwrap();
    assert!(!summary.interrupted);

    let status = scheduler.status().await;
    let refresh = &status["refresh"];
    assert!(!refresh.running);
    assert_eq!(refresh.run_count, 1);
    assert_eq!(refresh.error_count, 0);
    assert!(refresh.last_run_at.is_some());
}

#[tokio::test]
async fn job_returns_to_idle_and_can_run_again() {
    let runs = Arc::new(AtomicUsize::new(0));
    let (scheduler, _) = scheduler(vec![Arc::new(CountingJob {
        kind: JobKind::HealthCheck,
        runs: Arc::clone(&runs),
    })]);

    scheduler.trigger(JobKind::HealthCheck).await.unwrap();
    scheduler.trigger_by_name("health-check").await.unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert!(!scheduler.is_running(JobKind::HealthCheck).await);
    assert_eq!(scheduler.status().await["health-check"].run_count, 2);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_is_recorded_and_job_goes_idle() {
    let (scheduler, broadcaster) = scheduler(vec![Arc::new(FailingJob)]);
    let mut events = broadcaster.subscribe(TopicFilter::topics(["job.failed"])).await;

    let err = scheduler.trigger(JobKind::Analyze).await.unwrap_err();
    assert_matches!(err, SchedulerError::Failed { kind: JobKind::Analyze, source: JobError::Feed(_) });
    assert_eq!(err.code(), "FEED_ERROR");

    let statuses = scheduler.status().await;
    let status = &statuses["analyze"];
    assert!(!status.running);
    assert_eq!(status.error_count, 1);
    assert!(status.last_error.as_deref().unwrap().contains("truncated"));

    let event = events.try_recv().expect("job.failed event");
    assert_eq!(event.event_type, JOB_FAILED);
    assert_eq!(event.payload["errorCount"], 1);

    // No automatic retry, but a manual trigger is accepted again.
    assert!(scheduler.trigger(JobKind::Analyze).await.is_err());
    assert_eq!(scheduler.status().await["analyze"].error_count, 2);
}

#[tokio::test]
async fn panic_is_contained_as_failure() {
    let (scheduler, _) = scheduler(vec![Arc::new(PanickingJob)]);

    let err = scheduler.trigger(JobKind::Cleanup).await.unwrap_err();
    assert_matches!(err, SchedulerError::Failed { source: JobError::Panicked(_), .. });
    assert_eq!(err.code(), "JOB_PANICKED");

    let statuses = scheduler.status().await;
    let status = &statuses["cleanup"];
    assert!(!status.running);
    assert_eq!(status.error_count, 1);
}

#[tokio::test]
async fn unregistered_job_is_unknown() {
    let (scheduler, _) = scheduler(vec![Arc::new(FailingJob)]);
    assert_matches!(scheduler.trigger(JobKind::Refresh).await, Err(SchedulerError::UnknownJob(_)));
    assert_matches!(scheduler.trigger_by_name("reindex").await, Err(SchedulerError::UnknownJob(name)) if name == "reindex");
}

// ---------------------------------------------------------------------------
// Events and timers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_publishes_started_then_completed() {
    let runs = Arc::new(AtomicUsize::new(0));
    let (scheduler, broadcaster) = scheduler(vec![Arc::new(CountingJob {
        kind: JobKind::Analyze,
        runs,
    })]);
    let mut events = broadcaster.subscribe(TopicFilter::topics(["job"])).await;

    scheduler.trigger(JobKind::Analyze).await.unwrap();

    let started = events.try_recv().unwrap();
    let completed = events.try_recv().unwrap();
    assert_eq!(started.event_type, JOB_STARTED);
    assert_eq!(completed.event_type, JOB_COMPLETED);
    assert_eq!(completed.payload["job"], "analyze");
    assert_eq!(completed.payload["summary"]["processed"], 1);
}

#[tokio::test]
async fn timers_fire_on_interval() {
    let runs = Arc::new(AtomicUsize::new(0));
    let job: Arc<dyn Job> = Arc::new(CountingJob {
        kind: JobKind::HealthCheck,
        runs: Arc::clone(&runs),
    });
    let scheduler = Scheduler::new(
        vec![(job, Duration::from_millis(40))],
        Arc::new(Broadcaster::new()),
        Duration::from_secs(5),
    );

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.shutdown().await;

    let after_shutdown = runs.load(Ordering::SeqCst);
    assert!(after_shutdown >= 2, "expected at least two ticks, got {after_shutdown}");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(runs.load(Ordering::SeqCst), after_shutdown);
}

#[tokio::test]
async fn unrepresentable_interval_disables_timer_only() {
    let runs = Arc::new(AtomicUsize::new(0));
    let job: Arc<dyn Job> = Arc::new(CountingJob {
        kind: JobKind::Cleanup,
        runs: Arc::clone(&runs),
    });
    let scheduler = Scheduler::new(
        vec![(job, Duration::MAX)],
        Arc::new(Broadcaster::new()),
        Duration::from_secs(5),
    );

    scheduler.start();
    scheduler.trigger(JobKind::Cleanup).await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    scheduler.shutdown().await;
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_waits_for_in_flight_run_and_clears_registry() {
    let (job, _release, finished) = gate();
    let (scheduler, _) = scheduler(vec![job]);

    let run = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.trigger(JobKind::Refresh).await })
    };
    wait_until_running(&scheduler, JobKind::Refresh).await;

    scheduler.shutdown().await;
    assert!(finished.load(Ordering::SeqCst));
    assert!(scheduler.status().await.is_empty());

    let summary = run.await.unwrap().unwrap();
    assert!(summary.interrupted);
}

#[tokio::test]
async fn trigger_after_shutdown_is_rejected() {
    let runs = Arc::new(AtomicUsize::new(0));
    let (scheduler, _) = scheduler(vec![Arc::new(CountingJob {
        kind: JobKind::Refresh,
        runs: Arc::clone(&runs),
    })]);

    scheduler.shutdown().await;
    let err = scheduler.trigger(JobKind::Refresh).await.unwrap_err();
    assert_matches!(err, SchedulerError::ShutDown);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}
