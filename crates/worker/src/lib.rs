//! Scheduled background work for the course market pipeline.
//!
//! [`build_scheduler`] wires the four jobs (refresh, analyze, cleanup,
//! health-check) to a store, an acquisition feed, and the broadcaster.

pub mod config;
pub mod jobs;
pub mod scheduler;

use std::sync::Arc;

use pathwise_core::market_data::MarketDataTable;
use pathwise_core::scheduling::JobKind;
use pathwise_db::CourseStore;
use pathwise_events::Broadcaster;
use pathwise_pipeline::{ClassificationService, CourseFeed};

use crate::config::WorkerConfig;
use crate::jobs::{AnalyzeJob, CleanupJob, HealthCheckJob, Job, RefreshJob};
pub use crate::scheduler::{Scheduler, SchedulerError};

/// Build a scheduler with all four jobs registered at their configured
/// intervals. Timers are not started.
pub fn build_scheduler(
    config: &WorkerConfig,
    courses: Arc<dyn CourseStore>,
    feed: Arc<dyn CourseFeed>,
    broadcaster: Arc<Broadcaster>,
    market: Arc<MarketDataTable>,
) -> Scheduler {
    let classification = ClassificationService::new(Arc::clone(&market));
    let plan = config.batch_plan();

    let jobs: Vec<Arc<dyn Job>> = vec![
        Arc::new(RefreshJob::new(Arc::clone(&courses), feed, classification.clone(), plan)),
        Arc::new(AnalyzeJob::new(Arc::clone(&courses), classification, plan)),
        Arc::new(CleanupJob::new(Arc::clone(&courses), config.stale_after(), plan)),
        Arc::new(HealthCheckJob::new(courses, market.version.clone())),
    ];

    let jobs = jobs
        .into_iter()
        .map(|job| {
            let interval = config.interval(job.kind());
            (job, interval)
        })
        .collect();

    Scheduler::new(jobs, broadcaster, config.shutdown_timeout)
}

/// Every job the worker registers, in a stable order.
pub fn job_names() -> Vec<&'static str> {
    JobKind::ALL.iter().map(|k| k.name()).collect()
}
