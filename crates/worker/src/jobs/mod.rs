//! The four scheduled jobs.
//!
//! Each job works through its records in batches. Between batches it
//! rests for the configured pause and checks the shutdown token; a batch
//! that has started always runs to completion.

pub mod analyze;
pub mod cleanup;
pub mod health;
pub mod refresh;

use std::sync::Arc;

use async_trait::async_trait;
use pathwise_core::event_types::JOB_PROGRESS;
use pathwise_core::scheduling::JobKind;
use pathwise_db::StoreError;
use pathwise_events::{BroadcastEvent, Broadcaster};
use pathwise_pipeline::{BatchPlan, FeedError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

pub use analyze::AnalyzeJob;
pub use cleanup::CleanupJob;
pub use health::HealthCheckJob;
pub use refresh::RefreshJob;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The store failed mid-run; remaining batches are abandoned.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Acquisition feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Job panicked: {0}")]
    Panicked(String),
}

impl JobError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Feed(_) => "FEED_ERROR",
            Self::Panicked(_) => "JOB_PANICKED",
        }
    }
}

/// Counters reported by a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub processed: usize,
    pub updated: usize,
    pub skipped: usize,
    pub batches: usize,
    /// The run stopped early because of shutdown.
    pub interrupted: bool,
}

/// Handed to every run by the scheduler.
#[derive(Clone)]
pub struct JobContext {
    pub kind: JobKind,
    pub cancel: CancellationToken,
    pub broadcaster: Arc<Broadcaster>,
}

impl JobContext {
    pub fn new(kind: JobKind, cancel: CancellationToken, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            kind,
            cancel,
            broadcaster,
        }
    }

    pub async fn publish(&self, event: BroadcastEvent) {
        self.broadcaster.publish(event).await;
    }

    pub async fn progress(&self, batch: usize, total_batches: usize, summary: &JobSummary) {
        tracing::debug!(
            job = %self.kind,
            batch,
            total_batches,
            processed = summary.processed,
            "Batch finished",
        );
        self.publish(BroadcastEvent::new(JOB_PROGRESS).with_payload(serde_json::json!({
            "job": self.kind.name(),
            "batch": batch,
            "totalBatches": total_batches,
            "processed": summary.processed,
            "updated": summary.updated,
        })))
        .await;
    }

    /// Rest between batches. Returns `false` when shutdown was requested
    /// and no further batch should start.
    pub async fn pause_between_batches(&self, plan: &BatchPlan) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        if plan.pause().is_zero() {
            return true;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(plan.pause()) => true,
        }
    }
}

#[async_trait]
pub trait Job: Send + Sync {
    fn kind(&self) -> JobKind;

    async fn run(&self, ctx: JobContext) -> Result<JobSummary, JobError>;
}
