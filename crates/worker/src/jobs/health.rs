//! Ping the store and publish a health snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use pathwise_core::event_types::SYSTEM_HEALTH;
use pathwise_core::scheduling::JobKind;
use pathwise_db::CourseStore;
use pathwise_events::BroadcastEvent;

use super::{Job, JobContext, JobError, JobSummary};

pub struct HealthCheckJob {
    courses: Arc<dyn CourseStore>,
    market_data_version: String,
}

impl HealthCheckJob {
    pub fn new(courses: Arc<dyn CourseStore>, market_data_version: impl Into<String>) -> Self {
        Self {
            courses,
            market_data_version: market_data_version.into(),
        }
    }
}

#[async_trait]
impl Job for HealthCheckJob {
    fn kind(&self) -> JobKind {
        JobKind::HealthCheck
    }

    async fn run(&self, ctx: JobContext) -> Result<JobSummary, JobError> {
        self.courses.ping().await?;
        let counts = self.courses.count_courses_by_status().await?;
        let subscribers = ctx.broadcaster.subscriber_count().await;

        tracing::debug!(
            active = counts.active,
            outdated = counts.outdated,
            removed = counts.removed,
            subscribers,
            "Health check passed",
        );
        ctx.publish(BroadcastEvent::new(SYSTEM_HEALTH).with_payload(serde_json::json!({
            "store": "ok",
            "courses": counts,
            "totalCourses": counts.total(),
            "subscribers": subscribers,
            "marketDataVersion": self.market_data_version,
        })))
        .await;

        Ok(JobSummary {
            processed: usize::try_from(counts.total()).unwrap_or_default(),
            batches: 1,
            ..Default::default()
        })
    }
}
