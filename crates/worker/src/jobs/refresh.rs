//! Re-acquire the course feed and classify every candidate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pathwise_core::event_types::COURSE_CLASSIFIED;
use pathwise_core::scheduling::JobKind;
use pathwise_db::CourseStore;
use pathwise_events::BroadcastEvent;
use pathwise_pipeline::{BatchPlan, ClassificationService, CourseFeed, RecordOutcome};

use super::{Job, JobContext, JobError, JobSummary};

pub struct RefreshJob {
    courses: Arc<dyn CourseStore>,
    feed: Arc<dyn CourseFeed>,
    classification: ClassificationService,
    plan: BatchPlan,
}

impl RefreshJob {
    pub fn new(
        courses: Arc<dyn CourseStore>,
        feed: Arc<dyn CourseFeed>,
        classification: ClassificationService,
        plan: BatchPlan,
    ) -> Self {
        Self {
            courses,
            feed,
            classification,
            plan,
        }
    }
}

#[async_trait]
impl Job for RefreshJob {
    fn kind(&self) -> JobKind {
        JobKind::Refresh
    }

    async fn run(&self, ctx: JobContext) -> Result<JobSummary, JobError> {
        let candidates = self.feed.fetch().await?;
        let total_batches = self.plan.batch_count(candidates.len());
        tracing::info!(feed = self.feed.name(), candidates = candidates.len(), total_batches, "Refresh fetched candidates");

        let mut summary = JobSummary::default();
        for (index, batch) in self.plan.batches(&candidates).enumerate() {
            if index > 0 && !ctx.pause_between_batches(&self.plan).await {
                summary.interrupted = true;
                break;
            }

            let now = Utc::now();
            let mut updated = Vec::with_capacity(batch.len());
            let mut changed = Vec::new();
            for candidate in batch {
                let existing = self.courses.get_course(&candidate.url).await?;
                let outcome = self
                    .classification
                    .prepare_candidate(candidate, existing.as_ref(), now);
                summary.processed += 1;
                match outcome {
                    RecordOutcome::Classified(course) | RecordOutcome::Fallback(course) => {
                        let is_change = existing
                            .as_ref()
                            .map_or(true, |before| course.classification_changed(before));
                        if is_change {
                            changed.push(course.clone());
                        }
                        updated.push(course);
                    }
                    RecordOutcome::Skipped { .. } => summary.skipped += 1,
                }
            }

            summary.updated += self.courses.upsert_courses(&updated).await?;
            summary.batches += 1;
            for course in &changed {
                ctx.publish(BroadcastEvent::new(COURSE_CLASSIFIED).with_payload(serde_json::json!({
                    "url": course.url,
                    "trend": course.trend,
                    "status": course.status,
                })))
                .await;
            }
            ctx.progress(index + 1, total_batches, &summary).await;
        }

        Ok(summary)
    }
}
