//! Reclassify courses whose refresh time has come.
//!
//! The due list is only a hint. Each batch reads its records again before
//! classifying, so a course cleanup removed in the meantime stays removed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pathwise_core::event_types::COURSE_CLASSIFIED;
use pathwise_core::scheduling::JobKind;
use pathwise_db::CourseStore;
use pathwise_events::BroadcastEvent;
use pathwise_pipeline::{BatchPlan, ClassificationService};

use super::{Job, JobContext, JobError, JobSummary};

pub struct AnalyzeJob {
    courses: Arc<dyn CourseStore>,
    classification: ClassificationService,
    plan: BatchPlan,
}

impl AnalyzeJob {
    pub fn new(courses: Arc<dyn CourseStore>, classification: ClassificationService, plan: BatchPlan) -> Self {
        Self {
            courses,
            classification,
            plan,
        }
    }
}

#[async_trait]
impl Job for AnalyzeJob {
    fn kind(&self) -> JobKind {
        JobKind::Analyze
    }

    async fn run(&self, ctx: JobContext) -> Result<JobSummary, JobError> {
        let due: Vec<String> = self
            .courses
            .list_due_courses(Utc::now())
            .await?
            .into_iter()
            .map(|c| c.url)
            .collect();
        let total_batches = self.plan.batch_count(due.len());
        tracing::info!(due = due.len(), total_batches, "Analyze found due courses");

        let mut summary = JobSummary::default();
        for (index, batch) in self.plan.batches(&due).enumerate() {
            if index > 0 && !ctx.pause_between_batches(&self.plan).await {
                summary.interrupted = true;
                break;
            }

            let now = Utc::now();
            let mut fresh = Vec::with_capacity(batch.len());
            for url in batch {
                match self.courses.get_course(url).await? {
                    Some(course) if course.is_due(now) => fresh.push(course),
                    _ => {
                        tracing::debug!(url = %url, "Course no longer due, skipping");
                        summary.processed += 1;
                        summary.skipped += 1;
                    }
                }
            }

            let report = self.classification.classify_batch(&fresh, now);
            summary.processed += report.processed();
            summary.skipped += report.skipped.len();
            summary.updated += self.courses.upsert_courses(&report.updated).await?;
            summary.batches += 1;

            for url in &report.changed {
                ctx.publish(BroadcastEvent::new(COURSE_CLASSIFIED).with_payload(serde_json::json!({ "url": url })))
                    .await;
            }
            if report.fallbacks > 0 {
                tracing::warn!(fallbacks = report.fallbacks, batch = index + 1, "Batch used conservative defaults");
            }
            ctx.progress(index + 1, total_batches, &summary).await;
        }

        Ok(summary)
    }
}
