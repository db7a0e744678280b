//! Soft-delete courses that have stayed outdated for the whole staleness
//! window. The window runs from `outdated_since`, which repeat Outdated
//! classifications leave untouched.
//!
//! The candidate list is only a hint. Each record is read again right
//! before it is mutated, so a course the analyze job revived in the
//! meantime is left alone.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pathwise_core::course::{Course, CourseStatus};
use pathwise_core::event_types::COURSE_REMOVED;
use pathwise_core::scheduling::JobKind;
use pathwise_core::types::Timestamp;
use pathwise_db::{CourseFilter, CourseStore};
use pathwise_events::BroadcastEvent;
use pathwise_pipeline::BatchPlan;

use super::{Job, JobContext, JobError, JobSummary};

pub struct CleanupJob {
    courses: Arc<dyn CourseStore>,
    stale_after: chrono::Duration,
    plan: BatchPlan,
}

impl CleanupJob {
    pub fn new(courses: Arc<dyn CourseStore>, stale_after: chrono::Duration, plan: BatchPlan) -> Self {
        Self {
            courses,
            stale_after,
            plan,
        }
    }
}

fn is_stale(course: &Course, cutoff: Timestamp) -> bool {
    course.status == CourseStatus::Outdated
        && course.outdated_since.is_some_and(|since| since < cutoff)
}

#[async_trait]
impl Job for CleanupJob {
    fn kind(&self) -> JobKind {
        JobKind::Cleanup
    }

    async fn run(&self, ctx: JobContext) -> Result<JobSummary, JobError> {
        let cutoff = Utc::now() - self.stale_after;
        let filter = CourseFilter {
            status: Some(CourseStatus::Outdated),
            outdated_before: Some(cutoff),
            ..Default::default()
        };
        let candidates: Vec<String> = self
            .courses
            .list_courses(&filter)
            .await?
            .into_iter()
            .map(|c| c.url)
            .collect();
        let total_batches = self.plan.batch_count(candidates.len());
        tracing::info!(candidates = candidates.len(), %cutoff, "Cleanup found stale courses");

        let mut summary = JobSummary::default();
        for (index, batch) in self.plan.batches(&candidates).enumerate() {
            if index > 0 && !ctx.pause_between_batches(&self.plan).await {
                summary.interrupted = true;
                break;
            }

            let mut removed = Vec::new();
            for url in batch {
                summary.processed += 1;
                match self.courses.get_course(url).await? {
                    Some(mut course) if is_stale(&course, cutoff) => {
                        course.mark_removed();
                        removed.push(course);
                    }
                    _ => summary.skipped += 1,
                }
            }

            summary.updated += self.courses.upsert_courses(&removed).await?;
            summary.batches += 1;
            for course in &removed {
                ctx.publish(BroadcastEvent::new(COURSE_REMOVED).with_payload(serde_json::json!({ "url": course.url })))
                    .await;
            }
            ctx.progress(index + 1, total_batches, &summary).await;
        }

        Ok(summary)
    }
}
