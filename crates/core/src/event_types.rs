//! Event type constants for the change broadcaster.
//!
//! The topic of an event is the segment before the first `.`, so
//! subscribers can filter on `"job"` to receive every job lifecycle event.

/// A course received a new classification.
pub const COURSE_CLASSIFIED: &str = "course.classified";

/// A course was soft-deleted by cleanup.
pub const COURSE_REMOVED: &str = "course.removed";

/// A roadmap was created, regenerated, or had its progress updated.
pub const ROADMAP_UPDATED: &str = "roadmap.updated";

/// A scheduled or manual job run began.
pub const JOB_STARTED: &str = "job.started";

/// A job finished one batch.
pub const JOB_PROGRESS: &str = "job.progress";

/// A job run finished successfully.
pub const JOB_COMPLETED: &str = "job.completed";

/// A job run failed.
pub const JOB_FAILED: &str = "job.failed";

/// Periodic health snapshot.
pub const SYSTEM_HEALTH: &str = "system.health";

/// Extract the topic (segment before the first `.`) of an event type.
pub fn topic_of(event_type: &str) -> &str {
    event_type.split('.').next().unwrap_or(event_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_is_first_segment() {
        assert_eq!(topic_of(JOB_PROGRESS), "job");
        assert_eq!(topic_of(COURSE_CLASSIFIED), "course");
    }

    #[test]
    fn topic_of_undotted_type_is_whole_string() {
        assert_eq!(topic_of("heartbeat"), "heartbeat");
    }
}
