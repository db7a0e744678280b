//! Store traits consumed by the pipeline services and the scheduled jobs.
//!
//! Implementations must give at least read-after-write consistency: a
//! record written by `upsert_*` is visible to the next `get_*` call.

use async_trait::async_trait;
use pathwise_core::assessment::UserAssessment;
use pathwise_core::course::{Course, CourseStatus, Trend};
use pathwise_core::roadmap::Roadmap;
use pathwise_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::error::StoreError;

/// Optional predicates for [`CourseStore::list_courses`]. Empty matches all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub trend: Option<Trend>,
    /// Only courses last classified strictly before this instant.
    pub classified_before: Option<Timestamp>,
    /// Only courses that entered the outdated status strictly before this instant.
    pub outdated_before: Option<Timestamp>,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        self.status.map_or(true, |s| course.status == s)
            && self.trend.map_or(true, |t| course.trend == t)
            && self.classified_before.map_or(true, |cutoff| {
                course.last_classified_at.is_some_and(|at| at < cutoff)
            })
            && self.outdated_before.map_or(true, |cutoff| {
                course.outdated_since.is_some_and(|at| at < cutoff)
            })
    }
}

/// Course totals per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CourseCounts {
    pub active: i64,
    pub outdated: i64,
    pub removed: i64,
}

impl CourseCounts {
    pub fn add(&mut self, status: CourseStatus, n: i64) {
        match status {
            CourseStatus::Active => self.active += n,
            CourseStatus::Outdated => self.outdated += n,
            CourseStatus::Removed => self.removed += n,
        }
    }

    pub fn total(&self) -> i64 {
        self.active + self.outdated + self.removed
    }
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Fetch one course by URL.
    async fn get_course(&self, url: &str) -> Result<Option<Course>, StoreError>;

    /// List courses matching `filter`, ordered by URL.
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, StoreError>;

    /// Non-removed courses whose refresh time is unset or at/before `now`,
    /// oldest due first.
    async fn list_due_courses(&self, now: Timestamp) -> Result<Vec<Course>, StoreError>;

    /// Insert or replace a course keyed by URL.
    async fn upsert_course(&self, course: &Course) -> Result<(), StoreError>;

    /// Upsert a batch as one unit. Returns the number written.
    async fn upsert_courses(&self, courses: &[Course]) -> Result<usize, StoreError>;

    async fn count_courses_by_status(&self) -> Result<CourseCounts, StoreError>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RoadmapStore: Send + Sync {
    async fn get_roadmap(&self, user_id: DbId) -> Result<Option<Roadmap>, StoreError>;

    /// Insert or replace the roadmap for `roadmap.user_id`.
    async fn upsert_roadmap(&self, roadmap: &Roadmap) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AssessmentReader: Send + Sync {
    async fn get_assessment(&self, user_id: DbId) -> Result<Option<UserAssessment>, StoreError>;
}
