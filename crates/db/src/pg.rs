//! PostgreSQL-backed store built on the repositories.

use async_trait::async_trait;
use pathwise_core::assessment::UserAssessment;
use pathwise_core::course::{Course, CourseStatus};
use pathwise_core::roadmap::Roadmap;
use pathwise_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::course::CourseRow;
use crate::repositories::{AssessmentRepo, CourseRepo, RoadmapRepo};
use crate::store::{AssessmentReader, CourseCounts, CourseFilter, CourseStore, RoadmapStore};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn to_courses(rows: Vec<CourseRow>) -> Result<Vec<Course>, StoreError> {
    rows.into_iter()
        .map(|row| Course::try_from(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl CourseStore for PgStore {
    async fn get_course(&self, url: &str) -> Result<Option<Course>, StoreError> {
        let row = CourseRepo::find_by_url(&self.pool, url).await?;
        Ok(row.map(Course::try_from).transpose()?)
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, StoreError> {
        to_courses(CourseRepo::list_filtered(&self.pool, filter).await?)
    }

    async fn list_due_courses(&self, now: Timestamp) -> Result<Vec<Course>, StoreError> {
        to_courses(CourseRepo::list_due(&self.pool, now).await?)
    }

    async fn upsert_course(&self, course: &Course) -> Result<(), StoreError> {
        CourseRepo::upsert(&self.pool, course).await?;
        Ok(())
    }

    async fn upsert_courses(&self, courses: &[Course]) -> Result<usize, StoreError> {
        Ok(CourseRepo::upsert_many(&self.pool, courses).await?)
    }

    async fn count_courses_by_status(&self) -> Result<CourseCounts, StoreError> {
        let mut counts = CourseCounts::default();
        for (status, n) in CourseRepo::count_by_status(&self.pool).await? {
            counts.add(CourseStatus::parse(&status)?, n);
        }
        Ok(counts)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl RoadmapStore for PgStore {
    async fn get_roadmap(&self, user_id: DbId) -> Result<Option<Roadmap>, StoreError> {
        let row = RoadmapRepo::find_by_user(&self.pool, user_id).await?;
        Ok(row.map(Roadmap::try_from).transpose()?)
    }

    async fn upsert_roadmap(&self, roadmap: &Roadmap) -> Result<(), StoreError> {
        let document = serde_json::to_value(roadmap)?;
        RoadmapRepo::upsert(&self.pool, roadmap, &document).await?;
        Ok(())
    }
}

#[async_trait]
impl AssessmentReader for PgStore {
    async fn get_assessment(&self, user_id: DbId) -> Result<Option<UserAssessment>, StoreError> {
        let row = AssessmentRepo::find_by_user(&self.pool, user_id).await?;
        Ok(row.map(UserAssessment::from))
    }
}
