//! Course row model.

use pathwise_core::course::{Category, Course, CourseStatus, DemandTier, JobAvailability, Provider, Trend};
use pathwise_core::error::CoreError;
use pathwise_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `courses` table. Enum columns hold their canonical
/// `as_str` form.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseRow {
    pub url: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub provider: String,
    pub rating: f64,
    pub trend: String,
    pub demand: String,
    pub job_availability: String,
    pub confidence_score: f64,
    pub automation_threat: f64,
    pub status: String,
    pub last_classified_at: Option<Timestamp>,
    pub next_refresh_at: Option<Timestamp>,
    pub outdated_since: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<CourseRow> for Course {
    type Error = CoreError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            category: Category::parse(&row.category)?,
            provider: Provider::parse(&row.provider)?,
            trend: Trend::parse(&row.trend)?,
            demand: DemandTier::parse(&row.demand)?,
            job_availability: JobAvailability::parse(&row.job_availability)?,
            status: CourseStatus::parse(&row.status)?,
            url: row.url,
            title: row.title,
            description: row.description,
            rating: row.rating,
            confidence_score: row.confidence_score,
            automation_threat: row.automation_threat,
            last_classified_at: row.last_classified_at,
            next_refresh_at: row.next_refresh_at,
            outdated_since: row.outdated_since,
            created_at: row.created_at,
        })
    }
}
