//! Repository for the `courses` table.

use pathwise_core::course::{Course, CourseStatus};
use pathwise_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::course::CourseRow;
use crate::store::CourseFilter;

/// Column list for `courses` queries.
const COLUMNS: &str = "\
    url, title, description, category, provider, rating, \
    trend, demand, job_availability, confidence_score, automation_threat, \
    status, last_classified_at, next_refresh_at, outdated_since, created_at, updated_at";

/// Insert-or-replace keyed by URL. `created_at` is kept from the first insert.
const UPSERT: &str = "\
    INSERT INTO courses \
        (url, title, description, category, provider, rating, \
         trend, demand, job_availability, confidence_score, automation_threat, \
         status, last_classified_at, next_refresh_at, outdated_since, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
    ON CONFLICT (url) DO UPDATE SET \
        title = EXCLUDED.title, \
        description = EXCLUDED.description, \
        category = EXCLUDED.category, \
        provider = EXCLUDED.provider, \
        rating = EXCLUDED.rating, \
        trend = EXCLUDED.trend, \
        demand = EXCLUDED.demand, \
        job_availability = EXCLUDED.job_availability, \
        confidence_score = EXCLUDED.confidence_score, \
        automation_threat = EXCLUDED.automation_threat, \
        status = EXCLUDED.status, \
        last_classified_at = EXCLUDED.last_classified_at, \
        next_refresh_at = EXCLUDED.next_refresh_at, \
        outdated_since = EXCLUDED.outdated_since, \
        updated_at = NOW()";

/// Provides persistence operations for course records.
pub struct CourseRepo;

impl CourseRepo {
    /// Find a course by URL.
    pub async fn find_by_url(pool: &PgPool, url: &str) -> Result<Option<CourseRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE url = $1");
        sqlx::query_as::<_, CourseRow>(&query)
            .bind(url)
            .fetch_optional(pool)
            .await
    }

    /// List courses matching every predicate set on `filter`.
    pub async fn list_filtered(pool: &PgPool, filter: &CourseFilter) -> Result<Vec<CourseRow>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if filter.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if filter.trend.is_some() {
            conditions.push(format!("trend = ${param_idx}"));
            param_idx += 1;
        }
        if filter.classified_before.is_some() {
            conditions.push(format!("last_classified_at < ${param_idx}"));
            param_idx += 1;
        }
        if filter.outdated_before.is_some() {
            conditions.push(format!("outdated_since < ${param_idx}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT {COLUMNS} FROM courses {where_clause} ORDER BY url");
        let mut q = sqlx::query_as::<_, CourseRow>(&query);

        if let Some(s) = filter.status {
            q = q.bind(s.as_str());
        }
        if let Some(t) = filter.trend {
            q = q.bind(t.as_str());
        }
        if let Some(cutoff) = filter.classified_before {
            q = q.bind(cutoff);
        }
        if let Some(cutoff) = filter.outdated_before {
            q = q.bind(cutoff);
        }

        q.fetch_all(pool).await
    }

    /// Non-removed courses due for reclassification, never-classified first.
    pub async fn list_due(pool: &PgPool, now: Timestamp) -> Result<Vec<CourseRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses \
             WHERE status <> $1 AND (next_refresh_at IS NULL OR next_refresh_at <= $2) \
             ORDER BY next_refresh_at ASC NULLS FIRST, url"
        );
        sqlx::query_as::<_, CourseRow>(&query)
            .bind(CourseStatus::Removed.as_str())
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Upsert a single course.
    pub async fn upsert(pool: &PgPool, course: &Course) -> Result<(), sqlx::Error> {
        bind_course(sqlx::query(UPSERT), course).execute(pool).await?;
        Ok(())
    }

    /// Upsert a batch of courses within one transaction.
    pub async fn upsert_many(pool: &PgPool, courses: &[Course]) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for course in courses {
            bind_course(sqlx::query(UPSERT), course)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::debug!(count = courses.len(), "Course batch committed");
        Ok(courses.len())
    }

    /// Count courses grouped by status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM courses GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}

fn bind_course<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    course: &'q Course,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(&course.url)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.category.as_str())
        .bind(course.provider.as_str())
        .bind(course.rating)
        .bind(course.trend.as_str())
        .bind(course.demand.as_str())
        .bind(course.job_availability.as_str())
        .bind(course.confidence_score)
        .bind(course.automation_threat)
        .bind(course.status.as_str())
        .bind(course.last_classified_at)
        .bind(course.next_refresh_at)
        .bind(course.outdated_since)
        .bind(course.created_at)
}
