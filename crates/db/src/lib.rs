//! Persistence boundary for courses, roadmaps, and user assessments.
//!
//! Callers depend on the [`store`] traits. Two implementations ship here:
//! [`memory::InMemoryStore`] for tests and database-less runs, and
//! [`pg::PgStore`] backed by the sqlx repositories.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use pg::PgStore;
pub use store::{AssessmentReader, CourseCounts, CourseFilter, CourseStore, RoadmapStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
