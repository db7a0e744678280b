//! Repository for the `roadmaps` table.

use pathwise_core::roadmap::Roadmap;
use pathwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::roadmap::RoadmapRow;

/// Column list for `roadmaps` queries.
const COLUMNS: &str = "\
    user_id, target_role, match_score, total_progress, market_data_version, \
    document, generated_at, updated_at";

/// One roadmap per user.
pub struct RoadmapRepo;

impl RoadmapRepo {
    /// Find a user's roadmap. Returns `None` if none was generated yet.
    pub async fn find_by_user(pool: &PgPool, user_id: DbId) -> Result<Option<RoadmapRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roadmaps WHERE user_id = $1");
        sqlx::query_as::<_, RoadmapRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Upsert a user's roadmap.
    ///
    /// Uses `ON CONFLICT (user_id) DO UPDATE` to guarantee one row per user.
    pub async fn upsert(
        pool: &PgPool,
        roadmap: &Roadmap,
        document: &serde_json::Value,
    ) -> Result<RoadmapRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO roadmaps \
                (user_id, target_role, match_score, total_progress, market_data_version, \
                 document, generated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (user_id) DO UPDATE \
             SET target_role = EXCLUDED.target_role, \
                 match_score = EXCLUDED.match_score, \
                 total_progress = EXCLUDED.total_progress, \
                 market_data_version = EXCLUDED.market_data_version, \
                 document = EXCLUDED.document, \
                 generated_at = EXCLUDED.generated_at, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoadmapRow>(&query)
            .bind(roadmap.user_id)
            .bind(&roadmap.target_role)
            .bind(i16::from(roadmap.match_score))
            .bind(i16::from(roadmap.total_progress))
            .bind(&roadmap.market_data_version)
            .bind(document)
            .bind(roadmap.generated_at)
            .fetch_one(pool)
            .await
    }
}
