//! Repository for the `user_assessments` table.

use pathwise_core::assessment::UserAssessment;
use pathwise_core::types::DbId;
use sqlx::PgPool;

use crate::models::assessment::AssessmentRow;

const COLUMNS: &str = "user_id, skills, interests, education, experience, updated_at";

pub struct AssessmentRepo;

impl AssessmentRepo {
    pub async fn find_by_user(pool: &PgPool, user_id: DbId) -> Result<Option<AssessmentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_assessments WHERE user_id = $1");
        sqlx::query_as::<_, AssessmentRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Used by the profile collaborator and by fixtures.
    pub async fn upsert(pool: &PgPool, assessment: &UserAssessment) -> Result<AssessmentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_assessments (user_id, skills, interests, education, experience) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE \
             SET skills = EXCLUDED.skills, \
                 interests = EXCLUDED.interests, \
                 education = EXCLUDED.education, \
                 experience = EXCLUDED.experience, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssessmentRow>(&query)
            .bind(assessment.user_id)
            .bind(&assessment.skills)
            .bind(&assessment.interests)
            .bind(&assessment.education)
            .bind(&assessment.experience)
            .fetch_one(pool)
            .await
    }
}
