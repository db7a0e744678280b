//! User assessment row model.

use pathwise_core::assessment::UserAssessment;
use pathwise_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_assessments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssessmentRow {
    pub user_id: DbId,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub education: String,
    pub experience: String,
    pub updated_at: Timestamp,
}

impl From<AssessmentRow> for UserAssessment {
    fn from(row: AssessmentRow) -> Self {
        UserAssessment {
            user_id: row.user_id,
            skills: row.skills,
            interests: row.interests,
            education: row.education,
            experience: row.experience,
        }
    }
}
