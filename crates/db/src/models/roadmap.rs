//! Roadmap row model.
//!
//! The full roadmap (milestones, gaps, duration) lives in the `document`
//! JSONB column; a few fields are denormalized for listing and reporting.

use pathwise_core::roadmap::Roadmap;
use pathwise_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `roadmaps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoadmapRow {
    pub user_id: DbId,
    pub target_role: String,
    pub match_score: i16,
    pub total_progress: i16,
    pub market_data_version: String,
    pub document: serde_json::Value,
    pub generated_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<RoadmapRow> for Roadmap {
    type Error = serde_json::Error;

    fn try_from(row: RoadmapRow) -> Result<Self, Self::Error> {
        serde_json::from_value(row.document)
    }
}
