use pathwise_core::error::CoreError;
use pathwise_core::types::DbId;
use pathwise_db::StoreError;

use crate::feed::FeedError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("Acquisition feed error: {0}")]
    Feed(#[from] FeedError),

    /// A roadmap with started or finished milestones exists and the caller
    /// did not explicitly ask to regenerate it.
    #[error("Roadmap for user {user_id} has {locked} milestone(s) in progress or completed; regeneration must be requested explicitly")]
    RegenerationBlocked { user_id: DbId, locked: usize },
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => e.code(),
            Self::Store(e) => e.code(),
            Self::Feed(_) => "FEED_ERROR",
            Self::RegenerationBlocked { .. } => "REGENERATION_BLOCKED",
        }
    }
}
