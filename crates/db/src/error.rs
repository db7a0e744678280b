use pathwise_core::error::CoreError;

/// Failure talking to, or reading back from, the persistence collaborator.
///
/// Every variant is a persistence error from the job's point of view: the
/// current run aborts its remaining batches and waits for the next tick.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Corrupt(_) => "CORRUPT_RECORD",
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        Self::Corrupt(err.to_string())
    }
}
