//! Acquisition feed boundary.
//!
//! The pipeline never fetches or scrapes course pages itself. A
//! [`CourseFeed`] hands it raw candidates and the refresh job validates and
//! classifies them.

use std::path::PathBuf;

use async_trait::async_trait;
use pathwise_core::course::CourseCandidate;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to read course feed {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Course feed {path} is not a JSON array: {reason}")]
    Parse { path: String, reason: String },
}

/// Source of course candidates for the refresh job.
#[async_trait]
pub trait CourseFeed: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<CourseCandidate>, FeedError>;
}

/// A fixed list of candidates.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    candidates: Vec<CourseCandidate>,
}

impl StaticFeed {
    pub fn new(candidates: Vec<CourseCandidate>) -> Self {
        Self { candidates }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseFeed for StaticFeed {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<Vec<CourseCandidate>, FeedError> {
        Ok(self.candidates.clone())
    }
}

/// Reads a JSON array of candidates from disk on every fetch.
///
/// Items that do not deserialize are logged and dropped so one bad entry
/// does not cost the whole feed.
#[derive(Debug, Clone)]
pub struct JsonFileFeed {
    path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CourseFeed for JsonFileFeed {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch(&self) -> Result<Vec<CourseCandidate>, FeedError> {
        let path = self.path.display().to_string();
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FeedError::Io {
                path: path.clone(),
                source,
            })?;

        let items: Vec<serde_json::Value> =
            serde_json::from_str(&raw).map_err(|e| FeedError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let mut candidates = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<CourseCandidate>(item) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => {
                    tracing::warn!(feed = %path, index, error = %e, "Dropping unreadable feed entry");
                }
            }
        }

        tracing::debug!(feed = %path, count = candidates.len(), "Course feed loaded");
        Ok(candidates)
    }
}
