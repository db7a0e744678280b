//! Orchestration services between the pure scoring engines and the
//! persistence and broadcast collaborators.
//!
//! - [`classification`]: per-record isolated classification of courses
//!   and acquisition candidates.
//! - [`batch`]: fixed-size batch planning with an inter-batch pause.
//! - [`roadmap_service`]: roadmap generation, persistence with the
//!   regeneration merge, and progress updates.
//! - [`feed`]: the acquisition-feed boundary.

pub mod batch;
pub mod classification;
pub mod error;
pub mod feed;
pub mod roadmap_service;

pub use batch::BatchPlan;
pub use classification::{BatchReport, ClassificationService, RecordOutcome};
pub use error::PipelineError;
pub use feed::{CourseFeed, FeedError, JsonFileFeed, StaticFeed};
pub use roadmap_service::RoadmapService;
