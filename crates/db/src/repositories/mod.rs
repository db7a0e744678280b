//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod assessment_repo;
pub mod course_repo;
pub mod roadmap_repo;

pub use assessment_repo::AssessmentRepo;
pub use course_repo::CourseRepo;
pub use roadmap_repo::RoadmapRepo;
