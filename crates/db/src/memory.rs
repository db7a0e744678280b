//! In-memory store used by tests and by the worker when no database is
//! configured.
//!
//! Availability can be toggled with [`InMemoryStore::set_available`] to
//! simulate the persistence collaborator going away mid-job.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pathwise_core::assessment::UserAssessment;
use pathwise_core::course::Course;
use pathwise_core::roadmap::Roadmap;
use pathwise_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{AssessmentReader, CourseCounts, CourseFilter, CourseStore, RoadmapStore};

pub struct InMemoryStore {
    courses: RwLock<BTreeMap<String, Course>>,
    roadmaps: RwLock<HashMap<DbId, Roadmap>>,
    assessments: RwLock<HashMap<DbId, UserAssessment>>,
    available: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            courses: RwLock::new(BTreeMap::new()),
            roadmaps: RwLock::new(HashMap::new()),
            assessments: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage. While unavailable every call fails with
    /// [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Store an assessment for the reader side.
    pub async fn put_assessment(&self, assessment: UserAssessment) -> Result<(), StoreError> {
        self.check()?;
        self.assessments
            .write()
            .await
            .insert(assessment.user_id, assessment);
        Ok(())
    }

    pub async fn course_count(&self) -> usize {
        self.courses.read().await.len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CourseStore for InMemoryStore {
    async fn get_course(&self, url: &str) -> Result<Option<Course>, StoreError> {
        self.check()?;
        Ok(self.courses.read().await.get(url).cloned())
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, StoreError> {
        self.check()?;
        Ok(self
            .courses
            .read()
            .await
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn list_due_courses(&self, now: Timestamp) -> Result<Vec<Course>, StoreError> {
        self.check()?;
        let mut due: Vec<Course> = self
            .courses
            .read()
            .await
            .values()
            .filter(|c| c.is_due(now))
            .cloned()
            .collect();
        // Never-classified first; the stable sort keeps URL order on ties.
        due.sort_by_key(|c| c.next_refresh_at);
        Ok(due)
    }

    async fn upsert_course(&self, course: &Course) -> Result<(), StoreError> {
        self.check()?;
        self.courses
            .write()
            .await
            .insert(course.url.clone(), course.clone());
        Ok(())
    }

    async fn upsert_courses(&self, courses: &[Course]) -> Result<usize, StoreError> {
        self.check()?;
        let mut map = self.courses.write().await;
        for course in courses {
            map.insert(course.url.clone(), course.clone());
        }
        Ok(courses.len())
    }

    async fn count_courses_by_status(&self) -> Result<CourseCounts, StoreError> {
        self.check()?;
        let mut counts = CourseCounts::default();
        for course in self.courses.read().await.values() {
            counts.add(course.status, 1);
        }
        Ok(counts)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}

#[async_trait]
impl RoadmapStore for InMemoryStore {
    async fn get_roadmap(&self, user_id: DbId) -> Result<Option<Roadmap>, StoreError> {
        self.check()?;
        Ok(self.roadmaps.read().await.get(&user_id).cloned())
    }

    async fn upsert_roadmap(&self, roadmap: &Roadmap) -> Result<(), StoreError> {
        self.check()?;
        self.roadmaps
            .write()
            .await
            .insert(roadmap.user_id, roadmap.clone());
        Ok(())
    }
}

#[async_trait]
impl AssessmentReader for InMemoryStore {
    async fn get_assessment(&self, user_id: DbId) -> Result<Option<UserAssessment>, StoreError> {
        self.check()?;
        Ok(self.assessments.read().await.get(&user_id).cloned())
    }
}

