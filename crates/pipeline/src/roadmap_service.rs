//! Roadmap generation and persistence.
//!
//! The generator in `pathwise_core` always produces a clean document. This
//! service owns the regeneration policy: milestones a user has started or
//! finished are never reset or reordered by a later regeneration.
//!
//! Every read-modify-write of a user's roadmap runs under that user's lock,
//! so concurrent progress updates on different milestones both land.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use pathwise_core::analysis::{analyze_assessment, CareerAnalysis};
use pathwise_core::assessment::UserAssessment;
use pathwise_core::career::RoleCatalog;
use pathwise_core::error::CoreError;
use pathwise_core::event_types::ROADMAP_UPDATED;
use pathwise_core::market_data::MarketDataTable;
use pathwise_core::roadmap::Roadmap;
use pathwise_core::types::{DbId, Timestamp};
use pathwise_db::{AssessmentReader, RoadmapStore};
use pathwise_events::{BroadcastEvent, Broadcaster};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::PipelineError;

pub struct RoadmapService {
    roadmaps: Arc<dyn RoadmapStore>,
    assessments: Arc<dyn AssessmentReader>,
    broadcaster: Arc<Broadcaster>,
    market: Arc<MarketDataTable>,
    catalog: Arc<RoleCatalog>,
    user_locks: Mutex<HashMap<DbId, Arc<Mutex<()>>>>,
}

impl RoadmapService {
    pub fn new(
        roadmaps: Arc<dyn RoadmapStore>,
        assessments: Arc<dyn AssessmentReader>,
        broadcaster: Arc<Broadcaster>,
        market: Arc<MarketDataTable>,
        catalog: Arc<RoleCatalog>,
    ) -> Self {
        Self {
            roadmaps,
            assessments,
            broadcaster,
            market,
            catalog,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run the full analysis for an assessment without touching the store.
    pub fn analyze(
        &self,
        assessment: &UserAssessment,
        now: Timestamp,
    ) -> Result<CareerAnalysis, PipelineError> {
        Ok(analyze_assessment(assessment, &self.market, &self.catalog, now)?)
    }

    /// Generate a roadmap from the user's stored assessment and persist it.
    ///
    /// `regenerate` must be set to replace a roadmap that already has
    /// milestones in progress or completed; those milestones are merged
    /// into the new document rather than overwritten.
    pub async fn generate_for_user(
        &self,
        user_id: DbId,
        regenerate: bool,
    ) -> Result<Roadmap, PipelineError> {
        let assessment = self
            .assessments
            .get_assessment(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "assessment",
                key: user_id.to_string(),
            })?;

        let analysis = self.analyze(&assessment, Utc::now())?;
        self.save_generated(analysis.roadmap, regenerate).await
    }

    /// Persist a freshly generated roadmap, applying the regeneration policy.
    pub async fn save_generated(
        &self,
        fresh: Roadmap,
        regenerate: bool,
    ) -> Result<Roadmap, PipelineError> {
        let user_id = fresh.user_id;
        let _guard = self.lock_user(user_id).await;
        let existing = self.roadmaps.get_roadmap(user_id).await?;

        let (roadmap, reason) = match existing {
            Some(existing) if existing.has_locked_milestones() => {
                if !regenerate {
                    let locked = existing.milestones.iter().filter(|m| m.is_locked()).count();
                    return Err(PipelineError::RegenerationBlocked { user_id, locked });
                }
                let merged = Roadmap::merge_regenerated(&existing, fresh, &self.market.roadmap);
                (merged, "regenerated")
            }
            Some(_) => (fresh, "regenerated"),
            None => (fresh, "generated"),
        };

        self.roadmaps.upsert_roadmap(&roadmap).await?;
        tracing::info!(
            user_id,
            target_role = %roadmap.target_role,
            milestones = roadmap.milestones.len(),
            reason,
            "Roadmap saved",
        );
        self.announce(&roadmap, reason).await;
        Ok(roadmap)
    }

    pub async fn get_roadmap(&self, user_id: DbId) -> Result<Roadmap, PipelineError> {
        self.roadmaps
            .get_roadmap(user_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "roadmap",
                    key: user_id.to_string(),
                }
                .into()
            })
    }

    /// Record milestone progress. Progress never moves backwards here; use
    /// [`RoadmapService::reset_milestone`] for that.
    pub async fn update_progress(
        &self,
        user_id: DbId,
        milestone_index: usize,
        percentage: u8,
    ) -> Result<Roadmap, PipelineError> {
        let _guard = self.lock_user(user_id).await;
        let mut roadmap = self.get_roadmap(user_id).await?;
        roadmap.update_milestone_progress(milestone_index, percentage)?;
        self.roadmaps.upsert_roadmap(&roadmap).await?;
        self.announce(&roadmap, "progress").await;
        Ok(roadmap)
    }

    pub async fn reset_milestone(
        &self,
        user_id: DbId,
        milestone_index: usize,
    ) -> Result<Roadmap, PipelineError> {
        let _guard = self.lock_user(user_id).await;
        let mut roadmap = self.get_roadmap(user_id).await?;
        roadmap.reset_milestone(milestone_index)?;
        self.roadmaps.upsert_roadmap(&roadmap).await?;
        self.announce(&roadmap, "reset").await;
        Ok(roadmap)
    }

    /// One lock per user, created on first use and kept for the service's
    /// lifetime.
    async fn lock_user(&self, user_id: DbId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.user_locks.lock().await;
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }

    async fn announce(&self, roadmap: &Roadmap, reason: &str) {
        let event = BroadcastEvent::new(ROADMAP_UPDATED).with_payload(serde_json::json!({
            "userId": roadmap.user_id,
            "targetRole": roadmap.target_role,
            "totalProgress": roadmap.total_progress,
            "reason": reason,
        }));
        self.broadcaster.publish(event).await;
    }
}
