//! End-to-end career analysis for one assessment.
//!
//! Runs transfer analysis, role ranking, gap generation, and roadmap
//! generation in order. The result always carries a role and a four-phase
//! roadmap, falling back to the generic role when nothing else is viable.

use serde::{Deserialize, Serialize};

use crate::assessment::{ExperienceTier, UserAssessment};
use crate::career::{CareerOptimizer, RankedRole, RoleCatalog};
use crate::error::CoreError;
use crate::market_data::MarketDataTable;
use crate::roadmap::{Roadmap, RoadmapGenerator};
use crate::skill_gap::{SkillGap, SkillGapGenerator};
use crate::transfer::{TransferAnalysis, TransferAnalyzer};
use crate::types::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerAnalysis {
    pub transfer: TransferAnalysis,
    pub experience_tier: ExperienceTier,
    /// Ranked roles, best first. Non-empty when built by
    /// [`analyze_assessment`]; a deserialized value may hold none.
    pub roles: Vec<RankedRole>,
    pub skill_gaps: Vec<SkillGap>,
    pub roadmap: Roadmap,
}

impl CareerAnalysis {
    pub fn top_role(&self) -> Option<&RankedRole> {
        self.roles.first()
    }
}

/// Run the full analysis pipeline for `assessment`.
pub fn analyze_assessment(
    assessment: &UserAssessment,
    market: &MarketDataTable,
    catalog: &RoleCatalog,
    now: Timestamp,
) -> Result<CareerAnalysis, CoreError> {
    assessment.validate()?;

    let skills = assessment.normalized_skills();
    let transfer = TransferAnalyzer::new(market).analyze(&skills);
    let tier = ExperienceTier::from_text(&assessment.experience, &market.gaps);

    let roles = CareerOptimizer::new(market, catalog).rank(assessment, &transfer);
    let top = roles
        .first()
        .ok_or_else(|| CoreError::Internal("Career optimizer returned no roles".to_string()))?;

    let skill_gaps = SkillGapGenerator::new(market).generate(&top.role, &skills, &transfer, tier);
    let roadmap = RoadmapGenerator::new(market).generate(
        assessment.user_id,
        top,
        &skill_gaps,
        &transfer,
        tier,
        now,
    );

    Ok(CareerAnalysis {
        transfer,
        experience_tier: tier,
        roles,
        skill_gaps,
        roadmap,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::roadmap::Phase;

    fn assessment(skills: &[&str], experience: &str) -> UserAssessment {
        UserAssessment {
            user_id: 42,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            interests: vec!["web".to_string()],
            education: "BSc Computer Science".to_string(),
            experience: experience.to_string(),
        }
    }

    #[test]
    fn javascript_user_gets_role_gaps_and_roadmap() {
        let market = MarketDataTable::standard();
        let catalog = RoleCatalog::standard();
        let result =
            analyze_assessment(&assessment(&["javascript"], "2 years frontend"), &market, &catalog, Utc::now())
                .unwrap();

        assert!(!result.roles.is_empty());
        assert_eq!(result.roadmap.target_role, result.top_role().unwrap().role.title);
        assert_eq!(result.roadmap.user_id, 42);
        assert_eq!(result.roadmap.milestones.len(), 4);
        assert_eq!(result.roadmap.skill_gaps, result.skill_gaps);
        assert_eq!(result.experience_tier, ExperienceTier::Mid);
    }

    #[test]
    fn unknown_skills_fall_back_to_generic_role() {
        let market = MarketDataTable::standard();
        let mut catalog = RoleCatalog::standard();
        catalog.roles.clear();
        let result = analyze_assessment(&assessment(&["knitting"], ""), &market, &catalog, Utc::now()).unwrap();

        assert!(result.top_role().unwrap().is_fallback);
        assert_eq!(result.roadmap.milestones.last().map(|m| m.phase), Some(Phase::Transition));
    }

    #[test]
    fn deserialized_analysis_without_roles_has_no_top_role() {
        let market = MarketDataTable::standard();
        let catalog = RoleCatalog::standard();
        let result =
            analyze_assessment(&assessment(&["javascript"], "2 years frontend"), &market, &catalog, Utc::now())
                .unwrap();
        let mut json = serde_json::to_value(&result).unwrap();
        json["roles"] = serde_json::json!([]);

        let restored: CareerAnalysis = serde_json::from_value(json).unwrap();
        assert!(restored.top_role().is_none());
    }

    #[test]
    fn invalid_assessment_is_rejected() {
        let market = MarketDataTable::standard();
        let catalog = RoleCatalog::standard();
        let too_many: Vec<String> = (0..=crate::assessment::MAX_ASSESSMENT_SKILLS)
            .map(|i| format!("skill {i}"))
            .collect();
        let a = UserAssessment {
            user_id: 1,
            skills: too_many,
            ..Default::default()
        };
        let err = analyze_assessment(&a, &market, &catalog, Utc::now()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn analysis_is_deterministic_for_fixed_time() {
        let market = MarketDataTable::standard();
        let catalog = RoleCatalog::standard();
        let now = Utc::now();
        let a = assessment(&["python", "excel"], "senior accountant");
        let first = analyze_assessment(&a, &market, &catalog, now).unwrap();
        let second = analyze_assessment(&a, &market, &catalog, now).unwrap();
        assert_eq!(first, second);
    }
}
