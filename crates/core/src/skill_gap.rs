//! Skill gaps between a target role and what the user already covers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assessment::ExperienceTier;
use crate::career::CareerRole;
use crate::market_data::MarketDataTable;
use crate::similarity::{best_match, normalize_skill};
use crate::transfer::TransferAnalysis;

/// Highest value on the skill level scale.
pub const MAX_SKILL_LEVEL: u8 = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl GapPriority {
    pub fn rank(self) -> i32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl fmt::Display for GapPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDifficulty {
    Easy,
    Medium,
    Hard,
}

impl TransferDifficulty {
    pub fn rank(self) -> i32 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }
}

/// A required skill the user does not yet transferably possess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGap {
    pub required_skill: String,
    pub current_level: u8,
    pub target_level: u8,
    pub priority: GapPriority,
    pub estimated_learning_hours: u32,
    pub estimated_courses: u32,
    pub transfer_difficulty: TransferDifficulty,
    /// The user skill closest to this one, when similar enough to help.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_skill: Option<String>,
}

impl SkillGap {
    /// Sort key: higher is more urgent. Critical+Easy sorts highest.
    pub fn sort_key(&self) -> i32 {
        self.priority.rank() * 10 - self.transfer_difficulty.rank()
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

pub struct SkillGapGenerator<'a> {
    market: &'a MarketDataTable,
}

impl<'a> SkillGapGenerator<'a> {
    pub fn new(market: &'a MarketDataTable) -> Self {
        Self { market }
    }

    /// Gaps for `role`, ordered most urgent first.
    ///
    /// `user_skills` must already be normalised. A required skill is not a
    /// gap when the user owns it or any transferable skill targets it.
    pub fn generate(
        &self,
        role: &CareerRole,
        user_skills: &[String],
        transfer: &TransferAnalysis,
        tier: ExperienceTier,
    ) -> Vec<SkillGap> {
        let mut gaps: Vec<SkillGap> = role
            .required_skills
            .iter()
            .map(|s| normalize_skill(s))
            .filter(|s| !user_skills.contains(s) && !transfer.covers(s))
            .map(|s| self.gap_for(s, user_skills, tier))
            .collect();

        // Stable: equal keys keep catalog order.
        gaps.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        gaps
    }

    fn gap_for(&self, skill: String, user_skills: &[String], tier: ExperienceTier) -> SkillGap {
        let w = &self.market.gaps;
        let priority = self.priority(&skill);

        let related_skill = best_match(&skill, user_skills)
            .filter(|(_, similarity)| *similarity > w.easy_similarity)
            .map(|(s, _)| s.to_string());

        let transfer_difficulty = if related_skill.is_some() {
            TransferDifficulty::Easy
        } else if self.market.complex_skills.contains(&skill) {
            TransferDifficulty::Hard
        } else {
            TransferDifficulty::Medium
        };

        let hours = (tier.base_hours(w) * self.market.complexity(&skill)).round().max(0.0);
        let estimated_learning_hours = hours as u32;
        let estimated_courses = (hours / w.hours_per_course).ceil().max(1.0) as u32;

        let target_level = match priority {
            GapPriority::Critical | GapPriority::High => 4,
            _ => 3,
        };

        SkillGap {
            current_level: u8::from(related_skill.is_some()),
            target_level: target_level.min(MAX_SKILL_LEVEL),
            priority,
            estimated_learning_hours,
            estimated_courses,
            transfer_difficulty,
            related_skill,
            required_skill: skill,
        }
    }

    fn priority(&self, skill: &str) -> GapPriority {
        if self.market.is_trending_skill(skill) {
            GapPriority::Critical
        } else if self.market.high_value_skills.iter().any(|s| s == skill) {
            GapPriority::High
        } else if self.market.soft_skills.iter().any(|s| s == skill) {
            GapPriority::Low
        } else {
            GapPriority::Medium
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::career::RoleCatalog;

    fn role_with(skills: &[&str]) -> CareerRole {
        let mut role = RoleCatalog::standard().roles[0].clone();
        role.required_skills = skills.iter().map(|s| s.to_string()).collect();
        role
    }

    fn owned(skills: &[&str]) -> Vec<String> {
        skills.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn owned_and_transferred_skills_are_not_gaps() {
        let market = MarketDataTable::standard();
        let user = owned(&["javascript"]);
        let transfer = crate::transfer::TransferAnalyzer::new(&market).analyze(&user);
        let role = role_with(&["javascript", "react", "sql"]);

        let gaps = SkillGapGenerator::new(&market).generate(&role, &user, &transfer, ExperienceTier::Mid);
        let names: Vec<_> = gaps.iter().map(|g| g.required_skill.as_str()).collect();
        assert_eq!(names, vec!["sql"]);
    }

    #[test]
    fn priority_follows_table_lists() {
        let market = MarketDataTable::standard();
        let generator = SkillGapGenerator::new(&market);
        assert_eq!(generator.priority("python"), GapPriority::Critical);
        assert_eq!(generator.priority("statistics"), GapPriority::High);
        assert_eq!(generator.priority("communication"), GapPriority::Low);
        assert_eq!(generator.priority("excel"), GapPriority::Medium);
    }

    #[test]
    fn hours_scale_with_tier_and_complexity() {
        let market = MarketDataTable::standard();
        let role = role_with(&["machine learning", "excel"]);
        let gaps = SkillGapGenerator::new(&market).generate(
            &role,
            &[],
            &TransferAnalysis::default(),
            ExperienceTier::Entry,
        );
        let ml = gaps.iter().find(|g| g.required_skill == "machine learning").unwrap();
        let excel = gaps.iter().find(|g| g.required_skill == "excel").unwrap();
        assert_eq!(ml.estimated_learning_hours, 160);
        assert_eq!(ml.estimated_courses, 8);
        assert_eq!(excel.estimated_learning_hours, 80);
        assert_eq!(excel.estimated_courses, 4);
    }

    #[test]
    fn senior_needs_fewer_hours_than_entry() {
        let market = MarketDataTable::standard();
        let role = role_with(&["excel"]);
        let generator = SkillGapGenerator::new(&market);
        let entry = generator.generate(&role, &[], &TransferAnalysis::default(), ExperienceTier::Entry);
        let senior = generator.generate(&role, &[], &TransferAnalysis::default(), ExperienceTier::Senior);
        assert!(senior[0].estimated_learning_hours < entry[0].estimated_learning_hours);
    }

    #[test]
    fn similar_user_skill_makes_gap_easy() {
        let market = MarketDataTable::standard();
        let role = role_with(&["typescript"]);
        let user = owned(&["javascript"]);
        let gaps = SkillGapGenerator::new(&market).generate(
            &role,
            &user,
            &TransferAnalysis::default(),
            ExperienceTier::Mid,
        );
        assert_eq!(gaps[0].transfer_difficulty, TransferDifficulty::Easy);
        assert_eq!(gaps[0].related_skill.as_deref(), Some("javascript"));
        assert_eq!(gaps[0].current_level, 1);
    }

    #[test]
    fn complex_skill_without_related_skill_is_hard() {
        let market = MarketDataTable::standard();
        let role = role_with(&["kubernetes"]);
        let gaps = SkillGapGenerator::new(&market).generate(
            &role,
            &owned(&["zzzzzzzzzzzz"]),
            &TransferAnalysis::default(),
            ExperienceTier::Mid,
        );
        assert_eq!(gaps[0].transfer_difficulty, TransferDifficulty::Hard);
        assert_eq!(gaps[0].current_level, 0);
        assert_eq!(gaps[0].target_level, 4);
    }

    #[test]
    fn gaps_sorted_by_priority_then_difficulty() {
        let market = MarketDataTable::standard();
        // communication: Low; statistics: High; kubernetes: Critical+Hard; python: Critical+Medium.
        let role = role_with(&["communication", "statistics", "kubernetes", "python"]);
        let gaps = SkillGapGenerator::new(&market).generate(
            &role,
            &[],
            &TransferAnalysis::default(),
            ExperienceTier::Mid,
        );
        let names: Vec<_> = gaps.iter().map(|g| g.required_skill.as_str()).collect();
        assert_eq!(names, vec!["python", "kubernetes", "statistics", "communication"]);
        for pair in gaps.windows(2) {
            assert!(pair[0].sort_key() >= pair[1].sort_key());
        }
    }

    #[test]
    fn no_required_skills_yields_no_gaps() {
        let market = MarketDataTable::standard();
        let role = role_with(&[]);
        let gaps = SkillGapGenerator::new(&market).generate(
            &role,
            &[],
            &TransferAnalysis::default(),
            ExperienceTier::Mid,
        );
        assert!(gaps.is_empty());
    }
}
