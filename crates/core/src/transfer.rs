//! Skill transferability analysis.
//!
//! Maps each of a user's existing skills onto in-demand target skills via
//! three paths: a curated direct map, semantic group membership, and fuzzy
//! edit-distance matching against the trending-skill list. A direct hit
//! short-circuits; otherwise the better of the semantic and fuzzy paths wins.

use serde::{Deserialize, Serialize};

use crate::course::DemandTier;
use crate::market_data::MarketDataTable;
use crate::similarity::{best_match, normalize_skill, normalize_text};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which lookup produced a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPath {
    Direct,
    Semantic,
    Fuzzy,
}

/// Effort needed to turn an existing skill into its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearningEffort {
    Low,
    Medium,
    High,
}

/// An existing user skill mapped to in-demand targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableSkill {
    pub original_skill: String,
    pub transfers_to: Vec<String>,
    pub transfer_score: f64,
    pub market_demand: DemandTier,
    pub learning_effort: LearningEffort,
    pub path: TransferPath,
}

/// Result of analysing all of a user's skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAnalysis {
    pub skills: Vec<TransferableSkill>,
    /// Mean transfer score over every input skill (non-qualifying count as 0).
    pub overall_score: f64,
}

impl TransferAnalysis {
    /// Every target skill reachable from the user's transferable skills.
    pub fn all_targets(&self) -> impl Iterator<Item = &str> {
        self.skills
            .iter()
            .flat_map(|s| s.transfers_to.iter().map(String::as_str))
    }

    /// Whether `skill` (normalised) is reachable through any transfer.
    pub fn covers(&self, skill: &str) -> bool {
        self.all_targets().any(|t| t == skill)
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Maps user skills onto in-demand skills using an injected table.
#[derive(Debug, Clone)]
pub struct TransferAnalyzer<'a> {
    market: &'a MarketDataTable,
}

impl<'a> TransferAnalyzer<'a> {
    pub fn new(market: &'a MarketDataTable) -> Self {
        Self { market }
    }

    /// Analyse `user_skills` against the table's trending-skill list.
    pub fn analyze(&self, user_skills: &[String]) -> TransferAnalysis {
        self.analyze_against(user_skills, &self.market.trending_skills)
    }

    /// Analyse `user_skills` against an explicit list of trending skills,
    /// e.g. one aggregated from recent classifications.
    pub fn analyze_against(&self, user_skills: &[String], trending: &[String]) -> TransferAnalysis {
        let mut owned: Vec<String> = Vec::with_capacity(user_skills.len());
        for skill in user_skills.iter().map(|s| normalize_skill(s)) {
            if !skill.is_empty() && !owned.contains(&skill) {
                owned.push(skill);
            }
        }
        let trending: Vec<String> = trending.iter().map(|s| normalize_skill(s)).collect();

        let mut skills = Vec::new();
        let mut total = 0.0;

        for skill in &owned {
            let Some(mut candidate) = self.best_transfer(skill, &trending) else {
                continue;
            };
            if candidate.transfer_score <= self.market.transfer.qualify_threshold {
                continue;
            }
            candidate.transfers_to.retain(|t| !owned.contains(t));
            if candidate.transfers_to.is_empty() {
                continue;
            }
            candidate.market_demand = if candidate
                .transfers_to
                .iter()
                .any(|t| trending.contains(t))
            {
                DemandTier::High
            } else {
                DemandTier::Medium
            };
            total += candidate.transfer_score;
            skills.push(candidate);
        }

        let overall_score = if skills.is_empty() {
            0.0
        } else {
            total / owned.len() as f64
        };

        TransferAnalysis {
            skills,
            overall_score,
        }
    }

    fn best_transfer(&self, skill: &str, trending: &[String]) -> Option<TransferableSkill> {
        if let Some(direct) = self.market.direct_transfers.get(skill) {
            return Some(self.build(skill, direct.targets.clone(), direct.score, TransferPath::Direct));
        }

        let semantic = self.semantic_transfer(skill);
        let fuzzy = self.fuzzy_transfer(skill, trending);

        match (semantic, fuzzy) {
            (Some(s), Some(f)) if f.transfer_score > s.transfer_score => Some(f),
            (Some(s), _) => Some(s),
            (None, f) => f,
        }
    }

    /// First group (in table order) whose members appear in the skill.
    fn semantic_transfer(&self, skill: &str) -> Option<TransferableSkill> {
        let padded = normalize_text(skill);
        self.market
            .skill_groups
            .iter()
            .find(|g| {
                g.members
                    .iter()
                    .any(|m| padded.contains(&normalize_text(m)))
            })
            .map(|g| self.build(skill, g.targets.clone(), g.score, TransferPath::Semantic))
    }

    fn fuzzy_transfer(&self, skill: &str, trending: &[String]) -> Option<TransferableSkill> {
        let weights = &self.market.transfer;
        let (target, similarity) = best_match(skill, trending)?;
        if similarity < weights.fuzzy_floor {
            return None;
        }
        Some(self.build(
            skill,
            vec![target.to_string()],
            similarity * weights.fuzzy_scale,
            TransferPath::Fuzzy,
        ))
    }

    fn build(
        &self,
        skill: &str,
        targets: Vec<String>,
        score: f64,
        path: TransferPath,
    ) -> TransferableSkill {
        let weights = &self.market.transfer;
        let transfer_score = score.clamp(0.0, 1.0);
        let learning_effort = if transfer_score >= weights.low_effort_score {
            LearningEffort::Low
        } else if transfer_score >= weights.medium_effort_score {
            LearningEffort::Medium
        } else {
            LearningEffort::High
        };
        TransferableSkill {
            original_skill: skill.to_string(),
            transfers_to: targets,
            transfer_score,
            market_demand: DemandTier::Medium,
            learning_effort,
            path,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn direct_mapping_wins() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market).analyze(&skills(&["JavaScript"]));

        assert_eq!(result.skills.len(), 1);
        let s = &result.skills[0];
        assert_eq!(s.path, TransferPath::Direct);
        assert_eq!(s.transfers_to, vec!["typescript", "react", "node.js"]);
        assert_eq!(s.market_demand, DemandTier::High);
        assert_eq!(s.learning_effort, LearningEffort::Low);
    }

    #[test]
    fn duplicate_skills_count_once() {
        let market = MarketDataTable::standard();
        let analyzer = TransferAnalyzer::new(&market);
        let once = analyzer.analyze(&skills(&["JavaScript", "Tableau"]));
        let repeated = analyzer.analyze(&skills(&["JavaScript", " javascript ", "Tableau", "JAVASCRIPT"]));

        assert_eq!(repeated, once);
        assert_eq!(repeated.skills.len(), 2);
    }

    #[test]
    fn semantic_group_applies_without_direct_hit() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market).analyze(&skills(&["Tableau"]));

        assert_eq!(result.skills.len(), 1);
        assert_eq!(result.skills[0].path, TransferPath::Semantic);
        assert!(result.covers("data analysis"));
    }

    #[test]
    fn semantic_group_matches_words_inside_longer_skills() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market).analyze(&skills(&["enterprise sales"]));
        assert_eq!(result.skills[0].path, TransferPath::Semantic);
        assert!(result.covers("product management"));
    }

    #[test]
    fn fuzzy_match_catches_near_spellings() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market).analyze(&skills(&["kubernets"]));

        assert_eq!(result.skills.len(), 1);
        let s = &result.skills[0];
        assert_eq!(s.path, TransferPath::Fuzzy);
        assert_eq!(s.transfers_to, vec!["kubernetes"]);
        assert!(s.transfer_score > 0.3);
    }

    #[test]
    fn unrelated_skill_does_not_transfer() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market).analyze(&skills(&["underwater basket weaving"]));
        assert!(result.skills.is_empty());
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn targets_already_owned_are_removed() {
        let market = MarketDataTable::standard();
        let result =
            TransferAnalyzer::new(&market).analyze(&skills(&["javascript", "typescript"]));
        let js = result
            .skills
            .iter()
            .find(|s| s.original_skill == "javascript")
            .unwrap();
        assert!(!js.transfers_to.contains(&"typescript".to_string()));
    }

    #[test]
    fn skill_whose_targets_are_all_owned_is_dropped() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market)
            .analyze(&skills(&["photoshop", "figma", "ui design"]));
        assert!(result.skills.iter().all(|s| s.original_skill != "photoshop"));
    }

    #[test]
    fn overall_score_is_mean_over_all_inputs() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market)
            .analyze(&skills(&["javascript", "underwater basket weaving"]));
        assert!((result.overall_score - 0.85 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_analysis() {
        let market = MarketDataTable::standard();
        let result = TransferAnalyzer::new(&market).analyze(&[]);
        assert!(result.skills.is_empty());
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn explicit_trending_list_drives_fuzzy_path() {
        let market = MarketDataTable::standard();
        let trending = skills(&["quantum computing"]);
        let result =
            TransferAnalyzer::new(&market).analyze_against(&skills(&["quantum computng"]), &trending);
        assert_eq!(result.skills[0].transfers_to, vec!["quantum computing"]);
        assert_eq!(result.skills[0].market_demand, DemandTier::High);
    }
}
