//! Career path optimisation over a fixed catalog of target roles.
//!
//! Each role is scored by skill coverage, interest alignment, education
//! relevance, experience leverage, and market potential. Low-viability roles
//! are discarded and the rest ranked by `viability * market potential`.
//! The result is never empty: a generic fallback role is returned when the
//! catalog yields no viable match.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::assessment::UserAssessment;
use crate::course::DemandTier;
use crate::market_data::MarketDataTable;
use crate::similarity::{contains_phrase, normalize_text};
use crate::transfer::TransferAnalysis;

/// Title of the role returned when nothing in the catalog is viable.
pub const FALLBACK_ROLE_TITLE: &str = "Technology Professional";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A static catalog entry describing a target role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRole {
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    /// Semantic skill groups / backgrounds that feed naturally into the role.
    pub transferable_from_categories: Vec<String>,
    /// Education keywords that indicate a relevant background.
    pub education_keywords: Vec<String>,
    pub automation_resistance: f64,
    pub market_demand: DemandTier,
    /// Annual salary range in USD.
    pub salary_range: (u32, u32),
    /// Projected job growth in percent.
    pub job_growth: f64,
}

/// The fixed set of roles the optimizer scores against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCatalog {
    pub roles: Vec<CareerRole>,
    pub fallback: CareerRole,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoleCatalog {
    /// The catalog shipped with this release.
    pub fn standard() -> Self {
        Self {
            roles: vec![
                role(
                    "Machine Learning Engineer",
                    "Build, train and deploy machine learning models and AI systems in production",
                    &["python", "machine learning", "deep learning", "mlops", "statistics", "sql"],
                    &["programming", "data"],
                    &["computer science", "mathematics", "statistics", "physics", "engineering"],
                    0.85,
                    DemandTier::High,
                    (130_000, 210_000),
                    35.0,
                ),
                role(
                    "Data Scientist",
                    "Analyze data, run experiments and build predictive models to inform business decisions",
                    &["python", "statistics", "sql", "data analysis", "machine learning", "data visualization"],
                    &["data", "programming", "business"],
                    &["statistics", "mathematics", "economics", "computer science", "physics"],
                    0.75,
                    DemandTier::High,
                    (110_000, 180_000),
                    28.0,
                ),
                role(
                    "Data Analyst",
                    "Turn business data into reports, dashboards and insights",
                    &["sql", "data analysis", "data visualization", "excel", "python"],
                    &["data", "business"],
                    &["business", "economics", "statistics", "finance", "mathematics"],
                    0.55,
                    DemandTier::Medium,
                    (65_000, 110_000),
                    18.0,
                ),
                role(
                    "Cloud Solutions Architect",
                    "Design and operate scalable cloud infrastructure and platforms",
                    &["cloud computing", "aws", "terraform", "kubernetes", "networking", "system design"],
                    &["infrastructure", "programming"],
                    &["computer science", "information technology", "engineering"],
                    0.8,
                    DemandTier::High,
                    (140_000, 220_000),
                    25.0,
                ),
                role(
                    "DevOps Engineer",
                    "Automate delivery pipelines, infrastructure and operations",
                    &["docker", "kubernetes", "ci/cd", "linux", "terraform", "python"],
                    &["infrastructure", "programming"],
                    &["computer science", "information technology", "engineering"],
                    0.75,
                    DemandTier::High,
                    (110_000, 175_000),
                    20.0,
                ),
                role(
                    "Full Stack Developer",
                    "Build web applications across frontend and backend",
                    &["javascript", "typescript", "react", "node.js", "sql", "api design"],
                    &["programming", "design"],
                    &["computer science", "software engineering", "information technology"],
                    0.6,
                    DemandTier::High,
                    (90_000, 160_000),
                    15.0,
                ),
                role(
                    "Cybersecurity Analyst",
                    "Protect systems and networks, investigate incidents and harden security",
                    &["cybersecurity", "networking", "linux", "penetration testing", "python"],
                    &["infrastructure", "programming"],
                    &["computer science", "information security", "information technology"],
                    0.8,
                    DemandTier::High,
                    (95_000, 160_000),
                    32.0,
                ),
                role(
                    "UX/UI Designer",
                    "Research user needs and design intuitive digital products and interfaces",
                    &["ux design", "ui design", "figma", "user research", "prototyping"],
                    &["design", "communication"],
                    &["design", "psychology", "human computer interaction", "fine arts"],
                    0.7,
                    DemandTier::Medium,
                    (80_000, 140_000),
                    13.0,
                ),
                role(
                    "Product Manager",
                    "Own product strategy and roadmaps, working with engineering, design and business",
                    &["product management", "product strategy", "data analysis", "communication", "stakeholder management"],
                    &["business", "communication"],
                    &["business", "mba", "economics", "engineering", "computer science"],
                    0.85,
                    DemandTier::High,
                    (110_000, 190_000),
                    12.0,
                ),
            ],
            fallback: role(
                FALLBACK_ROLE_TITLE,
                "Broad technology role building on general digital skills",
                &["python", "sql", "cloud computing", "communication"],
                &[],
                &[],
                0.6,
                DemandTier::Medium,
                (60_000, 100_000),
                10.0,
            ),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn role(
    title: &str,
    description: &str,
    required_skills: &[&str],
    transferable_from_categories: &[&str],
    education_keywords: &[&str],
    automation_resistance: f64,
    market_demand: DemandTier,
    salary_range: (u32, u32),
    job_growth: f64,
) -> CareerRole {
    let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    CareerRole {
        title: title.to_string(),
        description: description.to_string(),
        required_skills: owned(required_skills),
        transferable_from_categories: owned(transferable_from_categories),
        education_keywords: owned(education_keywords),
        automation_resistance,
        market_demand,
        salary_range,
        job_growth,
    }
}

// ---------------------------------------------------------------------------
// Ranking output
// ---------------------------------------------------------------------------

/// A catalog role with its score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRole {
    pub role: CareerRole,
    pub viability_score: f64,
    pub skill_match: f64,
    pub interest_alignment: f64,
    pub education_relevance: f64,
    pub experience_leverage: f64,
    pub market_potential: f64,
    /// Required skills the user already covers.
    pub covered_skills: Vec<String>,
    /// Whether this is the generic fallback role.
    pub is_fallback: bool,
}

impl RankedRole {
    /// Sort key: viability weighted by market potential.
    pub fn rank_score(&self) -> f64 {
        self.viability_score * self.market_potential
    }

    /// Role match expressed as a whole percentage.
    pub fn match_percent(&self) -> u8 {
        (self.viability_score * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

/// Scores and ranks catalog roles for one user.
#[derive(Debug, Clone)]
pub struct CareerOptimizer<'a> {
    market: &'a MarketDataTable,
    catalog: &'a RoleCatalog,
}

impl<'a> CareerOptimizer<'a> {
    pub fn new(market: &'a MarketDataTable, catalog: &'a RoleCatalog) -> Self {
        Self { market, catalog }
    }

    /// Rank catalog roles for the user. Always returns at least one role.
    pub fn rank(&self, assessment: &UserAssessment, transfer: &TransferAnalysis) -> Vec<RankedRole> {
        let owned = assessment.normalized_skills();
        let interests = assessment.normalized_interests();
        let education = normalize_text(&assessment.education);
        let experience = normalize_text(&assessment.experience);
        let floor = self.market.career.viability_floor;

        let mut ranked: Vec<RankedRole> = self
            .catalog
            .roles
            .iter()
            .map(|role| self.score_role(role, &owned, &interests, &education, &experience, transfer))
            .filter(|r| r.viability_score > floor)
            .collect();

        ranked.sort_by(|a, b| {
            b.rank_score()
                .partial_cmp(&a.rank_score())
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.covered_skills.len().cmp(&a.covered_skills.len()))
                .then_with(|| a.role.title.cmp(&b.role.title))
        });

        if ranked.is_empty() {
            let mut fallback = self.score_role(
                &self.catalog.fallback,
                &owned,
                &interests,
                &education,
                &experience,
                transfer,
            );
            fallback.is_fallback = true;
            ranked.push(fallback);
        }

        ranked
    }

    fn score_role(
        &self,
        role: &CareerRole,
        owned: &[String],
        interests: &[String],
        education: &str,
        experience: &str,
        transfer: &TransferAnalysis,
    ) -> RankedRole {
        let w = &self.market.career;

        let covered_skills: Vec<String> = role
            .required_skills
            .iter()
            .filter(|req| owned.contains(req) || transfer.covers(req))
            .cloned()
            .collect();
        let skill_match = if role.required_skills.is_empty() {
            0.0
        } else {
            covered_skills.len() as f64 / role.required_skills.len() as f64
        };

        let interest_alignment = self.interest_alignment(role, interests);

        let education_hits = role
            .education_keywords
            .iter()
            .filter(|k| contains_phrase(education, k))
            .count();
        let education_relevance = (education_hits as f64 / w.education_saturation).min(1.0);

        let experience_hits = role
            .required_skills
            .iter()
            .chain(&role.transferable_from_categories)
            .filter(|k| contains_phrase(experience, k))
            .count();
        let experience_leverage = (experience_hits as f64 / w.experience_saturation).min(1.0);

        let market_potential = w.market_multiplier(role.market_demand);

        let viability_score = w.skill_match * skill_match
            + w.interest_alignment * interest_alignment
            + w.education_relevance * education_relevance
            + w.experience_leverage * experience_leverage
            + w.market_potential * market_potential;

        RankedRole {
            role: role.clone(),
            viability_score: viability_score.clamp(0.0, 1.0),
            skill_match,
            interest_alignment,
            education_relevance,
            experience_leverage,
            market_potential,
            covered_skills,
            is_fallback: false,
        }
    }

    /// Per interest: full credit for a title hit, partial for a description hit.
    fn interest_alignment(&self, role: &CareerRole, interests: &[String]) -> f64 {
        if interests.is_empty() {
            return 0.0;
        }
        let w = &self.market.career;
        let title = normalize_text(&role.title);
        let description = normalize_text(&role.description);
        let total: f64 = interests
            .iter()
            .map(|interest| {
                if contains_phrase(&title, interest) {
                    w.interest_title_hit
                } else if contains_phrase(&description, interest) {
                    w.interest_description_hit
                } else {
                    0.0
                }
            })
            .sum();
        (total / interests.len() as f64).min(1.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
