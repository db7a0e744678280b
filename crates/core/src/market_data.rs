//! Static market reference data and every scoring weight (Market Data Table).
//!
//! All engines take a `&MarketDataTable` rather than reading module-level
//! state, so tests can assert against the named values here and callers can
//! inject an alternative table. [`MarketDataTable::standard`] builds the
//! table shipped with this release, identified by [`MARKET_DATA_VERSION`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::course::{Category, DemandTier, Provider};

/// Version tag of the table built by [`MarketDataTable::standard`].
pub const MARKET_DATA_VERSION: &str = "2026.2";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Market figures for one course category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryFigures {
    /// Normalised demand in `0.0..=1.0`.
    pub demand_score: f64,
    /// Year-over-year job growth in percent. Negative means shrinking.
    pub growth_rate: f64,
    /// Median annual salary in USD.
    pub median_salary: u32,
}

/// A keyword with a weight, used for automation-threat accumulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub keyword: String,
    pub weight: f64,
}

/// Curated mapping from one existing skill to in-demand targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectTransfer {
    pub targets: Vec<String>,
    pub score: f64,
}

/// A semantic bucket of related skills and where they lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub name: String,
    pub members: Vec<String>,
    pub targets: Vec<String>,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Weight blocks
// ---------------------------------------------------------------------------

/// Thresholds and weights for the trend classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierWeights {
    /// Numeric score at or above which a course is Trending.
    pub trending_threshold: f64,
    /// Numeric score at or below which a course is Outdated.
    pub outdated_threshold: f64,
    /// Maximum bonus contributed by a 5.0 rating from a fully credible provider.
    pub rating_weight: f64,
    /// Subtracted when the category's growth rate is negative.
    pub decline_penalty: f64,
    /// Trend input used for confidence when an explicit keyword decided.
    pub keyword_trend_signal: f64,
    /// Confidence assigned by the conservative fallback.
    pub fallback_confidence: f64,
}

/// Thresholds for the skill transferability analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferWeights {
    /// A skill transfers only when its score is strictly above this.
    pub qualify_threshold: f64,
    /// Minimum normalised similarity for a fuzzy match.
    pub fuzzy_floor: f64,
    /// Fuzzy similarity is scaled by this to produce a transfer score.
    pub fuzzy_scale: f64,
    /// Transfer score at or above which learning effort is Low.
    pub low_effort_score: f64,
    /// Transfer score at or above which learning effort is Medium.
    pub medium_effort_score: f64,
}

/// Weights for the career path optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CareerWeights {
    pub skill_match: f64,
    pub interest_alignment: f64,
    pub education_relevance: f64,
    pub experience_leverage: f64,
    pub market_potential: f64,
    /// Roles scoring at or below this are discarded.
    pub viability_floor: f64,
    /// Interest credit for a hit in the role title.
    pub interest_title_hit: f64,
    /// Interest credit for a hit in the role description.
    pub interest_description_hit: f64,
    /// Education keyword hits needed for full relevance.
    pub education_saturation: f64,
    /// Experience keyword hits needed for full leverage.
    pub experience_saturation: f64,
    /// Market potential credited per demand tier.
    pub demand_multipliers: DemandMultipliers,
}

/// Market potential of a role by its demand tier, in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandMultipliers {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub declining: f64,
}

impl CareerWeights {
    /// Demand-tier multiplier used as market potential.
    pub fn market_multiplier(&self, tier: DemandTier) -> f64 {
        let m = &self.demand_multipliers;
        match tier {
            DemandTier::High => m.high,
            DemandTier::Medium => m.medium,
            DemandTier::Low => m.low,
            DemandTier::Declining => m.declining,
        }
    }
}

/// Weights for the skill gap generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapWeights {
    pub entry_base_hours: f64,
    pub mid_base_hours: f64,
    pub senior_base_hours: f64,
    /// Similarity above which an existing skill makes a gap Easy.
    pub easy_similarity: f64,
    /// Learning hours covered by one course.
    pub hours_per_course: f64,
    /// Years of experience at which a user counts as mid-level.
    pub mid_years: u32,
    /// Years of experience at which a user counts as senior.
    pub senior_years: u32,
}

/// Durations for the roadmap generator, in days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadmapWeights {
    pub low_capacity_base_days: i64,
    pub medium_capacity_base_days: i64,
    pub high_capacity_base_days: i64,
    pub days_per_skill: i64,
    pub min_phase_days: i64,
    pub max_phase_days: i64,
    pub transition_days: i64,
    /// Fractional schedule buffer added to the total duration.
    pub schedule_buffer: f64,
    pub days_per_month: f64,
    /// Transferable-skill count at which capacity is High.
    pub high_capacity_skills: usize,
    /// Transferable-skill count below which an entry-level user is Low.
    pub low_capacity_skills: usize,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Versioned reference data driving all scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataTable {
    pub version: String,
    pub categories: BTreeMap<Category, CategoryFigures>,
    /// Row used for categories without figures.
    pub neutral: CategoryFigures,
    pub trending_keywords: Vec<String>,
    pub outdated_keywords: Vec<String>,
    pub automation_keywords: Vec<WeightedKeyword>,
    pub provider_credibility: BTreeMap<Provider, f64>,
    /// Skills currently in demand across the market.
    pub trending_skills: Vec<String>,
    pub high_value_skills: Vec<String>,
    pub complex_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// Learning-hour multiplier per skill; absent skills use 1.0.
    pub skill_complexity: BTreeMap<String, f64>,
    pub direct_transfers: BTreeMap<String, DirectTransfer>,
    pub skill_groups: Vec<SkillGroup>,
    pub classifier: ClassifierWeights,
    pub transfer: TransferWeights,
    pub career: CareerWeights,
    pub gaps: GapWeights,
    pub roadmap: RoadmapWeights,
}

impl Default for MarketDataTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl MarketDataTable {
    /// Figures for a category, falling back to the neutral row.
    pub fn figures(&self, category: Category) -> (CategoryFigures, bool) {
        match self.categories.get(&category) {
            Some(f) => (*f, true),
            None => (self.neutral, false),
        }
    }

    /// Credibility weight of a provider in `0.0..=1.0`.
    pub fn credibility(&self, provider: Provider) -> f64 {
        self.provider_credibility
            .get(&provider)
            .copied()
            .unwrap_or(0.5)
    }

    /// Whether a (normalised) skill is currently trending.
    pub fn is_trending_skill(&self, skill: &str) -> bool {
        self.trending_skills.iter().any(|s| s == skill)
    }

    /// Learning-hour multiplier for a (normalised) skill.
    pub fn complexity(&self, skill: &str) -> f64 {
        self.skill_complexity.get(skill).copied().unwrap_or(1.0)
    }

    /// The table shipped with this release.
    pub fn standard() -> Self {
        Self {
            version: MARKET_DATA_VERSION.to_string(),
            categories: standard_categories(),
            neutral: CategoryFigures {
                demand_score: 0.4,
                growth_rate: 0.0,
                median_salary: 0,
            },
            trending_keywords: strings(&[
                "machine learning",
                "artificial intelligence",
                "deep learning",
                "generative ai",
                "large language model",
                "llm",
                "prompt engineering",
                "mlops",
                "kubernetes",
                "cloud native",
                "data engineering",
                "cybersecurity",
                "zero trust",
                "rust programming",
                "typescript",
                "terraform",
            ]),
            outdated_keywords: strings(&[
                "customer service",
                "data entry",
                "adobe flash",
                "actionscript",
                "silverlight",
                "cobol",
                "visual basic 6",
                "telemarketing",
                "typewriting",
                "internet explorer",
                "windows xp",
                "dreamweaver",
                "ms access",
                "fax",
            ]),
            automation_keywords: weighted(&[
                ("data entry", 0.35),
                ("transcription", 0.35),
                ("telemarketing", 0.35),
                ("customer service", 0.3),
                ("call center", 0.3),
                ("bookkeeping", 0.3),
                ("cashier", 0.3),
                ("manual testing", 0.25),
                ("proofreading", 0.25),
                ("translation", 0.2),
                ("copywriting", 0.2),
                ("payroll", 0.2),
                ("basic excel", 0.2),
            ]),
            provider_credibility: BTreeMap::from([
                (Provider::Coursera, 0.95),
                (Provider::EdX, 0.95),
                (Provider::Udacity, 0.85),
                (Provider::Pluralsight, 0.85),
                (Provider::LinkedInLearning, 0.8),
                (Provider::KhanAcademy, 0.8),
                (Provider::Udemy, 0.75),
                (Provider::YouTube, 0.6),
                (Provider::Other, 0.5),
            ]),
            trending_skills: strings(&[
                "python",
                "machine learning",
                "deep learning",
                "generative ai",
                "prompt engineering",
                "cloud computing",
                "aws",
                "kubernetes",
                "docker",
                "terraform",
                "typescript",
                "react",
                "sql",
                "data analysis",
                "data engineering",
                "mlops",
                "cybersecurity",
                "rust",
            ]),
            high_value_skills: strings(&[
                "system design",
                "statistics",
                "data visualization",
                "api design",
                "linux",
                "networking",
                "ci/cd",
                "tensorflow",
                "pytorch",
                "spark",
                "java",
                "go",
                "node.js",
                "figma",
                "user research",
                "product strategy",
                "penetration testing",
            ]),
            complex_skills: strings(&[
                "machine learning",
                "deep learning",
                "kubernetes",
                "distributed systems",
                "system design",
                "cryptography",
                "mlops",
                "statistics",
                "penetration testing",
            ]),
            soft_skills: strings(&[
                "communication",
                "leadership",
                "teamwork",
                "problem solving",
                "stakeholder management",
                "time management",
            ]),
            skill_complexity: BTreeMap::from(
                [
                    ("deep learning", 2.5),
                    ("distributed systems", 2.2),
                    ("machine learning", 2.0),
                    ("cryptography", 2.0),
                    ("kubernetes", 1.8),
                    ("system design", 1.8),
                    ("mlops", 1.8),
                    ("penetration testing", 1.7),
                    ("statistics", 1.5),
                    ("terraform", 1.3),
                    ("sql", 0.8),
                    ("communication", 0.6),
                    ("css", 0.6),
                    ("html", 0.5),
                    ("git", 0.5),
                ]
                .map(|(k, v)| (k.to_string(), v)),
            ),
            direct_transfers: standard_direct_transfers(),
            skill_groups: standard_skill_groups(),
            classifier: ClassifierWeights {
                trending_threshold: 0.75,
                outdated_threshold: 0.35,
                rating_weight: 0.1,
                decline_penalty: 0.25,
                keyword_trend_signal: 1.0,
                fallback_confidence: 0.3,
            },
            transfer: TransferWeights {
                qualify_threshold: 0.3,
                fuzzy_floor: 0.6,
                fuzzy_scale: 0.75,
                low_effort_score: 0.8,
                medium_effort_score: 0.5,
            },
            career: CareerWeights {
                skill_match: 0.35,
                interest_alignment: 0.20,
                education_relevance: 0.15,
                experience_leverage: 0.15,
                market_potential: 0.15,
                viability_floor: 0.2,
                interest_title_hit: 1.0,
                interest_description_hit: 0.5,
                education_saturation: 2.0,
                experience_saturation: 3.0,
                demand_multipliers: DemandMultipliers {
                    high: 1.0,
                    medium: 0.7,
                    low: 0.4,
                    declining: 0.2,
                },
            },
            gaps: GapWeights {
                entry_base_hours: 80.0,
                mid_base_hours: 60.0,
                senior_base_hours: 40.0,
                easy_similarity: 0.4,
                hours_per_course: 20.0,
                mid_years: 2,
                senior_years: 5,
            },
            roadmap: RoadmapWeights {
                low_capacity_base_days: 60,
                medium_capacity_base_days: 45,
                high_capacity_base_days: 30,
                days_per_skill: 10,
                min_phase_days: 30,
                max_phase_days: 150,
                transition_days: 30,
                schedule_buffer: 0.2,
                days_per_month: 30.0,
                high_capacity_skills: 5,
                low_capacity_skills: 2,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Standard rows
// ---------------------------------------------------------------------------

fn standard_categories() -> BTreeMap<Category, CategoryFigures> {
    let row = |demand_score, growth_rate, median_salary| CategoryFigures {
        demand_score,
        growth_rate,
        median_salary,
    };
    BTreeMap::from([
        (Category::AiMl, row(0.95, 35.0, 150_000)),
        (Category::DataScience, row(0.85, 22.0, 125_000)),
        (Category::CloudComputing, row(0.88, 25.0, 135_000)),
        (Category::Cybersecurity, row(0.9, 32.0, 120_000)),
        (Category::DevOps, row(0.82, 20.0, 125_000)),
        (Category::WebDevelopment, row(0.6, 13.0, 95_000)),
        (Category::MobileDevelopment, row(0.6, 10.0, 100_000)),
        (Category::Design, row(0.55, 3.0, 80_000)),
        (Category::Business, row(0.5, 2.0, 85_000)),
        (Category::Marketing, row(0.48, -2.0, 70_000)),
        (Category::Blockchain, row(0.45, -5.0, 110_000)),
    ])
}

fn standard_direct_transfers() -> BTreeMap<String, DirectTransfer> {
    BTreeMap::from([
        direct("javascript", &["typescript", "react", "node.js"], 0.85),
        direct("python", &["data analysis", "machine learning", "data engineering"], 0.85),
        direct("java", &["kotlin", "spring boot", "android development"], 0.8),
        direct("c++", &["rust", "systems programming", "embedded systems"], 0.8),
        direct("sql", &["data analysis", "data engineering", "data warehousing"], 0.8),
        direct("statistics", &["machine learning", "data analysis"], 0.8),
        direct("linux", &["docker", "kubernetes", "devops"], 0.75),
        direct("networking", &["cybersecurity", "cloud computing"], 0.75),
        direct("graphic design", &["ui design", "ux design", "figma"], 0.75),
        direct("excel", &["data analysis", "sql", "data visualization"], 0.7),
        direct("project management", &["product management", "scrum", "agile coaching"], 0.7),
        direct("photoshop", &["figma", "ui design"], 0.65),
        direct("marketing", &["digital marketing", "growth analytics", "seo"], 0.65),
        direct("html", &["react", "web accessibility"], 0.6),
        direct("css", &["tailwind css", "react"], 0.6),
        direct("php", &["node.js", "typescript"], 0.6),
        direct("accounting", &["financial analysis", "data analysis"], 0.6),
        direct("writing", &["technical writing", "content strategy", "prompt engineering"], 0.6),
        direct("teaching", &["instructional design", "technical training"], 0.6),
        direct("customer service", &["customer success", "user research"], 0.5),
    ])
}

fn direct(skill: &str, targets: &[&str], score: f64) -> (String, DirectTransfer) {
    (
        skill.to_string(),
        DirectTransfer {
            targets: strings(targets),
            score,
        },
    )
}

fn standard_skill_groups() -> Vec<SkillGroup> {
    vec![
        group(
            "programming",
            &["c", "c#", "ruby", "go", "kotlin", "swift", "scala", "perl", "bash", "programming"],
            &["python", "typescript", "cloud computing"],
            0.6,
        ),
        group(
            "data",
            &["r", "spss", "tableau", "power bi", "reporting", "analytics", "research"],
            &["data analysis", "sql", "python"],
            0.55,
        ),
        group(
            "infrastructure",
            &["it support", "helpdesk", "system administration", "windows server", "hardware"],
            &["cloud computing", "devops", "cybersecurity"],
            0.55,
        ),
        group(
            "design",
            &["illustrator", "sketch", "indesign", "drawing", "animation", "video editing"],
            &["ui design", "figma", "ux design"],
            0.55,
        ),
        group(
            "business",
            &["sales", "operations", "management", "consulting", "negotiation", "finance"],
            &["product management", "business analysis"],
            0.5,
        ),
        group(
            "communication",
            &["public speaking", "presentation", "customer support", "support", "training"],
            &["technical writing", "customer success"],
            0.45,
        ),
    ]
}

fn group(name: &str, members: &[&str], targets: &[&str], score: f64) -> SkillGroup {
    SkillGroup {
        name: name.to_string(),
        members: strings(members),
        targets: strings(targets),
        score,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn weighted(values: &[(&str, f64)]) -> Vec<WeightedKeyword> {
    values
        .iter()
        .map(|(keyword, weight)| WeightedKeyword {
            keyword: keyword.to_string(),
            weight: *weight,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_carries_version() {
        assert_eq!(MarketDataTable::standard().version, MARKET_DATA_VERSION);
    }

    #[test]
    fn other_category_falls_back_to_neutral_row() {
        let table = MarketDataTable::standard();
        let (figures, known) = table.figures(Category::Other);
        assert!(!known);
        assert_eq!(figures, table.neutral);
    }

    #[test]
    fn known_category_returns_its_row() {
        let table = MarketDataTable::standard();
        let (figures, known) = table.figures(Category::AiMl);
        assert!(known);
        assert!(figures.demand_score > 0.9);
    }

    #[test]
    fn all_scores_are_unit_interval() {
        let table = MarketDataTable::standard();
        for figures in table.categories.values() {
            assert!((0.0..=1.0).contains(&figures.demand_score));
        }
        for weight in table.provider_credibility.values() {
            assert!((0.0..=1.0).contains(weight));
        }
        for t in table.direct_transfers.values() {
            assert!((0.0..=1.0).contains(&t.score));
        }
    }

    #[test]
    fn career_weights_sum_to_one() {
        let c = MarketDataTable::standard().career;
        let sum = c.skill_match
            + c.interest_alignment
            + c.education_relevance
            + c.experience_leverage
            + c.market_potential;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn market_multiplier_reads_the_table() {
        let mut career = MarketDataTable::standard().career;
        assert_eq!(career.market_multiplier(DemandTier::High), 1.0);
        assert_eq!(career.market_multiplier(DemandTier::Declining), 0.2);

        career.demand_multipliers.medium = 0.55;
        assert_eq!(career.market_multiplier(DemandTier::Medium), 0.55);
    }

    #[test]
    fn demand_multipliers_are_ordered_unit_values() {
        let m = MarketDataTable::standard().career.demand_multipliers;
        for value in [m.high, m.medium, m.low, m.declining] {
            assert!((0.0..=1.0).contains(&value));
        }
        assert!(m.high > m.medium && m.medium > m.low && m.low > m.declining);
    }

    #[test]
    fn keyword_lists_are_lowercase() {
        let table = MarketDataTable::standard();
        for k in table.trending_keywords.iter().chain(&table.outdated_keywords) {
            assert_eq!(k, &k.to_lowercase());
        }
    }

    #[test]
    fn unknown_skill_has_unit_complexity() {
        let table = MarketDataTable::standard();
        assert_eq!(table.complexity("knitting"), 1.0);
        assert_eq!(table.complexity("deep learning"), 2.5);
    }
}
