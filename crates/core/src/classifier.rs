//! Trend classification of course records against the Market Data Table.
//!
//! The classifier is a deterministic rule-and-weight engine:
//!
//! 1. Explicit keywords decide first. Any trending indicator in the title or
//!    description yields Trending/High/High; otherwise any outdated indicator
//!    yields Outdated/Declining/None. Numeric scoring is skipped entirely.
//! 2. Without a keyword decision, a weighted score (category demand, rating
//!    bonus scaled by provider credibility, decline penalty) is compared
//!    against the trending and outdated thresholds.
//!
//! Automation threat is accumulated independently of the trend decision.

use serde::{Deserialize, Serialize};

use crate::course::{Course, CourseStatus, DemandTier, JobAvailability, Trend, MAX_RATING};
use crate::market_data::MarketDataTable;
use crate::similarity::{contains_phrase, matching_phrases, normalize_text};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Result of classifying one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub trend: Trend,
    pub demand: DemandTier,
    pub job_availability: JobAvailability,
    /// How strongly the inputs supported the decision, `0.0..=1.0`.
    pub confidence_score: f64,
    /// Exposure to automation, `0.0..=1.0`.
    pub automation_threat: f64,
    /// Keywords (trend and automation) that influenced the result.
    pub matched_keywords: Vec<String>,
    /// Human-readable explanation of the decision path.
    pub reason: String,
}

impl Classification {
    /// Conservative result substituted when scoring fails.
    pub fn conservative_default() -> Self {
        Self {
            trend: Trend::Stable,
            demand: DemandTier::Medium,
            job_availability: JobAvailability::Low,
            confidence_score: FALLBACK_CONFIDENCE,
            automation_threat: 0.0,
            matched_keywords: Vec::new(),
            reason: "conservative default".to_string(),
        }
    }

    /// The status this classification implies.
    pub fn status(&self) -> CourseStatus {
        CourseStatus::derive(self.trend, self.job_availability)
    }
}

/// Confidence of [`Classification::conservative_default`].
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a course could not be classified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// The record is malformed; the caller should skip it.
    #[error("Invalid course record {url}: {reason}")]
    Validation { url: String, reason: String },

    /// Scoring produced an unusable value; the caller should substitute defaults.
    #[error("Scoring failed for {url}: {reason}")]
    Analysis { url: String, reason: String },
}

impl ClassifyError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Analysis { .. } => "ANALYSIS_ERROR",
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Scores course records against an injected [`MarketDataTable`].
#[derive(Debug, Clone)]
pub struct TrendClassifier<'a> {
    market: &'a MarketDataTable,
}

impl<'a> TrendClassifier<'a> {
    pub fn new(market: &'a MarketDataTable) -> Self {
        Self { market }
    }

    /// Classify a single course.
    pub fn classify(&self, course: &Course) -> Result<Classification, ClassifyError> {
        self.validate(course)?;

        let text = normalize_text(&format!("{} {}", course.title, course.description));
        let (figures, known_category) = self.market.figures(course.category);
        let weights = &self.market.classifier;

        let (automation_threat, automation_hits) = self.automation_threat(&text);

        let trending_hits = matching_phrases(&text, &self.market.trending_keywords);
        let outdated_hits = matching_phrases(&text, &self.market.outdated_keywords);

        let (trend, demand, job_availability, trend_input, mut matched, reason) =
            if !trending_hits.is_empty() {
                (
                    Trend::Trending,
                    DemandTier::High,
                    JobAvailability::High,
                    weights.keyword_trend_signal,
                    trending_hits,
                    "explicit trending keyword".to_string(),
                )
            } else if !outdated_hits.is_empty() {
                (
                    Trend::Outdated,
                    DemandTier::Declining,
                    JobAvailability::None,
                    weights.keyword_trend_signal,
                    outdated_hits,
                    "explicit outdated keyword".to_string(),
                )
            } else {
                let score = self.weighted_score(course, figures.demand_score, figures.growth_rate);
                let (trend, demand, jobs) = if score >= weights.trending_threshold {
                    (Trend::Trending, DemandTier::High, JobAvailability::High)
                } else if score <= weights.outdated_threshold {
                    (Trend::Outdated, DemandTier::Low, JobAvailability::Low)
                } else {
                    (Trend::Stable, DemandTier::Medium, JobAvailability::Low)
                };
                let reason = if known_category {
                    format!("weighted score {score:.3}")
                } else {
                    format!("weighted score {score:.3} (neutral category row)")
                };
                (trend, demand, jobs, score, Vec::new(), reason)
            };

        let confidence_score = ((trend_input + figures.demand_score) / 2.0).clamp(0.0, 1.0);

        for hit in automation_hits {
            if !matched.contains(&hit) {
                matched.push(hit);
            }
        }

        if !confidence_score.is_finite() || !automation_threat.is_finite() {
            return Err(ClassifyError::Analysis {
                url: course.url.clone(),
                reason: "non-finite score".to_string(),
            });
        }

        Ok(Classification {
            trend,
            demand,
            job_availability,
            confidence_score,
            automation_threat,
            matched_keywords: matched.into_iter().map(str::to_string).collect(),
            reason,
        })
    }

    /// Classify, substituting [`Classification::conservative_default`] on
    /// analysis failure. Validation failures are still returned so the
    /// caller can skip the record.
    pub fn classify_or_default(&self, course: &Course) -> Result<Classification, ClassifyError> {
        match self.classify(course) {
            Ok(c) => Ok(c),
            Err(ClassifyError::Analysis { .. }) => Ok(self.fallback()),
            Err(e) => Err(e),
        }
    }

    /// The conservative default, with the table's fallback confidence.
    pub fn fallback(&self) -> Classification {
        let mut fallback = Classification::conservative_default();
        fallback.confidence_score = self.market.classifier.fallback_confidence;
        fallback
    }

    fn validate(&self, course: &Course) -> Result<(), ClassifyError> {
        let invalid = |reason: &str| ClassifyError::Validation {
            url: course.url.clone(),
            reason: reason.to_string(),
        };
        if course.url.trim().is_empty() {
            return Err(invalid("missing url"));
        }
        if course.title.trim().is_empty() {
            return Err(invalid("blank title"));
        }
        if !course.rating.is_finite() || !(0.0..=MAX_RATING).contains(&course.rating) {
            return Err(invalid("rating outside 0..=5"));
        }
        Ok(())
    }

    /// `demand + rating bonus - decline penalty`, clamped to `0.0..=1.0`.
    fn weighted_score(&self, course: &Course, demand_score: f64, growth_rate: f64) -> f64 {
        let weights = &self.market.classifier;
        let credibility = self.market.credibility(course.provider);
        let rating_bonus = (course.rating / MAX_RATING) * weights.rating_weight * credibility;
        let penalty = if growth_rate < 0.0 {
            weights.decline_penalty
        } else {
            0.0
        };
        (demand_score + rating_bonus - penalty).clamp(0.0, 1.0)
    }

    fn automation_threat<'t>(&'t self, text: &str) -> (f64, Vec<&'t str>) {
        let mut threat = 0.0;
        let mut hits = Vec::new();
        for kw in &self.market.automation_keywords {
            if contains_phrase(text, &kw.keyword) {
                threat += kw.weight;
                hits.push(kw.keyword.as_str());
            }
        }
        (f64::clamp(threat, 0.0, 1.0), hits)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{Category, Provider};
    use chrono::{TimeZone, Utc};

    fn course(title: &str, description: &str, category: Category, rating: f64) -> Course {
        Course {
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            title: title.to_string(),
            description: description.to_string(),
            category,
            provider: Provider::Coursera,
            rating,
            trend: Trend::Stable,
            demand: DemandTier::Medium,
            job_availability: JobAvailability::Low,
            confidence_score: 0.3,
            automation_threat: 0.0,
            status: CourseStatus::Active,
            last_classified_at: None,
            next_refresh_at: None,
            outdated_since: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    // -- explicit keyword overrides --

    #[test]
    fn andrew_ng_machine_learning_is_trending() {
        let market = MarketDataTable::standard();
        let c = course("Machine Learning by Andrew Ng", "", Category::AiMl, 4.9);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();

        assert_eq!(result.trend, Trend::Trending);
        assert_eq!(result.demand, DemandTier::High);
        assert_eq!(result.job_availability, JobAvailability::High);
        assert!(result.matched_keywords.contains(&"machine learning".to_string()));
    }

    #[test]
    fn customer_service_training_is_outdated() {
        let market = MarketDataTable::standard();
        let c = course("Customer Service Training", "", Category::Other, 4.0);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();

        assert_eq!(result.trend, Trend::Outdated);
        assert_eq!(result.demand, DemandTier::Declining);
        assert_eq!(result.job_availability, JobAvailability::None);
        assert_eq!(result.status(), CourseStatus::Outdated);
    }

    #[test]
    fn trending_keyword_overrides_low_numeric_score() {
        let market = MarketDataTable::standard();
        // Blockchain + rating 0 would score well under the outdated threshold.
        let c = course(
            "Kubernetes for blockchain nodes",
            "",
            Category::Blockchain,
            0.0,
        );
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Trending);
    }

    #[test]
    fn trending_keyword_wins_over_outdated_keyword() {
        let market = MarketDataTable::standard();
        let c = course(
            "Replacing COBOL with machine learning",
            "",
            Category::Other,
            3.0,
        );
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Trending);
    }

    #[test]
    fn keyword_in_description_counts() {
        let market = MarketDataTable::standard();
        let c = course(
            "Weekend workshop",
            "Hands-on with generative AI tools",
            Category::Business,
            3.5,
        );
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Trending);
    }

    // -- numeric path --

    #[test]
    fn strong_category_scores_trending_without_keywords() {
        let market = MarketDataTable::standard();
        let c = course("Cloud Architecture Fundamentals", "", Category::CloudComputing, 4.5);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Trending);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn middling_category_is_stable() {
        let market = MarketDataTable::standard();
        let c = course("Responsive Layouts", "", Category::WebDevelopment, 4.0);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Stable);
        assert_eq!(result.demand, DemandTier::Medium);
        assert_eq!(result.job_availability, JobAvailability::Low);
    }

    #[test]
    fn declining_category_scores_outdated_but_keeps_jobs() {
        let market = MarketDataTable::standard();
        let c = course("NFT Marketplaces", "", Category::Blockchain, 2.0);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Outdated);
        assert_eq!(result.job_availability, JobAvailability::Low);
        assert_eq!(result.status(), CourseStatus::Active);
    }

    #[test]
    fn unknown_category_uses_neutral_row() {
        let market = MarketDataTable::standard();
        let c = course("Knitting Patterns", "", Category::Other, 4.0);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Stable);
        assert!(result.reason.contains("neutral"));
    }

    // -- confidence & automation threat --

    #[test]
    fn confidence_averages_trend_and_demand_inputs() {
        let market = MarketDataTable::standard();
        let c = course("Machine Learning", "", Category::AiMl, 5.0);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        let expected = (1.0 + 0.95) / 2.0;
        assert!((result.confidence_score - expected).abs() < 1e-9);
    }

    #[test]
    fn automation_threat_accumulates_and_clamps() {
        let market = MarketDataTable::standard();
        let c = course(
            "Data entry, transcription and telemarketing",
            "call center bookkeeping payroll",
            Category::Business,
            3.0,
        );
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.automation_threat, 1.0);
    }

    #[test]
    fn automation_threat_is_independent_of_trend() {
        let market = MarketDataTable::standard();
        let c = course("Machine learning for payroll", "", Category::AiMl, 4.0);
        let result = TrendClassifier::new(&market).classify(&c).unwrap();
        assert_eq!(result.trend, Trend::Trending);
        assert!((result.automation_threat - 0.2).abs() < 1e-9);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let market = MarketDataTable::standard();
        let classifier = TrendClassifier::new(&market);
        for category in Category::ALL {
            for rating in [0.0, 2.5, 5.0] {
                let c = course("Some course", "with data entry", category, rating);
                let r = classifier.classify(&c).unwrap();
                assert!((0.0..=1.0).contains(&r.confidence_score));
                assert!((0.0..=1.0).contains(&r.automation_threat));
            }
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let market = MarketDataTable::standard();
        let classifier = TrendClassifier::new(&market);
        let c = course("Intro to DevOps", "pipelines and payroll", Category::DevOps, 3.7);
        assert_eq!(classifier.classify(&c).unwrap(), classifier.classify(&c).unwrap());
    }

    // -- failure modes --

    #[test]
    fn invalid_rating_is_a_validation_error() {
        let market = MarketDataTable::standard();
        let c = course("Anything", "", Category::AiMl, 9.0);
        let err = TrendClassifier::new(&market).classify(&c).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn non_finite_weights_fall_back_to_conservative_default() {
        let mut market = MarketDataTable::standard();
        market.neutral.demand_score = f64::NAN;
        let c = course("Knitting Patterns", "", Category::Other, 4.0);
        let classifier = TrendClassifier::new(&market);

        assert!(matches!(
            classifier.classify(&c),
            Err(ClassifyError::Analysis { .. })
        ));
        let fallback = classifier.classify_or_default(&c).unwrap();
        assert_eq!(fallback.trend, Trend::Stable);
        assert_eq!(fallback.demand, DemandTier::Medium);
        assert_eq!(fallback.job_availability, JobAvailability::Low);
        assert_eq!(fallback.confidence_score, FALLBACK_CONFIDENCE);
    }
}
