//! User skill assessments and experience-tier parsing.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::market_data::GapWeights;
use crate::similarity::{normalize_skill, normalize_text};
use crate::types::DbId;

/// Maximum number of skills accepted in one assessment.
pub const MAX_ASSESSMENT_SKILLS: usize = 200;

/// Words that mark a senior profile when no explicit year count is given.
const SENIOR_WORDS: &[&str] = &["senior", "lead", "principal", "staff", "manager", "director", "head"];

/// Words that mark an entry-level profile when no explicit year count is given.
const ENTRY_WORDS: &[&str] = &["junior", "intern", "internship", "entry", "graduate", "student", "beginner", "none"];

/// Immutable input to the analysis pipeline, owned by the profile collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAssessment {
    pub user_id: DbId,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: String,
}

impl UserAssessment {
    /// Skills normalised and deduplicated, in first-seen order.
    pub fn normalized_skills(&self) -> Vec<String> {
        dedup_normalized(&self.skills)
    }

    /// Interests normalised and deduplicated, in first-seen order.
    pub fn normalized_interests(&self) -> Vec<String> {
        dedup_normalized(&self.interests)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.skills.len() > MAX_ASSESSMENT_SKILLS {
            return Err(CoreError::Validation(format!(
                "An assessment may list at most {MAX_ASSESSMENT_SKILLS} skills"
            )));
        }
        Ok(())
    }
}

fn dedup_normalized(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let n = normalize_skill(v);
        if !n.is_empty() && !out.contains(&n) {
            out.push(n);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Experience tier
// ---------------------------------------------------------------------------

/// Coarse seniority derived from free-text experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceTier {
    Entry,
    Mid,
    Senior,
}

impl ExperienceTier {
    /// Parse free text such as `"7+ years in finance"` or `"junior analyst"`.
    ///
    /// An explicit year count wins over seniority words. Empty text is
    /// Entry; text without any signal is Mid.
    pub fn from_text(text: &str, weights: &GapWeights) -> Self {
        let normalized = normalize_text(text);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.is_empty() {
            return Self::Entry;
        }

        if let Some(years) = explicit_years(&tokens) {
            return if years >= weights.senior_years {
                Self::Senior
            } else if years >= weights.mid_years {
                Self::Mid
            } else {
                Self::Entry
            };
        }

        if tokens.iter().any(|t| SENIOR_WORDS.contains(t)) {
            Self::Senior
        } else if tokens.iter().any(|t| ENTRY_WORDS.contains(t)) {
            Self::Entry
        } else {
            Self::Mid
        }
    }

    /// Base learning hours for a gap at this tier.
    pub fn base_hours(self, weights: &GapWeights) -> f64 {
        match self {
            Self::Entry => weights.entry_base_hours,
            Self::Mid => weights.mid_base_hours,
            Self::Senior => weights.senior_base_hours,
        }
    }
}

/// Find `N year(s)` / `N yrs` in a token stream.
fn explicit_years(tokens: &[&str]) -> Option<u32> {
    tokens.windows(2).find_map(|pair| {
        let unit = pair[1];
        if !unit.starts_with("year") && !unit.starts_with("yr") {
            return None;
        }
        pair[0].trim_end_matches('+').parse::<u32>().ok()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::MarketDataTable;

    fn weights() -> GapWeights {
        MarketDataTable::standard().gaps
    }

    #[test]
    fn skills_are_normalized_and_deduplicated() {
        let a = UserAssessment {
            skills: vec!["Python".into(), " python ".into(), "SQL".into(), "".into()],
            ..Default::default()
        };
        assert_eq!(a.normalized_skills(), vec!["python", "sql"]);
    }

    #[test]
    fn too_many_skills_is_rejected() {
        let a = UserAssessment {
            skills: (0..=MAX_ASSESSMENT_SKILLS).map(|i| format!("s{i}")).collect(),
            ..Default::default()
        };
        assert!(matches!(a.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn explicit_years_decide_tier() {
        let w = weights();
        assert_eq!(ExperienceTier::from_text("7+ years in finance", &w), ExperienceTier::Senior);
        assert_eq!(ExperienceTier::from_text("3 years teaching", &w), ExperienceTier::Mid);
        assert_eq!(ExperienceTier::from_text("1 yr retail", &w), ExperienceTier::Entry);
    }

    #[test]
    fn years_win_over_words() {
        let w = weights();
        assert_eq!(
            ExperienceTier::from_text("senior cashier, 1 year", &w),
            ExperienceTier::Entry
        );
    }

    #[test]
    fn seniority_words_are_recognised() {
        let w = weights();
        assert_eq!(ExperienceTier::from_text("Team Lead at a bank", &w), ExperienceTier::Senior);
        assert_eq!(ExperienceTier::from_text("Junior analyst", &w), ExperienceTier::Entry);
    }

    #[test]
    fn empty_text_is_entry_and_plain_text_is_mid() {
        let w = weights();
        assert_eq!(ExperienceTier::from_text("", &w), ExperienceTier::Entry);
        assert_eq!(ExperienceTier::from_text("accountant", &w), ExperienceTier::Mid);
    }
}
