//! Course records, their classification vocabulary, and status derivation.
//!
//! A [`Course`] is created from a validated [`CourseCandidate`] supplied by
//! the acquisition collaborator, mutated only through
//! [`Course::apply_classification`], and soft-deleted by cleanup via
//! [`Course::mark_removed`].

use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::classifier::Classification;
use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Refresh cadence
// ---------------------------------------------------------------------------

/// Hours until a Trending course is reclassified.
pub const TRENDING_REFRESH_HOURS: i64 = 4;

/// Hours until an Outdated course is reclassified.
pub const OUTDATED_REFRESH_HOURS: i64 = 24;

/// Hours until a Stable course is reclassified.
pub const STABLE_REFRESH_HOURS: i64 = 6;

/// Maximum title length accepted from the acquisition feed.
pub const MAX_TITLE_LEN: u64 = 300;

/// Maximum rating on the provider scale.
pub const MAX_RATING: f64 = 5.0;

// ---------------------------------------------------------------------------
// Classification vocabulary
// ---------------------------------------------------------------------------

/// Market trend state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Trending,
    Stable,
    Outdated,
}

/// Demand tier for a course, skill, or role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandTier {
    High,
    Medium,
    Low,
    Declining,
}

/// How many jobs currently ask for what the course teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobAvailability {
    High,
    Low,
    None,
}

/// Lifecycle status of a course record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Active,
    Outdated,
    Removed,
}

impl CourseStatus {
    /// Derive the status from a classification.
    ///
    /// | trend               | job availability | status   |
    /// |---------------------|------------------|----------|
    /// | Trending / Stable   | any              | active   |
    /// | Outdated            | None             | outdated |
    /// | Outdated            | High / Low       | active   |
    pub fn derive(trend: Trend, job_availability: JobAvailability) -> Self {
        match (trend, job_availability) {
            (Trend::Outdated, JobAvailability::None) => Self::Outdated,
            _ => Self::Active,
        }
    }
}

macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            /// Canonical string form, used for storage.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Parse the canonical string form.
            pub fn parse(value: &str) -> Result<Self, CoreError> {
                match value {
                    $($label => Ok(Self::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {} value: {other}",
                        stringify!($ty)
                    ))),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Trend {
    Trending => "Trending",
    Stable => "Stable",
    Outdated => "Outdated",
});

string_enum!(DemandTier {
    High => "High",
    Medium => "Medium",
    Low => "Low",
    Declining => "Declining",
});

string_enum!(JobAvailability {
    High => "High",
    Low => "Low",
    None => "None",
});

string_enum!(CourseStatus {
    Active => "active",
    Outdated => "outdated",
    Removed => "removed",
});

// ---------------------------------------------------------------------------
// Category & provider
// ---------------------------------------------------------------------------

/// Closed set of course categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI/ML")]
    AiMl,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "Cloud Computing")]
    CloudComputing,
    Cybersecurity,
    DevOps,
    Blockchain,
    Design,
    Business,
    Marketing,
    Other,
}

string_enum!(Category {
    AiMl => "AI/ML",
    DataScience => "Data Science",
    WebDevelopment => "Web Development",
    MobileDevelopment => "Mobile Development",
    CloudComputing => "Cloud Computing",
    Cybersecurity => "Cybersecurity",
    DevOps => "DevOps",
    Blockchain => "Blockchain",
    Design => "Design",
    Business => "Business",
    Marketing => "Marketing",
    Other => "Other",
});

impl Category {
    pub const ALL: [Category; 12] = [
        Self::AiMl,
        Self::DataScience,
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::CloudComputing,
        Self::Cybersecurity,
        Self::DevOps,
        Self::Blockchain,
        Self::Design,
        Self::Business,
        Self::Marketing,
        Self::Other,
    ];

    /// Lenient parse of an acquisition-side category guess.
    ///
    /// Matching ignores case and surrounding whitespace; anything
    /// unrecognised falls into [`Category::Other`].
    pub fn from_guess(guess: &str) -> Self {
        let needle = guess.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().to_lowercase() == needle)
            .unwrap_or(Self::Other)
    }
}

/// Course provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    Coursera,
    #[serde(rename = "edX")]
    EdX,
    Udemy,
    Udacity,
    Pluralsight,
    #[serde(rename = "LinkedIn Learning")]
    LinkedInLearning,
    #[serde(rename = "Khan Academy")]
    KhanAcademy,
    YouTube,
    Other,
}

string_enum!(Provider {
    Coursera => "Coursera",
    EdX => "edX",
    Udemy => "Udemy",
    Udacity => "Udacity",
    Pluralsight => "Pluralsight",
    LinkedInLearning => "LinkedIn Learning",
    KhanAcademy => "Khan Academy",
    YouTube => "YouTube",
    Other => "Other",
});

// ---------------------------------------------------------------------------
// Candidate (acquisition input)
// ---------------------------------------------------------------------------

/// A raw course candidate produced by the acquisition feed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CourseCandidate {
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1, max = MAX_TITLE_LEN))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_guess: String,
    pub provider: Provider,
    #[validate(range(min = 0.0, max = MAX_RATING))]
    #[serde(default)]
    pub rating: f64,
}

impl CourseCandidate {
    /// Validate the candidate, flattening field errors into a single message.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Course {} has a blank title",
                self.url
            )));
        }
        self.validate()
            .map_err(|e| CoreError::Validation(format!("Course {}: {e}", self.url)))
    }
}

// ---------------------------------------------------------------------------
// Course record
// ---------------------------------------------------------------------------

/// A persisted course record, identified by its URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub url: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub provider: Provider,
    pub rating: f64,
    pub trend: Trend,
    pub demand: DemandTier,
    pub job_availability: JobAvailability,
    pub confidence_score: f64,
    pub automation_threat: f64,
    pub status: CourseStatus,
    pub last_classified_at: Option<Timestamp>,
    pub next_refresh_at: Option<Timestamp>,
    /// When the record last entered [`CourseStatus::Outdated`]. `None` while
    /// the status is anything else.
    #[serde(default)]
    pub outdated_since: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Course {
    /// Build an unclassified course from a candidate.
    ///
    /// The classification fields start at the conservative default and the
    /// record is due for classification immediately.
    pub fn from_candidate(candidate: &CourseCandidate, now: Timestamp) -> Self {
        let defaults = Classification::conservative_default();
        Self {
            url: candidate.url.clone(),
            title: candidate.title.trim().to_string(),
            description: candidate.description.trim().to_string(),
            category: Category::from_guess(&candidate.category_guess),
            provider: candidate.provider,
            rating: candidate.rating,
            trend: defaults.trend,
            demand: defaults.demand,
            job_availability: defaults.job_availability,
            confidence_score: defaults.confidence_score,
            automation_threat: defaults.automation_threat,
            status: CourseStatus::derive(defaults.trend, defaults.job_availability),
            last_classified_at: None,
            next_refresh_at: None,
            outdated_since: None,
            created_at: now,
        }
    }

    /// Overwrite descriptive fields with a freshly acquired candidate.
    pub fn refresh_from_candidate(&mut self, candidate: &CourseCandidate) {
        self.title = candidate.title.trim().to_string();
        self.description = candidate.description.trim().to_string();
        self.category = Category::from_guess(&candidate.category_guess);
        self.provider = candidate.provider;
        self.rating = candidate.rating;
    }

    /// Write a classification onto the record.
    ///
    /// Re-derives `status` from the new trend and job availability and
    /// schedules the next refresh based on the trend. `outdated_since` is
    /// stamped on entry to Outdated, kept across repeat Outdated
    /// classifications, and cleared on exit.
    pub fn apply_classification(&mut self, classification: &Classification, now: Timestamp) {
        self.trend = classification.trend;
        self.demand = classification.demand;
        self.job_availability = classification.job_availability;
        self.confidence_score = classification.confidence_score;
        self.automation_threat = classification.automation_threat;
        let status = CourseStatus::derive(self.trend, self.job_availability);
        self.outdated_since = match (self.status, status) {
            (_, CourseStatus::Active | CourseStatus::Removed) => None,
            (CourseStatus::Outdated, CourseStatus::Outdated) => self.outdated_since.or(Some(now)),
            (_, CourseStatus::Outdated) => Some(now),
        };
        self.status = status;
        self.last_classified_at = Some(now);
        self.next_refresh_at = Some(next_refresh_at(self.trend, now));
    }

    /// Soft-delete the record.
    pub fn mark_removed(&mut self) {
        self.status = CourseStatus::Removed;
    }

    /// Whether the record is due for reclassification at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status != CourseStatus::Removed
            && self.next_refresh_at.map_or(true, |due| due <= now)
    }

    /// Whether trend, demand, job availability or status differ from `other`.
    /// Score-only drift does not count as a change.
    pub fn classification_changed(&self, other: &Course) -> bool {
        self.trend != other.trend
            || self.demand != other.demand
            || self.job_availability != other.job_availability
            || self.status != other.status
    }
}

/// Compute when a course with the given trend should next be reclassified.
pub fn next_refresh_at(trend: Trend, now: Timestamp) -> Timestamp {
    let hours = match trend {
        Trend::Trending => TRENDING_REFRESH_HOURS,
        Trend::Outdated => OUTDATED_REFRESH_HOURS,
        Trend::Stable => STABLE_REFRESH_HOURS,
    };
    now + Duration::hours(hours)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
