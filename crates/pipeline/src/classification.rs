//! Isolated classification of course records.
//!
//! Failures are contained per record: a malformed record is skipped, a
//! scoring failure falls back to the conservative default, and the rest of
//! the batch carries on either way.

use std::sync::Arc;

use pathwise_core::classifier::{ClassifyError, TrendClassifier};
use pathwise_core::course::{Course, CourseCandidate};
use pathwise_core::market_data::MarketDataTable;
use pathwise_core::types::Timestamp;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Classified normally; the course carries the new classification.
    Classified(Course),
    /// Scoring failed and the conservative default was applied.
    Fallback(Course),
    /// The record was malformed and left untouched.
    Skipped { url: String, reason: String },
}

impl RecordOutcome {
    /// The updated course, unless the record was skipped.
    pub fn course(&self) -> Option<&Course> {
        match self {
            Self::Classified(c) | Self::Fallback(c) => Some(c),
            Self::Skipped { .. } => None,
        }
    }

    pub fn into_course(self) -> Option<Course> {
        match self {
            Self::Classified(c) | Self::Fallback(c) => Some(c),
            Self::Skipped { .. } => None,
        }
    }
}

/// Summary of a classified batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Courses to write back, in input order.
    pub updated: Vec<Course>,
    pub classified: usize,
    pub fallbacks: usize,
    /// URLs of skipped records.
    pub skipped: Vec<String>,
    /// URLs whose trend, demand, job availability or status changed.
    pub changed: Vec<String>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.classified + self.fallbacks + self.skipped.len()
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationService {
    market: Arc<MarketDataTable>,
}

impl ClassificationService {
    pub fn new(market: Arc<MarketDataTable>) -> Self {
        Self { market }
    }

    pub fn market(&self) -> &MarketDataTable {
        &self.market
    }

    /// Classify one course and write the result onto a copy of it.
    pub fn classify_record(&self, course: &Course, now: Timestamp) -> RecordOutcome {
        let classifier = TrendClassifier::new(&self.market);
        match classifier.classify(course) {
            Ok(classification) => {
                let mut updated = course.clone();
                updated.apply_classification(&classification, now);
                RecordOutcome::Classified(updated)
            }
            Err(ClassifyError::Analysis { url, reason }) => {
                tracing::warn!(url = %url, reason = %reason, "Classification failed, applying conservative default");
                let mut updated = course.clone();
                updated.apply_classification(&classifier.fallback(), now);
                RecordOutcome::Fallback(updated)
            }
            Err(ClassifyError::Validation { url, reason }) => {
                tracing::warn!(url = %url, reason = %reason, "Skipping malformed course record");
                RecordOutcome::Skipped { url, reason }
            }
        }
    }

    /// Classify every course in `courses`, isolating failures per record.
    pub fn classify_batch(&self, courses: &[Course], now: Timestamp) -> BatchReport {
        let mut report = BatchReport::default();
        for course in courses {
            match self.classify_record(course, now) {
                RecordOutcome::Classified(updated) => {
                    report.classified += 1;
                    Self::collect(&mut report, course, updated);
                }
                RecordOutcome::Fallback(updated) => {
                    report.fallbacks += 1;
                    Self::collect(&mut report, course, updated);
                }
                RecordOutcome::Skipped { url, .. } => report.skipped.push(url),
            }
        }
        report
    }

    /// Turn an acquisition candidate into a classified course.
    ///
    /// When `existing` is given its descriptive fields are refreshed from the
    /// candidate and `created_at` is kept. A removed course comes back to
    /// life here because classification re-derives its status.
    pub fn prepare_candidate(
        &self,
        candidate: &CourseCandidate,
        existing: Option<&Course>,
        now: Timestamp,
    ) -> RecordOutcome {
        if let Err(e) = candidate.check() {
            tracing::warn!(url = %candidate.url, error = %e, "Skipping invalid course candidate");
            return RecordOutcome::Skipped {
                url: candidate.url.clone(),
                reason: e.to_string(),
            };
        }

        let course = match existing {
            Some(existing) => {
                let mut course = existing.clone();
                course.refresh_from_candidate(candidate);
                course
            }
            None => Course::from_candidate(candidate, now),
        };
        self.classify_record(&course, now)
    }

    fn collect(report: &mut BatchReport, before: &Course, after: Course) {
        if after.classification_changed(before) {
            report.changed.push(after.url.clone());
        }
        report.updated.push(after);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pathwise_core::course::{CourseStatus, DemandTier, JobAvailability, Provider, Trend};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap()
    }

    fn service() -> ClassificationService {
        ClassificationService::new(Arc::new(MarketDataTable::standard()))
    }

    fn candidate(url: &str, title: &str, category: &str) -> CourseCandidate {
        CourseCandidate {
            url: url.to_string(),
            title: title.to_string(),
            description: String::new(),
            category_guess: category.to_string(),
            provider: Provider::Coursera,
            rating: 4.7,
        }
    }

    // -----------------------------------------------------------------------
    // Single records
    // -----------------------------------------------------------------------

    #[test]
    fn trending_candidate_is_classified() {
        let c = candidate(
            "https://www.coursera.org/learn/ml",
            "Machine Learning by Andrew Ng",
            "AI/ML",
        );
        let outcome = service().prepare_candidate(&c, None, now());
        let course = match outcome {
            RecordOutcome::Classified(course) => course,
            other => panic!("expected Classified, got {other:?}"),
        };
        assert_eq!(course.trend, Trend::Trending);
        assert_eq!(course.demand, DemandTier::High);
        assert_eq!(course.job_availability, JobAvailability::High);
        assert_eq!(course.last_classified_at, Some(now()));
        assert!(course.next_refresh_at.is_some());
    }

    #[test]
    fn invalid_candidate_is_skipped() {
        let c = candidate("not a url", "Anything", "Other");
        let outcome = service().prepare_candidate(&c, None, now());
        assert!(matches!(outcome, RecordOutcome::Skipped { ref url, .. } if url == "not a url"));
        assert!(outcome.course().is_none());
    }

    #[test]
    fn existing_course_keeps_created_at_and_revives() {
        let c = candidate(
            "https://www.udemy.com/course/support",
            "Customer Service Training",
            "Other",
        );
        let earlier = now() - chrono::Duration::days(90);
        let mut existing = Course::from_candidate(&c, earlier);
        existing.mark_removed();

        let mut renamed = c.clone();
        renamed.title = "Machine Learning by Andrew Ng".to_string();
        let course = service()
            .prepare_candidate(&renamed, Some(&existing), now())
            .into_course()
            .unwrap();

        assert_eq!(course.created_at, earlier);
        assert_eq!(course.title, "Machine Learning by Andrew Ng");
        assert_eq!(course.status, CourseStatus::Active);
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    #[test]
    fn batch_isolates_bad_records() {
        let svc = service();
        let good = Course::from_candidate(
            &candidate("https://a.example/1", "Customer Service Training", "Other"),
            now(),
        );
        let mut bad = good.clone();
        bad.url = "https://a.example/2".to_string();
        bad.title = "   ".to_string();

        let report = svc.classify_batch(&[bad, good], now());
        assert_eq!(report.classified, 1);
        assert_eq!(report.skipped, vec!["https://a.example/2".to_string()]);
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.processed(), 2);
    }

    #[test]
    fn batch_reports_changed_urls_only() {
        let svc = service();
        let course = Course::from_candidate(
            &candidate("https://a.example/legacy", "Customer Service Training", "Other"),
            now(),
        );
        let first = svc.classify_batch(std::slice::from_ref(&course), now());
        assert_eq!(first.changed, vec![course.url.clone()]);

        let second = svc.classify_batch(&first.updated, now());
        assert!(second.changed.is_empty());
        assert_eq!(second.updated[0].trend, Trend::Outdated);
    }
}
