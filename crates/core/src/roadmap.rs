//! Learning roadmaps: phased milestones with projects, assessments and dates.
//!
//! [`RoadmapGenerator`] always produces a clean four-phase document from the
//! ranked role and its skill gaps. Progress tracking and the regeneration
//! merge live on [`Roadmap`] itself so whatever persists a roadmap can keep
//! in-progress and completed milestones stable across regenerations.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::assessment::ExperienceTier;
use crate::career::RankedRole;
use crate::error::CoreError;
use crate::market_data::{MarketDataTable, RoadmapWeights};
use crate::skill_gap::{GapPriority, SkillGap, TransferDifficulty};
use crate::transfer::TransferAnalysis;
use crate::types::{DbId, Timestamp};

/// Soft skills added to every Mastery phase.
pub const MASTERY_SOFT_SKILLS: &[&str] = &["communication", "leadership", "problem solving"];

/// Job-readiness skills that make up the Transition phase.
pub const TRANSITION_SKILLS: &[&str] = &[
    "portfolio development",
    "interview preparation",
    "professional networking",
];

/// Maximum number of templated projects attached to one milestone.
const MAX_PROJECTS_PER_MILESTONE: usize = 3;

/// Maximum completion percentage.
pub const MAX_COMPLETION: u8 = 100;

// ---------------------------------------------------------------------------
// Capacity and phases
// ---------------------------------------------------------------------------

/// How much new material a user can take on per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningCapacity {
    Low,
    Medium,
    High,
}

impl LearningCapacity {
    pub fn assess(tier: ExperienceTier, transferable_skills: usize, w: &RoadmapWeights) -> Self {
        if tier == ExperienceTier::Senior || transferable_skills >= w.high_capacity_skills {
            Self::High
        } else if tier == ExperienceTier::Entry && transferable_skills < w.low_capacity_skills {
            Self::Low
        } else {
            Self::Medium
        }
    }

    /// Base phase length before per-skill days are added.
    pub fn base_days(self, w: &RoadmapWeights) -> i64 {
        match self {
            Self::Low => w.low_capacity_base_days,
            Self::Medium => w.medium_capacity_base_days,
            Self::High => w.high_capacity_base_days,
        }
    }
}

/// The four roadmap phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Foundation,
    Specialization,
    Mastery,
    Transition,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Self::Foundation,
        Self::Specialization,
        Self::Mastery,
        Self::Transition,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Specialization => "Specialization",
            Self::Mastery => "Mastery",
            Self::Transition => "Transition",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Foundation => "foundation",
            Self::Specialization => "specialization",
            Self::Mastery => "mastery",
            Self::Transition => "transition",
        }
    }

    /// Hours budgeted for each templated project in this phase.
    fn project_hours(self) -> u32 {
        match self {
            Self::Foundation => 10,
            Self::Specialization => 20,
            Self::Mastery => 30,
            Self::Transition => 25,
        }
    }

    fn check_kind(self) -> CheckKind {
        match self {
            Self::Foundation => CheckKind::Quiz,
            Self::Specialization => CheckKind::PracticalExercise,
            Self::Mastery => CheckKind::PeerReview,
            Self::Transition => CheckKind::MockInterview,
        }
    }
}

// ---------------------------------------------------------------------------
// Roadmap document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub estimated_hours: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Quiz,
    PracticalExercise,
    PeerReview,
    MockInterview,
}

/// An assessment checkpoint attached to a milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCheck {
    pub title: String,
    pub kind: CheckKind,
    /// Score needed to pass, in percent.
    pub passing_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub phase: Phase,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub assessments: Vec<SkillCheck>,
    pub duration_days: i64,
    pub target_date: Timestamp,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[serde(default)]
    pub completion_percentage: u8,
}

impl Milestone {
    /// Started or finished milestones survive regeneration unchanged.
    pub fn is_locked(&self) -> bool {
        self.status != MilestoneStatus::NotStarted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedDuration {
    /// Sum of phase durations plus the schedule buffer.
    pub total_days: i64,
    pub months: u32,
    pub display: String,
}

impl EstimatedDuration {
    pub fn from_phase_days(phase_days: i64, w: &RoadmapWeights) -> Self {
        let buffer = (phase_days as f64 * w.schedule_buffer - 1e-9).ceil().max(0.0) as i64;
        let total_days = phase_days + buffer;
        let months = ((total_days as f64 / w.days_per_month).round() as u32).max(1);
        let display = if months == 1 {
            "1 month".to_string()
        } else {
            format!("{months} months")
        };
        Self {
            total_days,
            months,
            display,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub user_id: DbId,
    pub target_role: String,
    /// Role viability as a whole percentage.
    pub match_score: u8,
    pub estimated_duration: EstimatedDuration,
    pub milestones: Vec<Milestone>,
    pub total_progress: u8,
    #[serde(default)]
    pub skill_gaps: Vec<SkillGap>,
    pub generated_at: Timestamp,
    pub market_data_version: String,
}

impl Roadmap {
    pub fn completed_count(&self) -> usize {
        self.milestones
            .iter()
            .filter(|m| m.status == MilestoneStatus::Completed)
            .count()
    }

    pub fn has_locked_milestones(&self) -> bool {
        self.milestones.iter().any(Milestone::is_locked)
    }

    /// Recalculate `total_progress = round(100 * completed / total)`.
    pub fn recompute_progress(&mut self) {
        let total = self.milestones.len();
        self.total_progress = if total == 0 {
            0
        } else {
            (100.0 * self.completed_count() as f64 / total as f64).round() as u8
        };
    }

    /// Record progress on one milestone.
    ///
    /// Progress is monotonic: lowering it requires [`Roadmap::reset_milestone`].
    /// 100 marks the milestone Completed; anything above 0 marks it InProgress.
    pub fn update_milestone_progress(&mut self, index: usize, percentage: u8) -> Result<(), CoreError> {
        if percentage > MAX_COMPLETION {
            return Err(CoreError::Validation(format!(
                "Completion percentage must be between 0 and {MAX_COMPLETION}, got {percentage}"
            )));
        }
        let milestone = self.milestone_mut(index)?;
        if percentage < milestone.completion_percentage {
            return Err(CoreError::Conflict(format!(
                "Milestone '{}' is already at {}%; progress cannot decrease without a reset",
                milestone.id, milestone.completion_percentage
            )));
        }

        milestone.completion_percentage = percentage;
        milestone.status = match percentage {
            MAX_COMPLETION => MilestoneStatus::Completed,
            0 => milestone.status,
            _ => MilestoneStatus::InProgress,
        };
        self.recompute_progress();
        Ok(())
    }

    /// Explicitly return a milestone to NotStarted with no progress.
    pub fn reset_milestone(&mut self, index: usize) -> Result<(), CoreError> {
        let milestone = self.milestone_mut(index)?;
        milestone.status = MilestoneStatus::NotStarted;
        milestone.completion_percentage = 0;
        self.recompute_progress();
        Ok(())
    }

    fn milestone_mut(&mut self, index: usize) -> Result<&mut Milestone, CoreError> {
        self.milestones
            .get_mut(index)
            .ok_or_else(|| CoreError::NotFound {
                entity: "milestone",
                key: index.to_string(),
            })
    }

    /// Merge a freshly generated roadmap into an existing one.
    ///
    /// Locked milestones (InProgress or Completed) stay at their positions
    /// with their content and progress untouched; only NotStarted slots take
    /// the fresh milestone. Target dates are then repaired so they stay
    /// strictly increasing: replaced milestones are re-dated from their
    /// predecessor, and a locked milestone's date only moves when it would
    /// otherwise not be after its predecessor.
    pub fn merge_regenerated(existing: &Roadmap, fresh: Roadmap, w: &RoadmapWeights) -> Roadmap {
        let mut merged = fresh;
        let fresh_len = merged.milestones.len();

        for (i, old) in existing.milestones.iter().enumerate() {
            if !old.is_locked() {
                continue;
            }
            if i < fresh_len {
                merged.milestones[i] = old.clone();
            } else {
                merged.milestones.push(old.clone());
            }
        }

        let mut previous = merged.generated_at;
        for m in &mut merged.milestones {
            if !m.is_locked() || m.target_date <= previous {
                m.target_date = previous + Duration::days(m.duration_days);
            }
            previous = m.target_date;
        }

        let phase_days = merged.milestones.iter().map(|m| m.duration_days).sum();
        merged.estimated_duration = EstimatedDuration::from_phase_days(phase_days, w);
        merged.recompute_progress();
        merged
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Builds clean roadmaps from analysis results.
#[derive(Debug, Clone)]
pub struct RoadmapGenerator<'a> {
    market: &'a MarketDataTable,
}

impl<'a> RoadmapGenerator<'a> {
    pub fn new(market: &'a MarketDataTable) -> Self {
        Self { market }
    }

    /// Generate a four-phase roadmap. `gaps` must already be ordered.
    pub fn generate(
        &self,
        user_id: DbId,
        role: &RankedRole,
        gaps: &[SkillGap],
        transfer: &TransferAnalysis,
        tier: ExperienceTier,
        now: Timestamp,
    ) -> Roadmap {
        let w = &self.market.roadmap;
        let capacity = LearningCapacity::assess(tier, transfer.skills.len(), w);
        let phases = assign_phases(gaps);

        let mut milestones = Vec::with_capacity(Phase::ALL.len());
        let mut cursor = now;
        for (index, (phase, skills)) in Phase::ALL.into_iter().zip(phases).enumerate() {
            let duration_days = phase_duration(phase, skills.len(), capacity, w);
            cursor += Duration::days(duration_days);
            milestones.push(build_milestone(index, phase, &role.role.title, skills, duration_days, cursor));
        }

        let phase_days = milestones.iter().map(|m| m.duration_days).sum();
        Roadmap {
            user_id,
            target_role: role.role.title.clone(),
            match_score: role.match_percent(),
            estimated_duration: EstimatedDuration::from_phase_days(phase_days, w),
            milestones,
            total_progress: 0,
            skill_gaps: gaps.to_vec(),
            generated_at: now,
            market_data_version: self.market.version.clone(),
        }
    }
}

/// Split ordered gaps into the four phase skill lists.
fn assign_phases(gaps: &[SkillGap]) -> [Vec<String>; 4] {
    let mut foundation = Vec::new();
    let mut specialization = Vec::new();
    let mut mastery = Vec::new();

    for gap in gaps {
        let skill = gap.required_skill.clone();
        if gap.priority == GapPriority::Critical || gap.transfer_difficulty == TransferDifficulty::Easy {
            foundation.push(skill);
        } else if gap.priority == GapPriority::High {
            specialization.push(skill);
        } else {
            mastery.push(skill);
        }
    }

    for soft in MASTERY_SOFT_SKILLS {
        let soft = soft.to_string();
        if !foundation.contains(&soft) && !specialization.contains(&soft) && !mastery.contains(&soft) {
            mastery.push(soft);
        }
    }

    let transition = TRANSITION_SKILLS.iter().map(|s| s.to_string()).collect();
    [foundation, specialization, mastery, transition]
}

fn phase_duration(phase: Phase, skill_count: usize, capacity: LearningCapacity, w: &RoadmapWeights) -> i64 {
    if phase == Phase::Transition {
        return w.transition_days;
    }
    (capacity.base_days(w) + w.days_per_skill * skill_count as i64).clamp(w.min_phase_days, w.max_phase_days)
}

fn build_milestone(
    index: usize,
    phase: Phase,
    role_title: &str,
    skills: Vec<String>,
    duration_days: i64,
    target_date: Timestamp,
) -> Milestone {
    let description = match phase {
        Phase::Foundation => format!("Build the core skills every {role_title} relies on"),
        Phase::Specialization => format!("Develop the specialised skills that set a {role_title} apart"),
        Phase::Mastery => format!("Deepen expertise and the professional skills of a {role_title}"),
        Phase::Transition => format!("Prepare your portfolio and job search for a {role_title} role"),
    };

    Milestone {
        id: format!("m{}-{}", index + 1, phase.slug()),
        phase,
        title: format!("{}: {}", phase.name(), role_title),
        description,
        projects: projects_for(phase, role_title, &skills),
        assessments: checks_for(phase, &skills),
        skills,
        duration_days,
        target_date,
        status: MilestoneStatus::NotStarted,
        completion_percentage: 0,
    }
}

fn projects_for(phase: Phase, role_title: &str, skills: &[String]) -> Vec<Project> {
    let hours = phase.project_hours();
    match phase {
        Phase::Transition => vec![Project {
            title: format!("{role_title} capstone portfolio"),
            description: "Package your strongest work into a public portfolio with write-ups".to_string(),
            skills: skills.to_vec(),
            estimated_hours: hours * 2,
        }],
        _ if skills.is_empty() => vec![Project {
            title: format!("{} review project", phase.name()),
            description: format!("Apply existing skills to a small {role_title} problem"),
            skills: Vec::new(),
            estimated_hours: hours,
        }],
        _ => skills
            .iter()
            .take(MAX_PROJECTS_PER_MILESTONE)
            .map(|skill| Project {
                title: match phase {
                    Phase::Foundation => format!("Guided {skill} exercise"),
                    Phase::Specialization => format!("Applied {skill} project"),
                    _ => format!("Advanced {skill} case study"),
                },
                description: format!("Hands-on {} work using {skill}", phase.slug()),
                skills: vec![skill.clone()],
                estimated_hours: hours,
            })
            .collect(),
    }
}

fn checks_for(phase: Phase, skills: &[String]) -> Vec<SkillCheck> {
    let kind = phase.check_kind();
    let passing_score = match phase {
        Phase::Foundation => 70,
        Phase::Specialization => 75,
        Phase::Mastery | Phase::Transition => 80,
    };
    if skills.is_empty() {
        return vec![SkillCheck {
            title: format!("{} self-assessment", phase.name()),
            kind,
            passing_score,
        }];
    }
    skills
        .iter()
        .map(|skill| SkillCheck {
            title: format!("{skill} checkpoint"),
            kind,
            passing_score,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
