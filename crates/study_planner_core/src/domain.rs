//! crates/study_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

/// How hard an exam is expected to be.
///
/// Two representations coexist: the three-way level picked by the user in
/// the exam form, and a numeric 1-4 code produced by the subject-analysis
/// feature. Consumers must go through [`Difficulty::normalized`] before
/// comparing across representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    /// Numeric difficulty code on the analysis subsystem's 1-4 scale.
    Code(u8),
}

impl Difficulty {
    /// Maps both representations onto the numeric 1-4 scale.
    pub fn normalized(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Code(code) => code,
        }
    }

    /// The lowercase label used by the exam form and the plan-generation
    /// request (`"easy"`, `"medium"`, `"hard"`). Numeric codes render as
    /// their digit.
    pub fn as_label(self) -> String {
        match self {
            Difficulty::Easy => "easy".to_string(),
            Difficulty::Medium => "medium".to_string(),
            Difficulty::Hard => "hard".to_string(),
            Difficulty::Code(code) => code.to_string(),
        }
    }
}

/// Derived per-subject analysis attached to an exam. Produced by the
/// analysis feature, stored verbatim, never recomputed by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectAnalysis {
    pub predicted_difficulty: u8,
    pub personal_difficulty: u8,
    pub analysis: String,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Represents one upcoming assessment tracked by the student.
#[derive(Debug, Clone, PartialEq)]
pub struct Exam {
    /// Assigned by the store at creation, immutable thereafter.
    pub id: Uuid,
    /// Free-text label; subject-keyed lookups compare case-insensitively.
    pub subject: String,
    /// Calendar date the exam occurs, no time component.
    pub date: NaiveDate,
    pub difficulty: Difficulty,
    /// Ranking hint; the store enforces no ordering contract.
    pub priority: Option<u32>,
    /// Free-text hint, UI display only.
    pub preferred_study_time: Option<String>,
    pub analysis: Option<SubjectAnalysis>,
    /// Set by presentation layers to filter "already scheduled" exams;
    /// the store never touches it.
    pub is_added: Option<bool>,
}

/// An [`Exam`] without an id, as supplied to `add_exam`. The store is the
/// sole generator of exam ids.
#[derive(Debug, Clone)]
pub struct ExamDraft {
    pub subject: String,
    pub date: NaiveDate,
    pub difficulty: Difficulty,
    pub priority: Option<u32>,
    pub preferred_study_time: Option<String>,
    pub analysis: Option<SubjectAnalysis>,
    pub is_added: Option<bool>,
}

impl ExamDraft {
    pub(crate) fn into_exam(self, id: Uuid) -> Exam {
        Exam {
            id,
            subject: self.subject,
            date: self.date,
            difficulty: self.difficulty,
            priority: self.priority,
            preferred_study_time: self.preferred_study_time,
            analysis: self.analysis,
            is_added: self.is_added,
        }
    }
}

/// A partial update over an [`Exam`]: `Some` replaces the named field
/// wholesale, `None` leaves it untouched. Nested values (the analysis
/// record) are replaced as a unit, never deep-merged.
#[derive(Debug, Clone, Default)]
pub struct ExamUpdate {
    pub subject: Option<String>,
    pub date: Option<NaiveDate>,
    pub difficulty: Option<Difficulty>,
    pub priority: Option<u32>,
    pub preferred_study_time: Option<String>,
    pub analysis: Option<SubjectAnalysis>,
    pub is_added: Option<bool>,
}

impl ExamUpdate {
    pub(crate) fn apply_to(&self, exam: &mut Exam) {
        if let Some(subject) = &self.subject {
            exam.subject = subject.clone();
        }
        if let Some(date) = self.date {
            exam.date = date;
        }
        if let Some(difficulty) = self.difficulty {
            exam.difficulty = difficulty;
        }
        if let Some(priority) = self.priority {
            exam.priority = Some(priority);
        }
        if let Some(time) = &self.preferred_study_time {
            exam.preferred_study_time = Some(time.clone());
        }
        if let Some(analysis) = &self.analysis {
            exam.analysis = Some(analysis.clone());
        }
        if let Some(is_added) = self.is_added {
            exam.is_added = Some(is_added);
        }
    }
}

/// Represents one scheduled block of study time derived from an exam.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySession {
    /// Assigned at generation time.
    pub id: Uuid,
    /// The owning exam; never dangling while that exam exists.
    pub exam_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Informational; not re-derived from start/end.
    pub duration_hours: u32,
    pub completed: bool,
    /// Denormalized copy of the owning exam's subject at generation time.
    /// Deliberately not kept in sync with later exam edits.
    pub subject: String,
}

/// One entry of a generated study plan: a module name, the generated
/// explanation text, and a reference video link.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanModule {
    pub module: String,
    pub explanation: String,
    pub youtube: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_normalizes_both_representations() {
        assert_eq!(Difficulty::Easy.normalized(), 1);
        assert_eq!(Difficulty::Medium.normalized(), 2);
        assert_eq!(Difficulty::Hard.normalized(), 3);
        assert_eq!(Difficulty::Code(4).normalized(), 4);
    }

    #[test]
    fn difficulty_labels() {
        assert_eq!(Difficulty::Medium.as_label(), "medium");
        assert_eq!(Difficulty::Code(3).as_label(), "3");
    }

    #[test]
    fn exam_update_replaces_only_named_fields() {
        let mut exam = Exam {
            id: Uuid::new_v4(),
            subject: "DSAA".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
            difficulty: Difficulty::Medium,
            priority: Some(1),
            preferred_study_time: None,
            analysis: None,
            is_added: None,
        };

        let update = ExamUpdate {
            priority: Some(5),
            ..ExamUpdate::default()
        };
        update.apply_to(&mut exam);

        assert_eq!(exam.priority, Some(5));
        assert_eq!(exam.subject, "DSAA");
        assert_eq!(exam.difficulty, Difficulty::Medium);
    }
}
