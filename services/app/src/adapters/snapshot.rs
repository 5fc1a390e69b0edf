//! services/app/src/adapters/snapshot.rs
//!
//! This module contains the snapshot adapter, which is the concrete implementation
//! of the `SnapshotStore` port from the `core` crate. It keeps the persisted
//! projection of store state in a single JSON file under a fixed slot name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use study_planner_core::domain::{Difficulty, Exam, PlanModule, SubjectAnalysis};
use study_planner_core::ports::{PortError, PortResult, SnapshotStore, StoreSnapshot};
use tracing::warn;
use uuid::Uuid;

/// Fixed name of the durable slot, carried over from the original storage key.
const STORAGE_NAME: &str = "study-plan-storage";

/// Schema version of the on-disk record. The original shape had no version
/// field at all; it parses as version 0 through `#[serde(default)]`.
const SNAPSHOT_VERSION: u32 = 0;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed snapshot adapter that implements the `SnapshotStore` port.
///
/// Writes are atomic: the record is written to a temp file in the same
/// directory and renamed over the slot.
#[derive(Debug, Clone)]
pub struct LocalSnapshotStore {
    path: PathBuf,
    temp_path: PathBuf,
}

impl LocalSnapshotStore {
    /// Creates a snapshot store rooted at `base_dir`, creating the
    /// directory if needed.
    pub fn new(base_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(format!("{STORAGE_NAME}.json")),
            temp_path: base_dir.join(format!(".{STORAGE_NAME}.json.tmp")),
        })
    }

    /// The file holding the durable slot.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

//=========================================================================================
// "Impure" Snapshot Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DifficultyRecord {
    Named(DifficultyLevel),
    Code(u8),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyRecord {
    fn from_domain(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => DifficultyRecord::Named(DifficultyLevel::Easy),
            Difficulty::Medium => DifficultyRecord::Named(DifficultyLevel::Medium),
            Difficulty::Hard => DifficultyRecord::Named(DifficultyLevel::Hard),
            Difficulty::Code(code) => DifficultyRecord::Code(code),
        }
    }

    fn to_domain(&self) -> Difficulty {
        match self {
            DifficultyRecord::Named(DifficultyLevel::Easy) => Difficulty::Easy,
            DifficultyRecord::Named(DifficultyLevel::Medium) => Difficulty::Medium,
            DifficultyRecord::Named(DifficultyLevel::Hard) => Difficulty::Hard,
            DifficultyRecord::Code(code) => Difficulty::Code(*code),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectAnalysisRecord {
    predicted_difficulty: u8,
    personal_difficulty: u8,
    analysis: String,
    recommendations: Vec<String>,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
}

impl SubjectAnalysisRecord {
    fn from_domain(analysis: &SubjectAnalysis) -> Self {
        Self {
            predicted_difficulty: analysis.predicted_difficulty,
            personal_difficulty: analysis.personal_difficulty,
            analysis: analysis.analysis.clone(),
            recommendations: analysis.recommendations.clone(),
            strengths: analysis.strengths.clone(),
            weaknesses: analysis.weaknesses.clone(),
        }
    }

    fn to_domain(self) -> SubjectAnalysis {
        SubjectAnalysis {
            predicted_difficulty: self.predicted_difficulty,
            personal_difficulty: self.personal_difficulty,
            analysis: self.analysis,
            recommendations: self.recommendations,
            strengths: self.strengths,
            weaknesses: self.weaknesses,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExamRecord {
    id: Uuid,
    subject: String,
    date: chrono::NaiveDate,
    difficulty: DifficultyRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preferred_study_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    analysis: Option<SubjectAnalysisRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_added: Option<bool>,
}

impl ExamRecord {
    fn from_domain(exam: &Exam) -> Self {
        Self {
            id: exam.id,
            subject: exam.subject.clone(),
            date: exam.date,
            difficulty: DifficultyRecord::from_domain(exam.difficulty),
            priority: exam.priority,
            preferred_study_time: exam.preferred_study_time.clone(),
            analysis: exam.analysis.as_ref().map(SubjectAnalysisRecord::from_domain),
            is_added: exam.is_added,
        }
    }

    fn to_domain(self) -> Exam {
        Exam {
            id: self.id,
            subject: self.subject,
            date: self.date,
            difficulty: self.difficulty.to_domain(),
            priority: self.priority,
            preferred_study_time: self.preferred_study_time,
            analysis: self.analysis.map(SubjectAnalysisRecord::to_domain),
            is_added: self.is_added,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PlanModuleRecord {
    module: String,
    explanation: String,
    youtube: String,
}

impl PlanModuleRecord {
    fn from_domain(module: &PlanModule) -> Self {
        Self {
            module: module.module.clone(),
            explanation: module.explanation.clone(),
            youtube: module.youtube.clone(),
        }
    }

    fn to_domain(self) -> PlanModule {
        PlanModule {
            module: self.module,
            explanation: self.explanation,
            youtube: self.youtube,
        }
    }
}

/// The full on-disk record: the `{exams, plan}` projection plus a schema
/// version. Version 0 is exactly the original two-field shape.
#[derive(Serialize, Deserialize)]
struct SnapshotRecord {
    #[serde(default)]
    version: u32,
    exams: Vec<ExamRecord>,
    plan: Vec<PlanModuleRecord>,
}

impl SnapshotRecord {
    fn from_domain(snapshot: &StoreSnapshot) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exams: snapshot.exams.iter().map(ExamRecord::from_domain).collect(),
            plan: snapshot.plan.iter().map(PlanModuleRecord::from_domain).collect(),
        }
    }

    fn to_domain(self) -> StoreSnapshot {
        StoreSnapshot {
            exams: self.exams.into_iter().map(ExamRecord::to_domain).collect(),
            plan: self.plan.into_iter().map(PlanModuleRecord::to_domain).collect(),
        }
    }
}

//=========================================================================================
// `SnapshotStore` Trait Implementation
//=========================================================================================

impl SnapshotStore for LocalSnapshotStore {
    fn write(&self, snapshot: &StoreSnapshot) -> PortResult<()> {
        let record = SnapshotRecord::from_domain(snapshot);
        let json = serde_json::to_vec(&record)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Temp file plus rename keeps a reader from ever seeing a torn slot.
        fs::write(&self.temp_path, &json)
            .and_then(|()| fs::rename(&self.temp_path, &self.path))
            .map_err(|e| PortError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }

    fn read(&self) -> PortResult<StoreSnapshot> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(StoreSnapshot::default());
            }
            Err(e) => return Err(PortError::StorageUnavailable(e.to_string())),
        };

        let record: SnapshotRecord = match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(),
                    "stored snapshot failed to parse, falling back to empty default");
                return Ok(StoreSnapshot::default());
            }
        };

        if record.version != SNAPSHOT_VERSION {
            warn!(
                version = record.version,
                "stored snapshot has an unknown schema version, falling back to empty default"
            );
            return Ok(StoreSnapshot::default());
        }

        Ok(record.to_domain())
    }
}
