//! crates/study_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like local storage or
//! the remote plan-generation API.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Difficulty, Exam, PlanModule};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., storage, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Durable storage is unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Syllabus is missing required modules: {0:?}")]
    ModuleMismatch(Vec<String>),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persisted Snapshot Projection
//=========================================================================================

/// The projection of store state that survives a process restart: exams and
/// the last generated plan. Study sessions are deliberately excluded and
/// always start empty after rehydration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub exams: Vec<Exam>,
    pub plan: Vec<PlanModule>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for the persisted projection of store state, kept under
/// one fixed, versionless slot.
///
/// The trait is synchronous: every store mutation runs to completion on the
/// caller's thread, and the snapshot write happens inline at the end of the
/// mutation. Durability is best-effort; a failed `write` never invalidates
/// the in-memory state of the running process.
pub trait SnapshotStore: Send + Sync {
    /// Overwrites the durable slot with the given projection.
    fn write(&self, snapshot: &StoreSnapshot) -> PortResult<()>;

    /// Returns the last written projection.
    ///
    /// Nothing-ever-written and an unparseable stored value both degrade to
    /// the empty default rather than an error; only an unavailable storage
    /// medium surfaces as `Err`.
    fn read(&self) -> PortResult<StoreSnapshot>;
}

/// A request to the remote plan-generation service.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub subject: String,
    pub exam_date: NaiveDate,
    pub difficulty: Difficulty,
    /// The uploaded syllabus document, if the user attached one.
    pub syllabus: Option<SyllabusUpload>,
}

/// An uploaded syllabus file carried opaquely to the remote service.
#[derive(Debug, Clone)]
pub struct SyllabusUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The remote service that turns a subject plus an uploaded syllabus into a
/// generated study plan. The core only consumes the resolved plan value; it
/// never performs the request itself.
#[async_trait]
pub trait PlanGenerationService: Send + Sync {
    /// Generates a study plan, or `PortError::ModuleMismatch` when the
    /// syllabus does not cover the subject's required modules.
    async fn generate_plan(&self, request: &PlanRequest) -> PortResult<Vec<PlanModule>>;
}
