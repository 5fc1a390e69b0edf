//! services/app/src/workflows.rs
//!
//! Orchestrates the exam-form submission flow over the core ports: ask the
//! remote service for a plan, then record the exam and the generated plan
//! in the store.

use study_planner_core::domain::{ExamDraft, PlanModule};
use study_planner_core::ports::{PlanRequest, SyllabusUpload};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

/// Generates a study plan for the drafted exam and, on success, adds the
/// exam and stores the plan in one go.
///
/// A `PortError::ModuleMismatch` from the service propagates to the caller
/// so the UI can list the unmatched syllabus modules; in that case the
/// store is left untouched.
pub async fn generate_and_store_plan(
    state: &AppState,
    draft: ExamDraft,
    syllabus: Option<SyllabusUpload>,
) -> Result<Vec<PlanModule>, AppError> {
    let request = PlanRequest {
        subject: draft.subject.clone(),
        exam_date: draft.date,
        difficulty: draft.difficulty,
        syllabus,
    };
    let plan = state.plan_api.generate_plan(&request).await?;
    info!(subject = %request.subject, modules = plan.len(), "plan generated");

    let mut store = state
        .store
        .lock()
        .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
    store.add_exam(draft);
    store.set_study_plan(plan.clone());

    Ok(plan)
}
