//! services/app/src/adapters/plan_api.rs
//!
//! This module contains the adapter for the remote plan-generation service.
//! It implements the `PlanGenerationService` port from the `core` crate by
//! posting the subject details and the uploaded syllabus as a multipart form.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use study_planner_core::domain::PlanModule;
use study_planner_core::ports::{PlanGenerationService, PlanRequest, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter that implements the `PlanGenerationService` port.
#[derive(Clone)]
pub struct PlanApiAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl PlanApiAdapter {
    /// Creates a new `PlanApiAdapter` against the given service base URL.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

//=========================================================================================
// Wire Payloads
//=========================================================================================

#[derive(Deserialize)]
struct PlanPayload {
    plan: Vec<PlanModulePayload>,
}

#[derive(Deserialize)]
struct PlanModulePayload {
    module: String,
    explanation: String,
    youtube: String,
}

impl PlanModulePayload {
    fn to_domain(self) -> PlanModule {
        PlanModule {
            module: self.module,
            explanation: self.explanation,
            youtube: self.youtube,
        }
    }
}

/// The error body the service returns on a non-success status, identifying
/// syllabus modules it could not match.
#[derive(Deserialize, Default)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    missing_modules: Option<Vec<String>>,
}

//=========================================================================================
// `PlanGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlanGenerationService for PlanApiAdapter {
    async fn generate_plan(&self, request: &PlanRequest) -> PortResult<Vec<PlanModule>> {
        let mut form = Form::new()
            .text("subject", request.subject.clone())
            .text("date", request.exam_date.to_string())
            .text("difficulty", request.difficulty.as_label());
        if let Some(syllabus) = &request.syllabus {
            form = form.part(
                "syllabus",
                Part::bytes(syllabus.bytes.clone()).file_name(syllabus.file_name.clone()),
            );
        }

        let response = self
            .http
            .post(format!("{}/generate-plan", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let payload: ErrorPayload = response.json().await.unwrap_or_default();
            if let Some(missing) = payload.missing_modules {
                return Err(PortError::ModuleMismatch(missing));
            }
            return Err(PortError::Unexpected(
                payload
                    .error
                    .unwrap_or_else(|| format!("plan service returned status {status}")),
            ));
        }

        let payload: PlanPayload = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(payload
            .plan
            .into_iter()
            .map(PlanModulePayload::to_domain)
            .collect())
    }
}
