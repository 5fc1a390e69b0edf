//! services/app/src/state.rs
//!
//! Defines the application's shared state and its composition root.

use std::sync::{Arc, Mutex};

use study_planner_core::ports::PlanGenerationService;
use study_planner_core::store::StudyPlanStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::adapters::{LocalSnapshotStore, PlanApiAdapter};
use crate::config::Config;
use crate::error::AppError;

//=========================================================================================
// AppState (Shared Across the UI Process)
//=========================================================================================

/// The shared application state, created once at startup and handed to the
/// UI layer. The store sits behind a `Mutex` because the UI is the single
/// writer; the lock only serializes access, it never sees contention from
/// concurrent mutators.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<Mutex<StudyPlanStore>>,
    pub plan_api: Arc<dyn PlanGenerationService>,
}

impl AppState {
    /// The composition root: loads configuration, constructs the adapters,
    /// and rehydrates the store from the durable snapshot slot.
    pub fn bootstrap() -> Result<Self, AppError> {
        let config = Arc::new(Config::from_env()?);

        let snapshots = Arc::new(LocalSnapshotStore::new(&config.storage_dir)?);
        info!(slot = %snapshots.path().display(), "snapshot slot ready");
        let store = StudyPlanStore::new(snapshots);

        let plan_api = Arc::new(PlanApiAdapter::new(
            reqwest::Client::new(),
            config.plan_api_url.clone(),
        ));

        Ok(Self {
            config,
            store: Arc::new(Mutex::new(store)),
            plan_api,
        })
    }
}

/// Sets up the global tracing subscriber. Called once by the enclosing
/// process before `AppState::bootstrap`.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
