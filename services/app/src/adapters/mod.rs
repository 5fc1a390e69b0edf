pub mod plan_api;
pub mod snapshot;

pub use plan_api::PlanApiAdapter;
pub use snapshot::LocalSnapshotStore;
