pub mod domain;
pub mod ports;
pub mod store;

pub use domain::{Difficulty, Exam, ExamDraft, ExamUpdate, PlanModule, StudySession, SubjectAnalysis};
pub use ports::{
    PlanGenerationService, PlanRequest, PortError, PortResult, SnapshotStore, StoreSnapshot,
    SyllabusUpload,
};
pub use store::{StoreState, StudyPlanStore, SubscriptionId};
