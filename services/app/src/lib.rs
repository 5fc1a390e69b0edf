pub mod adapters;
pub mod config;
pub mod error;
pub mod state;
pub mod workflows;

pub use config::Config;
pub use error::AppError;
pub use state::{init_tracing, AppState};
