//! CLI command implementations.

mod config;
mod doctor;
mod run;
mod serve;
mod tools;

pub use config::run_config;
pub use doctor::run_doctor;
pub use run::run_run;
pub use serve::{router, run_serve, ApiError, AppState};
pub use tools::{run_tool, run_tools};
