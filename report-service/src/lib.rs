pub mod analysis;
pub mod auth;
pub mod bmi;
pub mod completion;
pub mod models;
pub mod service;
pub mod stages;
pub mod workflow;

pub use analysis::{AnalysisEngine, CannedAnalysis, select_analysis};
pub use service::{AppConfig, AppState, build_router, create_app};
pub use stages::StageTiming;
pub use workflow::{build_submission_workflow, create_report_session};
