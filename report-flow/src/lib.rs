//! State machine for the health report submission workflow.
//!
//! A submission moves through a strictly sequential two-stage pipeline
//! (simulated upload, then analysis) and lands in exactly one of the
//! terminal states. The crate owns the state model, the validation rules,
//! the stage seam, and an in-memory session store; the stages themselves are
//! supplied by the service crate.

pub mod context;
pub mod error;
pub mod stage;
pub mod state;
pub mod storage;
pub mod submission;
pub mod workflow;

pub use context::Context;
pub use error::{FlowError, Result};
pub use stage::Stage;
pub use state::{AnalysisReport, Notification, NotificationKind, WorkflowState};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use submission::{ReportSubmission, ReportType, SubmissionMode, UploadedFile};
pub use workflow::{ANALYSIS_KEY, SUBMISSION_KEY, SubmissionWorkflow};
