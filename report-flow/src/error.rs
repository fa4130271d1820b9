use thiserror::Error;

/// Errors raised by the submission workflow and its stages.
///
/// Every variant is terminal for the current operation: there is no retry
/// anywhere in this crate, the caller must resubmit from scratch.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A required field is missing. Recoverable by user correction.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The upload stage failed; the analyze stage never ran.
    #[error("upload failed: {0}")]
    Upload(String),

    /// The analyze stage failed after upload resolved.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// A submission is already running; only one may be in flight at a time.
    #[error("a submission is already in progress")]
    SubmissionInFlight,

    /// Session lookup failed.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A stage expected a value in the shared context that was not there.
    #[error("context error: {0}")]
    Context(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
