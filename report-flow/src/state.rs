use serde::{Deserialize, Serialize};

/// The analysis text produced for a submission. Immutable once produced; a
/// new submission replaces it entirely, there is no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub text: String,
}

impl AnalysisReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Where a submission currently stands.
///
/// A single tagged state instead of the independent loading flags the
/// original UI juggled, so invalid flag combinations are unrepresentable.
/// Transitions only move forward or reset to Idle; a failure returns the
/// whole workflow to a pre-submission state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Uploading,
    Analyzing,
    Complete { analysis: AnalysisReport },
    Failed { reason: String },
}

impl WorkflowState {
    /// A submission is running and a concurrent submit must be rejected.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, WorkflowState::Uploading | WorkflowState::Analyzing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Complete { .. } | WorkflowState::Failed { .. }
        )
    }

    /// Short label used in session snapshots and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Uploading => "uploading",
            WorkflowState::Analyzing => "analyzing",
            WorkflowState::Complete { .. } => "complete",
            WorkflowState::Failed { .. } => "failed",
        }
    }
}

/// What kind of terminal event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ValidationError,
    UploadError,
    AnalysisError,
    Complete,
}

/// User-visible toast emitted exactly once per terminal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn validation_error(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::ValidationError,
            title: "Missing Information".to_string(),
            description: description.into(),
        }
    }

    pub fn upload_error() -> Self {
        Self {
            kind: NotificationKind::UploadError,
            title: "Upload Error".to_string(),
            description: "Failed to upload file. Please try again.".to_string(),
        }
    }

    pub fn analysis_error() -> Self {
        Self {
            kind: NotificationKind::AnalysisError,
            title: "Analysis Error".to_string(),
            description: "There was an error analyzing your report. Please try again.".to_string(),
        }
    }

    pub fn complete() -> Self {
        Self {
            kind: NotificationKind::Complete,
            title: "Analysis Complete".to_string(),
            description: "Your health report has been analyzed successfully.".to_string(),
        }
    }
}
