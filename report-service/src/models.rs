use chrono::{DateTime, Utc};
use report_flow::{ReportSubmission, ReportType, SubmissionMode, UploadedFile, WorkflowState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /reports/analyze`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeReportRequest {
    pub report_name: String,
    pub report_type: ReportType,
    pub mode: SubmissionMode,
    #[serde(default)]
    pub manual_text: String,
    #[serde(default)]
    pub file: Option<UploadedFile>,
}

impl AnalyzeReportRequest {
    pub fn into_submission(self) -> ReportSubmission {
        ReportSubmission {
            mode: self.mode,
            report_name: self.report_name,
            report_type: self.report_type,
            manual_text: self.manual_text,
            file: self.file,
        }
    }
}

/// Body of `POST /api/bmi-analysis`. Branch selection follows field
/// presence: height+weight pick the BMI branch, messages pick the chat
/// passthrough, neither is a 400.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BmiAnalysisRequest {
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub messages: Option<Vec<Value>>,
}

/// Body of the auth routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Snapshot returned by `GET /reports/{session_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub status: String,
    pub report_name: String,
    pub created_at: DateTime<Utc>,
    pub state: WorkflowState,
    /// Convenience copy of the analysis text when the workflow completed.
    pub analysis: Option<String>,
}

impl SessionResponse {
    pub fn from_session(session: report_flow::Session) -> Self {
        let analysis = match &session.state {
            WorkflowState::Complete { analysis } => Some(analysis.text.clone()),
            _ => None,
        };
        Self {
            session_id: session.id,
            status: session.state.label().to_string(),
            report_name: session.report_name,
            created_at: session.created_at,
            state: session.state,
            analysis,
        }
    }
}
