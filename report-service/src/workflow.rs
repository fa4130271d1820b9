use std::sync::Arc;

use report_flow::{Notification, ReportSubmission, Session, SubmissionWorkflow};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::analysis::AnalysisEngine;
use crate::stages::{AnalyzeStage, StageTiming, UploadStage};

/// Wire the two stages into a fresh workflow. Each submission gets its own
/// workflow instance; the stages are stateless.
pub fn build_submission_workflow(
    engine: Arc<dyn AnalysisEngine>,
    timing: StageTiming,
) -> (SubmissionWorkflow, UnboundedReceiver<Notification>) {
    let upload = Arc::new(UploadStage::new(timing.upload));
    let analyze = Arc::new(AnalyzeStage::new(engine, timing.analysis));
    SubmissionWorkflow::new(upload, analyze)
}

/// Create the session record tracking a submission.
pub fn create_report_session(submission: &ReportSubmission) -> Session {
    Session::new(
        Uuid::new_v4().to_string(),
        submission.report_name.clone(),
        submission.report_type,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CannedAnalysis;
    use report_flow::{
        FlowError, NotificationKind, ReportType, SubmissionMode, SubmissionWorkflow, UploadedFile,
        WorkflowState,
    };

    #[tokio::test]
    async fn wired_workflow_completes_a_manual_submission() {
        let (workflow, _notifications) =
            build_submission_workflow(Arc::new(CannedAnalysis), StageTiming::instant());

        let submission = ReportSubmission {
            mode: SubmissionMode::Manual,
            report_name: "Lipids".to_string(),
            report_type: ReportType::Cholesterol,
            manual_text: "Total Cholesterol: 230 mg/dL".to_string(),
            file: None,
        };

        let state = workflow.submit(submission).await.unwrap();
        match state {
            WorkflowState::Complete { analysis } => {
                assert!(analysis.text.starts_with("Cholesterol Panel Analysis Results"));
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn forced_upload_failure_ends_in_failed_state() {
        let timing = StageTiming::instant();
        let upload = Arc::new(UploadStage::failing(timing.upload));
        let analyze = Arc::new(AnalyzeStage::new(Arc::new(CannedAnalysis), timing.analysis));
        let (workflow, mut notifications) = SubmissionWorkflow::new(upload, analyze);

        let submission = ReportSubmission {
            mode: SubmissionMode::Upload,
            report_name: "Blood Test Results".to_string(),
            report_type: ReportType::BloodTest,
            manual_text: String::new(),
            file: Some(UploadedFile {
                name: "results.pdf".to_string(),
                size_bytes: 48_213,
            }),
        };

        let err = workflow.submit(submission).await.unwrap_err();
        assert!(matches!(err, FlowError::Upload(_)));
        assert!(matches!(workflow.state(), WorkflowState::Failed { .. }));
        assert_eq!(
            notifications.recv().await.unwrap().kind,
            NotificationKind::UploadError
        );
    }
}
