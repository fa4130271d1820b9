use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::{
    context::Context,
    error::{FlowError, Result},
    stage::Stage,
    state::{AnalysisReport, Notification, WorkflowState},
    submission::{ReportSubmission, SubmissionMode},
};

/// Context key the analyze stage writes its result under.
pub const ANALYSIS_KEY: &str = "analysis";
/// Context key the submission is stored under for stages to read.
pub const SUBMISSION_KEY: &str = "submission";

/// Drives one report submission through its two-stage pipeline.
///
/// The pipeline is strictly sequential: in Upload mode the upload stage must
/// resolve before the analyze stage starts; Manual mode skips upload
/// entirely. A stage failure is terminal, there is no partial retry and no
/// cancellation. Only one submission may be in flight at a time; a concurrent
/// `submit` is rejected rather than queued.
///
/// State is observed through [`SubmissionWorkflow::subscribe`]; terminal
/// notifications (validation failure, upload failure, analysis failure,
/// completion) arrive on the receiver returned by
/// [`SubmissionWorkflow::new`], exactly one per terminal transition.
pub struct SubmissionWorkflow {
    upload: Arc<dyn Stage>,
    analyze: Arc<dyn Stage>,
    state_tx: watch::Sender<WorkflowState>,
    notify_tx: mpsc::UnboundedSender<Notification>,
    in_flight: AtomicBool,
}

impl SubmissionWorkflow {
    pub fn new(
        upload: Arc<dyn Stage>,
        analyze: Arc<dyn Stage>,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let workflow = Self {
            upload,
            analyze,
            state_tx,
            notify_tx,
            in_flight: AtomicBool::new(false),
        };
        (workflow, notify_rx)
    }

    /// Observe every state transition of this workflow.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WorkflowState {
        self.state_tx.borrow().clone()
    }

    /// Run a submission to its terminal state.
    ///
    /// Validation runs first and short-circuits before any asynchronous
    /// stage starts: a rejected submission never incurs the upload delay and
    /// leaves the current state (including a previously completed analysis)
    /// untouched.
    pub async fn submit(&self, submission: ReportSubmission) -> Result<WorkflowState> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FlowError::SubmissionInFlight);
        }

        let result = self.run_submission(submission).await;
        self.in_flight.store(false, Ordering::Release);
        result
    }

    async fn run_submission(&self, submission: ReportSubmission) -> Result<WorkflowState> {
        if let Err(e) = submission.validate() {
            info!("Submission rejected: {}", e);
            if let FlowError::Validation(field) = &e {
                self.notify(Notification::validation_error(validation_description(field)));
            }
            return Err(e);
        }

        info!(
            "Starting submission workflow for report '{}'",
            submission.report_name
        );

        let context = Context::new();
        context.set(SUBMISSION_KEY, &submission).await;

        if submission.mode == SubmissionMode::Upload {
            self.set_state(WorkflowState::Uploading);
            if let Err(e) = self.upload.run(context.clone()).await {
                error!("Upload stage failed: {}", e);
                let state = WorkflowState::Failed {
                    reason: e.to_string(),
                };
                self.set_state(state);
                self.notify(Notification::upload_error());
                return Err(e);
            }
        }

        self.set_state(WorkflowState::Analyzing);
        if let Err(e) = self.analyze.run(context.clone()).await {
            error!("Analyze stage failed: {}", e);
            let state = WorkflowState::Failed {
                reason: e.to_string(),
            };
            self.set_state(state);
            self.notify(Notification::analysis_error());
            return Err(e);
        }

        let Some(analysis) = context.get::<AnalysisReport>(ANALYSIS_KEY).await else {
            error!("Analyze stage produced no result");
            self.set_state(WorkflowState::Failed {
                reason: "analysis produced no result".to_string(),
            });
            self.notify(Notification::analysis_error());
            return Err(FlowError::Context(
                "analysis result not found in context".to_string(),
            ));
        };

        let state = WorkflowState::Complete { analysis };
        self.set_state(state.clone());
        self.notify(Notification::complete());
        info!("Submission workflow completed");
        Ok(state)
    }

    fn set_state(&self, state: WorkflowState) {
        info!("Workflow state -> {}", state.label());
        // send only fails when every receiver is gone, which is fine: the
        // caller of submit() still sees the returned state.
        let _ = self.state_tx.send(state);
    }

    fn notify(&self, notification: Notification) {
        let _ = self.notify_tx.send(notification);
    }
}

/// Map a validation error field onto the toast wording shown to the user.
fn validation_description(field: &str) -> String {
    match field {
        "missing report name" => "Please provide a name for your report.".to_string(),
        "missing manual text" => "Please enter your report values.".to_string(),
        "missing file" => "Please upload a report file.".to_string(),
        other => format!("Missing required field: {}.", other),
    }
}
