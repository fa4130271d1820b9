use async_trait::async_trait;
use report_flow::{Context, FlowError, ReportSubmission, Result, SUBMISSION_KEY, Stage};
use std::time::Duration;
use tracing::info;

/// Simulated file upload. No bytes move anywhere: the stage waits for the
/// configured delay and resolves, modeling a transfer to remote storage.
pub struct UploadStage {
    delay: Duration,
    force_failure: bool,
}

impl UploadStage {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            force_failure: false,
        }
    }

    /// Variant whose upload always fails, for exercising the failure path.
    pub fn failing(delay: Duration) -> Self {
        Self {
            delay,
            force_failure: true,
        }
    }
}

#[async_trait]
impl Stage for UploadStage {
    fn id(&self) -> &str {
        "upload"
    }

    async fn run(&self, context: Context) -> Result<()> {
        let submission: ReportSubmission = context
            .get(SUBMISSION_KEY)
            .await
            .ok_or_else(|| FlowError::Context("submission not found in context".to_string()))?;

        let file = submission
            .file
            .as_ref()
            .ok_or_else(|| FlowError::Upload("no file attached to submission".to_string()))?;

        info!(
            "Uploading {} ({:.1} KB)",
            file.name,
            file.size_bytes as f64 / 1024.0
        );

        tokio::time::sleep(self.delay).await;

        if self.force_failure {
            return Err(FlowError::Upload("simulated upload failure".to_string()));
        }

        info!("Upload of {} finished", file.name);
        Ok(())
    }
}
