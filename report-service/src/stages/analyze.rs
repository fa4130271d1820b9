use async_trait::async_trait;
use report_flow::{ANALYSIS_KEY, Context, FlowError, ReportSubmission, Result, SUBMISSION_KEY, Stage};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::analysis::AnalysisEngine;

/// Simulated analysis. Waits for the configured delay, then asks the engine
/// for a result and stores it in the context for the workflow to pick up.
pub struct AnalyzeStage {
    engine: Arc<dyn AnalysisEngine>,
    delay: Duration,
}

impl AnalyzeStage {
    pub fn new(engine: Arc<dyn AnalysisEngine>, delay: Duration) -> Self {
        Self { engine, delay }
    }
}

#[async_trait]
impl Stage for AnalyzeStage {
    fn id(&self) -> &str {
        "analyze"
    }

    async fn run(&self, context: Context) -> Result<()> {
        let submission: ReportSubmission = context
            .get(SUBMISSION_KEY)
            .await
            .ok_or_else(|| FlowError::Context("submission not found in context".to_string()))?;

        info!(
            "Analyzing report '{}' ({:?})",
            submission.report_name, submission.report_type
        );

        tokio::time::sleep(self.delay).await;

        let report = self
            .engine
            .analyze(&submission)
            .await
            .map_err(|e| FlowError::Analysis(e.to_string()))?;

        context.set(ANALYSIS_KEY, report).await;
        info!("Analysis of '{}' finished", submission.report_name);
        Ok(())
    }
}
