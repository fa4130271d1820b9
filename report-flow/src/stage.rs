use async_trait::async_trait;

use crate::{context::Context, error::Result};

/// One sequential phase of the submission pipeline.
///
/// The pipeline is strictly linear (upload, then analyze), so unlike a full
/// graph executor there is no routing decision in the return value: a stage
/// either succeeds, letting the workflow move forward, or fails, which is
/// terminal for the whole submission.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Identifier used in logs and session bookkeeping.
    fn id(&self) -> &str;

    /// Execute the stage against the shared context.
    async fn run(&self, context: Context) -> Result<()>;
}
