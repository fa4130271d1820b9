pub mod analyze;
pub mod upload;

pub use analyze::AnalyzeStage;
pub use upload::UploadStage;

use std::time::Duration;

/// Fixed artificial delays standing in for real stage work. Injected so the
/// test suite runs without wall-clock waits.
#[derive(Debug, Clone, Copy)]
pub struct StageTiming {
    pub upload: Duration,
    pub analysis: Duration,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self {
            upload: Duration::from_millis(1500),
            analysis: Duration::from_millis(2000),
        }
    }
}

impl StageTiming {
    /// Zero delays, for tests.
    pub fn instant() -> Self {
        Self {
            upload: Duration::ZERO,
            analysis: Duration::ZERO,
        }
    }
}
