use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// How the user provided their report data. The two modes are mutually
/// exclusive: `Manual` reads `manual_text`, `Upload` reads `file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
    Manual,
    Upload,
}

/// Report category selected by the user. Drives which canned analysis
/// template is returned; the submitted content itself is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    BloodTest,
    Cholesterol,
    Glucose,
    General,
    Other,
}

/// Metadata of a file picked for upload. The bytes themselves never reach
/// this crate: the upload stage is simulated, no parsing happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
}

/// A single user submission of a health report for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub mode: SubmissionMode,
    pub report_name: String,
    pub report_type: ReportType,
    #[serde(default)]
    pub manual_text: String,
    #[serde(default)]
    pub file: Option<UploadedFile>,
}

impl ReportSubmission {
    /// Check the submission is ready to run, short-circuiting on the first
    /// missing field. Runs before any asynchronous stage starts, so a
    /// rejected submission never incurs the upload delay.
    pub fn validate(&self) -> Result<()> {
        if self.report_name.trim().is_empty() {
            return Err(FlowError::Validation("missing report name".to_string()));
        }
        match self.mode {
            SubmissionMode::Manual => {
                if self.manual_text.trim().is_empty() {
                    return Err(FlowError::Validation("missing manual text".to_string()));
                }
            }
            SubmissionMode::Upload => {
                if self.file.is_none() {
                    return Err(FlowError::Validation("missing file".to_string()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_submission() -> ReportSubmission {
        ReportSubmission {
            mode: SubmissionMode::Manual,
            report_name: "Annual blood work".to_string(),
            report_type: ReportType::BloodTest,
            manual_text: "LDL Cholesterol: 110 mg/dL".to_string(),
            file: None,
        }
    }

    #[test]
    fn valid_manual_submission_passes() {
        assert!(manual_submission().validate().is_ok());
    }

    #[test]
    fn missing_report_name_rejected_first() {
        // Name is checked before mode-specific fields, even when those are
        // also missing.
        let submission = ReportSubmission {
            report_name: "  ".to_string(),
            manual_text: String::new(),
            ..manual_submission()
        };
        match submission.validate() {
            Err(FlowError::Validation(message)) => assert_eq!(message, "missing report name"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn manual_mode_requires_text() {
        let submission = ReportSubmission {
            manual_text: String::new(),
            ..manual_submission()
        };
        match submission.validate() {
            Err(FlowError::Validation(message)) => assert_eq!(message, "missing manual text"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn upload_mode_requires_file() {
        let submission = ReportSubmission {
            mode: SubmissionMode::Upload,
            file: None,
            ..manual_submission()
        };
        match submission.validate() {
            Err(FlowError::Validation(message)) => assert_eq!(message, "missing file"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn upload_mode_ignores_manual_text() {
        let submission = ReportSubmission {
            mode: SubmissionMode::Upload,
            manual_text: String::new(),
            file: Some(UploadedFile {
                name: "results.pdf".to_string(),
                size_bytes: 48_213,
            }),
            ..manual_submission()
        };
        assert!(submission.validate().is_ok());
    }
}
