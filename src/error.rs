//! Error handling for the resume analyzer

use crate::input::file_detector::DocumentFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeAnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported document type '{mime_type}': expected PDF, Word (.doc) or Word (.docx)")]
    UnsupportedFormat { mime_type: String },

    #[error("Could not parse document as {format}: {reason}")]
    CorruptDocument {
        format: DocumentFormat,
        reason: String,
    },

    #[error(
        "Document contains only {extracted_chars} characters of text (minimum {minimum}); \
         scanned images without a text layer cannot be analyzed"
    )]
    EmptyContent { extracted_chars: usize, minimum: usize },

    #[error("File is {size} bytes, which exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Analysis did not finish within {limit_ms}ms")]
    Timeout { limit_ms: u64 },

    #[error("All {capacity} extraction workers are busy; retry shortly")]
    Busy { capacity: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

impl ResumeAnalyzerError {
    /// True when the request itself was at fault (bad, empty or oversized document).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. }
                | Self::CorruptDocument { .. }
                | Self::EmptyContent { .. }
                | Self::FileTooLarge { .. }
                | Self::InvalidInput(_)
        )
    }

    /// True when the engine was saturated or slow; the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy { .. } | Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ResumeAnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_in_messages() {
        let err = ResumeAnalyzerError::FileTooLarge {
            size: 12 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        let message = err.to_string();
        assert!(message.contains("12582912"));
        assert!(message.contains("10485760"));

        let err = ResumeAnalyzerError::EmptyContent {
            extracted_chars: 3,
            minimum: 50,
        };
        assert!(err.to_string().contains("only 3 characters"));
    }

    #[test]
    fn test_error_classification() {
        assert!(ResumeAnalyzerError::UnsupportedFormat {
            mime_type: "image/png".to_string()
        }
        .is_client_error());
        assert!(ResumeAnalyzerError::Busy { capacity: 4 }.is_retryable());
        assert!(!ResumeAnalyzerError::Timeout { limit_ms: 10 }.is_client_error());
    }
}
