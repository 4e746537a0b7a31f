//! Error taxonomy shared by the summarizer, the validators and the upload
//! pipeline. Every variant maps to a stable machine-readable code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error codes returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidFileType,
    FileTooLarge,
    InvalidThreshold,
    EmptyFile,
    InvalidCsvFormat,
    ProcessingError,
    UploadError,
    NetworkError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFileType => "INVALID_FILE_TYPE",
            ErrorCode::FileTooLarge => "FILE_TOO_LARGE",
            ErrorCode::InvalidThreshold => "INVALID_THRESHOLD",
            ErrorCode::EmptyFile => "EMPTY_FILE",
            ErrorCode::InvalidCsvFormat => "INVALID_CSV_FORMAT",
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
            ErrorCode::UploadError => "UPLOAD_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
        }
    }

    /// Client-side (400) codes; everything else is a server error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidFileType
                | ErrorCode::FileTooLarge
                | ErrorCode::InvalidThreshold
                | ErrorCode::EmptyFile
                | ErrorCode::InvalidCsvFormat
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a threshold value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdProblem {
    Missing,
    NotANumber,
    Negative,
}

impl ThresholdProblem {
    fn message(&self) -> &'static str {
        match self {
            ThresholdProblem::Missing => "Usage threshold is required",
            ThresholdProblem::NotANumber => "Threshold must be a valid number",
            ThresholdProblem::Negative => "Threshold must be a positive number",
        }
    }
}

/// Input rejected before or during CSV processing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("CSV file appears to be empty")]
    EmptyFile,

    #[error("No file provided")]
    MissingFile,

    #[error("Invalid file type. Please upload a CSV file.")]
    InvalidFileType { file_name: String },

    #[error("File size exceeds {limit_display} limit.")]
    FileTooLarge { size: u64, limit_display: String },

    #[error("{}", .0.message())]
    InvalidThreshold(ThresholdProblem),

    #[error("Invalid CSV format: {reason}")]
    InvalidCsvFormat { reason: String },
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyFile | ValidationError::MissingFile => ErrorCode::EmptyFile,
            ValidationError::InvalidFileType { .. } => ErrorCode::InvalidFileType,
            ValidationError::FileTooLarge { .. } => ErrorCode::FileTooLarge,
            ValidationError::InvalidThreshold(_) => ErrorCode::InvalidThreshold,
            ValidationError::InvalidCsvFormat { .. } => ErrorCode::InvalidCsvFormat,
        }
    }
}
