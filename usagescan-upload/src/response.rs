//! JSON reply envelopes and the transport-neutral reply type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use usagescan_core::numeric::to_fixed;
use usagescan_core::{ErrorCode, ProcessedData};

use crate::clock::iso_timestamp;

pub const SUCCESS_MESSAGE: &str = "CSV file processed successfully!";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed. Use POST to upload files.";
pub const GENERIC_FAILURE: &str =
    "An unexpected error occurred while processing your file. Please try again.";

/// Headers attached to every reply.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

/// File metadata echoed back next to the processing results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadData {
    pub file_name: String,
    /// Display size, e.g. "1.5 KB"
    pub file_size: String,
    pub uploaded_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamo_db_id: Option<String>,
}

impl FileUploadData {
    pub fn new(file_name: impl Into<String>, size_bytes: u64, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            file_name: file_name.into(),
            file_size: format_file_size(size_bytes),
            uploaded_at: iso_timestamp(uploaded_at),
            s3_key: None,
            dynamo_db_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadData {
    #[serde(flatten)]
    pub file: FileUploadData,
    #[serde(flatten)]
    pub processed: ProcessedData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub data: UploadData,
}

impl UploadResponse {
    pub fn success(file: FileUploadData, processed: ProcessedData) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            data: UploadData { file, processed },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            details: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

/// Status, headers and body, ready for whatever transport carries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

impl UploadReply {
    pub fn new(status: u16, body: String) -> Self {
        Self {
            status,
            headers: CORS_HEADERS.to_vec(),
            body,
        }
    }

    /// CORS preflight answer.
    pub fn preflight() -> Self {
        Self::new(200, String::new())
    }

    pub fn error(status: u16, body: &ErrorResponse) -> Self {
        match serde_json::to_string(body) {
            Ok(json) => Self::new(status, json),
            Err(err) => {
                error!(%err, "failed to serialize error reply");
                Self::new(500, format!(r#"{{"error":"{GENERIC_FAILURE}"}}"#))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }
}

/// Display size in KiB with one decimal, e.g. 1536 bytes -> "1.5 KB".
pub fn format_file_size(size_bytes: u64) -> String {
    format!("{} KB", to_fixed(size_bytes as f64 / 1024.0, 1))
}
