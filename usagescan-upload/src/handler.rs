//! The upload pipeline: method check, validation, summarization, optional
//! archiving, and mapping of every outcome to a JSON reply.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use usagescan_core::{
    ErrorCode, FileLimits, ValidationError, parse_threshold, process_csv_content,
};

use crate::archive::{Archive, ArchiveError, ArchiveInput, archive_upload};
use crate::clock::{Clock, SystemClock};
use crate::form::{UploadForm, UploadRequest};
use crate::response::{
    ErrorResponse, FileUploadData, GENERIC_FAILURE, METHOD_NOT_ALLOWED, UploadReply,
    UploadResponse,
};

/// Deployment environment; decides whether server errors carry details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl RuntimeEnvironment {
    pub fn exposes_error_details(&self) -> bool {
        !matches!(self, RuntimeEnvironment::Production)
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("failed to encode response: {0}")]
    Processing(#[from] serde_json::Error),
}

impl UploadError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UploadError::Validation(err) => err.code(),
            UploadError::Archive(err) => err.code(),
            UploadError::Processing(_) => ErrorCode::ProcessingError,
        }
    }

    pub fn status(&self) -> u16 {
        if self.code().is_client_error() { 400 } else { 500 }
    }
}

/// Handles upload requests. Without an archive it behaves like the web
/// form endpoint; with one it also stores the file and a record.
pub struct UploadHandler {
    limits: FileLimits,
    environment: RuntimeEnvironment,
    clock: Arc<dyn Clock>,
    archive: Option<Arc<dyn Archive>>,
}

impl UploadHandler {
    pub fn new(limits: FileLimits, environment: RuntimeEnvironment) -> Self {
        Self {
            limits,
            environment,
            clock: Arc::new(SystemClock),
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: Arc<dyn Archive>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn handle(&self, request: UploadRequest) -> UploadReply {
        match request.method.to_ascii_uppercase().as_str() {
            "OPTIONS" => return UploadReply::preflight(),
            "POST" => {}
            other => {
                warn!(method = other, "method not allowed");
                return UploadReply::error(405, &ErrorResponse::new(METHOD_NOT_ALLOWED));
            }
        }

        match self.respond(request.form).await {
            Ok(body) => UploadReply::new(200, body),
            Err(err) => self.error_reply(&err),
        }
    }

    async fn respond(&self, form: UploadForm) -> Result<String, UploadError> {
        let response = self.process(form).await?;
        Ok(serde_json::to_string(&response)?)
    }

    /// Run the pipeline and return the success envelope.
    pub async fn process(&self, form: UploadForm) -> Result<UploadResponse, UploadError> {
        let file = form.file.ok_or(ValidationError::MissingFile)?;
        let size = file.size();
        self.limits.validate_file(&file.name, size)?;

        let threshold = parse_threshold(form.threshold.as_deref().unwrap_or(""))?;
        let content = file.text();
        let processed = process_csv_content(&content, threshold)?;

        let uploaded_at = self.clock.now();
        let mut data = FileUploadData::new(&file.name, size, uploaded_at);

        if let Some(archive) = &self.archive {
            let archived = archive_upload(
                archive.as_ref(),
                ArchiveInput {
                    file_name: &file.name,
                    content: &content,
                    file_size: size,
                    threshold,
                    processed: &processed,
                    uploaded_at,
                },
            )
            .await?;
            debug!(location = %archived.location, "archived object location");
            data.s3_key = Some(archived.key);
            data.dynamo_db_id = Some(archived.record_id);
        }

        info!(
            file = %file.name,
            size,
            threshold,
            rows = processed.total_rows,
            invalid = processed.invalid_rows,
            "csv upload processed"
        );

        Ok(UploadResponse::success(data, processed))
    }

    fn error_reply(&self, err: &UploadError) -> UploadReply {
        let code = err.code();
        let status = err.status();

        let body = if code.is_client_error() {
            warn!(%code, %err, "upload rejected");
            ErrorResponse::new(err.to_string()).with_code(code)
        } else {
            error!(%code, %err, "upload failed");
            let details = self
                .environment
                .exposes_error_details()
                .then(|| err.to_string());
            ErrorResponse::new(GENERIC_FAILURE)
                .with_code(code)
                .with_details(details)
        };

        UploadReply::error(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = UploadError::from(ValidationError::EmptyFile);
        assert_eq!(err.status(), 400);
        assert_eq!(err.code(), ErrorCode::EmptyFile);

        let err = UploadError::from(ArchiveError::Network("reset".into()));
        assert_eq!(err.status(), 500);
        assert_eq!(err.code(), ErrorCode::NetworkError);
    }

    #[test]
    fn test_environment_details() {
        assert!(RuntimeEnvironment::Development.exposes_error_details());
        assert!(RuntimeEnvironment::Test.exposes_error_details());
        assert!(!RuntimeEnvironment::Production.exposes_error_details());
    }
}
