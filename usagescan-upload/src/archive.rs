//! Persistence seam for the Lambda-style variant: the raw file goes to an
//! object store, a metadata record goes to a key-value table.
//!
//! Concrete cloud clients live outside this crate and implement [`Archive`].
//! [`MemoryArchive`] keeps everything in process for dry runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{error, info};
use usagescan_core::{ErrorCode, ProcessedData};
use uuid::Uuid;

use crate::clock::iso_timestamp;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Where uploads and records are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSettings {
    pub bucket: String,
    pub table: String,
    pub region: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            bucket: "csv-upload-bucket".to_string(),
            table: "csv-uploads".to_string(),
            region: "us-west-2".to_string(),
        }
    }
}

impl ArchiveSettings {
    /// Apply `S3_BUCKET_NAME`, `DYNAMODB_TABLE_NAME` and `AWS_REGION` on top
    /// of `self`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(bucket) = non_empty("S3_BUCKET_NAME") {
            self.bucket = bucket;
        }
        if let Some(table) = non_empty("DYNAMODB_TABLE_NAME") {
            self.table = table;
        }
        if let Some(region) = non_empty("AWS_REGION") {
            self.region = region;
        }
        self
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key)
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to upload file to object storage: {message}")]
    Upload { key: String, message: String },

    #[error("Failed to save upload record {id}: {message}")]
    Record { id: String, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl ArchiveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ArchiveError::Upload { .. } | ArchiveError::Record { .. } => ErrorCode::UploadError,
            ArchiveError::Network(_) => ErrorCode::NetworkError,
        }
    }
}

/// An object write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutObject<'a> {
    pub key: &'a str,
    pub body: &'a str,
    pub content_type: &'a str,
    pub uploaded_at: &'a str,
    pub original_file_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub key: String,
    pub bucket: String,
    pub location: String,
}

/// Metadata row stored for every archived upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: String,
    pub file_name: String,
    pub uploaded_at: String,
    pub threshold: f64,
    pub processed_data: ProcessedData,
    pub s3_key: String,
    /// Size in bytes
    pub file_size: u64,
}

#[async_trait]
pub trait Archive: Send + Sync {
    async fn put_object(&self, object: PutObject<'_>) -> Result<ObjectLocation, ArchiveError>;

    async fn put_record(&self, record: &UploadRecord) -> Result<(), ArchiveError>;
}

/// `uploads/{epoch-millis}-{file name}`
pub fn object_key(file_name: &str, at: DateTime<Utc>) -> String {
    format!("uploads/{}-{}", at.timestamp_millis(), file_name)
}

/// What the archive step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedUpload {
    pub key: String,
    pub record_id: String,
    pub location: String,
}

/// Everything the archive step needs to know about one processed upload.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveInput<'a> {
    pub file_name: &'a str,
    pub content: &'a str,
    pub file_size: u64,
    pub threshold: f64,
    pub processed: &'a ProcessedData,
    pub uploaded_at: DateTime<Utc>,
}

/// Store the object, then the record. The two writes are sequential; the
/// first failure is returned as-is and nothing already written is undone.
pub async fn archive_upload(
    archive: &dyn Archive,
    input: ArchiveInput<'_>,
) -> Result<ArchivedUpload, ArchiveError> {
    let key = object_key(input.file_name, input.uploaded_at);
    let uploaded_at = iso_timestamp(input.uploaded_at);

    let stored = archive
        .put_object(PutObject {
            key: &key,
            body: input.content,
            content_type: CSV_CONTENT_TYPE,
            uploaded_at: &uploaded_at,
            original_file_name: input.file_name,
        })
        .await
        .inspect_err(|err| error!(%err, key = %key, "object upload failed"))?;

    let record = UploadRecord {
        id: Uuid::new_v4().to_string(),
        file_name: input.file_name.to_string(),
        uploaded_at,
        threshold: input.threshold,
        processed_data: input.processed.clone(),
        s3_key: stored.key.clone(),
        file_size: input.file_size,
    };
    archive
        .put_record(&record)
        .await
        .inspect_err(|err| error!(%err, id = %record.id, "record write failed"))?;

    info!(key = %stored.key, id = %record.id, "upload archived");

    Ok(ArchivedUpload {
        key: stored.key,
        record_id: record.id,
        location: stored.location,
    })
}

/// A stored object as kept by [`MemoryArchive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub body: String,
    pub content_type: String,
    pub uploaded_at: String,
    pub original_file_name: String,
}

/// In-process archive; nothing leaves memory.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    settings: ArchiveSettings,
    objects: Mutex<Vec<StoredObject>>,
    records: Mutex<Vec<UploadRecord>>,
}

impl MemoryArchive {
    pub fn new(settings: ArchiveSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ArchiveSettings {
        &self.settings
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn records(&self) -> Vec<UploadRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Archive for MemoryArchive {
    async fn put_object(&self, object: PutObject<'_>) -> Result<ObjectLocation, ArchiveError> {
        let mut objects = self.objects.lock().map_err(|_| ArchiveError::Upload {
            key: object.key.to_string(),
            message: "object store lock poisoned".to_string(),
        })?;
        objects.push(StoredObject {
            key: object.key.to_string(),
            body: object.body.to_string(),
            content_type: object.content_type.to_string(),
            uploaded_at: object.uploaded_at.to_string(),
            original_file_name: object.original_file_name.to_string(),
        });

        Ok(ObjectLocation {
            key: object.key.to_string(),
            bucket: self.settings.bucket.clone(),
            location: self.settings.object_url(object.key),
        })
    }

    async fn put_record(&self, record: &UploadRecord) -> Result<(), ArchiveError> {
        let mut records = self.records.lock().map_err(|_| ArchiveError::Record {
            id: record.id.clone(),
            message: "record table lock poisoned".to_string(),
        })?;
        records.push(record.clone());
        Ok(())
    }
}
