//! usagescan-upload: upload request pipeline, reply envelopes and the
//! archive seam for persisting uploads.

pub mod archive;
pub mod clock;
pub mod form;
pub mod handler;
pub mod response;

pub use archive::{
    Archive, ArchiveError, ArchiveSettings, MemoryArchive, ObjectLocation, UploadRecord,
    object_key,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use form::{UploadForm, UploadRequest, UploadedFile};
pub use handler::{RuntimeEnvironment, UploadError, UploadHandler};
pub use response::{ErrorResponse, FileUploadData, UploadReply, UploadResponse};
