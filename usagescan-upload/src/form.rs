//! Decoded upload request. Multipart parsing happens in the HTTP binding;
//! this crate only sees the resulting fields.

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Size in bytes, as checked against the upload limit.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Content as UTF-8. Invalid sequences become U+FFFD rather than failing
    /// the upload, so Latin-1 exports still summarize.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// The `file` and `threshold` form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub threshold: Option<String>,
}

impl UploadForm {
    pub fn new(file: UploadedFile, threshold: impl Into<String>) -> Self {
        Self {
            file: Some(file),
            threshold: Some(threshold.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub method: String,
    pub form: UploadForm,
}

impl UploadRequest {
    pub fn post(form: UploadForm) -> Self {
        Self {
            method: "POST".to_string(),
            form,
        }
    }

    pub fn with_method(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            form: UploadForm::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_and_text() {
        let file = UploadedFile::new("usage.csv", "ID,Usage\n1,2\n");
        assert_eq!(file.size(), 13);
        assert!(matches!(file.text(), Cow::Borrowed("ID,Usage\n1,2\n")));
    }

    #[test]
    fn test_non_utf8_is_replaced() {
        let file = UploadedFile::new("usage.csv", b"Name,Usage\nJos\xe9,1500\n".to_vec());
        assert_eq!(file.text(), "Name,Usage\nJos\u{fffd},1500\n");
    }
}
