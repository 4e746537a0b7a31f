//! Upload validators: file name, file size, threshold.

use crate::error::{ThresholdProblem, ValidationError};
use crate::numeric::parse_leading_float;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_EXTENSION: &str = ".csv";

/// Limits applied to an uploaded file before it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLimits {
    pub max_size_bytes: u64,
}

impl Default for FileLimits {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl FileLimits {
    /// Human-readable limit, e.g. "10MB".
    pub fn max_size_display(&self) -> String {
        const MIB: u64 = 1024 * 1024;
        if self.max_size_bytes % MIB == 0 {
            format!("{}MB", self.max_size_bytes / MIB)
        } else {
            format!("{:.1}KB", self.max_size_bytes as f64 / 1024.0)
        }
    }

    pub fn validate_file(&self, file_name: &str, size: u64) -> Result<(), ValidationError> {
        validate_file_type(file_name)?;
        self.validate_file_size(size)
    }

    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                limit_display: self.max_size_display(),
            });
        }
        Ok(())
    }
}

pub fn validate_file_type(file_name: &str) -> Result<(), ValidationError> {
    if !file_name.to_lowercase().ends_with(ALLOWED_EXTENSION) {
        return Err(ValidationError::InvalidFileType {
            file_name: file_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_threshold(threshold: f64) -> Result<(), ValidationError> {
    if threshold.is_nan() {
        return Err(ValidationError::InvalidThreshold(ThresholdProblem::NotANumber));
    }
    if threshold < 0.0 {
        return Err(ValidationError::InvalidThreshold(ThresholdProblem::Negative));
    }
    Ok(())
}

/// Parse and validate the threshold form field. Trailing text after the
/// number is ignored ("100kWh" reads as 100).
pub fn parse_threshold(raw: &str) -> Result<f64, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::InvalidThreshold(ThresholdProblem::Missing));
    }
    let threshold = parse_leading_float(raw).unwrap_or(f64::NAN);
    validate_threshold(threshold)?;
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type() {
        assert!(validate_file_type("usage.csv").is_ok());
        assert!(validate_file_type("USAGE.CSV").is_ok());
        assert!(validate_file_type("archive.csv.txt").is_err());
        assert!(validate_file_type("csv").is_err());
        assert_eq!(
            validate_file_type("test.txt").unwrap_err().to_string(),
            "Invalid file type. Please upload a CSV file."
        );
    }

    #[test]
    fn test_file_size_boundary() {
        let limits = FileLimits::default();
        assert!(limits.validate_file_size(10 * 1024 * 1024).is_ok());
        let err = limits.validate_file_size(10 * 1024 * 1024 + 1).unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 10MB limit.");
    }

    #[test]
    fn test_threshold_values() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(100.0).is_ok());
        assert_eq!(
            validate_threshold(-10.0),
            Err(ValidationError::InvalidThreshold(ThresholdProblem::Negative))
        );
        assert_eq!(
            validate_threshold(f64::NAN),
            Err(ValidationError::InvalidThreshold(ThresholdProblem::NotANumber))
        );
    }

    #[test]
    fn test_parse_threshold_strings() {
        assert_eq!(parse_threshold("1000"), Ok(1000.0));
        assert_eq!(parse_threshold(" 0 "), Ok(0.0));
        assert_eq!(parse_threshold("250.5kWh"), Ok(250.5));
        assert_eq!(
            parse_threshold("  "),
            Err(ValidationError::InvalidThreshold(ThresholdProblem::Missing))
        );
        assert_eq!(
            parse_threshold("lots"),
            Err(ValidationError::InvalidThreshold(ThresholdProblem::NotANumber))
        );
        assert_eq!(
            parse_threshold("-1"),
            Err(ValidationError::InvalidThreshold(ThresholdProblem::Negative))
        );
    }
}
