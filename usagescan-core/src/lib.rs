//! usagescan-core: CSV usage summarizer, column heuristics and validators

pub mod columns;
pub mod error;
pub mod numeric;
pub mod processor;
pub mod summary;
pub mod table;
pub mod validation;

pub use columns::ColumnRoles;
pub use error::{ErrorCode, ThresholdProblem, ValidationError};
pub use processor::{ProcessedData, process_csv_content};
pub use summary::{SummaryData, ThresholdAnalysis, UsageRecord};
pub use table::ParsedTable;
pub use validation::{FileLimits, parse_threshold, validate_file_type, validate_threshold};
