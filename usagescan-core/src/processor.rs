//! End-to-end CSV summarization: parse, classify columns, summarize.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::ColumnRoles;
use crate::error::ValidationError;
use crate::summary::{SummaryData, ThresholdAnalysis, analyze_threshold, summarize};
use crate::table::ParsedTable;

/// Result of summarizing one uploaded CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub total_rows: usize,
    pub invalid_rows: usize,
    pub headers: Vec<String>,
    pub usage_columns: Vec<String>,
    pub threshold: f64,
    pub threshold_analysis: Option<ThresholdAnalysis>,
    pub summary: SummaryData,
}

/// Summarize `content` against `threshold`.
///
/// The threshold is expected to be validated already. Fails only when the
/// content has no non-blank line; a header-only file yields an empty
/// summary.
pub fn process_csv_content(content: &str, threshold: f64) -> Result<ProcessedData, ValidationError> {
    let table = ParsedTable::parse(content)?;
    let valid_rows = table.valid_rows();
    let roles = ColumnRoles::detect(&table.headers);

    let summary = summarize(&valid_rows, &roles, threshold);
    let threshold_analysis = analyze_threshold(&valid_rows, &roles, threshold);

    debug!(
        headers = table.headers.len(),
        valid = valid_rows.len(),
        invalid = table.rows.len() - valid_rows.len(),
        usage_column = roles.primary_usage_column().unwrap_or("-"),
        "parsed csv"
    );

    Ok(ProcessedData {
        total_rows: valid_rows.len(),
        invalid_rows: table.rows.len() - valid_rows.len(),
        usage_columns: roles.usage_columns,
        headers: table.headers,
        threshold,
        threshold_analysis,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_accounting_invariant() {
        let text = "ID,Usage\n1,5\n\n2\n3,4,5\n , \n4,8\n";
        let data = process_csv_content(text, 1.0).unwrap();
        assert_eq!(data.total_rows, 2);
        assert_eq!(data.invalid_rows, 3);
        assert_eq!(data.total_rows + data.invalid_rows, 5);
    }

    #[test]
    fn test_null_fields_serialize_as_null() {
        let data = process_csv_content("Name,Location\nA,B\n", 10.0).unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert!(json["thresholdAnalysis"].is_null());
        assert!(json["summary"]["highestUsageDay"].is_null());
        assert_eq!(json["totalRows"], 1);
        assert_eq!(json["usageColumns"], serde_json::json!([]));
    }
}
