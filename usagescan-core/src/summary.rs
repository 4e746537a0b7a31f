//! Usage statistics over the valid rows of a table.
//!
//! The scan is a single fold: every row produces a [`UsageRecord`], and the
//! accumulator keeps only the running counts, the running total and the
//! first record that reached the maximum.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::ColumnRoles;
use crate::numeric::{parse_leading_float, round2, to_fixed};
use crate::table::split_cells;

/// One row's usage reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Date cell, or `Row {n}` when the row has none
    pub date: String,
    pub usage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub total_days_processed: usize,
    pub days_exceeding_threshold: usize,
    pub highest_usage_day: Option<UsageRecord>,
    pub total_usage: f64,
    pub average_usage: f64,
}

impl SummaryData {
    /// Summary for a table without any usage column.
    pub fn without_usage(row_count: usize) -> Self {
        Self {
            total_days_processed: row_count,
            days_exceeding_threshold: 0,
            highest_usage_day: None,
            total_usage: 0.0,
            average_usage: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdAnalysis {
    pub usage_column: String,
    pub rows_above_threshold: usize,
    /// Percentage of valid rows above the threshold, one decimal place
    pub percentage_above_threshold: String,
}

#[derive(Debug, Default)]
struct Tally {
    processed: usize,
    exceeding: usize,
    total: f64,
    highest: Option<UsageRecord>,
}

impl Tally {
    /// Fold one row in. Unparseable readings still count as processed but
    /// stay out of the total, the exceedance count and the maximum.
    fn push(mut self, record: UsageRecord, parsed: bool, threshold: f64) -> Self {
        self.processed += 1;
        if !parsed {
            return self;
        }

        self.total += record.usage;
        if record.usage > threshold {
            self.exceeding += 1;
        }
        let is_new_max = self
            .highest
            .as_ref()
            .is_none_or(|best| record.usage > best.usage);
        if is_new_max {
            self.highest = Some(record);
        }
        self
    }

    fn finish(self) -> SummaryData {
        let average = if self.processed > 0 {
            self.total / self.processed as f64
        } else {
            0.0
        };

        SummaryData {
            total_days_processed: self.processed,
            days_exceeding_threshold: self.exceeding,
            highest_usage_day: self.highest,
            total_usage: round2(self.total),
            average_usage: round2(average),
        }
    }
}

fn cell_at(cells: &[&str], index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| cells.get(i))
        .map(|c| c.trim().to_string())
}

/// Usage reading of a cell; blank or missing cells read as "0".
fn read_usage(cells: &[&str], index: usize) -> Option<f64> {
    let raw = cells.get(index).map(|c| c.trim()).unwrap_or("");
    parse_leading_float(if raw.is_empty() { "0" } else { raw })
}

/// Build the summary for `rows`, which must already be the valid rows.
pub fn summarize(rows: &[&str], roles: &ColumnRoles, threshold: f64) -> SummaryData {
    let Some(usage_index) = roles.usage_index else {
        return SummaryData::without_usage(rows.len());
    };

    let summary = rows
        .iter()
        .enumerate()
        .fold(Tally::default(), |tally, (i, row)| {
            let cells: Vec<&str> = split_cells(row).collect();
            let parsed = read_usage(&cells, usage_index);

            let date = cell_at(&cells, roles.date_index)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("Row {}", i + 1));

            let record = UsageRecord {
                date,
                usage: parsed.unwrap_or(0.0),
                customer_name: cell_at(&cells, roles.customer_name_index),
                customer_id: cell_at(&cells, roles.customer_id_index),
            };
            tally.push(record, parsed.is_some(), threshold)
        })
        .finish();

    debug!(
        rows = summary.total_days_processed,
        exceeding = summary.days_exceeding_threshold,
        total = summary.total_usage,
        "usage summary computed"
    );
    summary
}

/// Count valid rows strictly above `threshold` in the primary usage column.
/// Returns `None` when the table has no usage column.
pub fn analyze_threshold(
    rows: &[&str],
    roles: &ColumnRoles,
    threshold: f64,
) -> Option<ThresholdAnalysis> {
    let usage_column = roles.primary_usage_column()?;
    let usage_index = roles.usage_index?;

    let above = rows
        .iter()
        .filter(|row| {
            let cells: Vec<&str> = split_cells(row).collect();
            read_usage(&cells, usage_index).unwrap_or(0.0) > threshold
        })
        .count();

    let percentage = if rows.is_empty() {
        "0.0".to_string()
    } else {
        to_fixed(above as f64 / rows.len() as f64 * 100.0, 1)
    };

    Some(ThresholdAnalysis {
        usage_column: usage_column.to_string(),
        rows_above_threshold: above,
        percentage_above_threshold: percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(headers: &[&str]) -> ColumnRoles {
        let h: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        ColumnRoles::detect(&h)
    }

    #[test]
    fn test_first_maximum_wins() {
        let r = roles(&["Day", "Usage"]);
        let rows = ["mon,50", "tue,80", "wed,80", "thu,10"];
        let summary = summarize(&rows, &r, 60.0);
        let best = summary.highest_usage_day.unwrap();
        assert_eq!(best.date, "tue");
        assert_eq!(best.usage, 80.0);
        assert_eq!(summary.days_exceeding_threshold, 2);
    }

    #[test]
    fn test_row_labels_when_date_blank() {
        let r = roles(&["Date", "Usage"]);
        let rows = ["2024-01-01,5", " ,9"];
        let summary = summarize(&rows, &r, 100.0);
        assert_eq!(summary.highest_usage_day.unwrap().date, "Row 2");
    }

    #[test]
    fn test_row_labels_without_date_column() {
        let r = roles(&["Usage"]);
        let summary = summarize(&["3", "7", "4"], &r, 0.0);
        assert_eq!(summary.highest_usage_day.unwrap().date, "Row 2");
    }

    #[test]
    fn test_unparseable_counted_but_not_summed() {
        let r = roles(&["Usage"]);
        let summary = summarize(&["abc", "10"], &r, 5.0);
        assert_eq!(summary.total_days_processed, 2);
        assert_eq!(summary.total_usage, 10.0);
        assert_eq!(summary.average_usage, 5.0);
        assert_eq!(summary.days_exceeding_threshold, 1);
    }

    #[test]
    fn test_all_unparseable_has_no_highest() {
        let r = roles(&["Usage", "Note"]);
        let summary = summarize(&["n/a,x", "n/a,y"], &r, 0.0);
        assert_eq!(summary.total_days_processed, 2);
        assert!(summary.highest_usage_day.is_none());
        assert_eq!(summary.total_usage, 0.0);
    }

    #[test]
    fn test_customer_cells_are_trimmed() {
        let r = roles(&["Customer ID", "Name", "Usage"]);
        let summary = summarize(&[" 007 , Bond ,12"], &r, 0.0);
        let best = summary.highest_usage_day.unwrap();
        assert_eq!(best.customer_id.as_deref(), Some("007"));
        assert_eq!(best.customer_name.as_deref(), Some("Bond"));
    }

    #[test]
    fn test_threshold_analysis_counts_strictly_above() {
        let r = roles(&["Usage"]);
        let analysis = analyze_threshold(&["100", "100.01", "bad", "", "3"], &r, 100.0).unwrap();
        assert_eq!(analysis.usage_column, "Usage");
        assert_eq!(analysis.rows_above_threshold, 1);
        assert_eq!(analysis.percentage_above_threshold, "20.0");
    }

    #[test]
    fn test_threshold_analysis_empty_rows() {
        let r = roles(&["Usage"]);
        let analysis = analyze_threshold(&[], &r, 1.0).unwrap();
        assert_eq!(analysis.rows_above_threshold, 0);
        assert_eq!(analysis.percentage_above_threshold, "0.0");
        assert!(analyze_threshold(&[], &roles(&["Name"]), 1.0).is_none());
    }

    #[test]
    fn test_record_json_omits_missing_customer() {
        let record = UsageRecord {
            date: "Row 1".to_string(),
            usage: 1.5,
            customer_name: None,
            customer_id: Some("9".to_string()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"date": "Row 1", "usage": 1.5, "customerId": "9"}));
    }
}
