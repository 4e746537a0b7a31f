//! Header-name heuristics that decide which columns carry usage, dates and
//! customer identity.

use regex::Regex;
use std::sync::LazyLock;

static USAGE_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)usage|consumption|amount|quantity|value|kwh|units|energy").unwrap()
});
static DATE_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)date|day|month|time|period|billing|timestamp").unwrap()
});
static CUSTOMER_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)name").unwrap());
static CUSTOMER_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)id").unwrap());

/// Roles detected on a header row. Match order always follows header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub usage_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub usage_index: Option<usize>,
    pub date_index: Option<usize>,
    pub customer_name_index: Option<usize>,
    pub customer_id_index: Option<usize>,
}

impl ColumnRoles {
    pub fn detect(headers: &[String]) -> Self {
        Self {
            usage_columns: all_matches(headers, &USAGE_COLUMN),
            date_columns: all_matches(headers, &DATE_COLUMN),
            usage_index: first_match(headers, &USAGE_COLUMN),
            date_index: first_match(headers, &DATE_COLUMN),
            customer_name_index: first_match(headers, &CUSTOMER_NAME),
            customer_id_index: first_match(headers, &CUSTOMER_ID),
        }
    }

    /// The usage column that drives the statistics, if any.
    pub fn primary_usage_column(&self) -> Option<&str> {
        self.usage_columns.first().map(String::as_str)
    }
}

fn all_matches(headers: &[String], re: &Regex) -> Vec<String> {
    headers.iter().filter(|h| re.is_match(h)).cloned().collect()
}

fn first_match(headers: &[String], re: &Regex) -> Option<usize> {
    headers.iter().position(|h| re.is_match(h))
}
