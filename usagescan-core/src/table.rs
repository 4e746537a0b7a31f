//! Line-level CSV splitting: header line, candidate rows, row validity.
//!
//! Fields are split on bare commas. Quoted fields are not recognised, so a
//! comma inside a value shifts every following column.

use crate::error::ValidationError;

/// Header names plus the raw, unparsed data lines that follow them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable<'a> {
    pub headers: Vec<String>,
    pub rows: Vec<&'a str>,
}

impl<'a> ParsedTable<'a> {
    /// Split `content` into headers and candidate rows.
    ///
    /// Blank lines are dropped everywhere; the first remaining line is the
    /// header line.
    pub fn parse(content: &'a str) -> Result<Self, ValidationError> {
        let mut lines = content.split('\n').filter(|line| !line.trim().is_empty());

        let header_line = lines.next().ok_or(ValidationError::EmptyFile)?;
        let headers = split_cells(header_line)
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            headers,
            rows: lines.collect(),
        })
    }

    /// Rows that have one cell per header and at least one non-blank cell.
    pub fn valid_rows(&self) -> Vec<&'a str> {
        let expected = self.headers.len();
        self.rows
            .iter()
            .copied()
            .filter(|row| is_valid_row(row, expected))
            .collect()
    }
}

pub fn split_cells(line: &str) -> std::str::Split<'_, char> {
    line.split(',')
}

/// A row is valid when its cell count matches the header count and it is
/// not entirely blank.
pub fn is_valid_row(row: &str, expected_columns: usize) -> bool {
    let cells: Vec<&str> = split_cells(row).collect();
    cells.len() == expected_columns && cells.iter().any(|c| !c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let text = "\n  \nCustomer ID , Name,Usage (kWh)\n\n001,John,12\n   \n002,Sarah,13\n";
        let table = ParsedTable::parse(text).unwrap();
        assert_eq!(table.headers, vec!["Customer ID", "Name", "Usage (kWh)"]);
        assert_eq!(table.rows, vec!["001,John,12", "002,Sarah,13"]);
    }

    #[test]
    fn test_parse_empty_content() {
        assert_eq!(ParsedTable::parse(""), Err(ValidationError::EmptyFile));
        assert_eq!(ParsedTable::parse(" \n\t\n"), Err(ValidationError::EmptyFile));
    }

    #[test]
    fn test_row_validity() {
        assert!(is_valid_row("1,2,3", 3));
        assert!(is_valid_row("1,,", 3));
        assert!(!is_valid_row("1,2", 3));
        assert!(!is_valid_row("1,2,3,4", 3));
        assert!(!is_valid_row(" , ,\t", 3));
    }

    #[test]
    fn test_crlf_lines_keep_cell_count() {
        let table = ParsedTable::parse("ID,Usage\r\n1,5\r\n2,6\r\n").unwrap();
        assert_eq!(table.headers, vec!["ID", "Usage"]);
        assert_eq!(table.valid_rows().len(), 2);
    }

    #[test]
    fn test_quoted_commas_are_not_special() {
        let table = ParsedTable::parse("Name,Usage\n\"Smith, John\",12\n").unwrap();
        assert!(table.valid_rows().is_empty());
    }
}
