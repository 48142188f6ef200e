//! Turns the sampling command's tabular text into records.
//!
//! Lines 0 and 1 are banner lines and always skipped. Every following
//! non-empty line must carry the nine columns in [`Field`] order.

use crate::record::{Field, ProcessRecord};
use crate::utils::errors::MonitoringError;

/// Number of leading banner lines.
pub const HEADER_LINES: usize = 2;

/// Trim surrounding whitespace and blank lines off raw command output.
pub fn normalize(raw: &str) -> &str {
    raw.trim()
}

/// Parse tabular text into records, preserving input order.
///
/// A data line with fewer than nine columns is a [`MonitoringError::FormatViolation`];
/// the whole parse fails rather than guessing at the missing fields.
pub fn parse(text: &str) -> Result<Vec<ProcessRecord>, MonitoringError> {
    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate().skip(HEADER_LINES) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        let record = ProcessRecord::from_columns(&columns).ok_or(
            MonitoringError::FormatViolation {
                line: line_no,
                expected: Field::COUNT,
                found: columns.len(),
            },
        )?;
        records.push(record);
    }
    Ok(records)
}
