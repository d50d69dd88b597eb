//! Header row extraction and schema validation.
//!
//! Checks a dataset's header row against the required field catalog.
//! Validation never fails: an empty or unreadable header simply reports
//! every catalog field as missing.

use crate::catalog;
use crate::constants::FIELD_DELIMITER;
use crate::models::ValidationReport;
use std::collections::HashSet;
use tracing::debug;

/// Validate a header row against the field catalog
///
/// Headers and catalog keys are compared trimmed and lowercased. Missing
/// keys are reported in catalog order.
pub fn validate_header<S: AsRef<str>>(headers: &[S]) -> ValidationReport {
    let normalized: HashSet<String> = headers
        .iter()
        .map(|header| normalize(header.as_ref()))
        .filter(|header| !header.is_empty())
        .collect();

    let mut missing_fields = Vec::new();
    let mut found_fields = 0;

    for key in catalog::required_keys() {
        if normalized.contains(&normalize(key)) {
            found_fields += 1;
        } else {
            missing_fields.push(key.to_string());
        }
    }

    debug!(
        "Header check: {}/{} required fields present",
        found_fields,
        catalog::len()
    );

    ValidationReport {
        is_valid: missing_fields.is_empty(),
        missing_fields,
        total_fields: catalog::len(),
        found_fields,
    }
}

/// Validate the header row of raw file text
pub fn validate_text(raw: &str) -> ValidationReport {
    let headers = header_row(raw).unwrap_or_default();
    validate_header(&headers)
}

/// First non-blank line of `raw`, split on the field delimiter and trimmed
pub fn header_row(raw: &str) -> Option<Vec<String>> {
    raw.lines()
        .find(|line| !line.trim().is_empty())
        .map(split_cells)
}

/// Split one line into trimmed cells; no quoting or escaping
pub(crate) fn split_cells(line: &str) -> Vec<String> {
    line.split(FIELD_DELIMITER)
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
