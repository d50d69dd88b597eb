//! Batch aggregation of accepted rows into one submission payload

use crate::error::{IntakeError, Result};
use crate::models::{AdmittedFile, SubmissionPayload};
use tracing::debug;

/// Concatenate the rows of every completed file, in admission order
///
/// Rows are neither deduplicated nor reordered within a file. Fails with
/// [`IntakeError::NothingToSubmit`] when no file has completed.
pub fn build_payload(files: &[AdmittedFile], category: &str) -> Result<SubmissionPayload> {
    let mut eligible: Vec<&AdmittedFile> = files
        .iter()
        .filter(|file| file.status.is_complete())
        .collect();

    if eligible.is_empty() {
        return Err(IntakeError::NothingToSubmit);
    }
    eligible.sort_by_key(|file| file.sequence);

    let data: Vec<_> = eligible
        .iter()
        .copied()
        .flat_map(|file| file.parsed_rows().unwrap_or_default().iter().cloned())
        .collect();

    debug!(
        "Aggregated {} rows from {} files under category '{}'",
        data.len(),
        eligible.len(),
        category
    );

    Ok(SubmissionPayload {
        category: category.to_string(),
        data,
    })
}
