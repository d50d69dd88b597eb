//! File admission filter and input discovery
//!
//! Only tabular text files are admitted: either the declared content type
//! is `text/csv` or the name ends in `.csv` (any case). Directories given
//! on the command line are walked for such files.

use crate::constants::{CSV_EXTENSION, CSV_MIME_TYPE};
use crate::models::CandidateFile;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Candidates split by the type filter
#[derive(Debug, Default)]
pub struct Admission {
    pub accepted: Vec<CandidateFile>,
    pub rejected_for_type: usize,
}

/// Split candidates into admissible files and a count of wrong-type files
pub fn filter_candidates(candidates: impl IntoIterator<Item = CandidateFile>) -> Admission {
    let mut admission = Admission::default();

    for candidate in candidates {
        if is_accepted_type(&candidate.name, candidate.declared_type.as_deref()) {
            admission.accepted.push(candidate);
        } else {
            debug!("Ignoring non-CSV file: {}", candidate.name);
            admission.rejected_for_type += 1;
        }
    }

    admission
}

/// Whether a file's name or declared type marks it as CSV
pub fn is_accepted_type(name: &str, declared_type: Option<&str>) -> bool {
    let declared_csv = declared_type
        .map(|mime| mime.trim().eq_ignore_ascii_case(CSV_MIME_TYPE))
        .unwrap_or(false);

    declared_csv || has_csv_extension(Path::new(name))
}

/// Short type label recorded on an admitted file
pub fn type_hint(candidate: &CandidateFile) -> String {
    candidate
        .declared_type
        .clone()
        .unwrap_or_else(|| CSV_EXTENSION.to_string())
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}

/// Expand input paths: files are kept as given, directories are walked
/// for CSV files in sorted order
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && has_csv_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            debug!("Found {} CSV files under {}", found.len(), input.display());
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}
