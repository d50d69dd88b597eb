//! Core data structures for the intake pipeline.
//!
//! Defines candidate and admitted files, the per-file lifecycle status,
//! validation reports, row records and the submission payload.

use crate::catalog;
use crate::constants::TRANSFER_COMPLETE;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// One parsed data line, keyed by header in header order
pub type RowRecord = IndexMap<String, Option<String>>;

/// Opaque identifier assigned when a file is admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(Uuid);

impl FileId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Result of checking a header row against the field catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
    pub total_fields: usize,
    pub found_fields: usize,
}

impl ValidationReport {
    /// Report used when the file content could not be read at all
    pub fn unreadable() -> Self {
        Self {
            is_valid: false,
            missing_fields: catalog::required_keys().map(str::to_string).collect(),
            total_fields: catalog::len(),
            found_fields: 0,
        }
    }

    /// Short status line, e.g. `9/9 fields OK` or `7/9 fields`
    pub fn summary(&self) -> String {
        if self.is_valid {
            format!("{}/{} fields OK", self.found_fields, self.total_fields)
        } else {
            format!("{}/{} fields", self.found_fields, self.total_fields)
        }
    }
}

/// Where the bytes of a candidate file come from
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A user-supplied file before type filtering
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub declared_type: Option<String>,
    pub byte_size: u64,
    pub source: FileSource,
}

impl CandidateFile {
    /// Describe a file on disk; size is taken from its metadata
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            declared_type: None,
            byte_size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Describe an in-memory upload
    pub fn in_memory(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            name: name.into(),
            declared_type: None,
            byte_size: bytes.len() as u64,
            source: FileSource::Memory(Arc::from(bytes)),
        }
    }

    /// Attach the content type the client declared for this file
    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }
}

/// Display-only transfer indicator of an accepted file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransferState {
    Transferring { progress: f64 },
    Complete,
}

impl TransferState {
    pub fn progress(&self) -> f64 {
        match self {
            TransferState::Transferring { progress } => *progress,
            TransferState::Complete => TRANSFER_COMPLETE,
        }
    }
}

/// Why a file was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    MissingFields,
    Unreadable { message: String },
}

/// Lifecycle status; replaced wholesale on every transition
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Validating,
    Rejected {
        report: ValidationReport,
        reason: RejectionReason,
    },
    Accepted {
        report: ValidationReport,
        rows: Arc<Vec<RowRecord>>,
        transfer: TransferState,
    },
}

impl FileStatus {
    /// `rejected` and `accepted(complete)` are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FileStatus::Rejected { .. }
                | FileStatus::Accepted {
                    transfer: TransferState::Complete,
                    ..
                }
        )
    }

    /// Whether the file's rows are eligible for submission
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            FileStatus::Accepted {
                transfer: TransferState::Complete,
                ..
            }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Validating => "validating",
            FileStatus::Rejected { .. } => "rejected",
            FileStatus::Accepted {
                transfer: TransferState::Transferring { .. },
                ..
            } => "transferring",
            FileStatus::Accepted {
                transfer: TransferState::Complete,
                ..
            } => "complete",
        }
    }
}

/// A file that passed the type filter and entered the lifecycle controller
#[derive(Debug, Clone, Serialize)]
pub struct AdmittedFile {
    pub id: FileId,
    /// Monotonic admission number; defines file admission order
    pub sequence: u64,
    pub name: String,
    pub byte_size: u64,
    pub type_hint: String,
    pub admitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl AdmittedFile {
    /// Copy of this file with a new status; identity is preserved
    pub(crate) fn with_status(&self, status: FileStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn validation_report(&self) -> Option<&ValidationReport> {
        match &self.status {
            FileStatus::Validating => None,
            FileStatus::Rejected { report, .. } | FileStatus::Accepted { report, .. } => {
                Some(report)
            }
        }
    }

    /// Present if and only if validation succeeded
    pub fn parsed_rows(&self) -> Option<&[RowRecord]> {
        match &self.status {
            FileStatus::Accepted { rows, .. } => Some(rows.as_slice()),
            _ => None,
        }
    }

    pub fn transfer_progress(&self) -> f64 {
        match &self.status {
            FileStatus::Accepted { transfer, .. } => transfer.progress(),
            _ => 0.0,
        }
    }
}

/// Aggregated rows of every completed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub category: String,
    pub data: Vec<RowRecord>,
}

/// Payload wrapped under its domain key, as sent to the storage backend
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionEnvelope {
    pub key: String,
    pub payload: SubmissionPayload,
}

impl Serialize for SubmissionEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.payload)?;
        map.end()
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub category: String,
    pub files_submitted: usize,
    pub rows_sent: usize,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ValidationReport {
        ValidationReport {
            is_valid: true,
            missing_fields: vec![],
            total_fields: 9,
            found_fields: 9,
        }
    }

    #[test]
    fn test_file_id_display_matches_json() {
        let id = FileId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json.as_str(), Some(id.to_string().as_str()));
    }

    fn admitted(status: FileStatus) -> AdmittedFile {
        AdmittedFile {
            id: FileId::new(),
            sequence: 0,
            name: "planets.csv".to_string(),
            byte_size: 10,
            type_hint: "csv".to_string(),
            admitted_at: Utc::now(),
            status,
        }
    }

    #[test]
    fn test_unreadable_report_lists_whole_catalog() {
        let report = ValidationReport::unreadable();
        assert!(!report.is_valid);
        assert_eq!(report.found_fields, 0);
        assert_eq!(report.missing_fields.len(), report.total_fields);
        assert_eq!(report.summary(), "0/9 fields");
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["foundFields"], 9);
        assert!(json["missingFields"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_status_accessors_are_consistent() {
        let validating = admitted(FileStatus::Validating);
        assert!(validating.validation_report().is_none());
        assert!(validating.parsed_rows().is_none());
        assert!(!validating.status.is_terminal());

        let rejected = admitted(FileStatus::Rejected {
            report: ValidationReport::unreadable(),
            reason: RejectionReason::MissingFields,
        });
        assert!(rejected.validation_report().is_some());
        assert!(rejected.parsed_rows().is_none());
        assert!(rejected.status.is_terminal());

        let transferring = admitted(FileStatus::Accepted {
            report: report(),
            rows: Arc::new(vec![RowRecord::new()]),
            transfer: TransferState::Transferring { progress: 42.0 },
        });
        assert_eq!(transferring.parsed_rows().map(<[_]>::len), Some(1));
        assert_eq!(transferring.transfer_progress(), 42.0);
        assert!(!transferring.status.is_terminal());
        assert_eq!(transferring.status.label(), "transferring");

        let complete = transferring.with_status(FileStatus::Accepted {
            report: report(),
            rows: Arc::new(vec![]),
            transfer: TransferState::Complete,
        });
        assert_eq!(complete.id, transferring.id);
        assert!(complete.status.is_complete());
        assert_eq!(complete.transfer_progress(), 100.0);
    }

    #[test]
    fn test_envelope_wraps_payload_under_key() {
        let mut row = RowRecord::new();
        row.insert("pl_rade".to_string(), Some("1.2".to_string()));
        row.insert("st_teff".to_string(), None);

        let envelope = SubmissionEnvelope {
            key: "planetas".to_string(),
            payload: SubmissionPayload {
                category: "research".to_string(),
                data: vec![row],
            },
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["planetas"]["category"], "research");
        assert_eq!(json["planetas"]["data"][0]["pl_rade"], "1.2");
        assert!(json["planetas"]["data"][0]["st_teff"].is_null());
    }

    #[test]
    fn test_in_memory_candidate_size() {
        let candidate = CandidateFile::in_memory("a.csv", "abc").with_declared_type("text/csv");
        assert_eq!(candidate.byte_size, 3);
        assert_eq!(candidate.declared_type.as_deref(), Some("text/csv"));
    }
}
