//! User-facing notifications emitted by an intake session.

use crate::catalog;
use crate::models::FileId;
use serde::Serialize;
use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Error,
    Success,
    Warning,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Error => "error",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Info => "info",
        };
        f.write_str(label)
    }
}

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Files dropped by the type filter in one admission call
    WrongFileType { count: usize },
    FileAccepted {
        id: FileId,
        name: String,
        rows: usize,
    },
    ValidationFailed {
        id: FileId,
        name: String,
        missing_fields: Vec<String>,
    },
    FileUnreadable {
        id: FileId,
        name: String,
        reason: String,
    },
    FileRemoved { id: FileId, name: String },
    NothingToSubmit,
    Submitted { category: String, rows: usize },
    SubmissionFailed { message: String },
}

impl Notification {
    pub fn level(&self) -> Level {
        match self {
            Notification::WrongFileType { .. }
            | Notification::ValidationFailed { .. }
            | Notification::FileUnreadable { .. }
            | Notification::SubmissionFailed { .. } => Level::Error,
            Notification::FileAccepted { .. } | Notification::Submitted { .. } => Level::Success,
            Notification::NothingToSubmit => Level::Warning,
            Notification::FileRemoved { .. } => Level::Info,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Notification::WrongFileType { .. } => "Wrong file type",
            Notification::FileAccepted { .. } => "File validated and parsed",
            Notification::ValidationFailed { .. } => "Validation error",
            Notification::FileUnreadable { .. } => "Could not process file",
            Notification::FileRemoved { .. } => "File removed",
            Notification::NothingToSubmit => "No valid files",
            Notification::Submitted { .. } => "Data submitted",
            Notification::SubmissionFailed { .. } => "Submission error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notification::WrongFileType { count } => format!(
                "{} file(s) ignored. Please select only CSV files.",
                count
            ),
            Notification::FileAccepted { name, .. } => format!(
                "File \"{}\" contains every required field and its data has been read.",
                name
            ),
            Notification::ValidationFailed { name, .. } => {
                format!("File \"{}\" does not contain the required fields.", name)
            }
            Notification::FileUnreadable { name, .. } => {
                format!("File \"{}\" could not be processed.", name)
            }
            Notification::FileRemoved { name, .. } => {
                format!("File \"{}\" has been removed.", name)
            }
            Notification::NothingToSubmit => {
                "Upload and validate at least one CSV file before submitting.".to_string()
            }
            Notification::Submitted { rows, .. } => {
                format!("Sent {} planet records to the server.", rows)
            }
            Notification::SubmissionFailed { .. } => "The data could not be saved.".to_string(),
        }
    }

    /// Supporting lines shown under the message
    pub fn details(&self) -> Vec<String> {
        match self {
            Notification::FileAccepted { rows, .. } => vec![format!("{} data rows found.", rows)],
            Notification::ValidationFailed { missing_fields, .. } => {
                let mut details = vec![format!(
                    "{} required field(s) missing.",
                    missing_fields.len()
                )];
                details.extend(catalog::missing_field_details(missing_fields));
                details
            }
            Notification::FileUnreadable { reason, .. } => vec![reason.clone()],
            Notification::SubmissionFailed { message } => vec![message.clone()],
            _ => Vec::new(),
        }
    }

    /// File the notification refers to, if any
    pub fn file_id(&self) -> Option<FileId> {
        match self {
            Notification::FileAccepted { id, .. }
            | Notification::ValidationFailed { id, .. }
            | Notification::FileUnreadable { id, .. }
            | Notification::FileRemoved { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level(), self.title(), self.message())?;
        for detail in self.details() {
            write!(f, "\n  {}", detail)?;
        }
        Ok(())
    }
}
