//! Error handling for dataset intake operations.
//!
//! Provides error types with context for file reading, configuration,
//! payload serialization and submission failures.

use crate::models::FileId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read file contents of '{name}': {reason}")]
    UnreadableContent { name: String, reason: String },

    #[error("No admitted file with id {id}")]
    FileNotFound { id: FileId },

    #[error("Nothing to submit: no file has finished validation and transfer")]
    NothingToSubmit,

    #[error("Submission failed: {message}")]
    SubmissionFailed { message: String },

    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl IntakeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the error was raised locally, before any request left the process
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::SubmissionFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
