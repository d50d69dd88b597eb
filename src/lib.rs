//! Exoplanet Dataset Intake Library
//!
//! Admits candidate CSV files of exoplanet transit observations, checks each
//! one against a fixed catalog of required columns, parses accepted files
//! into row records and forwards the aggregated rows to a storage backend
//! under a user-chosen category.
//!
//! This library provides tools for:
//! - Filtering candidate files by declared type or `.csv` extension
//! - Validating header rows against the required field catalog
//! - Tracking every admitted file through validation and transfer
//! - Emitting user-facing notifications for each outcome
//! - Building and submitting a single payload for all completed files

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod header;
pub mod intake;
pub mod models;
pub mod notification;
pub mod rows;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::IntakeConfig;
pub use error::{IntakeError, Result};
pub use gateway::{GatewayOutcome, HttpGateway, SubmissionGateway};
pub use intake::{AdmissionSummary, IntakeSession};
pub use models::{
    AdmittedFile, CandidateFile, FileId, FileStatus, RejectionReason, RowRecord,
    SubmissionEnvelope, SubmissionPayload, SubmissionReceipt, TransferState, ValidationReport,
};
pub use notification::{Level, Notification};
