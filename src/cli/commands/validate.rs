//! Validate command implementation
//!
//! Admits the given files into a throwaway session, waits until each one is
//! rejected or fully transferred, and prints a per-file report.

use super::shared::{IntakeStats, admit_and_settle, collect_candidates, load_configuration, setup_logging};
use crate::catalog;
use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::error::Result;
use crate::intake::IntakeSession;
use crate::models::{AdmittedFile, FileStatus, RejectionReason, ValidationReport};
use colored::*;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Per-file line of the validation report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub name: String,
    pub byte_size: u64,
    pub status: &'static str,
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub report: Option<ValidationReport>,
}

impl From<&AdmittedFile> for FileReport {
    fn from(file: &AdmittedFile) -> Self {
        let error = match &file.status {
            FileStatus::Rejected {
                reason: RejectionReason::Unreadable { message },
                ..
            } => Some(message.clone()),
            _ => None,
        };
        Self {
            name: file.name.clone(),
            byte_size: file.byte_size,
            status: file.status.label(),
            rows: file.parsed_rows().map(<[_]>::len),
            error,
            report: file.validation_report().cloned(),
        }
    }
}

pub async fn run_validate(args: ValidateArgs) -> Result<IntakeStats> {
    let start_time = Instant::now();
    setup_logging(&args.common)?;

    let config = load_configuration(&args.common)?;
    let candidates = collect_candidates(&args.paths).await?;

    let session = IntakeSession::new(config)?;
    let show_progress = args.common.show_progress() && args.output_format == OutputFormat::Human;
    let (summary, files) = admit_and_settle(&session, candidates, show_progress).await;

    let reports: Vec<FileReport> = files.iter().map(FileReport::from).collect();
    match args.output_format {
        OutputFormat::Human => print_human_report(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let mut stats = IntakeStats::from_files(&files, summary.rejected_for_type);
    stats.processing_time = start_time.elapsed();
    info!(
        "Validation finished in {:.2}s: {} accepted, {} rejected, {} ignored",
        stats.processing_time.as_secs_f64(),
        stats.files_accepted,
        stats.files_rejected,
        stats.files_ignored
    );

    Ok(stats)
}

fn print_human_report(reports: &[FileReport]) {
    println!();
    println!("{}", "Validation report".bright_green().bold());

    if reports.is_empty() {
        println!("  {}", "No CSV files were admitted".bright_yellow());
        return;
    }

    for report in reports {
        let status = match report.status {
            "complete" => "accepted".bright_green(),
            "rejected" => "rejected".bright_red(),
            other => other.bright_yellow(),
        };
        let summary = report
            .report
            .as_ref()
            .map(ValidationReport::summary)
            .unwrap_or_default();

        println!(
            "  {} {} {} {}",
            status.bold(),
            report.name.as_str().bright_cyan(),
            format!("({})", IntakeStats::format_size(report.byte_size)).bright_black(),
            summary
        );

        if let Some(rows) = report.rows {
            println!("      {} data rows", rows);
        }
        if let Some(error) = &report.error {
            println!("      {}", error.as_str().bright_red());
        } else if let Some(validation) = &report.report {
            for line in catalog::missing_field_details(&validation.missing_fields) {
                println!("      {}", line);
            }
        }
    }
}
