//! Submit command implementation
//!
//! Validates the given files, shows their transfer progress, then sends the
//! rows of every completed file to the storage backend in a single request.

use super::shared::{
    IntakeStats, admit_and_settle, collect_candidates, drain_notifications, load_configuration,
    setup_logging,
};
use crate::cli::args::SubmitArgs;
use crate::constants::category_label;
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::intake::IntakeSession;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub async fn run_submit(args: SubmitArgs) -> Result<IntakeStats> {
    let start_time = Instant::now();
    setup_logging(&args.common)?;
    debug!("Submit arguments: {:?}", args);

    let config = args.apply_overrides(load_configuration(&args.common)?)?;
    let category = args.get_category(&config)?;
    let candidates = collect_candidates(&args.paths).await?;

    let session = IntakeSession::new(config)?;
    let (summary, files) =
        admit_and_settle(&session, candidates, args.common.show_progress()).await;
    let mut stats = IntakeStats::from_files(&files, summary.rejected_for_type);

    if args.preview {
        // an empty batch is reported by the submit step
        if let Ok(preview) = session.preview(&category).await {
            println!("{}", preview);
        }
    }

    if args.dry_run {
        let envelope = session.envelope(&category).await?;
        println!(
            "{} {} rows from {} file(s) would be sent as {} to {}",
            "Dry run:".bright_yellow().bold(),
            envelope.payload.data.len(),
            stats.files_accepted,
            category_label(&category).unwrap_or(category.as_str()).bright_cyan(),
            session.config().endpoint
        );
        stats.processing_time = start_time.elapsed();
        return Ok(stats);
    }

    let gateway = HttpGateway::new(session.config())?;
    info!("Submitting to {}", gateway.endpoint());

    let spinner = if args.common.show_progress() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        pb.set_message("Submitting rows...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut notifications = session.subscribe();
    let result = session.submit(&gateway, &category).await;
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    drain_notifications(&mut notifications, None);

    let receipt = result?;
    stats.rows_sent = receipt.rows_sent;
    stats.processing_time = start_time.elapsed();

    println!(
        "{} {} rows from {} file(s) filed under {} in {:.2}s",
        "Submitted".bright_green().bold(),
        receipt.rows_sent,
        receipt.files_submitted,
        category_label(&receipt.category)
            .unwrap_or(receipt.category.as_str())
            .bright_cyan(),
        stats.processing_time.as_secs_f64()
    );
    if let Some(message) = &receipt.message {
        println!("  {}", message.as_str().bright_black());
    }

    Ok(stats)
}
