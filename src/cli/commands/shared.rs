//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! the command implementations.

use crate::cli::args::CommonArgs;
use crate::config::IntakeConfig;
use crate::error::Result;
use crate::intake::admission::expand_inputs;
use crate::intake::{AdmissionSummary, IntakeSession};
use crate::models::{AdmittedFile, CandidateFile, FileId, FileStatus};
use crate::notification::{Level, Notification};
use colored::*;
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

/// Run statistics reported at the end of a command
#[derive(Debug, Clone, Default)]
pub struct IntakeStats {
    /// Files that passed the type filter
    pub files_admitted: usize,
    /// Files dropped by the type filter
    pub files_ignored: usize,
    /// Files accepted by the schema validator
    pub files_accepted: usize,
    /// Files rejected for missing fields or unreadable content
    pub files_rejected: usize,
    /// Data rows parsed from accepted files
    pub rows_parsed: usize,
    /// Rows delivered to the storage backend
    pub rows_sent: usize,
    /// Total bytes of admitted files
    pub bytes_admitted: u64,
    /// Total command time
    pub processing_time: std::time::Duration,
}

impl IntakeStats {
    /// Tally a settled set of files
    pub fn from_files(files: &[AdmittedFile], files_ignored: usize) -> Self {
        let mut stats = Self {
            files_admitted: files.len(),
            files_ignored,
            ..Default::default()
        };
        for file in files {
            stats.bytes_admitted += file.byte_size;
            match &file.status {
                FileStatus::Accepted { rows, .. } => {
                    stats.files_accepted += 1;
                    stats.rows_parsed += rows.len();
                }
                FileStatus::Rejected { .. } => stats.files_rejected += 1,
                FileStatus::Validating => {}
            }
        }
        stats
    }

    /// Format a byte count in human-readable form
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging
pub fn setup_logging(args: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("exo_intake={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration from the given file or the default location
pub fn load_configuration(args: &CommonArgs) -> Result<IntakeConfig> {
    match &args.config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => debug!("No config file given, checking the default location"),
    }
    let config = IntakeConfig::load(args.config_file.as_deref())?;
    debug!("Configuration: {:?}", config);
    Ok(config)
}

/// Expand paths and read file metadata for every candidate
pub async fn collect_candidates(paths: &[PathBuf]) -> Result<Vec<CandidateFile>> {
    let files = expand_inputs(paths).map_err(std::io::Error::from)?;
    if files.is_empty() {
        warn!("No files found under the given paths");
    }

    let candidates = join_all(files.iter().map(CandidateFile::from_path))
        .await
        .into_iter()
        .collect::<std::io::Result<Vec<_>>>()?;
    info!("Collected {} candidate file(s)", candidates.len());
    Ok(candidates)
}

/// Format a notification as colored terminal lines
pub fn format_notification(notification: &Notification) -> String {
    let title = match notification.level() {
        Level::Error => notification.title().bright_red().bold(),
        Level::Success => notification.title().bright_green().bold(),
        Level::Warning => notification.title().bright_yellow().bold(),
        Level::Info => notification.title().bright_blue().bold(),
    };

    let mut text = format!("{} {}", title, notification.message());
    for detail in notification.details() {
        text.push_str(&format!("\n    {}", detail.as_str().bright_black()));
    }
    text
}

/// Print every notification waiting in `receiver`
pub fn drain_notifications(
    receiver: &mut broadcast::Receiver<Notification>,
    progress: Option<&MultiProgress>,
) {
    loop {
        match receiver.try_recv() {
            Ok(notification) => {
                let text = format_notification(&notification);
                match progress {
                    Some(multi) => {
                        if multi.println(&text).is_err() {
                            eprintln!("{}", text);
                        }
                    }
                    None => eprintln!("{}", text),
                }
            }
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("{} notification(s) dropped", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

/// Create a per-file transfer progress bar
pub fn create_progress_bar(name: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {prefix} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_prefix(name.to_string());
    pb
}

/// Progress bars for every admitted file, keyed by id
pub struct TransferBars {
    multi: MultiProgress,
    bars: HashMap<FileId, ProgressBar>,
}

impl TransferBars {
    pub fn new(visible: bool) -> Self {
        let multi = if visible {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        Self {
            multi,
            bars: HashMap::new(),
        }
    }

    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }

    /// Bring every bar in line with the latest snapshot
    pub fn update(&mut self, files: &[AdmittedFile]) {
        for file in files {
            let bar = self
                .bars
                .entry(file.id)
                .or_insert_with(|| self.multi.add(create_progress_bar(&file.name)));
            if bar.is_finished() {
                continue;
            }

            match &file.status {
                FileStatus::Validating => bar.set_message("validating"),
                FileStatus::Rejected { report, .. } => {
                    bar.abandon_with_message(format!("rejected ({})", report.summary()))
                }
                FileStatus::Accepted { rows, .. } => {
                    bar.set_position(file.transfer_progress().min(100.0) as u64);
                    if file.status.is_complete() {
                        bar.finish_with_message(format!("{} rows", rows.len()));
                    } else {
                        bar.set_message("transferring");
                    }
                }
            }
        }
    }
}

/// Admit candidates and report notifications and transfer progress until
/// every admitted file settles
pub async fn admit_and_settle(
    session: &IntakeSession,
    candidates: Vec<CandidateFile>,
    show_progress: bool,
) -> (AdmissionSummary, Vec<AdmittedFile>) {
    let mut notifications = session.subscribe();
    let mut changes = session.watch_changes();
    let mut bars = TransferBars::new(show_progress);

    let summary = session.admit(candidates).await;
    loop {
        let files = session.snapshot().await;
        bars.update(&files);
        drain_notifications(&mut notifications, show_progress.then(|| bars.multi()));

        if files.iter().all(|file| file.status.is_terminal()) {
            return (summary, files);
        }
        if changes.changed().await.is_err() {
            return (summary, files);
        }
    }
}
