//! Per-file pipeline: read, validate, parse, then transfer
//!
//! Stages run strictly in order for one file. Pipelines of different files
//! are independent tasks and may finish in any order.

use super::{Shared, transfer};
use crate::header::validate_text;
use crate::models::{FileId, FileSource, FileStatus, RejectionReason, TransferState, ValidationReport};
use crate::notification::Notification;
use crate::rows::{parse_rows, read_text};
use std::sync::Arc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run one admitted file through the pipeline unless cancelled first
pub(super) async fn run(
    shared: Arc<Shared>,
    id: FileId,
    name: String,
    source: FileSource,
    token: CancellationToken,
) {
    tokio::select! {
        _ = token.cancelled() => {
            debug!("Pipeline for {} cancelled", name);
        }
        _ = process(&shared, id, &name, &source) => {}
    }
    shared.forget_task(id).await;
}

async fn process(shared: &Shared, id: FileId, name: &str, source: &FileSource) {
    let (status, notification) = match read_text(name, source).await {
        Ok(text) => check_and_parse(id, name, text).await,
        Err(e) => {
            warn!("Could not read {}: {}", name, e);
            unreadable(id, name, e.to_string())
        }
    };

    let accepted = matches!(status, FileStatus::Accepted { .. });
    if shared.replace_status(id, status, notification).await.is_none() {
        debug!("File {} removed during validation, result dropped", name);
        return;
    }

    if accepted {
        transfer::emit_progress(shared, id).await;
    }
}

async fn check_and_parse(id: FileId, name: &str, text: String) -> (FileStatus, Notification) {
    let work = task::spawn_blocking(move || {
        let report = validate_text(&text);
        let rows = report.is_valid.then(|| parse_rows(&text));
        (report, rows)
    });

    match work.await {
        Ok((report, Some(rows))) => {
            info!("Accepted {}: {} rows", name, rows.len());
            let notification = Notification::FileAccepted {
                id,
                name: name.to_string(),
                rows: rows.len(),
            };
            let status = FileStatus::Accepted {
                report,
                rows: Arc::new(rows),
                transfer: TransferState::Transferring { progress: 0.0 },
            };
            (status, notification)
        }
        Ok((report, None)) => {
            warn!(
                "Rejected {}: missing {}",
                name,
                report.missing_fields.join(", ")
            );
            let notification = Notification::ValidationFailed {
                id,
                name: name.to_string(),
                missing_fields: report.missing_fields.clone(),
            };
            let status = FileStatus::Rejected {
                report,
                reason: RejectionReason::MissingFields,
            };
            (status, notification)
        }
        Err(e) => unreadable(id, name, format!("parsing task failed: {}", e)),
    }
}

fn unreadable(id: FileId, name: &str, reason: String) -> (FileStatus, Notification) {
    let notification = Notification::FileUnreadable {
        id,
        name: name.to_string(),
        reason: reason.clone(),
    };
    let status = FileStatus::Rejected {
        report: ValidationReport::unreadable(),
        reason: RejectionReason::Unreadable { message: reason },
    };
    (status, notification)
}
