//! File lifecycle controller.
//!
//! An [`IntakeSession`] owns every admitted file and drives each through
//! `validating -> rejected | accepted(transferring) -> accepted(complete)`.
//! Each transition replaces one file's entry wholesale under the session
//! lock. Per-file tasks are tracked in a side table of cancellation tokens
//! keyed by file id and are torn down on completion, removal or clear.

pub mod admission;
pub mod aggregate;
mod pipeline;
mod transfer;

#[cfg(test)]
mod tests;

use crate::config::IntakeConfig;
use crate::constants::GENERIC_SUBMISSION_FAILURE;
use crate::error::{IntakeError, Result};
use crate::gateway::SubmissionGateway;
use crate::models::{
    AdmittedFile, CandidateFile, FileId, FileStatus, SubmissionEnvelope, SubmissionReceipt,
    TransferState,
};
use crate::notification::Notification;
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Outcome of one admission call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionSummary {
    /// Ids of admitted files, in admission order
    pub admitted: Vec<FileId>,
    /// Files dropped by the type filter
    pub rejected_for_type: usize,
}

#[derive(Default)]
struct SessionState {
    files: IndexMap<FileId, AdmittedFile>,
    tasks: HashMap<FileId, CancellationToken>,
    next_sequence: u64,
}

/// State shared between the session handle and its per-file tasks
pub(crate) struct Shared {
    config: IntakeConfig,
    state: Mutex<SessionState>,
    notifications: broadcast::Sender<Notification>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn notify(&self, notification: Notification) {
        debug!("Notification: {}", notification.title());
        // no subscribers is fine
        let _ = self.notifications.send(notification);
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Record the validation outcome of a file still in `validating`
    ///
    /// The notification goes out before the revision bump so watchers woken
    /// by the change can already receive it. Returns `None`, without
    /// notifying, when the file was removed in the meantime.
    async fn replace_status(
        &self,
        id: FileId,
        status: FileStatus,
        notification: Notification,
    ) -> Option<AdmittedFile> {
        let mut state = self.state.lock().await;
        let entry = state.files.get_mut(&id)?;
        if !matches!(entry.status, FileStatus::Validating) {
            warn!("Ignoring second validation result for {}", entry.name);
            return None;
        }
        *entry = entry.with_status(status);
        let updated = entry.clone();
        if updated.status.is_terminal() {
            state.tasks.remove(&id);
        }
        drop(state);

        self.notify(notification);
        self.bump();
        Some(updated)
    }

    /// Advance the transfer indicator; false once the file is gone
    async fn update_transfer(&self, id: FileId, transfer: TransferState) -> bool {
        let mut state = self.state.lock().await;
        let Some(entry) = state.files.get_mut(&id) else {
            return false;
        };
        let FileStatus::Accepted { report, rows, .. } = &entry.status else {
            return false;
        };

        let status = FileStatus::Accepted {
            report: report.clone(),
            rows: Arc::clone(rows),
            transfer,
        };
        *entry = entry.with_status(status);
        if transfer == TransferState::Complete {
            state.tasks.remove(&id);
        }
        drop(state);

        self.bump();
        true
    }

    async fn forget_task(&self, id: FileId) {
        self.state.lock().await.tasks.remove(&id);
    }
}

/// One user's set of admitted files
pub struct IntakeSession {
    shared: Arc<Shared>,
    root: CancellationToken,
    _shutdown: DropGuard,
}

impl IntakeSession {
    /// Start an empty session, refusing configurations the transfer
    /// indicator cannot run with
    pub fn new(config: IntakeConfig) -> Result<Self> {
        config.validate()?;
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        let (revision, _) = watch::channel(0);
        let root = CancellationToken::new();

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(SessionState::default()),
                notifications,
                revision,
            }),
            _shutdown: root.clone().drop_guard(),
            root,
        })
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.shared.config
    }

    /// Receive notifications emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.shared.notifications.subscribe()
    }

    /// Revision counter bumped on every file replacement, removal or clear
    pub fn watch_changes(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Admit the files that pass the type filter and start their pipelines
    ///
    /// Wrong-type files never receive an id. If any were dropped, a single
    /// notification reports how many.
    pub async fn admit(
        &self,
        candidates: impl IntoIterator<Item = CandidateFile>,
    ) -> AdmissionSummary {
        let admission = admission::filter_candidates(candidates);
        let mut summary = AdmissionSummary {
            admitted: Vec::with_capacity(admission.accepted.len()),
            rejected_for_type: admission.rejected_for_type,
        };

        if !admission.accepted.is_empty() {
            let mut state = self.shared.state.lock().await;
            for candidate in admission.accepted {
                let id = FileId::new();
                let sequence = state.next_sequence;
                state.next_sequence += 1;

                let file = AdmittedFile {
                    id,
                    sequence,
                    name: candidate.name.clone(),
                    byte_size: candidate.byte_size,
                    type_hint: admission::type_hint(&candidate),
                    admitted_at: Utc::now(),
                    status: FileStatus::Validating,
                };
                state.files.insert(id, file);

                let token = self.root.child_token();
                state.tasks.insert(id, token.clone());
                tokio::spawn(pipeline::run(
                    Arc::clone(&self.shared),
                    id,
                    candidate.name,
                    candidate.source,
                    token,
                ));
                summary.admitted.push(id);
            }
            drop(state);
            self.shared.bump();
        }

        info!(
            "Admitted {} file(s), ignored {} of the wrong type",
            summary.admitted.len(),
            summary.rejected_for_type
        );
        if summary.rejected_for_type > 0 {
            self.shared.notify(Notification::WrongFileType {
                count: summary.rejected_for_type,
            });
        }
        summary
    }

    /// All files in admission order
    pub async fn snapshot(&self) -> Vec<AdmittedFile> {
        let state = self.shared.state.lock().await;
        let mut files: Vec<_> = state.files.values().cloned().collect();
        files.sort_by_key(|file| file.sequence);
        files
    }

    pub async fn get(&self, id: FileId) -> Option<AdmittedFile> {
        self.shared.state.lock().await.files.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.shared.state.lock().await.files.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove a file in any state, stopping its pipeline or transfer
    pub async fn remove(&self, id: FileId) -> Result<AdmittedFile> {
        let mut state = self.shared.state.lock().await;
        let removed = state
            .files
            .shift_remove(&id)
            .ok_or(IntakeError::FileNotFound { id })?;
        if let Some(token) = state.tasks.remove(&id) {
            token.cancel();
        }
        drop(state);

        self.shared.bump();
        info!("Removed {}", removed.name);
        self.shared.notify(Notification::FileRemoved {
            id,
            name: removed.name.clone(),
        });
        Ok(removed)
    }

    /// Drop every file and cancel every running task
    pub async fn clear(&self) {
        let mut state = self.shared.state.lock().await;
        for (_, token) in state.tasks.drain() {
            token.cancel();
        }
        let cleared = state.files.len();
        state.files.clear();
        drop(state);

        self.shared.bump();
        debug!("Cleared {} file(s) from the session", cleared);
    }

    /// Whether every file is `rejected` or `accepted(complete)`
    pub async fn is_settled(&self) -> bool {
        let state = self.shared.state.lock().await;
        state.files.values().all(|file| file.status.is_terminal())
    }

    /// Resolve once every file has reached a terminal state
    pub async fn settled(&self) {
        let mut changes = self.shared.revision.subscribe();
        loop {
            if self.is_settled().await {
                return;
            }
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    /// At least one file, and every file accepted and complete
    pub async fn is_ready_to_submit(&self) -> bool {
        let state = self.shared.state.lock().await;
        !state.files.is_empty() && state.files.values().all(|file| file.status.is_complete())
    }

    /// Aggregate completed files into the envelope that would be sent
    pub async fn envelope(&self, category: &str) -> Result<SubmissionEnvelope> {
        let files = self.snapshot().await;
        let payload = aggregate::build_payload(&files, category)?;
        Ok(SubmissionEnvelope {
            key: self.shared.config.payload_key.clone(),
            payload,
        })
    }

    /// Pretty-printed JSON of the envelope that would be sent
    pub async fn preview(&self, category: &str) -> Result<String> {
        let envelope = self.envelope(category).await?;
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// Send every completed file's rows to the storage backend in one call
    ///
    /// With nothing eligible the gateway is never called. On success the
    /// session is cleared; on failure files are left untouched. Clearing
    /// covers every file, including any that completed while the request
    /// was in flight and so were not part of the sent batch.
    pub async fn submit<G>(&self, gateway: &G, category: &str) -> Result<SubmissionReceipt>
    where
        G: SubmissionGateway + ?Sized,
    {
        let files = self.snapshot().await;
        let payload = match aggregate::build_payload(&files, category) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Submission refused locally: {}", e);
                self.shared.notify(Notification::NothingToSubmit);
                return Err(e);
            }
        };

        let files_submitted = files.iter().filter(|f| f.status.is_complete()).count();
        let rows_sent = payload.data.len();
        let envelope = SubmissionEnvelope {
            key: self.shared.config.payload_key.clone(),
            payload,
        };

        info!(
            "Submitting {} rows from {} file(s) as '{}'",
            rows_sent, files_submitted, category
        );
        let outcome = gateway.submit(&envelope).await;

        if outcome.ok {
            self.shared.notify(Notification::Submitted {
                category: category.to_string(),
                rows: rows_sent,
            });
            self.clear().await;
            Ok(SubmissionReceipt {
                category: category.to_string(),
                files_submitted,
                rows_sent,
                message: outcome.message,
            })
        } else {
            let message = outcome
                .message
                .unwrap_or_else(|| GENERIC_SUBMISSION_FAILURE.to_string());
            warn!("Submission failed: {}", message);
            self.shared.notify(Notification::SubmissionFailed {
                message: message.clone(),
            });
            Err(IntakeError::SubmissionFailed { message })
        }
    }
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new(IntakeConfig::default()).expect("default IntakeConfig is valid")
    }
}
