//! Integration tests for the intake session
//!
//! Drive real sessions with in-memory and on-disk files and a recording
//! gateway standing in for the storage backend.


use super::IntakeSession;
use crate::config::IntakeConfig;
use crate::gateway::{GatewayOutcome, SubmissionGateway};
use crate::models::{AdmittedFile, CandidateFile, SubmissionEnvelope};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const HEADER: &str =
    "pl_orbper,pl_trandep,pl_trandur,pl_rade,pl_imppar,pl_ratror,pl_ratdor,st_rad,st_teff";

/// Session whose transfers finish within a few milliseconds
pub fn fast_session() -> IntakeSession {
    IntakeSession::new(
        IntakeConfig::default()
            .with_transfer_tick(Duration::from_millis(1))
            .with_progress_steps(30.0, 50.0),
    )
    .unwrap()
}

/// Session whose transfers never finish during a test
pub fn stalled_session() -> IntakeSession {
    IntakeSession::new(
        IntakeConfig::default()
            .with_transfer_tick(Duration::from_secs(3600))
            .with_progress_steps(1.0, 1.0),
    )
    .unwrap()
}

/// CSV text with every required column and `rows` data lines tagged by `tag`
pub fn valid_csv(tag: &str, rows: usize) -> String {
    let mut text = format!("{}\n", HEADER);
    for i in 0..rows {
        text.push_str(&format!(
            "{tag}{i},0.5,2.1,1.{i},0.3,0.01,15.2,0.9,5700\n"
        ));
    }
    text
}

pub fn csv_file(name: &str, contents: &str) -> CandidateFile {
    CandidateFile::in_memory(name, contents.as_bytes().to_vec())
}

/// Wait until `predicate` holds for the session's files
pub async fn wait_for<F>(session: &IntakeSession, predicate: F) -> Vec<AdmittedFile>
where
    F: Fn(&[AdmittedFile]) -> bool,
{
    let mut changes = session.watch_changes();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let files = session.snapshot().await;
            if predicate(&files) {
                return files;
            }
            changes.changed().await.unwrap();
        }
    })
    .await
    .expect("condition not reached in time")
}

pub async fn settle(session: &IntakeSession) {
    tokio::time::timeout(Duration::from_secs(10), session.settled())
        .await
        .expect("session did not settle");
}

/// Gateway that records every call and answers with a fixed outcome
pub struct RecordingGateway {
    outcome: GatewayOutcome,
    calls: AtomicUsize,
    last: Mutex<Option<SubmissionEnvelope>>,
}

impl RecordingGateway {
    pub fn answering(outcome: GatewayOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_envelope(&self) -> Option<SubmissionEnvelope> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn submit(&self, envelope: &SubmissionEnvelope) -> GatewayOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(envelope.clone());
        self.outcome.clone()
    }
}
