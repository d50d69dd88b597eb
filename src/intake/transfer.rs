//! Display-only transfer progress emitter
//!
//! After a file is accepted its progress climbs from 0 to 100 in random
//! steps, one per tick, and flips to complete exactly once. The emitter
//! does not touch the parsed rows and does not talk to the network.

use super::Shared;
use crate::constants::TRANSFER_COMPLETE;
use crate::models::{FileId, TransferState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Drive one file's progress until complete or until the file disappears
pub(super) async fn emit_progress(shared: &Shared, id: FileId) {
    let tick = shared.config.transfer_tick();
    let (min_step, max_step) = (
        shared.config.min_progress_step,
        shared.config.max_progress_step,
    );
    let mut rng = StdRng::from_entropy();
    let mut progress = 0.0_f64;

    loop {
        tokio::time::sleep(tick).await;

        progress += rng.gen_range(min_step..=max_step);
        let transfer = if progress >= TRANSFER_COMPLETE {
            TransferState::Complete
        } else {
            TransferState::Transferring { progress }
        };

        if !shared.update_transfer(id, transfer).await {
            debug!("File {} left the session, stopping transfer", id);
            return;
        }
        if transfer == TransferState::Complete {
            debug!("Transfer of {} complete", id);
            return;
        }
    }
}
