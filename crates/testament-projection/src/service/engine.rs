//! # Projection Engine
//!
//! One long-lived consumer per event source. Startup sequence:
//!
//! 1. Load the replica and the last durable checkpoint from the store.
//! 2. Subscribe to the live head *first*, then backfill from the checkpoint
//!    through the same apply path, so the handoff cannot drop records.
//! 3. Drain the live subscription; records at or before the checkpoint are
//!    dropped by ordering-key dedup (a boundary duplicate is harmless, the
//!    apply function is an upsert anyway).
//!
//! Failure policy: a record the apply function rejects is logged and
//! skipped without halting the stream; a store failure is fatal and
//! surfaces, so process-level restart resumes backfill from the checkpoint.

use crate::domain::apply::{apply_event, ApplyOutcome};
use crate::domain::replica::Replica;
use crate::ports::{EventSource, ReplicaStore, SourceError, StoreError};
use std::sync::Arc;
use testament_events::EventRecord;
use testament_types::EventKey;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Fatal engine errors.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The event source could not serve backfill.
    #[error("event source failure: {0}")]
    Source(#[from] SourceError),

    /// The replica store failed; restart and resume from the checkpoint.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// The event projection engine.
pub struct ProjectionEngine {
    source: Arc<dyn EventSource>,
    store: Arc<dyn ReplicaStore>,
}

impl ProjectionEngine {
    /// Wire an engine over its source and store.
    pub fn new(source: Arc<dyn EventSource>, store: Arc<dyn ReplicaStore>) -> Self {
        Self { source, store }
    }

    /// Run backfill, then consume the live head until shutdown or source
    /// close. Returns `Err` only on fatal storage/source faults.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), ProjectionError> {
        let (mut replica, mut last_applied) = self.store.load()?;
        info!(checkpoint = ?last_applied, "Projection engine starting");

        // Live first, backfill second: overlap is removed by key dedup.
        let mut live = self.source.live();

        let backfill = self.source.backfill(last_applied).await?;
        let backfill_count = backfill.len();
        for record in backfill {
            self.process(&mut replica, record, &mut last_applied)?;
        }
        info!(
            records = backfill_count,
            checkpoint = ?last_applied,
            "Backfill complete, switching to live head"
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Projection engine shutting down");
                    return Ok(());
                }
                maybe = live.recv() => match maybe {
                    Some(record) => self.process(&mut replica, record, &mut last_applied)?,
                    None => {
                        info!("Event source closed, projection engine stopping");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Run backfill only and stop. Used when a caller wants a one-shot
    /// rebuild without holding a live subscription.
    pub async fn catch_up(&self) -> Result<usize, ProjectionError> {
        let (mut replica, mut last_applied) = self.store.load()?;
        let backfill = self.source.backfill(last_applied).await?;
        let count = backfill.len();
        for record in backfill {
            self.process(&mut replica, record, &mut last_applied)?;
        }
        Ok(count)
    }

    fn process(
        &self,
        replica: &mut Replica,
        record: EventRecord,
        last_applied: &mut Option<EventKey>,
    ) -> Result<(), ProjectionError> {
        if let Some(applied) = *last_applied {
            if record.key <= applied {
                debug!(key = %record.key, "Duplicate record dropped");
                return Ok(());
            }
        }

        let (outcome, ops) = apply_event(replica, &record);
        match outcome {
            ApplyOutcome::Applied => {
                self.store.apply(&ops, record.key)?;
                debug!(key = %record.key, kind = record.event.kind(), "Record applied");
            }
            ApplyOutcome::Skipped(reason) => {
                // Partial-failure isolation: advance the checkpoint so the
                // record is not re-processed after restart.
                warn!(
                    key = %record.key,
                    kind = record.event.kind(),
                    reason,
                    "Record skipped"
                );
                self.store.apply(&[], record.key)?;
            }
        }
        *last_applied = Some(record.key);
        Ok(())
    }
}
