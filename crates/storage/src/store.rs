// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`CrawlStore`]: the durable orchestration layer over WAL + checkpoint +
//! materialized state.
//!
//! Every mutation is appended to the WAL, folded into the in-memory
//! [`MaterializedStore`], and periodically checkpointed in the background.
//! `open()` performs crash recovery (load snapshot, replay unprocessed WAL
//! entries) and decides, based on the `resume` flag and whatever prior state
//! it finds, whether this is a resumed crawl or a fresh one.

use crate::checkpoint::{load_snapshot, CheckpointError, CheckpointHandle, Checkpointer};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::state::MaterializedStore;
use crate::wal::{Wal, WalError};
use crawl_core::{Reference, StoreEvent};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Background checkpoints are taken after this many mutating events, unless
/// one is already in flight (in which case the next boundary picks it up).
const CHECKPOINT_EVERY: u64 = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn checkpoint_path(store_dir: &Path) -> PathBuf {
    store_dir.join("checkpoint.snap.zst")
}

fn wal_path(store_dir: &Path) -> PathBuf {
    store_dir.join("wal.jsonl")
}

struct Inner {
    state: MaterializedStore,
    wal: Wal,
    checkpointer: Checkpointer,
    since_checkpoint: u64,
    in_flight: Option<CheckpointHandle>,
}

impl Inner {
    fn append_and_apply(&mut self, event: StoreEvent) -> Result<(), StoreError> {
        let seq = self.wal.append(&event)?;
        self.state.apply_event(&event);
        self.since_checkpoint += 1;
        if self.wal.needs_flush() {
            self.wal.flush()?;
        }
        self.reap_in_flight_checkpoint()?;
        if self.since_checkpoint >= CHECKPOINT_EVERY && self.in_flight.is_none() {
            self.wal.flush()?;
            self.in_flight = Some(self.checkpointer.start(seq, &self.state));
            self.since_checkpoint = 0;
        }
        Ok(())
    }

    /// Non-blocking: if a background checkpoint has finished, truncate the
    /// WAL up to the checkpointed sequence. Directory fsync happens inside
    /// the checkpointer before this ever sees a result, so truncation here
    /// is safe.
    fn reap_in_flight_checkpoint(&mut self) -> Result<(), StoreError> {
        let Some(handle) = self.in_flight.take() else {
            return Ok(());
        };
        match handle.try_wait() {
            Some(Ok(result)) => {
                self.wal.truncate_before(result.seq)?;
                debug!(seq = result.seq, size = result.size_bytes, "checkpoint complete");
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "background checkpoint failed, will retry");
            }
            None => {
                self.in_flight = Some(handle);
            }
        }
        Ok(())
    }

    /// Block until any in-flight checkpoint completes, then take a final
    /// synchronous one and truncate. Used on shutdown.
    fn flush_and_checkpoint(&mut self) -> Result<(), StoreError> {
        if let Some(handle) = self.in_flight.take() {
            let result = handle.wait()?;
            self.wal.truncate_before(result.seq)?;
        }
        self.wal.flush()?;
        let seq = self.wal.write_seq();
        let result = self.checkpointer.checkpoint_sync(seq, &self.state)?;
        self.wal.truncate_before(result.seq)?;
        self.since_checkpoint = 0;
        Ok(())
    }
}

/// Orchestrates the WAL, background checkpointing, and the materialized
/// reference state for one crawl store directory.
pub struct CrawlStore {
    inner: Mutex<Inner>,
}

impl CrawlStore {
    /// Open (or create) a crawl store at `store_dir`, replaying the WAL on
    /// top of the last checkpoint and reconciling against `resume`.
    ///
    /// Returns the opened store plus whether this is actually a resumed
    /// crawl: `resume` only takes effect if there was prior persisted state
    /// to resume from.
    pub fn open(store_dir: &Path, resume: bool) -> Result<(Self, bool), StoreError> {
        std::fs::create_dir_all(store_dir)?;

        let snap_path = checkpoint_path(store_dir);
        let snapshot = load_snapshot(&snap_path)?;
        let (mut state, snap_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (MaterializedStore::new(), 0),
        };

        let mut wal = Wal::open(&wal_path(store_dir), snap_seq)?;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
        }

        let had_prior_state = !state.queued.is_empty()
            || !state.active.is_empty()
            || !state.processed_valid.is_empty()
            || !state.processed_invalid.is_empty()
            || !state.cached.is_empty();
        let resuming = resume && had_prior_state;

        let reconciliation = if resuming {
            let keys: Vec<String> = state.active.keys().cloned().collect();
            StoreEvent::ResumeRequeued { keys }
        } else {
            let carried: Vec<Reference> = state
                .processed_valid
                .values()
                .filter(|r| r.is_good_state())
                .map(Reference::copy)
                .collect();
            StoreEvent::FreshStart { carried_cache: carried }
        };
        info!(resuming, had_prior_state, "reconciling crawl store on open");
        let seq = wal.append(&reconciliation)?;
        state.apply_event(&reconciliation);
        wal.flush()?;

        let checkpointer = Checkpointer::new(snap_path);
        let result = checkpointer.checkpoint_sync(seq, &state)?;
        wal.truncate_before(result.seq)?;

        let store = Self {
            inner: Mutex::new(Inner {
                state,
                wal,
                checkpointer,
                since_checkpoint: 0,
                in_flight: None,
            }),
        };
        Ok((store, resuming))
    }

    pub fn queue(&self, reference: Reference) -> Result<(), StoreError> {
        self.inner.lock().append_and_apply(StoreEvent::Queued { reference })
    }

    /// Dequeue the FIFO head into `active` and return it, atomically.
    pub fn next_queued(&self) -> Result<Option<Reference>, StoreError> {
        let mut inner = self.inner.lock();
        let Some(key) = inner.state.peek_queued().map(|r| r.reference.clone()) else {
            return Ok(None);
        };
        inner.append_and_apply(StoreEvent::Dequeued { key: key.clone() })?;
        Ok(inner.state.active.get(&key).cloned())
    }

    pub fn get_cached(&self, key: &str) -> Option<Reference> {
        self.inner.lock().state.get_cached(key).cloned()
    }

    pub fn processed(&self, reference: Reference) -> Result<(), StoreError> {
        self.inner.lock().append_and_apply(StoreEvent::Processed { reference })
    }

    pub fn queued_count(&self) -> usize {
        self.inner.lock().state.queued_count()
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().state.active_count()
    }

    pub fn processed_count(&self) -> usize {
        self.inner.lock().state.processed_count()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.inner.lock().state.is_queue_empty()
    }

    pub fn is_cache_empty(&self) -> bool {
        self.inner.lock().state.is_cache_empty()
    }

    pub fn cached_snapshot(&self) -> Vec<Reference> {
        self.inner.lock().state.cached_iterable().cloned().collect()
    }

    /// Write a plain, human-portable JSON export of the current state.
    /// Used by the CLI's `storeexport` subcommand.
    pub fn export_to(&self, path: &Path) -> Result<(), StoreError> {
        let inner = self.inner.lock();
        let seq = inner.wal.write_seq();
        Snapshot::new(seq, inner.state.clone()).save(path)?;
        Ok(())
    }

    /// Flush outstanding writes and take a final durable checkpoint.
    pub fn close(&self) -> Result<(), StoreError> {
        self.inner.lock().flush_and_checkpoint()
    }
}

/// Replace the store at `store_dir` with the state exported to `path` by
/// [`CrawlStore::export_to`]. Used by the CLI's `storeimport` subcommand;
/// `store_dir` must not have an already-open [`CrawlStore`].
pub fn import_store(store_dir: &Path, path: &Path) -> Result<(), StoreError> {
    let snapshot = Snapshot::load(path)?.ok_or_else(|| {
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no importable snapshot at {}", path.display()),
        ))
    })?;

    std::fs::create_dir_all(store_dir)?;
    let checkpointer = Checkpointer::new(checkpoint_path(store_dir));
    checkpointer.checkpoint_sync(snapshot.seq, &snapshot.state)?;

    let wal_file = wal_path(store_dir);
    let _ = std::fs::remove_file(&wal_file);
    Wal::open(&wal_file, snapshot.seq)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
