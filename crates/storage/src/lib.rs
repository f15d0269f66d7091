// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for crawl reference state: WAL, checkpoints, and the
//! [`CrawlStore`] orchestration layer that ties them together.

mod checkpoint;
mod migration;
mod snapshot;
mod state;
mod store;
mod wal;

pub use checkpoint::{
    load_snapshot, CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter,
    Checkpointer, FsCheckpointWriter,
};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedStore;
pub use store::{import_store, CrawlStore, StoreError};
pub use wal::{Wal, WalEntry, WalError};
