// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy vocabulary shared between configuration and the engine crate's
//! `SpoilPolicy`/`OrphanHandler` components.

use serde::{Deserialize, Serialize};

/// Action a `SpoiledReferenceStrategizer` can take on a bad terminal reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoilAction {
    /// Leave the reference (and any cached entry) alone.
    Ignore,
    /// Delete the cached entry, if any.
    Delete,
    /// Tolerate one bad run; delete on the next consecutive bad run.
    GraceOnce,
}

impl Default for SpoilAction {
    fn default() -> Self {
        SpoilAction::Delete
    }
}

/// Strategy for cache entries never re-encountered this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanStrategy {
    /// Log the orphan count and leave the cache as-is.
    Ignore,
    /// Re-queue orphans through the normal pipeline (fetch, import, commit).
    Process,
    /// Enqueue orphans directly for deletion, bypassing fetch/import.
    Delete,
}

impl Default for OrphanStrategy {
    fn default() -> Self {
        OrphanStrategy::Ignore
    }
}
