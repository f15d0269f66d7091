// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log event vocabulary driving [`crate::reference::Reference`]
//! partition transitions. These are persisted, replayed-on-resume events —
//! distinct from the ephemeral [`crate::notification::CrawlEvent`] stream
//! the engine's event bus fires for listeners.

use crate::reference::Reference;
use serde::{Deserialize, Serialize};

/// A single persisted partition transition. Applying the same event twice
/// must be a no-op (idempotent replay after a crash mid-append).
///
/// Serializes as `{"type": "store:queued", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// A reference was inserted into `queued` (or its non-key fields were
    /// refreshed, if already present).
    #[serde(rename = "store:queued")]
    Queued { reference: Reference },

    /// `nextQueued` moved a reference from `queued` into `active`.
    #[serde(rename = "store:dequeued")]
    Dequeued { key: String },

    /// `processed` moved a reference out of `active`/`cached` into exactly
    /// one of `processedValid`/`processedInvalid`, keyed off `reference.state`.
    #[serde(rename = "store:processed")]
    Processed { reference: Reference },

    /// Start-of-run reconciliation (resume path, invariant 5): every entry
    /// found in `active` at open() time is moved back to `queued`.
    #[serde(rename = "store:resume_requeued")]
    ResumeRequeued { keys: Vec<String> },

    /// Start-of-run reconciliation (fresh path, invariant 4): `queued`,
    /// `active`, `cached`, and `processedInvalid` are cleared; `processedValid`
    /// is drained (filtered to good states) into the new `cached`.
    #[serde(rename = "store:fresh_start")]
    FreshStart { carried_cache: Vec<Reference> },
}

impl StoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::Queued { .. } => "store:queued",
            StoreEvent::Dequeued { .. } => "store:dequeued",
            StoreEvent::Processed { .. } => "store:processed",
            StoreEvent::ResumeRequeued { .. } => "store:resume_requeued",
            StoreEvent::FreshStart { .. } => "store:fresh_start",
        }
    }

    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            StoreEvent::Queued { reference } => format!("{t} key={}", reference.reference),
            StoreEvent::Dequeued { key } => format!("{t} key={key}"),
            StoreEvent::Processed { reference } => format!(
                "{t} key={} state={:?}",
                reference.reference, reference.state
            ),
            StoreEvent::ResumeRequeued { keys } => format!("{t} count={}", keys.len()),
            StoreEvent::FreshStart { carried_cache } => {
                format!("{t} carried={}", carried_cache.len())
            }
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
