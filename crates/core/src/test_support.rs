// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::event::StoreEvent;
use crate::reference::{Reference, ReferenceState};

// ── Reference factory functions ─────────────────────────────────────────────

pub fn seed_reference(key: &str) -> Reference {
    Reference::seed(key)
}

pub fn new_reference(key: &str) -> Reference {
    let mut r = Reference::seed(key);
    r.state = Some(ReferenceState::New);
    r
}

pub fn unmodified_reference(key: &str, checksum: &str) -> Reference {
    let mut r = Reference::seed(key);
    r.state = Some(ReferenceState::Unmodified);
    r.content_checksum = Some(checksum.to_string());
    r
}

pub fn bad_status_reference(key: &str) -> Reference {
    let mut r = Reference::seed(key);
    r.state = Some(ReferenceState::BadStatus);
    r
}

pub fn deleted_reference(key: &str) -> Reference {
    let mut r = Reference::seed(key);
    r.state = Some(ReferenceState::Deleted);
    r
}

pub fn embedded_reference(key: &str, parent: &str) -> Reference {
    Reference::embedded(key, parent)
}

// ── StoreEvent factory functions ────────────────────────────────────────────

pub fn queued_event(key: &str) -> StoreEvent {
    StoreEvent::Queued {
        reference: seed_reference(key),
    }
}

pub fn dequeued_event(key: &str) -> StoreEvent {
    StoreEvent::Dequeued { key: key.to_string() }
}

pub fn processed_event(key: &str, state: ReferenceState) -> StoreEvent {
    let mut reference = Reference::seed(key);
    reference.state = Some(state);
    StoreEvent::Processed { reference }
}

pub fn resume_requeued_event(keys: &[&str]) -> StoreEvent {
    StoreEvent::ResumeRequeued {
        keys: keys.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn fresh_start_event(carried: Vec<Reference>) -> StoreEvent {
    StoreEvent::FreshStart {
        carried_cache: carried,
    }
}

// ── Proptest strategies ─────────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::reference::ReferenceState;
    use proptest::prelude::*;

    pub fn arb_reference_state() -> impl Strategy<Value = ReferenceState> {
        prop_oneof![
            Just(ReferenceState::New),
            Just(ReferenceState::Modified),
            Just(ReferenceState::Unmodified),
            Just(ReferenceState::Rejected),
            Just(ReferenceState::Deleted),
            Just(ReferenceState::Error),
            Just(ReferenceState::BadStatus),
            Just(ReferenceState::NotFound),
        ]
    }
}
