// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay.
//!
//! [`MaterializedStore`] holds the five disjoint Reference partitions and
//! knows how to fold a [`StoreEvent`] into itself. It does not decide *which*
//! key to dequeue or *when* to checkpoint — that orchestration lives in
//! [`crate::store::CrawlStore`]. Folding the same event twice is a no-op,
//! which is what makes WAL replay after a crash mid-append safe.

use crawl_core::{Reference, StoreEvent};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The five disjoint reference partitions, plus the fold logic that keeps
/// them consistent with each other.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedStore {
    /// Insertion-ordered so `nextQueued` can take a FIFO head.
    #[serde(default)]
    pub queued: IndexMap<String, Reference>,
    #[serde(default)]
    pub active: IndexMap<String, Reference>,
    #[serde(default)]
    pub processed_valid: HashMap<String, Reference>,
    #[serde(default)]
    pub processed_invalid: HashMap<String, Reference>,
    #[serde(default)]
    pub cached: HashMap<String, Reference>,
}

impl MaterializedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single persisted transition. Idempotent: replaying the same
    /// event twice leaves the store in the same state as replaying it once.
    pub fn apply_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::Queued { reference } => {
                self.queued
                    .insert(reference.reference.clone(), reference.copy());
            }

            StoreEvent::Dequeued { key } => {
                if let Some(reference) = self.queued.shift_remove(key) {
                    self.active.insert(key.clone(), reference);
                }
            }

            StoreEvent::Processed { reference } => {
                let key = reference.reference.clone();
                self.active.shift_remove(&key);
                self.cached.remove(&key);
                if reference.belongs_in_processed_valid() {
                    self.processed_valid.insert(key, reference.copy());
                } else {
                    self.processed_invalid.insert(key, reference.copy());
                }
            }

            StoreEvent::ResumeRequeued { keys } => {
                for key in keys {
                    if let Some(reference) = self.active.shift_remove(key) {
                        self.queued.insert(key.clone(), reference);
                    }
                }
            }

            StoreEvent::FreshStart { carried_cache } => {
                self.queued.clear();
                self.active.clear();
                self.processed_invalid.clear();
                self.processed_valid.clear();
                self.cached.clear();
                for reference in carried_cache {
                    self.cached.insert(reference.reference.clone(), reference.copy());
                }
            }
        }
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn processed_count(&self) -> usize {
        self.processed_valid.len() + self.processed_invalid.len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn is_cache_empty(&self) -> bool {
        self.cached.is_empty()
    }

    pub fn get_cached(&self, key: &str) -> Option<&Reference> {
        self.cached.get(key)
    }

    /// FIFO head of `queued`, without removing it.
    pub fn peek_queued(&self) -> Option<&Reference> {
        self.queued.first().map(|(_, v)| v)
    }

    pub fn cached_iterable(&self) -> impl Iterator<Item = &Reference> {
        self.cached.values()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
