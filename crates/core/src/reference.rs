// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference identity and state-machine types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of processing a single reference through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceState {
    /// Never seen before this run.
    New,
    /// Seen in a prior run but its content has changed.
    Modified,
    /// Seen in a prior run; checksum resolution found no change.
    Unmodified,
    /// The importer rejected it (filter, unmodified short-circuit, or failure).
    Rejected,
    /// Expelled from the store (orphan sweep or spoil policy DELETE).
    Deleted,
    /// An uncaught exception occurred while processing.
    Error,
    /// The fetch returned a non-success status.
    BadStatus,
    /// The fetch reported the resource does not exist.
    NotFound,
}

impl ReferenceState {
    /// New, Modified, or Unmodified: the crawl learned something useful
    /// about this reference rather than merely failing to process it.
    pub fn is_new_or_modified(&self) -> bool {
        matches!(self, ReferenceState::New | ReferenceState::Modified)
    }

    /// New, Modified, or Unmodified: a "good" terminal outcome that should
    /// seed next run's cache.
    pub fn is_good_state(&self) -> bool {
        matches!(
            self,
            ReferenceState::New | ReferenceState::Modified | ReferenceState::Unmodified
        )
    }

    /// True once a reference has been removed from the crawl's corpus,
    /// regardless of the spoil policy that led here.
    pub fn is_deleted(&self) -> bool {
        matches!(self, ReferenceState::Deleted)
    }

    /// A good state or a completed deletion: the outcomes that belong in
    /// `processedValid` rather than `processedInvalid`. A `Deleted`
    /// reference isn't "good" (nothing new was learned about it) but it's
    /// not a failure either — it was successfully removed.
    pub fn belongs_in_processed_valid(&self) -> bool {
        self.is_good_state() || self.is_deleted()
    }
}

impl fmt::Display for ReferenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceState::New => "new",
            ReferenceState::Modified => "modified",
            ReferenceState::Unmodified => "unmodified",
            ReferenceState::Rejected => "rejected",
            ReferenceState::Deleted => "deleted",
            ReferenceState::Error => "error",
            ReferenceState::BadStatus => "bad_status",
            ReferenceState::NotFound => "not_found",
        };
        write!(f, "{s}")
    }
}

/// The unit of work tracked by a [`crate::clock::Clock`]-driven crawl: a stable
/// identity string plus the state accumulated about it across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Stable string identity; the CrawlStore partition key.
    pub reference: String,
    /// The top-level reference this one was discovered from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_root_reference: Option<String>,
    pub is_root_parent_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ReferenceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_date: Option<u64>,
}

impl Reference {
    /// A fresh root reference (as produced by a seed loader), with no state yet.
    pub fn seed(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            parent_root_reference: None,
            is_root_parent_reference: true,
            state: None,
            meta_checksum: None,
            content_checksum: None,
            content_type: None,
            crawl_date: None,
        }
    }

    /// An embedded (child) reference discovered while processing `parent`.
    pub fn embedded(reference: impl Into<String>, parent_root_reference: &str) -> Self {
        Self {
            reference: reference.into(),
            parent_root_reference: Some(parent_root_reference.to_string()),
            is_root_parent_reference: false,
            state: None,
            meta_checksum: None,
            content_checksum: None,
            content_type: None,
            crawl_date: None,
        }
    }

    /// A cheap, explicit defensive copy — this is a plain struct, so `Clone`
    /// already is the cheap copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// True if `state` is a good terminal state (see [`ReferenceState::is_good_state`]).
    /// A reference with no state yet is treated as not-good.
    pub fn is_good_state(&self) -> bool {
        self.state.is_some_and(|s| s.is_good_state())
    }

    pub fn is_new_or_modified(&self) -> bool {
        self.state.is_some_and(|s| s.is_new_or_modified())
    }

    /// See [`ReferenceState::belongs_in_processed_valid`]. A reference with
    /// no state yet is treated as not belonging there.
    pub fn belongs_in_processed_valid(&self) -> bool {
        self.state.is_some_and(|s| s.belongs_in_processed_valid())
    }

    /// Copy-over-nulls: fields unset on `self` are filled in from `cached`.
    /// Used by `finalize` to preserve prior metadata on unmodified/skipped
    /// references.
    pub fn fill_from_cached(&mut self, cached: &Reference) {
        if self.meta_checksum.is_none() {
            self.meta_checksum = cached.meta_checksum.clone();
        }
        if self.content_checksum.is_none() {
            self.content_checksum = cached.content_checksum.clone();
        }
        if self.content_type.is_none() {
            self.content_type = cached.content_type.clone();
        }
        if self.crawl_date.is_none() {
            self.crawl_date = cached.crawl_date;
        }
    }
}

#[cfg(test)]
#[path = "reference_tests.rs"]
mod tests;
