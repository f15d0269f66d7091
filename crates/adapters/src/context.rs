// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit per-reference pipeline context.
//!
//! There is no global thread-local "current crawler" accessor — every
//! collaborator that needs crawler identity or flags receives it explicitly
//! through this context, threaded by the caller.

use crawl_core::Reference;

/// Identity and run-wide flags a pipeline stage needs, without reaching for
/// ambient/global state.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub crawler_id: String,
    /// True when this pass is a delete-mode sweep (orphan DELETE strategy or
    /// an explicit `clean`): every reference is routed to deletion without
    /// fetch/import.
    pub delete_mode: bool,
    /// True when this reference was enqueued by the orphan handler rather
    /// than discovered during the normal crawl.
    pub orphan: bool,
    /// True the first time this reference's key has ever been seen (no
    /// cached entry existed at dequeue time).
    pub is_new_crawl: bool,
}

impl PipelineContext {
    pub fn new(crawler_id: impl Into<String>) -> Self {
        Self {
            crawler_id: crawler_id.into(),
            delete_mode: false,
            orphan: false,
            is_new_crawl: true,
        }
    }

    pub fn for_reference(crawler_id: &str, cached: Option<&Reference>, delete_mode: bool) -> Self {
        Self {
            crawler_id: crawler_id.to_string(),
            delete_mode,
            orphan: false,
            is_new_crawl: cached.is_none(),
        }
    }
}
