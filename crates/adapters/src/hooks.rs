// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CrawlerHooks capability interface.
//!
//! The engine used to reach for per-crawler subclassing at a handful of
//! extension points (`beforeFinalize`, `markReferenceVariationsAsProcessed`,
//! the orphan sweep's `executeQueuePipeline`). Rather than thread a subclass
//! hierarchy through the engine, those extension points are collected here as
//! one capability interface the engine holds as `Arc<dyn CrawlerHooks>` and
//! calls with an explicit [`PipelineContext`] — no implicit "current crawler".
//! All methods default to a no-op so most embedders never implement this.

use crate::context::PipelineContext;
use crawl_core::Reference;

pub trait CrawlerHooks: Send + Sync {
    /// Called from `finalize`, just before copy-over-nulls and spoil
    /// handling. May mutate the reference (e.g. to stamp extra metadata).
    fn before_finalize(&self, _ctx: &PipelineContext, _reference: &mut Reference) {}

    /// Called from `finalize`, after `store.processed(ref)` has succeeded.
    /// Typically used to mark URL canonical aliases or other variations of
    /// this reference as processed too.
    fn mark_variations_processed(&self, _ctx: &PipelineContext, _reference: &Reference) {}

    /// Called by the orphan handler's `PROCESS` strategy for each cached
    /// reference before it's re-queued. Returning `None` drops the
    /// reference (filtered or deduped away); returning `Some` re-queues it,
    /// possibly modified.
    fn queue_pipeline(&self, _ctx: &PipelineContext, reference: Reference) -> Option<Reference> {
        Some(reference)
    }
}

/// The default: every hook is a no-op and `queue_pipeline` passes its
/// reference through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCrawlerHooks;

impl CrawlerHooks for NoOpCrawlerHooks {}

/// Records every hook invocation for assertions in tests. `queue_pipeline`
/// drops any reference whose key is in `drop_keys`.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct RecordingHooks {
    pub before_finalize_calls: parking_lot::Mutex<Vec<String>>,
    pub mark_variations_calls: parking_lot::Mutex<Vec<String>>,
    pub queue_pipeline_calls: parking_lot::Mutex<Vec<String>>,
    pub drop_keys: Vec<String>,
}

#[cfg(any(test, feature = "test-support"))]
impl CrawlerHooks for RecordingHooks {
    fn before_finalize(&self, _ctx: &PipelineContext, reference: &mut Reference) {
        self.before_finalize_calls
            .lock()
            .push(reference.reference.clone());
    }

    fn mark_variations_processed(&self, _ctx: &PipelineContext, reference: &Reference) {
        self.mark_variations_calls
            .lock()
            .push(reference.reference.clone());
    }

    fn queue_pipeline(&self, _ctx: &PipelineContext, reference: Reference) -> Option<Reference> {
        self.queue_pipeline_calls
            .lock()
            .push(reference.reference.clone());
        if self.drop_keys.contains(&reference.reference) {
            None
        } else {
            Some(reference)
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
