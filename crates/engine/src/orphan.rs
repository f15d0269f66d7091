// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`OrphanHandler`]: second-phase treatment of cache entries never
//! re-encountered this run.

use crate::error::EngineError;
use crate::scheduler::Scheduler;
use crawl_adapters::{CrawlerHooks, PipelineContext};
use crawl_core::{Clock, OrphanStrategy};
use crawl_storage::CrawlStore;
use std::sync::Arc;

pub struct OrphanHandler {
    crawler_id: String,
    store: Arc<CrawlStore>,
    strategy: OrphanStrategy,
    max_documents: u64,
    hooks: Arc<dyn CrawlerHooks>,
}

impl OrphanHandler {
    pub fn new(
        crawler_id: String,
        store: Arc<CrawlStore>,
        strategy: OrphanStrategy,
        max_documents: u64,
        hooks: Arc<dyn CrawlerHooks>,
    ) -> Self {
        Self {
            crawler_id,
            store,
            strategy,
            max_documents,
            hooks,
        }
    }

    /// Sweep remaining `cached` entries according to the configured
    /// strategy, invoking `scheduler` again for PROCESS/DELETE.
    pub async fn sweep<C: Clock + 'static>(&self, scheduler: &Scheduler<C>) -> Result<(), EngineError> {
        match self.strategy {
            OrphanStrategy::Ignore => {
                tracing::info!(
                    count = self.store.cached_snapshot().len(),
                    "ignoring orphaned cache entries"
                );
                Ok(())
            }
            OrphanStrategy::Process => {
                if self.max_documents > 0 && self.store.processed_count() as u64 >= self.max_documents {
                    tracing::info!("max documents reached, skipping orphan processing");
                    return Ok(());
                }
                let ctx = PipelineContext::new(&self.crawler_id);
                for reference in self.store.cached_snapshot() {
                    if let Some(reference) = self.hooks.queue_pipeline(&ctx, reference) {
                        self.store.queue(reference)?;
                    }
                }
                scheduler.run(false).await
            }
            OrphanStrategy::Delete => {
                for reference in self.store.cached_snapshot() {
                    self.store.queue(reference)?;
                }
                scheduler.run(true).await
            }
        }
    }
}

#[cfg(test)]
#[path = "orphan_tests.rs"]
mod tests;
