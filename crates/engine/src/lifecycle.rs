// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`LifecycleController`]: init / run / stop / clean / export / import,
//! resume detection. The top-level object a CLI (or any embedder) drives.

use crate::error::EngineError;
use crate::orphan::OrphanHandler;
use crate::pipeline::PipelineDriver;
use crate::progress::ProgressReporter;
use crate::scheduler::Scheduler;
use crawl_adapters::{
    CommitterPipeline, CrawlerHooks, DocumentChecksummer, ImporterPipeline, PipelineContext,
    SpoiledReferenceStrategizer,
};
use crawl_core::{
    format_elapsed, Clock, CrawlConfig, CrawlEvent, EventBus, IdGen, Reference, ReferenceState,
    ShortId, SpoilAction, UuidIdGen,
};
use crawl_storage::{CrawlStore, StoreError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// The default spoil dispatch, with the catch-all fallback taken from
/// configuration instead of hardcoded to `DELETE`.
struct ConfiguredSpoilPolicy {
    fallback: SpoilAction,
}

impl SpoiledReferenceStrategizer for ConfiguredSpoilPolicy {
    fn resolve(&self, state: ReferenceState) -> SpoilAction {
        match state {
            ReferenceState::NotFound => SpoilAction::Delete,
            ReferenceState::BadStatus => SpoilAction::GraceOnce,
            ReferenceState::Error => SpoilAction::Ignore,
            _ => self.fallback,
        }
    }
}

pub struct LifecycleController<C: Clock = crawl_core::SystemClock> {
    config: CrawlConfig,
    bus: Arc<EventBus>,
    store: Arc<CrawlStore>,
    committer: Arc<dyn CommitterPipeline>,
    scheduler: Scheduler<C>,
    clock: C,
    run_id: String,
    hooks: Arc<dyn CrawlerHooks>,
}

impl<C: Clock + 'static> LifecycleController<C> {
    /// Open the store (performing crash recovery and resume reconciliation),
    /// wire the pipeline driver and scheduler, and report whether this run
    /// is resuming prior work.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        config: CrawlConfig,
        bus: Arc<EventBus>,
        clock: C,
        importer: Arc<dyn ImporterPipeline>,
        committer: Arc<dyn CommitterPipeline>,
        checksummer: Arc<dyn DocumentChecksummer>,
        hooks: Arc<dyn CrawlerHooks>,
        resume: bool,
    ) -> Result<(Self, bool), EngineError> {
        let run_id = UuidIdGen.next();
        bus.fire(CrawlEvent::CrawlerInitBegin);
        tracing::info!(run_id = %run_id.short(8), crawler_id = %config.crawler_id, "initializing crawler");

        let (store, resuming) = CrawlStore::open(&config.store_dir(), resume)?;
        let store = Arc::new(store);

        let spoil_policy = Arc::new(ConfiguredSpoilPolicy {
            fallback: config.spoil_action,
        });
        let progress = Arc::new(ProgressReporter::new(clock.clone()));
        let driver = Arc::new(PipelineDriver::new(
            config.crawler_id.clone(),
            store.clone(),
            bus.clone(),
            importer,
            committer.clone(),
            checksummer,
            spoil_policy,
            progress,
            config.stop_on_exceptions.clone(),
            hooks.clone(),
        ));

        let stop_flag = Arc::new(AtomicBool::new(false));
        let scheduler = Scheduler::new(
            store.clone(),
            driver,
            config.workers,
            config.max_documents,
            stop_flag,
        );

        bus.fire(CrawlEvent::CrawlerInitEnd);
        let controller = Self {
            config,
            bus,
            store,
            committer,
            scheduler,
            clock,
            run_id,
            hooks,
        };
        Ok((controller, resuming))
    }

    /// Queue seed references (by key) ahead of a `run()`; idempotent with
    /// any reference already tracked by the store.
    pub fn seed(&self, references: impl IntoIterator<Item = Reference>) -> Result<(), StoreError> {
        for reference in references {
            self.store.queue(reference)?;
        }
        Ok(())
    }

    /// Run the main reference pass, then (if not stopped) the orphan sweep,
    /// then call `committer.commit()` exactly once: it touches a shared
    /// resource, so it must never run once per worker.
    pub async fn run(&self) -> Result<(), EngineError> {
        let started_at = self.clock.now();
        self.bus.fire(CrawlEvent::CrawlerRunBegin);

        let mut result = self.scheduler.run(false).await;
        if result.is_ok() && !self.scheduler.is_stopped() {
            let orphan = OrphanHandler::new(
                self.config.crawler_id.clone(),
                self.store.clone(),
                self.config.orphan_strategy,
                self.config.max_documents,
                self.hooks.clone(),
            );
            result = orphan.sweep(&self.scheduler).await;
        }

        let ctx = PipelineContext::new(&self.config.crawler_id);
        let commit_result = self.committer.commit(&ctx).await;
        self.bus.fire(CrawlEvent::CrawlerRunEnd);

        let elapsed = self.clock.now().saturating_duration_since(started_at);
        tracing::info!(
            run_id = %self.run_id.short(8),
            processed = self.store.processed_count(),
            elapsed = %format_elapsed(elapsed.as_secs()),
            "crawler run finished"
        );

        result?;
        commit_result.map_err(|e| EngineError::FatalException {
            reference: String::new(),
            message: e.to_string(),
        })
    }

    /// Cooperative stop: in-flight references finish, no more are dequeued.
    /// Idempotent.
    pub fn stop(&self) {
        self.bus.fire(CrawlEvent::CrawlerStopBegin);
        self.scheduler.stop();
        self.bus.fire(CrawlEvent::CrawlerStopEnd);
    }

    /// Destructively remove every reference still known to the store
    /// (cached and queued) via a delete-mode pass.
    pub async fn clean(&self) -> Result<(), EngineError> {
        self.bus.fire(CrawlEvent::CrawlerCleanBegin);
        for reference in self.store.cached_snapshot() {
            self.store.queue(reference)?;
        }
        let result = self.scheduler.run(true).await;
        self.bus.fire(CrawlEvent::CrawlerCleanEnd);
        result
    }

    pub fn close(&self) -> Result<(), EngineError> {
        Ok(self.store.close()?)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
