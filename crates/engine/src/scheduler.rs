// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Scheduler`]: the worker pool that drives references from the queue
//! through the [`crate::pipeline::PipelineDriver`] to a terminal state.

use crate::error::EngineError;
use crate::pipeline::PipelineDriver;
use crawl_core::Clock;
use crawl_storage::CrawlStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Outcome {
    MoreWork,
    NoMoreWork,
}

pub struct Scheduler<C: Clock> {
    store: Arc<CrawlStore>,
    driver: Arc<PipelineDriver<C>>,
    workers: usize,
    max_documents: u64,
    stop: Arc<AtomicBool>,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(
        store: Arc<CrawlStore>,
        driver: Arc<PipelineDriver<C>>,
        workers: usize,
        max_documents: u64,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            driver,
            workers,
            max_documents,
            stop,
        }
    }

    /// Set the stop flag: in-flight references complete, no new ones are
    /// dequeued, and `run` returns once every worker has exited. Idempotent.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Spawn `workers` tasks and await them all via a join barrier. Any
    /// worker error (store failure, fatal exception, join failure) stops the
    /// whole crawl and is returned as the first such error observed.
    pub async fn run(&self, delete_mode: bool) -> Result<(), EngineError> {
        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let store = self.store.clone();
            let driver = self.driver.clone();
            let stop = self.stop.clone();
            let max_documents = self.max_documents;
            handles.push(tokio::spawn(async move {
                Self::worker_loop(worker_id, store, driver, stop, max_documents, delete_mode).await
            }));
        }

        let mut first_err = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.stop();
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Err(join_err) => {
                    self.stop();
                    if first_err.is_none() {
                        first_err = Some(EngineError::WorkerJoin(join_err.to_string()));
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn worker_loop(
        worker_id: usize,
        store: Arc<CrawlStore>,
        driver: Arc<PipelineDriver<C>>,
        stop: Arc<AtomicBool>,
        max_documents: u64,
        delete_mode: bool,
    ) -> Result<(), EngineError> {
        loop {
            if stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            match Self::process_one(&store, &driver, max_documents, delete_mode).await {
                Ok(Outcome::MoreWork) => continue,
                Ok(Outcome::NoMoreWork) => return Ok(()),
                Err(e) => {
                    // An error that escapes processing a single reference is
                    // treated as stability-compromising: it stops the whole crawl.
                    tracing::error!(worker = worker_id, error = %e, "worker stopping crawl");
                    return Err(e);
                }
            }
        }
    }

    async fn process_one(
        store: &CrawlStore,
        driver: &PipelineDriver<C>,
        max_documents: u64,
        delete_mode: bool,
    ) -> Result<Outcome, EngineError> {
        if !delete_mode && max_documents > 0 && store.processed_count() as u64 >= max_documents {
            return Ok(Outcome::NoMoreWork);
        }

        match store.next_queued()? {
            Some(reference) => {
                if delete_mode {
                    driver.delete_reference(reference).await?;
                } else {
                    driver.process(reference).await?;
                }
                Ok(Outcome::MoreWork)
            }
            None => {
                if store.active_count() > 0 || !store.is_queue_empty() {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok(Outcome::MoreWork)
                } else {
                    Ok(Outcome::NoMoreWork)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
