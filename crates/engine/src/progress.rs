// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sampled progress reporter. Recomputed on every reference completion,
//! logged at most once per five seconds regardless of how often it is
//! recomputed.

use crawl_core::Clock;
use crawl_storage::CrawlStore;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

const LOG_INTERVAL: Duration = Duration::from_secs(5);

pub struct ProgressReporter<C: Clock> {
    clock: C,
    last_logged: Mutex<Option<Instant>>,
}

impl<C: Clock> ProgressReporter<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last_logged: Mutex::new(None),
        }
    }

    /// Recompute `processed / (processed + queued)`, four-decimal truncated,
    /// and log it if the throttle interval has elapsed. Eventually
    /// consistent with the store rather than locked in step with it.
    pub fn record(&self, store: &CrawlStore) {
        let processed = store.processed_count();
        let queued = store.queued_count();
        let denom = processed + queued;
        if denom == 0 {
            return;
        }
        let now = self.clock.now();
        let mut last = self.last_logged.lock();
        let should_log = match *last {
            Some(t) => now.duration_since(t) >= LOG_INTERVAL,
            None => true,
        };
        if !should_log {
            return;
        }
        *last = Some(now);
        let progress = (processed as f64 / denom as f64 * 10_000.0).trunc() / 10_000.0;
        tracing::info!(progress, processed, queued, "crawl progress");
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
