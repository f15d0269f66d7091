// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error kinds. Store failures are fatal. Per-reference
//! fetch/import/commit failures never surface here — the pipeline driver
//! catches them and maps them to an `ERROR` reference state — unless they
//! match the configured `stop_on_exceptions` list, in which case they are
//! re-thrown as [`EngineError::FatalException`] after the reference finalizes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] crawl_storage::StoreError),

    #[error(transparent)]
    Config(#[from] crawl_core::ConfigError),

    #[error("crawl stopped: fatal exception while processing '{reference}': {message}")]
    FatalException { reference: String, message: String },

    #[error("worker pool join failed: {0}")]
    WorkerJoin(String),
}

