// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CommitterPipeline collaborator interface.

use crate::context::PipelineContext;
use crate::document::Document;
use crawl_core::Reference;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("commit add failed for '{reference}': {message}")]
    Add { reference: String, message: String },
    #[error("commit remove failed for '{reference}': {message}")]
    Remove { reference: String, message: String },
    #[error("commit finalize failed: {message}")]
    Finalize { message: String },
}

/// The destination side of the pipeline: persists accepted documents and
/// removes deleted ones. `commit` is called once per worker batch to flush
/// any buffering the implementation does internally.
#[async_trait::async_trait]
pub trait CommitterPipeline: Send + Sync {
    async fn add(
        &self,
        ctx: &PipelineContext,
        reference: &Reference,
        document: &Document,
    ) -> Result<(), CommitError>;

    async fn remove(&self, ctx: &PipelineContext, reference: &Reference) -> Result<(), CommitError>;

    async fn commit(&self, ctx: &PipelineContext) -> Result<(), CommitError>;
}

/// Records every call for test assertions instead of persisting anything.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeCommitter {
    added: parking_lot::Mutex<Vec<String>>,
    removed: parking_lot::Mutex<Vec<String>>,
    commits: parking_lot::Mutex<u64>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeCommitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added(&self) -> Vec<String> {
        self.added.lock().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().clone()
    }

    pub fn commit_count(&self) -> u64 {
        *self.commits.lock()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait::async_trait]
impl CommitterPipeline for FakeCommitter {
    async fn add(
        &self,
        _ctx: &PipelineContext,
        reference: &Reference,
        _document: &Document,
    ) -> Result<(), CommitError> {
        self.added.lock().push(reference.reference.clone());
        Ok(())
    }

    async fn remove(&self, _ctx: &PipelineContext, reference: &Reference) -> Result<(), CommitError> {
        self.removed.lock().push(reference.reference.clone());
        Ok(())
    }

    async fn commit(&self, _ctx: &PipelineContext) -> Result<(), CommitError> {
        *self.commits.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "commit_tests.rs"]
mod tests;
