// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fetcher collaborator interface. Invoked from within the importer
//! pipeline, never directly by the engine.

use crate::document::Document;
use crawl_core::Reference;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch failed for '{reference}': {message}")]
    Failed { reference: String, message: String },
}

/// Outcome of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub document: Document,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, reference: &Reference) -> Result<FetchResponse, FetchError>;
}

/// In-memory fetcher for tests: returns a canned response per reference key.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeFetcher {
    responses: parking_lot::Mutex<HashMap<String, Result<FetchResponse, String>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, key: &str, response: FetchResponse) -> Self {
        self.responses.lock().insert(key.to_string(), Ok(response));
        self
    }

    pub fn with_error(self, key: &str, message: &str) -> Self {
        self.responses
            .lock()
            .insert(key.to_string(), Err(message.to_string()));
        self
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait::async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, reference: &Reference) -> Result<FetchResponse, FetchError> {
        match self.responses.lock().get(&reference.reference) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(FetchError::Failed {
                reference: reference.reference.clone(),
                message: message.clone(),
            }),
            None => Ok(FetchResponse {
                status: 404,
                document: Document::new_empty(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
