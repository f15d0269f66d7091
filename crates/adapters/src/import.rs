// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ImporterPipeline collaborator interface.

use crate::context::PipelineContext;
use crate::document::Document;
use crate::fetch::Fetcher;
use crate::link_extractor::LinkExtractor;
use crawl_core::Reference;
use std::collections::HashMap;

/// Result of importing one reference. `nested` carries child references
/// discovered during import (e.g. attachments), each paired with its own
/// already-resolved response — the driver processes these recursively within
/// the current worker rather than re-queuing them.
#[derive(Debug, Clone)]
pub struct ImporterResponse {
    pub document: Document,
    pub success: bool,
    pub status_description: String,
    pub nested: Vec<(String, ImporterResponse)>,
}

impl ImporterResponse {
    pub fn success(document: Document) -> Self {
        Self {
            document,
            success: true,
            status_description: "ok".to_string(),
            nested: Vec::new(),
        }
    }

    pub fn failure(status_description: impl Into<String>) -> Self {
        Self {
            document: Document::new_empty(),
            success: false,
            status_description: status_description.into(),
            nested: Vec::new(),
        }
    }

    pub fn with_nested(mut self, key: impl Into<String>, response: ImporterResponse) -> Self {
        self.nested.push((key.into(), response));
        self
    }
}

#[async_trait::async_trait]
pub trait ImporterPipeline: Send + Sync {
    /// Returns `None` when the reference is filtered out before any fetch
    /// attempt is made (e.g. scope/robots exclusion).
    async fn import(
        &self,
        ctx: &PipelineContext,
        reference: &Reference,
        cached: Option<&Reference>,
        document: Document,
    ) -> Option<ImporterResponse>;
}

/// Composes a [`Fetcher`] and [`LinkExtractor`] into the full importer
/// contract: fetch the resource, map its status to success/failure, and
/// surface extracted links as nested references for the driver to recurse
/// into. Status-code classification (not-found vs. bad-status) is left to
/// the driver via `status_description`.
pub struct DefaultImporter<F, L> {
    fetcher: F,
    link_extractor: L,
}

impl<F: Fetcher, L: LinkExtractor> DefaultImporter<F, L> {
    pub fn new(fetcher: F, link_extractor: L) -> Self {
        Self {
            fetcher,
            link_extractor,
        }
    }
}

#[async_trait::async_trait]
impl<F: Fetcher, L: LinkExtractor> ImporterPipeline for DefaultImporter<F, L> {
    async fn import(
        &self,
        _ctx: &PipelineContext,
        reference: &Reference,
        _cached: Option<&Reference>,
        _document: Document,
    ) -> Option<ImporterResponse> {
        let fetched = match self.fetcher.fetch(reference).await {
            Ok(response) => response,
            Err(err) => return Some(ImporterResponse::failure(err.to_string())),
        };

        if !fetched.is_success() {
            let description = if fetched.is_not_found() {
                "not_found"
            } else {
                "bad_status"
            };
            return Some(ImporterResponse::failure(format!(
                "{description}:{}",
                fetched.status
            )));
        }

        let links = self.link_extractor.extract(&fetched.document);
        let mut response = ImporterResponse::success(fetched.document);
        for link in links {
            response = response.with_nested(
                link.reference.clone(),
                ImporterResponse::success(Document::new_empty()),
            );
        }
        Some(response)
    }
}

/// In-memory importer for tests: returns a canned response (or `None`) per
/// reference key.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeImporter {
    responses: parking_lot::Mutex<HashMap<String, Option<ImporterResponse>>>,
    calls: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, key: &str, response: ImporterResponse) -> Self {
        self.responses.lock().insert(key.to_string(), Some(response));
        self
    }

    pub fn with_filtered(self, key: &str) -> Self {
        self.responses.lock().insert(key.to_string(), None);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait::async_trait]
impl ImporterPipeline for FakeImporter {
    async fn import(
        &self,
        _ctx: &PipelineContext,
        reference: &Reference,
        _cached: Option<&Reference>,
        _document: Document,
    ) -> Option<ImporterResponse> {
        self.calls.lock().push(reference.reference.clone());
        match self.responses.lock().get(&reference.reference) {
            Some(response) => response.clone(),
            None => Some(ImporterResponse::success(Document::new_empty())),
        }
    }
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
