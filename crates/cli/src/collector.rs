// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bundled minimal filesystem collector.
//!
//! The engine crate is fetch-protocol agnostic; a concrete collector plugs in
//! a [`Fetcher`], [`LinkExtractor`], and [`CommitterPipeline`]. This module is
//! the CLI's own instantiation: references are paths relative to the
//! crawler's work directory, fetched straight off disk, and accepted
//! documents are committed under `<crawlerRoot>/downloads/`. No markup is
//! parsed, so this collector never discovers embedded references.

use crawl_adapters::{
    CommitError, CommitterPipeline, Document, DocumentChecksummer, ExtractedLink, FetchError,
    FetchResponse, Fetcher, LinkExtractor, PipelineContext,
};
use crawl_core::Reference;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

pub struct FilesystemFetcher {
    root: PathBuf,
}

impl FilesystemFetcher {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait::async_trait]
impl Fetcher for FilesystemFetcher {
    async fn fetch(&self, reference: &Reference) -> Result<FetchResponse, FetchError> {
        let path = self.root.join(&reference.reference);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(FetchResponse {
                status: 200,
                document: Document::with_content(content, "application/octet-stream"),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                document: Document::new_empty(),
            }),
            Err(err) => Err(FetchError::Failed {
                reference: reference.reference.clone(),
                message: err.to_string(),
            }),
        }
    }
}

pub struct NullLinkExtractor;

impl LinkExtractor for NullLinkExtractor {
    fn extract(&self, _document: &Document) -> Vec<ExtractedLink> {
        Vec::new()
    }
}

/// Writes accepted documents under `downloads_dir`, keyed by a filesystem-safe
/// rendering of the reference. Deletes the same file on `remove`.
pub struct FilesystemCommitter {
    downloads_dir: PathBuf,
}

impl FilesystemCommitter {
    pub fn new(downloads_dir: PathBuf) -> Self {
        Self { downloads_dir }
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        let safe: String = reference
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.downloads_dir.join(safe)
    }
}

#[async_trait::async_trait]
impl CommitterPipeline for FilesystemCommitter {
    async fn add(
        &self,
        _ctx: &PipelineContext,
        reference: &Reference,
        document: &Document,
    ) -> Result<(), CommitError> {
        let path = self.path_for(&reference.reference);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CommitError::Add {
                    reference: reference.reference.clone(),
                    message: e.to_string(),
                })?;
        }
        tokio::fs::write(&path, &document.content)
            .await
            .map_err(|e| CommitError::Add {
                reference: reference.reference.clone(),
                message: e.to_string(),
            })
    }

    async fn remove(
        &self,
        _ctx: &PipelineContext,
        reference: &Reference,
    ) -> Result<(), CommitError> {
        let path = self.path_for(&reference.reference);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CommitError::Remove {
                reference: reference.reference.clone(),
                message: e.to_string(),
            }),
        }
    }

    async fn commit(&self, _ctx: &PipelineContext) -> Result<(), CommitError> {
        Ok(())
    }
}

/// Checksums a document's bytes and content type with the standard library's
/// hasher. Content-checksum algorithms are a collector concern the engine
/// never inspects, and a resumed crawl only needs to detect whether the same
/// bytes came back, not a cryptographically strong digest.
pub struct FilesystemChecksummer;

impl DocumentChecksummer for FilesystemChecksummer {
    fn checksum(&self, document: &Document, field: Option<&str>) -> String {
        let mut hasher = DefaultHasher::new();
        document.content.hash(&mut hasher);
        document.content_type.hash(&mut hasher);
        field.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
