// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`PipelineDriver`]: per-reference lifecycle — wrap document, invoke the
//! importer pipeline, route the response (including recursively processing
//! embedded/nested references), invoke the committer pipeline, and finalize.

use crate::error::EngineError;
use crate::progress::ProgressReporter;
use crawl_adapters::{
    CommitterPipeline, CrawlerHooks, DocumentChecksummer, Document, ImporterPipeline,
    ImporterResponse, PipelineContext, SpoiledReferenceStrategizer,
};
use crawl_core::{Clock, CrawlEvent, EventBus, Reference, ReferenceState, RejectReason, SpoilAction};
use crawl_storage::CrawlStore;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Collaborators a [`PipelineDriver`] drives a reference through. Held as
/// trait objects so the engine never needs to know the concrete collector.
pub struct PipelineDriver<C: Clock> {
    crawler_id: String,
    store: Arc<CrawlStore>,
    bus: Arc<EventBus>,
    importer: Arc<dyn ImporterPipeline>,
    committer: Arc<dyn CommitterPipeline>,
    checksummer: Arc<dyn DocumentChecksummer>,
    spoil_policy: Arc<dyn SpoiledReferenceStrategizer>,
    progress: Arc<ProgressReporter<C>>,
    stop_on_exceptions: Vec<String>,
    hooks: Arc<dyn CrawlerHooks>,
}

impl<C: Clock + 'static> PipelineDriver<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        crawler_id: String,
        store: Arc<CrawlStore>,
        bus: Arc<EventBus>,
        importer: Arc<dyn ImporterPipeline>,
        committer: Arc<dyn CommitterPipeline>,
        checksummer: Arc<dyn DocumentChecksummer>,
        spoil_policy: Arc<dyn SpoiledReferenceStrategizer>,
        progress: Arc<ProgressReporter<C>>,
        stop_on_exceptions: Vec<String>,
        hooks: Arc<dyn CrawlerHooks>,
    ) -> Self {
        Self {
            crawler_id,
            store,
            bus,
            importer,
            committer,
            checksummer,
            spoil_policy,
            progress,
            stop_on_exceptions,
            hooks,
        }
    }

    pub fn committer(&self) -> &Arc<dyn CommitterPipeline> {
        &self.committer
    }

    /// Entry point for a dequeued reference in the ordinary (non-delete-mode)
    /// pass: wrap document, import, route, finalize, recurse into nested.
    pub async fn process(&self, reference: Reference) -> Result<(), EngineError> {
        let cached = self.store.get_cached(&reference.reference);
        let ctx = PipelineContext::for_reference(&self.crawler_id, cached.as_ref(), false);
        let response = self
            .importer
            .import(&ctx, &reference, cached.as_ref(), Document::new_empty())
            .await;
        self.process_response(reference, cached, response, ctx).await
    }

    /// Entry point for a delete-mode pass (orphan DELETE strategy, or
    /// `clean`): every reference is routed directly to deletion, bypassing
    /// fetch/import.
    pub async fn delete_reference(&self, mut reference: Reference) -> Result<(), EngineError> {
        let cached = self.store.get_cached(&reference.reference);
        let fatal = self.issue_delete(&mut reference).await.err();
        self.finalize(reference, cached).await?;
        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn process_response<'a>(
        &'a self,
        reference: Reference,
        cached: Option<Reference>,
        response: Option<ImporterResponse>,
        ctx: PipelineContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut reference = reference;
            let mut fatal = None;
            let nested = match response {
                None => {
                    if reference.is_new_or_modified() {
                        // No event fired here: a None response means the importer
                        // already decided this reference needed no further work.
                        reference.state = Some(ReferenceState::Rejected);
                    }
                    Vec::new()
                }
                Some(resp) if resp.success => {
                    let nested = resp.nested.clone();
                    if let Err(e) = self
                        .handle_success(&mut reference, cached.as_ref(), resp, &ctx)
                        .await
                    {
                        fatal = Some(e);
                    }
                    nested
                }
                Some(resp) => {
                    let nested = resp.nested.clone();
                    self.handle_failure(&mut reference, &resp);
                    nested
                }
            };

            let parent_key = reference.reference.clone();
            // A fatal exception is re-thrown only after the reference is
            // finalized, so finalize must run even when handle_success failed.
            self.finalize(reference, cached).await?;
            if let Some(e) = fatal {
                return Err(e);
            }

            for (child_key, child_response) in nested {
                let child_ref = Reference::embedded(child_key, &parent_key);
                let child_cached = self.store.get_cached(&child_ref.reference);
                let child_ctx =
                    PipelineContext::for_reference(&self.crawler_id, child_cached.as_ref(), false);
                self.process_response(child_ref, child_cached, Some(child_response), child_ctx)
                    .await?;
            }
            Ok(())
        })
    }

    /// Classifies an importer failure by its status description, set by
    /// `DefaultImporter`'s fetch-status mapping (`"not_found:…"`,
    /// `"bad_status:…"`); anything else is a generic import rejection.
    fn handle_failure(&self, reference: &mut Reference, resp: &ImporterResponse) {
        let (state, reason) = if resp.status_description.starts_with("not_found") {
            (ReferenceState::NotFound, RejectReason::NotFound)
        } else if resp.status_description.starts_with("bad_status") {
            (ReferenceState::BadStatus, RejectReason::BadStatus)
        } else {
            (ReferenceState::Rejected, RejectReason::Import)
        };
        reference.state = Some(state);
        self.bus.fire(CrawlEvent::Rejected {
            reference: reference.clone(),
            reason,
        });
    }

    async fn handle_success(
        &self,
        reference: &mut Reference,
        cached: Option<&Reference>,
        resp: ImporterResponse,
        ctx: &PipelineContext,
    ) -> Result<(), EngineError> {
        let new_checksum = self.checksummer.checksum(&resp.document, None);
        let cached_checksum = cached.and_then(|c| c.content_checksum.clone());
        if !new_checksum.is_empty() && cached_checksum.as_deref() == Some(new_checksum.as_str()) {
            // Checksum unchanged from the cached copy: short-circuit, skip the committer.
            reference.state = Some(ReferenceState::Unmodified);
            self.bus.fire(CrawlEvent::Rejected {
                reference: reference.clone(),
                reason: RejectReason::Unmodified,
            });
            return Ok(());
        }

        reference.content_checksum = Some(new_checksum);
        reference.content_type = resp.document.content_type.clone();
        reference.state = Some(if cached.is_some() {
            ReferenceState::Modified
        } else {
            ReferenceState::New
        });
        self.bus.fire(CrawlEvent::DocumentImported {
            reference: reference.clone(),
        });

        match self.committer.add(ctx, reference, &resp.document).await {
            Ok(()) => {
                self.bus.fire(CrawlEvent::DocumentCommittedAdd {
                    reference: reference.clone(),
                });
                Ok(())
            }
            Err(e) => {
                reference.state = Some(ReferenceState::Error);
                self.bus.fire(CrawlEvent::Rejected {
                    reference: reference.clone(),
                    reason: RejectReason::Error(e.to_string()),
                });
                self.maybe_fatal(&reference.reference, &e.to_string())
            }
        }
    }

    async fn finalize(&self, mut reference: Reference, cached: Option<Reference>) -> Result<(), EngineError> {
        let state = match reference.state {
            Some(state) => state,
            None => {
                tracing::warn!(key = %reference.reference, "reference finalized with no state");
                reference.state = Some(ReferenceState::BadStatus);
                ReferenceState::BadStatus
            }
        };

        let ctx = PipelineContext::for_reference(&self.crawler_id, cached.as_ref(), false);
        self.hooks.before_finalize(&ctx, &mut reference);

        if !reference.is_new_or_modified() {
            if let Some(cached) = &cached {
                reference.fill_from_cached(cached);
            }
        }

        let mut fatal = None;
        if !state.is_good_state() && state != ReferenceState::Deleted {
            if let Err(e) = self
                .apply_spoil_policy(&mut reference, cached.as_ref(), state)
                .await
            {
                fatal = Some(e);
            }
        }

        self.store.processed(reference.clone())?;
        self.hooks.mark_variations_processed(&ctx, &reference);
        self.progress.record(&self.store);
        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn apply_spoil_policy(
        &self,
        reference: &mut Reference,
        cached: Option<&Reference>,
        state: ReferenceState,
    ) -> Result<(), EngineError> {
        match self.spoil_policy.resolve(state) {
            SpoilAction::Ignore => Ok(()),
            SpoilAction::Delete => match cached {
                Some(cached) if cached.state != Some(ReferenceState::Deleted) => {
                    self.issue_delete(reference).await
                }
                _ => Ok(()),
            },
            SpoilAction::GraceOnce => match cached {
                None => self.issue_delete(reference).await,
                Some(cached) if cached.is_good_state() => {
                    tracing::info!(key = %reference.reference, "spoil grace period granted");
                    Ok(())
                }
                Some(_) => self.issue_delete(reference).await,
            },
        }
    }

    async fn issue_delete(&self, reference: &mut Reference) -> Result<(), EngineError> {
        let ctx = PipelineContext::for_reference(&self.crawler_id, None, true);
        match self.committer.remove(&ctx, reference).await {
            Ok(()) => {
                reference.state = Some(ReferenceState::Deleted);
                self.bus.fire(CrawlEvent::DocumentCommittedRemove {
                    reference: reference.clone(),
                });
                Ok(())
            }
            Err(e) => self.maybe_fatal(&reference.reference, &e.to_string()),
        }
    }

    fn maybe_fatal(&self, reference: &str, message: &str) -> Result<(), EngineError> {
        if self
            .stop_on_exceptions
            .iter()
            .any(|needle| message.contains(needle.as_str()))
        {
            Err(EngineError::FatalException {
                reference: reference.to_string(),
                message: message.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
