// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral event-bus notifications. Never persisted, never replayed — for
//! that, see [`crate::event::StoreEvent`].
//!
//! The event "subject" is a tagged union of the few real payload types
//! instead of an "anything" field, so listeners can match on [`CrawlEvent`]
//! directly instead of downcasting a trait object.

use crate::reference::Reference;
use std::fmt;

/// A reason a reference was rejected, carried on `REJECTED_*` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Filter,
    Unmodified,
    NotFound,
    BadStatus,
    Import,
    Error(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Filter => write!(f, "filter"),
            RejectReason::Unmodified => write!(f, "unmodified"),
            RejectReason::NotFound => write!(f, "not_found"),
            RejectReason::BadStatus => write!(f, "bad_status"),
            RejectReason::Import => write!(f, "import"),
            RejectReason::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// The fixed event vocabulary, fired synchronously and in order to every
/// registered listener.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    CrawlerInitBegin,
    CrawlerInitEnd,
    CrawlerRunBegin,
    CrawlerRunEnd,
    CrawlerStopBegin,
    CrawlerStopEnd,
    CrawlerCleanBegin,
    CrawlerCleanEnd,
    DocumentImported { reference: Reference },
    DocumentCommittedAdd { reference: Reference },
    DocumentCommittedRemove { reference: Reference },
    Rejected { reference: Reference, reason: RejectReason },
}

impl CrawlEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CrawlEvent::CrawlerInitBegin => "CRAWLER_INIT_BEGIN",
            CrawlEvent::CrawlerInitEnd => "CRAWLER_INIT_END",
            CrawlEvent::CrawlerRunBegin => "CRAWLER_RUN_BEGIN",
            CrawlEvent::CrawlerRunEnd => "CRAWLER_RUN_END",
            CrawlEvent::CrawlerStopBegin => "CRAWLER_STOP_BEGIN",
            CrawlEvent::CrawlerStopEnd => "CRAWLER_STOP_END",
            CrawlEvent::CrawlerCleanBegin => "CRAWLER_CLEAN_BEGIN",
            CrawlEvent::CrawlerCleanEnd => "CRAWLER_CLEAN_END",
            CrawlEvent::DocumentImported { .. } => "DOCUMENT_IMPORTED",
            CrawlEvent::DocumentCommittedAdd { .. } => "DOCUMENT_COMMITTED_ADD",
            CrawlEvent::DocumentCommittedRemove { .. } => "DOCUMENT_COMMITTED_REMOVE",
            CrawlEvent::Rejected { reason, .. } => match reason {
                RejectReason::Filter => "REJECTED_FILTER",
                RejectReason::Unmodified => "REJECTED_UNMODIFIED",
                RejectReason::NotFound => "REJECTED_NOTFOUND",
                RejectReason::BadStatus => "REJECTED_BAD_STATUS",
                RejectReason::Import => "REJECTED_IMPORT",
                RejectReason::Error(_) => "REJECTED_ERROR",
            },
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            CrawlEvent::DocumentImported { reference }
            | CrawlEvent::DocumentCommittedAdd { reference }
            | CrawlEvent::DocumentCommittedRemove { reference }
            | CrawlEvent::Rejected { reference, .. } => Some(reference),
            _ => None,
        }
    }

    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self.reference() {
            Some(reference) => format!("{t} key={}", reference.reference),
            None => t.to_string(),
        }
    }
}

/// A listener invoked synchronously, in registration order, for every
/// [`CrawlEvent`]. A listener that panics or returns an error is logged and
/// does not abort the crawl.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &CrawlEvent);
}

/// Ordered, thread-safe collection of [`EventListener`]s.
#[derive(Default)]
pub struct EventBus {
    listeners: parking_lot::RwLock<Vec<Box<dyn EventListener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Box<dyn EventListener>) {
        self.listeners.write().push(listener);
    }

    /// Fire `event` to every listener in registration order. A listener that
    /// panics is caught and logged; it never propagates to the caller.
    pub fn fire(&self, event: CrawlEvent) {
        tracing::debug!(event = %event.log_summary(), "crawl event");
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(&event);
            }));
            if let Err(_panic) = result {
                tracing::warn!(event = %event.name(), "event listener panicked, continuing");
            }
        }
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
