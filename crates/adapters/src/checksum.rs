// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DocumentChecksummer collaborator interface. The engine only consumes
//! the checksum string returned here; the algorithm itself is out of scope.

use crate::document::Document;

pub trait DocumentChecksummer: Send + Sync {
    /// Compute a checksum for `document`, optionally scoped to a named field
    /// (e.g. a specific header or metadata attribute rather than the body).
    fn checksum(&self, document: &Document, field: Option<&str>) -> String;
}

/// Deterministic length-and-sum checksum for tests. Real collectors plug in
/// a cryptographic digest; the engine never inspects the algorithm.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeChecksummer;

#[cfg(any(test, feature = "test-support"))]
impl DocumentChecksummer for FakeChecksummer {
    fn checksum(&self, document: &Document, field: Option<&str>) -> String {
        let sum: u64 = document.content.iter().map(|b| *b as u64).sum();
        match field {
            Some(field) => format!("{field}:{}:{}", document.content.len(), sum),
            None => format!("{}:{}", document.content.len(), sum),
        }
    }
}

#[cfg(test)]
#[path = "checksum_tests.rs"]
mod tests;
