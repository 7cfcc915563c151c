//! Pool of compiled library documents

use indexmap::IndexMap;
use octofhir_measure_diagnostics::{MeasureError, Result, MB0100, MB0101};
use octofhir_measure_elm::{LibraryDocument, LibraryIdentifier};
use tracing::debug;

/// Compiled documents available for resolution, keyed by their exact
/// identifier in insertion order
#[derive(Debug, Clone, Default)]
pub struct DocumentPool {
    documents: IndexMap<LibraryIdentifier, LibraryDocument>,
}

impl DocumentPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: impl IntoIterator<Item = LibraryDocument>) -> Self {
        let mut pool = Self::new();
        for doc in documents {
            pool.insert(doc);
        }
        pool
    }

    /// Add a document. A second document with the same id and version is
    /// ignored and `false` is returned.
    pub fn insert(&mut self, document: LibraryDocument) -> bool {
        let key = document.identifier().clone();
        if self.documents.contains_key(&key) {
            debug!(library = %key, "Ignoring duplicate compiled library");
            return false;
        }
        self.documents.insert(key, document);
        true
    }

    /// Find the single document matching `identifier`.
    ///
    /// The id must be equal; the version is compared only when both sides
    /// carry one. No match is an unresolved-library error, several matches an
    /// ambiguous-reference error.
    pub fn resolve(&self, identifier: &LibraryIdentifier) -> Result<&LibraryDocument> {
        let mut candidates = self
            .documents
            .values()
            .filter(|doc| identifier.matches(doc.identifier()));

        let Some(first) = candidates.next() else {
            return Err(MeasureError::resolution(
                MB0100,
                format!(
                    "Could not resolve library {} version {}",
                    identifier.id,
                    identifier.version.as_deref().unwrap_or("(any)")
                ),
                identifier.to_string(),
            ));
        };

        if let Some(second) = candidates.next() {
            return Err(MeasureError::resolution(
                MB0101,
                format!(
                    "Library reference {} matches both {} and {}",
                    identifier,
                    first.identifier(),
                    second.identifier()
                ),
                identifier.to_string(),
            ));
        }

        Ok(first)
    }

    /// Document with exactly this id and version
    pub fn get(&self, identifier: &LibraryIdentifier) -> Option<&LibraryDocument> {
        self.documents.get(identifier)
    }

    pub fn documents(&self) -> impl Iterator<Item = &LibraryDocument> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
