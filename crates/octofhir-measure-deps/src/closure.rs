//! Direct and transitive dependency resolution over compiled documents

use crate::pool::DocumentPool;
use indexmap::{IndexMap, IndexSet};
use octofhir_measure_diagnostics::Result;
use octofhir_measure_elm::{LibraryDocument, LibraryIdentifier};
use std::collections::HashSet;
use tracing::debug;

/// Deduplicated set of libraries reachable from a root set, keyed by the
/// resolved identifier in first-visit order
#[derive(Debug, Clone, Default)]
pub struct DependencyClosure {
    entries: IndexMap<LibraryIdentifier, LibraryDocument>,
}

impl DependencyClosure {
    pub fn identifiers(&self) -> impl Iterator<Item = &LibraryIdentifier> {
        self.entries.keys()
    }

    pub fn documents(&self) -> impl Iterator<Item = &LibraryDocument> {
        self.entries.values()
    }

    pub fn get(&self, identifier: &LibraryIdentifier) -> Option<&LibraryDocument> {
        self.entries.get(identifier)
    }

    pub fn contains(&self, identifier: &LibraryIdentifier) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Includes of `document`, deduplicated by id/version pair in first-seen order.
///
/// Every include must resolve to a document in `pool`; the first miss fails
/// the whole call.
pub fn direct_dependencies(
    document: &LibraryDocument,
    pool: &DocumentPool,
) -> Result<Vec<LibraryIdentifier>> {
    let unique: IndexSet<&LibraryIdentifier> = document.includes().iter().collect();

    for include in &unique {
        pool.resolve(include)?;
    }

    Ok(unique.into_iter().cloned().collect())
}

/// Every library reachable from `roots` through includes.
///
/// Roots are only part of the result when another library depends on them.
/// Each library is expanded once, so cyclic includes terminate.
pub fn transitive_dependencies<'a>(
    roots: impl IntoIterator<Item = &'a LibraryDocument>,
    pool: &DocumentPool,
) -> Result<DependencyClosure> {
    let mut walker = Walker {
        pool,
        expanded: HashSet::new(),
        closure: DependencyClosure::default(),
    };

    for root in roots {
        walker.visit(root)?;
    }

    debug!(count = walker.closure.len(), "Resolved transitive dependencies");
    Ok(walker.closure)
}

struct Walker<'p> {
    pool: &'p DocumentPool,
    expanded: HashSet<LibraryIdentifier>,
    closure: DependencyClosure,
}

impl<'p> Walker<'p> {
    fn visit(&mut self, document: &LibraryDocument) -> Result<()> {
        if !self.expanded.insert(document.identifier().clone()) {
            return Ok(());
        }

        let pool = self.pool;
        let mut resolved: Vec<&'p LibraryDocument> = Vec::new();
        for include in direct_dependencies(document, pool)? {
            let target = pool.resolve(&include)?;
            self.closure
                .entries
                .entry(target.identifier().clone())
                .or_insert_with(|| target.clone());
            resolved.push(target);
        }

        for target in resolved {
            self.visit(target)?;
        }
        Ok(())
    }
}
