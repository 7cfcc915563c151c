//! Dependency closure over CQL sources
//!
//! Used before translation so only the main library and the libraries it
//! actually includes are sent to the translator.

use indexmap::IndexMap;
use octofhir_measure_cql::{extract_includes, extract_library_identifier};
use octofhir_measure_diagnostics::{MeasureError, Result, MB0001, MB0100, MB0101};
use octofhir_measure_elm::LibraryIdentifier;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CQL library text with its declared identifier
#[derive(Debug, Clone)]
pub struct CqlSource {
    identifier: LibraryIdentifier,
    text: String,
    path: Option<PathBuf>,
}

impl CqlSource {
    /// Read the `library` declaration of `text`; a source without one is a
    /// parse error
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let identifier = extract_library_identifier(&text).ok_or_else(|| {
            MeasureError::parse(MB0001, "Could not locate a library declaration in CQL source")
        })?;
        Ok(Self {
            identifier,
            text,
            path: None,
        })
    }

    /// Remember the file the source was read from, for messages
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn identifier(&self) -> &LibraryIdentifier {
        &self.identifier
    }

    /// Library name used as the translation request key
    pub fn name(&self) -> &str {
        &self.identifier.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Available CQL sources keyed by declared identifier
#[derive(Debug, Clone, Default)]
pub struct CqlSourcePool {
    sources: IndexMap<LibraryIdentifier, CqlSource>,
}

impl CqlSourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sources(sources: impl IntoIterator<Item = CqlSource>) -> Self {
        let mut pool = Self::new();
        for source in sources {
            pool.insert(source);
        }
        pool
    }

    /// Add a source; a repeated id/version pair keeps the first one
    pub fn insert(&mut self, source: CqlSource) -> bool {
        if self.sources.contains_key(source.identifier()) {
            debug!(library = %source.identifier(), "Ignoring duplicate CQL library");
            return false;
        }
        self.sources.insert(source.identifier().clone(), source);
        true
    }

    /// Source matching an include, comparing versions only when both exist
    pub fn resolve(&self, identifier: &LibraryIdentifier) -> Result<&CqlSource> {
        let mut candidates = self
            .sources
            .values()
            .filter(|source| identifier.matches(source.identifier()));

        let Some(first) = candidates.next() else {
            return Err(MeasureError::resolution(
                MB0100,
                format!(
                    "Could not find CQL source for library {} version {}",
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
                    "Include {} matches both {} and {}",
                    identifier,
                    first.identifier(),
                    second.identifier()
                ),
                identifier.to_string(),
            ));
        }

        Ok(first)
    }

    pub fn get(&self, identifier: &LibraryIdentifier) -> Option<&CqlSource> {
        self.sources.get(identifier)
    }

    pub fn sources(&self) -> impl Iterator<Item = &CqlSource> {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Libraries the main CQL text depends on, directly or transitively, in
/// depth-first first-visit order. The main library itself is excluded.
pub fn cql_dependency_closure(
    main_cql: &str,
    pool: &CqlSourcePool,
) -> Result<Vec<LibraryIdentifier>> {
    let mut visited = HashSet::new();
    if let Some(main) = extract_library_identifier(main_cql) {
        visited.insert(main);
    }

    let mut order = Vec::new();
    walk(main_cql, pool, &mut visited, &mut order)?;

    debug!(count = order.len(), "Resolved CQL dependency closure");
    Ok(order)
}

fn walk(
    cql: &str,
    pool: &CqlSourcePool,
    visited: &mut HashSet<LibraryIdentifier>,
    order: &mut Vec<LibraryIdentifier>,
) -> Result<()> {
    for include in extract_includes(cql) {
        let source = pool.resolve(&include)?;
        if visited.insert(source.identifier().clone()) {
            order.push(source.identifier().clone());
            walk(source.text(), pool, visited, order)?;
        }
    }
    Ok(())
}
