//! Measure bundle generation

use crate::library::build_library;
use crate::measure::build_measure;
use indexmap::{IndexMap, IndexSet};
use octofhir_measure_criteria::GroupInfo;
use octofhir_measure_deps::{
    library_related_artifacts, transitive_dependencies, value_set_related_artifacts,
    value_set_urls, DependencyClosure, DocumentPool,
};
use octofhir_measure_diagnostics::{MeasureError, Result, MB0102};
use octofhir_measure_elm::{LibraryDocument, LibraryIdentifier};
use octofhir_measure_model::{Bundle, BundleEntry, Library, Resource, ValueSet};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Inputs of [`generate_measure_bundle`]
#[derive(Debug, Clone)]
pub struct MeasureBundleParts<'a> {
    /// Compiled main library
    pub main: &'a LibraryDocument,
    /// Every compiled library available for resolution, main included
    pub pool: &'a DocumentPool,
    /// CQL source text by library id, for libraries translated in this run
    pub cql_sources: &'a BTreeMap<String, String>,
    pub groups: &'a [GroupInfo],
    /// ValueSet resources matched to the closure's references
    pub value_sets: Vec<ValueSet>,
    pub canonical_base: &'a str,
}

/// Build the transaction bundle for a measure.
///
/// Entries are the Measure, the main Library, one Library per library the main
/// library depends on (directly or not), then the value sets. Population
/// references are checked before anything is built.
pub fn generate_measure_bundle(parts: MeasureBundleParts<'_>) -> Result<Bundle> {
    for group in parts.groups {
        group.criteria.validate_references()?;
    }

    info!("Resolving dependencies/relatedArtifact");
    let main_library = library_resource(&parts, parts.main)?;

    let closure = transitive_dependencies([parts.main], parts.pool)?;
    ensure_single_versions(parts.main, &closure)?;
    let mut dependency_libraries = Vec::with_capacity(closure.len());
    for document in closure.documents() {
        if document.identifier() == parts.main.identifier() {
            continue;
        }
        dependency_libraries.push(library_resource(&parts, document)?);
    }
    debug!(count = dependency_libraries.len(), "Built dependency libraries");

    let measure = build_measure(parts.main.identifier(), parts.groups, parts.canonical_base);

    let mut bundle = Bundle::transaction();
    let entries = bundle.entry.get_or_insert_with(Vec::new);
    entries.push(BundleEntry::put(Resource::Measure(Box::new(measure))));
    entries.push(BundleEntry::put(Resource::Library(Box::new(main_library))));
    entries.extend(
        dependency_libraries
            .into_iter()
            .map(|library| BundleEntry::put(Resource::Library(Box::new(library)))),
    );
    entries.extend(
        parts
            .value_sets
            .into_iter()
            .map(|vs| BundleEntry::put(Resource::ValueSet(Box::new(vs)))),
    );

    Ok(bundle)
}

/// Library resource ids carry no version, so each library id may be bundled
/// in one version only
fn ensure_single_versions(main: &LibraryDocument, closure: &DependencyClosure) -> Result<()> {
    let mut seen: IndexMap<&str, &LibraryIdentifier> = IndexMap::new();
    seen.insert(&main.identifier().id, main.identifier());

    for identifier in closure.identifiers() {
        match seen.get(identifier.id.as_str()) {
            Some(existing) if *existing != identifier => {
                return Err(MeasureError::resolution(
                    MB0102,
                    format!(
                        "Library {} is required in more than one version ({} and {})",
                        identifier.id,
                        version_label(existing),
                        version_label(identifier)
                    ),
                    identifier.id.clone(),
                ));
            }
            Some(_) => {}
            None => {
                seen.insert(&identifier.id, identifier);
            }
        }
    }
    Ok(())
}

fn version_label(identifier: &LibraryIdentifier) -> &str {
    identifier.version.as_deref().unwrap_or("unversioned")
}

fn library_resource(parts: &MeasureBundleParts<'_>, document: &LibraryDocument) -> Result<Library> {
    let mut related_artifact =
        library_related_artifacts(document, parts.pool, parts.canonical_base)?;
    related_artifact.extend(value_set_related_artifacts(document));

    let cql = parts
        .cql_sources
        .get(&document.identifier().id)
        .map(String::as_str);

    Ok(build_library(document, cql, related_artifact, parts.canonical_base))
}

/// Value set URLs referenced by `main` and every library it depends on, each
/// once, in first-seen order
pub fn referenced_value_set_urls(
    main: &LibraryDocument,
    pool: &DocumentPool,
) -> Result<Vec<String>> {
    let closure = transitive_dependencies([main], pool)?;

    let urls: IndexSet<&str> = std::iter::once(main)
        .chain(closure.documents())
        .flat_map(value_set_urls)
        .collect();

    Ok(urls.into_iter().map(str::to_string).collect())
}
