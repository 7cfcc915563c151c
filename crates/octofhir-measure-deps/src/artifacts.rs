//! relatedArtifact entries for Library resources

use crate::closure::direct_dependencies;
use crate::pool::DocumentPool;
use indexmap::IndexSet;
use octofhir_measure_diagnostics::Result;
use octofhir_measure_elm::{LibraryDocument, LibraryIdentifier};
use octofhir_measure_model::{combine_urls, RelatedArtifact};

/// FHIR resource id of the Library generated for a CQL library
pub fn library_resource_id(library_id: &str) -> String {
    format!("library-{}", library_id)
}

/// Versioned canonical reference to the Library generated for `identifier`
pub fn library_canonical(canonical_base: &str, identifier: &LibraryIdentifier) -> String {
    let url = combine_urls(
        canonical_base,
        &format!("Library/{}", library_resource_id(&identifier.id)),
    );
    match &identifier.version {
        Some(version) => format!("{}|{}", url, version),
        None => url,
    }
}

/// One `depends-on` artifact per direct library dependency of `document`.
///
/// Each include is resolved against the full pool; the reference uses the
/// identifier of the document that satisfied it, so an unversioned include is
/// pinned to the version actually bundled.
pub fn library_related_artifacts(
    document: &LibraryDocument,
    pool: &DocumentPool,
    canonical_base: &str,
) -> Result<Vec<RelatedArtifact>> {
    direct_dependencies(document, pool)?
        .iter()
        .map(|include| {
            let target = pool.resolve(include)?;
            Ok(RelatedArtifact::depends_on(
                format!("Library {}", target.identifier().id),
                library_canonical(canonical_base, target.identifier()),
            ))
        })
        .collect()
}

/// Value set URLs declared by `document`, each once, in declaration order
pub fn value_set_urls(document: &LibraryDocument) -> Vec<&str> {
    document
        .value_set_urls()
        .iter()
        .map(String::as_str)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// One `depends-on` artifact per distinct value set declared by `document`
pub fn value_set_related_artifacts(document: &LibraryDocument) -> Vec<RelatedArtifact> {
    value_set_urls(document)
        .into_iter()
        .map(|url| RelatedArtifact::depends_on(format!("ValueSet {}", url), url))
        .collect()
}
