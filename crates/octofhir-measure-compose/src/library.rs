//! Library resource construction

use base64::{engine::general_purpose, Engine};
use octofhir_measure_diagnostics::{MeasureError, Result, MB0003};
use octofhir_measure_elm::LibraryDocument;
use octofhir_measure_model::codes::{
    CQL_CONTENT_TYPE, ELM_JSON_CONTENT_TYPE, LIBRARY_TYPE_SYSTEM, LOGIC_LIBRARY,
};
use octofhir_measure_model::{canonical_url, Attachment, CodeableConcept, Library, RelatedArtifact};
use octofhir_measure_deps::library_resource_id;

/// Logic Library for a compiled document.
///
/// Content holds the CQL source (when known) followed by the compiled
/// document, both base64 encoded. The compiled document is embedded as its
/// original text.
pub fn build_library(
    document: &LibraryDocument,
    cql: Option<&str>,
    related_artifact: Vec<RelatedArtifact>,
    canonical_base: &str,
) -> Library {
    let id = library_resource_id(&document.identifier().id);

    let mut content = Vec::with_capacity(2);
    if let Some(cql) = cql {
        content.push(attachment(CQL_CONTENT_TYPE, cql));
    }
    content.push(attachment(ELM_JSON_CONTENT_TYPE, document.raw_json()));

    Library {
        url: Some(canonical_url(canonical_base, "Library", &id)),
        id: Some(id),
        version: document.identifier().version.clone(),
        status: Some("draft".to_string()),
        library_type: Some(CodeableConcept::from_code(LIBRARY_TYPE_SYSTEM, LOGIC_LIBRARY)),
        related_artifact,
        content,
        ..Default::default()
    }
}

fn attachment(content_type: &str, text: &str) -> Attachment {
    Attachment {
        content_type: Some(content_type.to_string()),
        data: Some(general_purpose::STANDARD.encode(text)),
        ..Default::default()
    }
}

/// Decoded text of the first attachment with `content_type`
pub fn decode_content(library: &Library, content_type: &str) -> Result<String> {
    let data = library
        .content_of_type(content_type)
        .and_then(|a| a.data.as_deref())
        .ok_or_else(|| {
            MeasureError::parse(
                MB0003,
                format!(
                    "Library {} has no {} content",
                    library.id.as_deref().unwrap_or("<unknown>"),
                    content_type
                ),
            )
        })?;

    let bytes = general_purpose::STANDARD
        .decode(data)
        .map_err(|e| MeasureError::parse(MB0003, format!("Invalid base64 content: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| MeasureError::parse(MB0003, format!("Content is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELM: &str = r#"{"library":{"identifier":{"id":"Main","version":"1.0.0"}}}"#;

    #[test]
    fn test_library_fields() {
        let doc = LibraryDocument::from_json(ELM).unwrap();
        let library = build_library(&doc, None, Vec::new(), "http://example.com/");

        assert_eq!(library.id.as_deref(), Some("library-Main"));
        assert_eq!(library.url.as_deref(), Some("http://example.com/Library/library-Main"));
        assert_eq!(library.version.as_deref(), Some("1.0.0"));
        assert_eq!(library.content.len(), 1);
        assert_eq!(
            library.library_type.as_ref().and_then(CodeableConcept::first_code),
            Some("logic-library")
        );
    }

    #[test]
    fn test_cql_content_first() {
        let doc = LibraryDocument::from_json(ELM).unwrap();
        let library = build_library(&doc, Some("library Main version '1.0.0'"), Vec::new(), "http://example.com");

        let types: Vec<_> = library
            .content
            .iter()
            .map(|a| a.content_type.as_deref().unwrap())
            .collect();
        assert_eq!(types, vec!["text/cql", "application/elm+json"]);
        assert_eq!(
            decode_content(&library, CQL_CONTENT_TYPE).unwrap(),
            "library Main version '1.0.0'"
        );
    }

    #[test]
    fn test_version_omitted_when_absent() {
        let doc = LibraryDocument::from_json(r#"{"library":{"identifier":{"id":"Main"}}}"#).unwrap();
        let library = build_library(&doc, None, Vec::new(), "http://example.com");

        assert!(library.version.is_none());
    }
}
