//! Compiled library documents

use crate::identifier::LibraryIdentifier;
use crate::model::{Annotation, ElmEnvelope};
use octofhir_measure_diagnostics::{
    Diagnostic, MeasureError, Result, Severity, SourceLocation, MB0002, MB0200,
};
use serde_json::Value;

/// One compiled CQL library.
///
/// Immutable once created. The raw JSON text is kept as received so it can be
/// embedded in a Library resource without re-serialization.
#[derive(Debug, Clone)]
pub struct LibraryDocument {
    identifier: LibraryIdentifier,
    includes: Vec<LibraryIdentifier>,
    value_sets: Vec<String>,
    annotations: Vec<Annotation>,
    raw: String,
}

impl LibraryDocument {
    /// Parse an ELM JSON document, keeping its text verbatim
    pub fn from_json(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let envelope: ElmEnvelope = serde_json::from_str(&raw).map_err(|e| {
            MeasureError::parse(MB0002, format!("Invalid ELM document: {}", e))
        })?;
        let library = envelope.library;

        let identifier =
            LibraryIdentifier::new(library.identifier.id, library.identifier.version);

        let includes = library
            .includes
            .map(|inc| {
                inc.defs
                    .into_iter()
                    .map(|def| LibraryIdentifier::new(def.path, def.version))
                    .collect()
            })
            .unwrap_or_default();

        let value_sets = library
            .value_sets
            .map(|vs| vs.defs.into_iter().map(|def| def.id).collect())
            .unwrap_or_default();

        Ok(Self {
            identifier,
            includes,
            value_sets,
            annotations: library.annotation.unwrap_or_default(),
            raw,
        })
    }

    /// Build a document from an already-parsed JSON value
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw = serde_json::to_string(value).map_err(|e| {
            MeasureError::parse(MB0002, format!("Could not serialize ELM document: {}", e))
        })?;
        Self::from_json(raw)
    }

    pub fn identifier(&self) -> &LibraryIdentifier {
        &self.identifier
    }

    /// Direct includes in declaration order, duplicates preserved
    pub fn includes(&self) -> &[LibraryIdentifier] {
        &self.includes
    }

    /// Declared value set canonical URLs, duplicates preserved
    pub fn value_set_urls(&self) -> &[String] {
        &self.value_sets
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Raw JSON text of the document
    pub fn raw_json(&self) -> &str {
        &self.raw
    }

    /// Translator annotations that carry a severity, as diagnostics
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.annotations
            .iter()
            .filter_map(|annotation| {
                let severity = Severity::from_annotation(annotation.error_severity.as_deref()?);
                let message = annotation
                    .message
                    .clone()
                    .unwrap_or_else(|| "Translator reported a problem".to_string());
                let mut diag = Diagnostic::new(severity, MB0200, message);
                if let Some(line) = annotation.start_line {
                    let library = annotation
                        .library_id
                        .clone()
                        .unwrap_or_else(|| self.identifier.id.clone());
                    diag = diag.with_location(
                        SourceLocation::new(line, annotation.start_char.unwrap_or(1))
                            .in_library(library),
                    );
                }
                Some(diag)
            })
            .collect()
    }

    /// Only error-severity diagnostics
    pub fn errors(&self) -> Vec<Diagnostic> {
        self.diagnostics().into_iter().filter(Diagnostic::is_error).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"{
  "library": {
    "identifier": { "id": "SimpleLibrary", "version": "0.0.1" },
    "includes": { "def": [ { "localIdentifier": "Dep", "path": "SimpleLibraryDependency", "version": "0.0.1" } ] },
    "valueSets": { "def": [ { "name": "test-vs", "id": "http://example.com/example-vs", "accessLevel": "Public" } ] },
    "annotation": [ { "translatorVersion": "2.4.0", "type": "CqlToElmInfo" } ],
    "statements": { "def": [] }
  }
}"#;

    #[test]
    fn test_reads_header() {
        let doc = LibraryDocument::from_json(SIMPLE).unwrap();

        assert_eq!(doc.identifier(), &LibraryIdentifier::versioned("SimpleLibrary", "0.0.1"));
        assert_eq!(
            doc.includes(),
            &[LibraryIdentifier::versioned("SimpleLibraryDependency", "0.0.1")]
        );
        assert_eq!(doc.value_set_urls(), &["http://example.com/example-vs".to_string()]);
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_keeps_raw_text() {
        let doc = LibraryDocument::from_json(SIMPLE).unwrap();
        assert_eq!(doc.raw_json(), SIMPLE);
    }

    #[test]
    fn test_missing_identifier_is_parse_error() {
        let err = LibraryDocument::from_json(r#"{"library": {}}"#).unwrap_err();
        assert_eq!(err.code(), MB0002);
    }

    #[test]
    fn test_error_annotations() {
        let doc = LibraryDocument::from_json(
            r#"{"library": {
                "identifier": {"id": "Broken"},
                "annotation": [
                    {"type": "CqlToElmError", "errorSeverity": "error", "message": "Could not resolve identifier X", "startLine": 4, "startChar": 3},
                    {"type": "CqlToElmError", "errorSeverity": "warning", "message": "Unused include"}
                ]
            }}"#,
        )
        .unwrap();

        assert_eq!(doc.diagnostics().len(), 2);
        let errors = doc.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Could not resolve identifier X");
        assert_eq!(
            errors[0].location,
            Some(SourceLocation::new(4, 3).in_library("Broken"))
        );
    }
}
