//! ELM library header structures per HL7 ELM specification
//!
//! Only the parts of a compiled library that matter for bundling are modelled:
//! the identifier, include definitions, value set definitions and translator
//! annotations. Every other member of the document is ignored on read; the
//! original text is kept by [`crate::LibraryDocument`].

use serde::{Deserialize, Serialize};

// ============================================================================
// Library Structure
// ============================================================================

/// Top-level ELM JSON document: `{ "library": { ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElmEnvelope {
    pub library: Library,
}

/// ELM Library header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Library identifier
    pub identifier: VersionedIdentifier,
    /// Include definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<IncludeDefs>,
    /// Value sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_sets: Option<ValueSetDefs>,
    /// Annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Vec<Annotation>>,
}

/// Versioned identifier for libraries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedIdentifier {
    /// Identifier
    pub id: String,
    /// System/namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Definition Containers
// ============================================================================

/// Container for include definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeDefs {
    #[serde(rename = "def", default)]
    pub defs: Vec<IncludeDef>,
}

/// Container for value set definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSetDefs {
    #[serde(rename = "def", default)]
    pub defs: Vec<ValueSetDef>,
}

// ============================================================================
// Definitions
// ============================================================================

/// Include definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeDef {
    /// Local identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_identifier: Option<String>,
    /// Library path
    pub path: String,
    /// Library version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Value set definition; `id` is the value set's canonical URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSetDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Annotations
// ============================================================================

/// Translator annotation (`CqlToElmError`, `CqlToElmInfo`, narrative, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_char: Option<usize>,
}
