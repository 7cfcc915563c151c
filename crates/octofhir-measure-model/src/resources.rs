//! FHIR R4 resource structures
//!
//! Only members the bundler reads or writes are typed. Everything else lands
//! in the `extra` maps and is serialized back unchanged.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::codes;

// ============================================================================
// Bundle
// ============================================================================

/// FHIR Bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub bundle_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bundle {
    /// Empty transaction bundle
    pub fn transaction() -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            id: None,
            bundle_type: "transaction".to_string(),
            entry: Some(Vec::new()),
            extra: Map::new(),
        }
    }

    /// Entries, treating a missing `entry` as empty
    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or_default()
    }

    /// Measure resources in entry order
    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.entries().iter().filter_map(|e| match &e.resource {
            Some(BundleResource::Known(Resource::Measure(m))) => Some(m.as_ref()),
            _ => None,
        })
    }
}

/// Entry of a Bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<BundleResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleRequest>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundleEntry {
    /// Entry with a `PUT <resourceType>/<id>` request
    pub fn put(resource: Resource) -> Self {
        let request = BundleRequest {
            method: "PUT".to_string(),
            url: format!("{}/{}", resource.resource_type(), resource.id().unwrap_or_default()),
            extra: Map::new(),
        };
        Self {
            full_url: None,
            resource: Some(BundleResource::Known(resource)),
            request: Some(request),
            extra: Map::new(),
        }
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource.as_ref().and_then(BundleResource::resource_type)
    }

    /// Canonical URL of the resource, if it declares one
    pub fn resource_url(&self) -> Option<&str> {
        self.resource.as_ref().and_then(BundleResource::url)
    }
}

/// Request part of a transaction entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRequest {
    pub method: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A bundled resource: one of the measure bundle resource types, or any other
/// resource kept as raw JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BundleResource {
    Known(Resource),
    Other(Value),
}

impl BundleResource {
    pub fn resource_type(&self) -> Option<&str> {
        match self {
            BundleResource::Known(r) => Some(r.resource_type()),
            BundleResource::Other(v) => v.get("resourceType").and_then(Value::as_str),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            BundleResource::Known(r) => r.id(),
            BundleResource::Other(v) => v.get("id").and_then(Value::as_str),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            BundleResource::Known(r) => r.url(),
            BundleResource::Other(v) => v.get("url").and_then(Value::as_str),
        }
    }
}

impl<'de> Deserialize<'de> for BundleResource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value.get("resourceType").and_then(Value::as_str) {
            Some("Measure" | "Library" | "ValueSet") => Resource::deserialize(value)
                .map(BundleResource::Known)
                .map_err(serde::de::Error::custom),
            _ => Ok(BundleResource::Other(value)),
        }
    }
}

/// Resources a measure bundle is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Measure(Box<Measure>),
    Library(Box<Library>),
    ValueSet(Box<ValueSet>),
}

impl Resource {
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::Measure(_) => "Measure",
            Resource::Library(_) => "Library",
            Resource::ValueSet(_) => "ValueSet",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Measure(m) => m.id.as_deref(),
            Resource::Library(l) => l.id.as_deref(),
            Resource::ValueSet(v) => v.id.as_deref(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Resource::Measure(m) => m.url.as_deref(),
            Resource::Library(l) => l.url.as_deref(),
            Resource::ValueSet(v) => v.url.as_deref(),
        }
    }
}

// ============================================================================
// Measure
// ============================================================================

/// FHIR Measure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub library: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_scoring: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_notation: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_artifact: Vec<RelatedArtifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<MeasureGroup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Measure.group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub population: Vec<MeasureGroupPopulation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Measure.group.population
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureGroupPopulation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Expression>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// FHIR Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Expression {
    pub fn cql_identifier(expression: impl Into<String>) -> Self {
        Self {
            language: codes::CQL_IDENTIFIER_LANGUAGE.to_string(),
            expression: Some(expression.into()),
            extra: Map::new(),
        }
    }
}

// ============================================================================
// Library
// ============================================================================

/// FHIR Library
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub library_type: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_artifact: Vec<RelatedArtifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Attachment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Library {
    /// First content attachment with the given content type
    pub fn content_of_type(&self, content_type: &str) -> Option<&Attachment> {
        self.content
            .iter()
            .find(|a| a.content_type.as_deref() == Some(content_type))
    }
}

/// FHIR Attachment; `data` is base64
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// ValueSet
// ============================================================================

/// FHIR ValueSet, passed through as read from the value set directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Datatypes
// ============================================================================

/// FHIR CodeableConcept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CodeableConcept {
    /// Concept with a single coding
    pub fn from_code(system: &str, code: &str) -> Self {
        Self {
            coding: vec![Coding {
                system: Some(system.to_string()),
                code: Some(code.to_string()),
                display: None,
                extra: Map::new(),
            }],
            text: None,
            extra: Map::new(),
        }
    }

    /// Code of the first coding
    pub fn first_code(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.code.as_deref())
    }
}

/// FHIR Coding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// FHIR RelatedArtifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedArtifact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RelatedArtifact {
    pub fn depends_on(display: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            extension: Vec::new(),
            artifact_type: codes::DEPENDS_ON.to_string(),
            display: Some(display.into()),
            resource: Some(resource.into()),
            extra: Map::new(),
        }
    }

    pub fn composed_of(resource: impl Into<String>) -> Self {
        Self {
            extension: Vec::new(),
            artifact_type: codes::COMPOSED_OF.to_string(),
            display: None,
            resource: Some(resource.into()),
            extra: Map::new(),
        }
    }
}

/// FHIR Extension with the value types used by measure bundles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_decimal: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Extension {
    fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            value_code: None,
            value_string: None,
            value_codeable_concept: None,
            value_decimal: None,
            extra: Map::new(),
        }
    }

    pub fn code(url: &str, code: impl Into<String>) -> Self {
        Self {
            value_code: Some(code.into()),
            ..Self::empty(url)
        }
    }

    pub fn string(url: &str, value: impl Into<String>) -> Self {
        Self {
            value_string: Some(value.into()),
            ..Self::empty(url)
        }
    }

    pub fn codeable_concept(url: &str, concept: CodeableConcept) -> Self {
        Self {
            value_codeable_concept: Some(concept),
            ..Self::empty(url)
        }
    }

    pub fn decimal(url: &str, value: Decimal) -> Self {
        Self {
            value_decimal: Some(value),
            ..Self::empty(url)
        }
    }
}
