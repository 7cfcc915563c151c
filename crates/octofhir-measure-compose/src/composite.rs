//! Composite measure assembly

use crate::combine::{merge_error, single_measure};
use indexmap::IndexSet;
use octofhir_measure_criteria::{CompositeScoring, ScoringCode, UniqueId};
use octofhir_measure_diagnostics::Result;
use octofhir_measure_model::codes::{
    COMPOSITE_SCORING_SYSTEM, GROUP_ID_EXT, MEASURE_SCORING_SYSTEM, WEIGHT_EXT,
};
use octofhir_measure_model::{
    canonical_url, Bundle, BundleEntry, CodeableConcept, Extension, Measure, RelatedArtifact,
    Resource,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Per-component settings carried on the composed-of artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentOverride {
    /// Group of the component measure that contributes to the composite
    pub group_id: Option<String>,
    pub weight: Option<Decimal>,
}

/// Settings for [`make_composite`]
#[derive(Debug, Clone)]
pub struct CompositeOptions {
    pub composite_scoring: CompositeScoring,
    pub canonical_base: String,
    /// Composite Measure id; generated when absent
    pub id: Option<String>,
    /// Overrides by component position
    pub components: Vec<ComponentOverride>,
}

impl CompositeOptions {
    pub fn new(composite_scoring: CompositeScoring, canonical_base: impl Into<String>) -> Self {
        Self {
            composite_scoring,
            canonical_base: canonical_base.into(),
            id: None,
            components: Vec::new(),
        }
    }
}

/// Build a composite Measure over component measure bundles.
///
/// The result starts with the composite Measure followed by the entries of
/// every component bundle, each resource once. Resources are identified by
/// canonical URL, or by type and id when they have none; the first occurrence
/// wins.
pub fn make_composite(components: &[Bundle], options: &CompositeOptions) -> Result<Bundle> {
    if components.is_empty() {
        return Err(merge_error("A composite measure needs at least one component bundle"));
    }

    let mut related_artifact = Vec::with_capacity(components.len());
    for (index, bundle) in components.iter().enumerate() {
        let measure = single_measure(bundle, index)?;
        let url = measure.url.as_deref().ok_or_else(|| {
            merge_error(format!(
                "Measure {} in bundle {} has no url to reference",
                measure.id.as_deref().unwrap_or("<unknown>"),
                index + 1
            ))
        })?;
        let overrides = options.components.get(index).cloned().unwrap_or_default();
        related_artifact.push(composed_of(url, overrides));
    }

    let id = options
        .id
        .clone()
        .unwrap_or_else(|| format!("composite-{}", UniqueId::generate()));
    let composite = Measure {
        url: Some(canonical_url(&options.canonical_base, "Measure", &id)),
        name: Some(id.clone()),
        id: Some(id),
        status: Some("draft".to_string()),
        scoring: Some(CodeableConcept::from_code(
            MEASURE_SCORING_SYSTEM,
            ScoringCode::Composite.code(),
        )),
        composite_scoring: Some(CodeableConcept::from_code(
            COMPOSITE_SCORING_SYSTEM,
            options.composite_scoring.code(),
        )),
        related_artifact,
        ..Default::default()
    };

    let mut bundle = Bundle::transaction();
    let entries = bundle.entry.get_or_insert_with(Vec::new);
    entries.push(BundleEntry::put(Resource::Measure(Box::new(composite))));

    let mut seen: IndexSet<String> = IndexSet::new();
    for entry in components.iter().flat_map(Bundle::entries) {
        if let Some(key) = entry_key(entry) {
            if !seen.insert(key) {
                debug!(resource = ?entry.resource_url(), "Skipping duplicate component resource");
                continue;
            }
        }
        entries.push(entry.clone());
    }

    info!(
        components = components.len(),
        entries = entries.len(),
        "Assembled composite measure"
    );
    Ok(bundle)
}

fn composed_of(url: &str, overrides: ComponentOverride) -> RelatedArtifact {
    let mut artifact = RelatedArtifact::composed_of(url);
    if let Some(group_id) = overrides.group_id {
        artifact.extension.push(Extension::string(GROUP_ID_EXT, group_id));
    }
    if let Some(weight) = overrides.weight {
        artifact.extension.push(Extension::decimal(WEIGHT_EXT, weight));
    }
    artifact
}

fn entry_key(entry: &BundleEntry) -> Option<String> {
    if let Some(url) = entry.resource_url() {
        return Some(url.to_string());
    }
    let resource = entry.resource.as_ref()?;
    Some(format!("{}/{}", resource.resource_type()?, resource.id()?))
}
