//! Merging measure groups across bundles

use octofhir_measure_diagnostics::{MeasureError, Result, MB0302};
use octofhir_measure_model::{Bundle, BundleResource, Measure, MeasureGroup, Resource};
use tracing::info;

/// Combine the groups of equally shaped measure bundles into one bundle.
///
/// Every bundle must hold the same number of entries and exactly one Measure.
/// The result is the first bundle with its Measure's groups replaced by the
/// groups of all measures, in bundle order. Other entries are copied from the
/// first bundle unchanged.
pub fn combine_groups(bundles: &[Bundle]) -> Result<Bundle> {
    let Some(first) = bundles.first() else {
        return Err(merge_error("No bundles to combine"));
    };

    let expected = first.entries().len();
    if expected == 0 {
        return Err(merge_error("No entry found on bundle 1"));
    }

    for (index, bundle) in bundles.iter().enumerate().skip(1) {
        let count = bundle.entries().len();
        if count != expected {
            return Err(merge_error(format!(
                "Measure bundles must have the same number of resources: bundle {} has {}, bundle 1 has {}",
                index + 1,
                count,
                expected
            )));
        }
    }

    let mut groups: Vec<MeasureGroup> = Vec::new();
    for (index, bundle) in bundles.iter().enumerate() {
        groups.extend(single_measure(bundle, index)?.group.iter().cloned());
    }
    info!(bundles = bundles.len(), groups = groups.len(), "Combined measure groups");

    let mut combined = first.clone();
    for entry in combined.entry.iter_mut().flatten() {
        if let Some(BundleResource::Known(Resource::Measure(measure))) = &mut entry.resource {
            measure.group = groups;
            break;
        }
    }

    Ok(combined)
}

/// The only Measure of `bundle`
pub(crate) fn single_measure(bundle: &Bundle, index: usize) -> Result<&Measure> {
    let mut measures = bundle.measures();
    let Some(measure) = measures.next() else {
        return Err(merge_error(format!("Bundle {} is missing a Measure resource", index + 1)));
    };
    if measures.next().is_some() {
        return Err(merge_error(format!(
            "Bundle {} contains more than one Measure resource",
            index + 1
        )));
    }
    Ok(measure)
}

pub(crate) fn merge_error(message: impl Into<String>) -> MeasureError {
    MeasureError::reference(MB0302, message)
}
