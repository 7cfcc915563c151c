//! Measure bundle composition
//!
//! Builds FHIR Library and Measure resources from resolved libraries and
//! population criteria, and works on whole bundles:
//!
//! - [`generate_measure_bundle`]: one measure, its libraries and value sets
//! - [`combine_groups`]: merge the groups of equally shaped bundles
//! - [`make_composite`]: a composite measure over component bundles

pub mod bundle;
pub mod combine;
pub mod composite;
pub mod library;
pub mod measure;

pub use bundle::{generate_measure_bundle, referenced_value_set_urls, MeasureBundleParts};
pub use combine::combine_groups;
pub use composite::{make_composite, ComponentOverride, CompositeOptions};
pub use library::{build_library, decode_content};
pub use measure::{build_group, build_measure, measure_resource_id};
