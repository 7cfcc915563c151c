//! FHIR data model for measure bundles
//!
//! Typed FHIR R4 structures for the resources a measure bundle carries
//! (Measure, Library, ValueSet) plus the transaction Bundle around them.
//! Members the bundler does not interpret are preserved through flattened
//! maps so bundles read from disk are written back without loss.

pub mod canonical;
pub mod codes;
pub mod resources;

pub use canonical::{canonical_url, combine_urls};
pub use resources::*;
