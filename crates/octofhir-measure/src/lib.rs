//! FHIR Measure Bundle generation for CQL measure libraries
//!
//! This crate ties together the bundling components:
//! - Reading library declarations and includes from CQL source
//! - Resolving the libraries a measure depends on
//! - Describing measure groups and their population criteria
//! - Composing Measure, Library and ValueSet resources into bundles
//!
//! # Example
//!
//! ```ignore
//! use octofhir_measure::criteria::{build_simple_criteria, GroupInfo, PopulationCode, ScoringCode};
//!
//! let mut criteria = build_simple_criteria(PopulationCode::InitialPopulation, vec!["IPP".into()])?;
//! criteria.merge(build_simple_criteria(PopulationCode::Denominator, "Denominator")?);
//! criteria.merge(build_simple_criteria(PopulationCode::Numerator, "Numerator")?);
//!
//! let group = GroupInfo::new(ScoringCode::Proportion, criteria);
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_measure_compose as compose;
pub use octofhir_measure_cql as cql;
pub use octofhir_measure_criteria as criteria;
pub use octofhir_measure_deps as deps;
pub use octofhir_measure_diagnostics as diagnostics;
pub use octofhir_measure_elm as elm;
pub use octofhir_measure_model as model;

// Convenience re-exports
pub use octofhir_measure_compose::{combine_groups, generate_measure_bundle, make_composite};
pub use octofhir_measure_criteria::{validate_constraints, GroupInfo};
pub use octofhir_measure_diagnostics::{MeasureError, Result};
pub use octofhir_measure_elm::{LibraryDocument, LibraryIdentifier};
pub use octofhir_measure_model::Bundle;

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
