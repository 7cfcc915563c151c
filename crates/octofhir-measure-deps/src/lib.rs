//! Library dependency resolution
//!
//! Two resolution modes are supported:
//! - CQL sources: follow `include` statements from the main library to find
//!   which sources must be sent to the translator
//! - Compiled documents: resolve includes against a pool of ELM documents,
//!   producing direct and transitive dependency sets
//!
//! Related artifacts for Library resources are built from the resolved sets.

pub mod artifacts;
pub mod closure;
pub mod cql;
pub mod pool;

pub use artifacts::{
    library_canonical, library_related_artifacts, library_resource_id, value_set_related_artifacts,
    value_set_urls,
};
pub use closure::{direct_dependencies, transitive_dependencies, DependencyClosure};
pub use cql::{cql_dependency_closure, CqlSource, CqlSourcePool};
pub use pool::DocumentPool;
