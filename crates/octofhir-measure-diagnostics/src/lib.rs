//! Measure bundling diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by every
//! bundling component: error codes, translator annotation locations and the
//! error kinds surfaced to the command-line tool.

mod error;
mod error_code;
mod location;

pub use error::*;
pub use error_code::*;
pub use location::*;

/// Result type for measure bundling operations
pub type Result<T> = std::result::Result<T, MeasureError>;
