//! CQL library header extraction
//!
//! Full CQL parsing is delegated to the translation service. This crate only
//! reads what bundling needs from raw library text:
//! - the `library` declaration
//! - `include` statements
//! - names of `define` expressions and functions, for criteria selection

mod extract;
mod preprocess;

pub use extract::{extract_defined_expression_names, extract_includes, extract_library_identifier};
pub use preprocess::strip_comments;
