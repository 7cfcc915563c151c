//! Compiled CQL (ELM) library documents
//!
//! This crate provides:
//! - `LibraryIdentifier`, the id/version pair used to key libraries
//! - `LibraryDocument`, one compiled library with its includes, value set
//!   references and translator annotations, keeping the raw JSON text intact
//! - The subset of the HL7 ELM library header needed for bundling

pub mod document;
pub mod identifier;
pub mod model;

pub use document::LibraryDocument;
pub use identifier::LibraryIdentifier;
pub use model::*;
