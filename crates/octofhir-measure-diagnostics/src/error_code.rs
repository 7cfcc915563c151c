//! Bundler error codes following a structured numbering system
//!
//! Error code ranges:
//! - MB0001-MB0099: Parse errors (CQL headers, ELM documents, bundles)
//! - MB0100-MB0199: Resolution errors (library dependencies)
//! - MB0200-MB0299: Translation errors (CQL-to-ELM service)
//! - MB0300-MB0399: Reference errors (population references, bundle merges)
//! - MB0400-MB0499: Constraint errors (scoring population rules, value sets)
//! - MB0500-MB0599: System errors (I/O, configuration, network)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    pub const fn is_resolution_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    pub const fn is_translation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_reference_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    pub const fn is_constraint_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    pub const fn is_system_error(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MB{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Parse errors (0001-0099)
    map.insert(1, ErrorInfo::new("Missing library declaration")
        .with_help("The main CQL file must start with `library <Name> version '<version>'`"));
    map.insert(2, ErrorInfo::new("Invalid ELM document"));
    map.insert(3, ErrorInfo::new("Invalid bundle"));
    map.insert(4, ErrorInfo::new("Invalid translator response"));

    // Resolution errors (0100-0199)
    map.insert(100, ErrorInfo::new("Unresolved library")
        .with_help("Supply the dependency with --deps or --deps-directory"));
    map.insert(101, ErrorInfo::new("Ambiguous library reference")
        .with_help("Add a version to the include statement"));
    map.insert(102, ErrorInfo::new("Conflicting library versions")
        .with_help("Include the same version of the library everywhere it is used"));

    // Translation errors (0200-0299)
    map.insert(200, ErrorInfo::new("Translation failed"));

    // Reference errors (0300-0399)
    map.insert(300, ErrorInfo::new("Unknown population reference"));
    map.insert(301, ErrorInfo::new("Missing population to reference"));
    map.insert(302, ErrorInfo::new("Bundle merge precondition failed"));
    map.insert(303, ErrorInfo::new("Population cardinality mismatch")
        .with_help("Only initial-population and measure-observation accept several expressions"));

    // Constraint errors (0400-0499)
    map.insert(400, ErrorInfo::new("Population constraint violated"));
    map.insert(401, ErrorInfo::new("Unmatched value set"));

    // System errors (0500-0599)
    map.insert(500, ErrorInfo::new("Internal error"));
    map.insert(501, ErrorInfo::new("I/O error"));
    map.insert(502, ErrorInfo::new("Configuration error"));
    map.insert(503, ErrorInfo::new("Network error"));

    map
});

// Parse errors
pub const MB0001: ErrorCode = ErrorCode::new(1);
pub const MB0002: ErrorCode = ErrorCode::new(2);
pub const MB0003: ErrorCode = ErrorCode::new(3);
pub const MB0004: ErrorCode = ErrorCode::new(4);

// Resolution errors
pub const MB0100: ErrorCode = ErrorCode::new(100);
pub const MB0101: ErrorCode = ErrorCode::new(101);
pub const MB0102: ErrorCode = ErrorCode::new(102);

// Translation errors
pub const MB0200: ErrorCode = ErrorCode::new(200);

// Reference errors
pub const MB0300: ErrorCode = ErrorCode::new(300);
pub const MB0301: ErrorCode = ErrorCode::new(301);
pub const MB0302: ErrorCode = ErrorCode::new(302);
pub const MB0303: ErrorCode = ErrorCode::new(303);

// Constraint errors
pub const MB0400: ErrorCode = ErrorCode::new(400);
pub const MB0401: ErrorCode = ErrorCode::new(401);

// System errors
pub const MB0500: ErrorCode = ErrorCode::new(500);
pub const MB0501: ErrorCode = ErrorCode::new(501);
pub const MB0502: ErrorCode = ErrorCode::new(502);
pub const MB0503: ErrorCode = ErrorCode::new(503);
