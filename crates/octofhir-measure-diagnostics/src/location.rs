//! Source locations reported by the CQL-to-ELM translator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a translator annotation inside a CQL library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Library the location belongs to, when the translator reports it
    pub library: Option<String>,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub const fn new(line: usize, column: usize) -> Self {
        Self {
            library: None,
            line,
            column,
        }
    }

    /// Attach the library name
    pub fn in_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.library {
            Some(library) => write!(f, "{}:{}:{}", library, self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(SourceLocation::new(3, 7).to_string(), "3:7");
        assert_eq!(
            SourceLocation::new(3, 7).in_library("Helpers").to_string(),
            "Helpers:3:7"
        );
    }
}
