//! Library identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a CQL library: a name and an optional version.
///
/// The derived `Eq`/`Hash` compare the exact id/version pair and are used for
/// deduplication. Use [`LibraryIdentifier::matches`] for reference lookups,
/// where a missing version acts as a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryIdentifier {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl LibraryIdentifier {
    pub fn new(id: impl Into<String>, version: Option<impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            version: version.map(Into::into),
        }
    }

    /// Identifier that matches any version of `id`
    pub fn unversioned(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
        }
    }

    pub fn versioned(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: Some(version.into()),
        }
    }

    /// Ids must be equal; versions are compared only when both sides have one.
    pub fn matches(&self, other: &LibraryIdentifier) -> bool {
        if self.id != other.id {
            return false;
        }
        match (&self.version, &other.version) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for LibraryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}|{}", self.id, version),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ignores_missing_version() {
        let any = LibraryIdentifier::unversioned("Helpers");
        let v1 = LibraryIdentifier::versioned("Helpers", "1.0.0");
        let v2 = LibraryIdentifier::versioned("Helpers", "2.0.0");

        assert!(any.matches(&v1));
        assert!(v1.matches(&any));
        assert!(!v1.matches(&v2));
        assert!(!any.matches(&LibraryIdentifier::unversioned("Other")));
    }

    #[test]
    fn test_equality_is_exact() {
        assert_ne!(
            LibraryIdentifier::unversioned("Helpers"),
            LibraryIdentifier::versioned("Helpers", "1.0.0")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(LibraryIdentifier::versioned("A", "1.0.0").to_string(), "A|1.0.0");
        assert_eq!(LibraryIdentifier::unversioned("A").to_string(), "A");
    }
}
