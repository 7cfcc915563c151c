//! Bundler error types

use crate::{ErrorCode, SourceLocation, MB0200, MB0400, MB0401};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level, as reported by the translator's `errorSeverity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - bundle generation cannot proceed
    Error,
    /// Warning - potential issue but can continue
    Warning,
    /// Information - informational message
    Info,
}

impl Severity {
    /// Parse a translator severity string; unknown values are treated as info
    pub fn from_annotation(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with an explicit severity
    pub fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main bundler error type
#[derive(Debug, Clone, Error)]
pub enum MeasureError {
    /// Malformed input (missing library declaration, unreadable document)
    #[error("{code}: {message}")]
    Parse {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// A referenced library has no matching compiled document or source
    #[error("{code}: {message}")]
    Resolution {
        code: ErrorCode,
        message: String,
        library: String,
    },

    /// The translator reported error-severity annotations
    #[error("{code}: translation failed with {} error(s)", .diagnostics.len())]
    Translation {
        code: ErrorCode,
        diagnostics: Vec<Diagnostic>,
    },

    /// A population or bundle reference could not be satisfied
    #[error("{code}: {message}")]
    Reference { code: ErrorCode, message: String },

    /// Scoring population requirements are unmet, one message per violation
    #[error("{code}: {} population constraint violation(s)", .violations.len())]
    ConstraintViolation {
        code: ErrorCode,
        violations: Vec<String>,
    },

    /// Referenced value sets missing from the value set directory
    #[error("{code}: could not find ValueSet resources for: {}", .unmatched.join(", "))]
    ValueSet {
        code: ErrorCode,
        unmatched: Vec<String>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl MeasureError {
    /// Create a parse error
    pub fn parse(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create a resolution error naming the unresolved library
    pub fn resolution(
        code: ErrorCode,
        message: impl Into<String>,
        library: impl Into<String>,
    ) -> Self {
        Self::Resolution {
            code,
            message: message.into(),
            library: library.into(),
        }
    }

    /// Create a translation error from error-severity diagnostics
    pub fn translation(diagnostics: Vec<Diagnostic>) -> Self {
        Self::Translation {
            code: MB0200,
            diagnostics,
        }
    }

    /// Create a reference error
    pub fn reference(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Reference {
            code,
            message: message.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraints(violations: Vec<String>) -> Self {
        Self::ConstraintViolation {
            code: MB0400,
            violations,
        }
    }

    /// Create a value set error listing every unmatched URL
    pub fn value_sets(unmatched: Vec<String>) -> Self {
        Self::ValueSet {
            code: MB0401,
            unmatched,
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to parse and system errors
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::Parse { context, .. } | Self::System { context, .. } => {
                *context = Some(ctx.into());
            }
            _ => {}
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { code, .. } => *code,
            Self::Resolution { code, .. } => *code,
            Self::Translation { code, .. } => *code,
            Self::Reference { code, .. } => *code,
            Self::ConstraintViolation { code, .. } => *code,
            Self::ValueSet { code, .. } => *code,
            Self::System { code, .. } => *code,
        }
    }

    /// Expand the error into the individual diagnostics a user should see
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Translation { diagnostics, .. } => diagnostics.clone(),
            Self::ConstraintViolation { code, violations } => violations
                .iter()
                .map(|v| Diagnostic::error(*code, v.clone()))
                .collect(),
            Self::ValueSet { code, unmatched } => unmatched
                .iter()
                .map(|url| Diagnostic::error(*code, format!("No ValueSet found for {}", url)))
                .collect(),
            Self::Parse { code, message, context } | Self::System { code, message, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                vec![diag]
            }
            Self::Resolution { code, message, .. } | Self::Reference { code, message } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                vec![diag]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MB0001, MB0100};

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(MB0200, "Could not resolve identifier Foo")
            .with_location(SourceLocation::new(12, 5).in_library("Main"));

        assert!(diag.to_string().contains("MB0200"));
        assert!(diag.to_string().contains("Main:12:5"));
    }

    #[test]
    fn test_severity_from_annotation() {
        assert_eq!(Severity::from_annotation("error"), Severity::Error);
        assert_eq!(Severity::from_annotation("Warning"), Severity::Warning);
        assert_eq!(Severity::from_annotation("info"), Severity::Info);
    }

    #[test]
    fn test_constraint_violations_expand_to_diagnostics() {
        let err = MeasureError::constraints(vec!["first".into(), "second".into()]);

        assert_eq!(err.code(), MB0400);
        assert_eq!(err.diagnostics().len(), 2);
        assert!(err.to_string().contains("2 population constraint violation(s)"));
    }

    #[test]
    fn test_resolution_error_carries_help() {
        let err = MeasureError::resolution(MB0100, "Unresolved library Helpers|1.0.0", "Helpers");

        let diags = err.diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].help.is_some());
    }

    #[test]
    fn test_with_context() {
        let err = MeasureError::parse(MB0001, "No library declaration").with_context("main.cql");

        assert!(matches!(err, MeasureError::Parse { context: Some(ref c), .. } if c == "main.cql"));
    }
}
