//! Library declaration, include and define extraction

use crate::preprocess::strip_comments;
use octofhir_measure_elm::LibraryIdentifier;
use regex::{Captures, Regex};
use std::sync::LazyLock;

const IDENT: &str = r#"(?:"([^"]+)"|([A-Za-z_][A-Za-z0-9_]*))"#;

static LIBRARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*library\s+{IDENT}(?:\s+version\s+'([^']*)')?"
    ))
    .expect("library pattern is valid")
});

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*include\s+{IDENT}(?:\s+version\s+'([^']*)')?"
    ))
    .expect("include pattern is valid")
});

static DEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*define\s+(?:(?:public|private)\s+)?{IDENT}\s*:"
    ))
    .expect("define pattern is valid")
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*define\s+(?:(?:public|private)\s+)?(?:fluent\s+)?function\s+{IDENT}\s*\("
    ))
    .expect("function pattern is valid")
});

/// Quoted or plain identifier from capture groups 1/2
fn identifier(caps: &Captures<'_>) -> Option<String> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn versioned_identifier(caps: &Captures<'_>) -> Option<LibraryIdentifier> {
    let id = identifier(caps)?;
    let version = caps.get(3).map(|m| m.as_str().to_string());
    Some(LibraryIdentifier::new(id, version))
}

/// Identifier and version of the `library` declaration.
///
/// Returns `None` when the text declares no library. Only the first
/// declaration is considered.
pub fn extract_library_identifier(cql: &str) -> Option<LibraryIdentifier> {
    let cleaned = strip_comments(cql);
    LIBRARY_RE
        .captures(&cleaned)
        .and_then(|caps| versioned_identifier(&caps))
}

/// Every `include` statement in source order, duplicates preserved
pub fn extract_includes(cql: &str) -> Vec<LibraryIdentifier> {
    let cleaned = strip_comments(cql);
    INCLUDE_RE
        .captures_iter(&cleaned)
        .filter_map(|caps| versioned_identifier(&caps))
        .collect()
}

/// Names of defined expressions followed by names of defined functions,
/// each in declaration order
pub fn extract_defined_expression_names(cql: &str) -> Vec<String> {
    let cleaned = strip_comments(cql);

    let expressions = DEFINE_RE.captures_iter(&cleaned).filter_map(|c| identifier(&c));
    let functions = FUNCTION_RE.captures_iter(&cleaned).filter_map(|c| identifier(&c));

    expressions.chain(functions).collect()
}
