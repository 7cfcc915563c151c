//! Gathering main and dependency library inputs

use super::config::{DependencyInput, MainInput};
use super::translator::TranslationRequest;
use crate::deps::{cql_dependency_closure, CqlSource, CqlSourcePool};
use crate::elm::LibraryDocument;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dependency files for a run, sorted by path.
///
/// Directory scans keep files with the main input's extension and skip the
/// main file itself.
pub fn dependency_paths(main: &MainInput, dependencies: &DependencyInput) -> Result<Vec<PathBuf>> {
    let mut paths = match dependencies {
        DependencyInput::None => Vec::new(),
        DependencyInput::Files(files) => files.clone(),
        DependencyInput::Directory(dir) => scan_directory(dir, main)?,
    };
    paths.sort();
    debug!(count = paths.len(), "Gathered dependency files");
    Ok(paths)
}

fn scan_directory(dir: &Path, main: &MainInput) -> Result<Vec<PathBuf>> {
    let main_name = main.path().file_name();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read dependency directory: {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read dependency directory: {}", dir.display()))?
            .path();
        let same_extension = path.extension().is_some_and(|ext| ext == main.extension());
        if path.is_file() && same_extension && path.file_name() != main_name {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Read a CQL file and locate its library declaration
pub fn read_cql_source(path: &Path) -> Result<CqlSource> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CQL file: {}", path.display()))?;
    let source = CqlSource::new(text).map_err(|e| e.with_context(path.display().to_string()))?;
    Ok(source.with_path(path))
}

pub fn load_cql_sources(paths: &[PathBuf]) -> Result<CqlSourcePool> {
    let mut pool = CqlSourcePool::new();
    for path in paths {
        pool.insert(read_cql_source(path)?);
    }
    Ok(pool)
}

/// Read a compiled ELM JSON document, keeping its text as read
pub fn read_elm_document(path: &Path) -> Result<LibraryDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ELM file: {}", path.display()))?;
    let document =
        LibraryDocument::from_json(raw).map_err(|e| e.with_context(path.display().to_string()))?;
    Ok(document)
}

pub fn load_elm_documents(paths: &[PathBuf]) -> Result<Vec<LibraryDocument>> {
    paths.iter().map(|path| read_elm_document(path)).collect()
}

/// Request holding the main library and every library it reaches through
/// includes. Sources nothing includes are left out.
pub fn translation_request(main: &CqlSource, pool: &CqlSourcePool) -> Result<TranslationRequest> {
    let mut request = TranslationRequest::new();
    request.insert(main.name(), main.text());

    for identifier in cql_dependency_closure(main.text(), pool)? {
        let source = pool.resolve(&identifier)?;
        request.insert(source.name(), source.text());
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_directory_scan_filters_extension_and_main() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(&dir, "Main.cql", "library Main");
        write(&dir, "B.cql", "library B");
        write(&dir, "A.cql", "library A");
        write(&dir, "A.json", "{}");
        fs::create_dir(dir.path().join("nested.cql")).unwrap();

        let paths = dependency_paths(
            &MainInput::Cql(main),
            &DependencyInput::Directory(dir.path().to_path_buf()),
        )
        .unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A.cql", "B.cql"]);
    }

    #[test]
    fn test_elm_mode_scans_json() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(&dir, "Main.json", "{}");
        write(&dir, "Dep.json", "{}");
        write(&dir, "Dep.cql", "library Dep");

        let paths = dependency_paths(
            &MainInput::Elm(main),
            &DependencyInput::Directory(dir.path().to_path_buf()),
        )
        .unwrap();

        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("Dep.json"));
    }

    #[test]
    fn test_missing_library_declaration() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "Broken.cql", "define \"X\": true");

        let err = read_cql_source(&path).unwrap_err();

        assert!(err.to_string().contains("library declaration"));
    }

    #[test]
    fn test_translation_request_only_reachable_libraries() {
        let main = CqlSource::new("library Main version '1'\ninclude A version '1'").unwrap();
        let pool = CqlSourcePool::from_sources([
            CqlSource::new("library A version '1'\ninclude B").unwrap(),
            CqlSource::new("library B version '2'").unwrap(),
            CqlSource::new("library Unused").unwrap(),
        ]);

        let request = translation_request(&main, &pool).unwrap();

        assert_eq!(request.names().collect::<Vec<_>>(), vec!["A", "B", "Main"]);
    }
}
