//! Bundle command implementation

use super::config::{BundleConfig, MainInput};
use super::translator::{check_annotations, HttpTranslator, Translator};
use super::{output, sources, valuesets};
use crate::compose::{generate_measure_bundle, referenced_value_set_urls, MeasureBundleParts};
use crate::criteria::{ensure_constraints, GroupInfo};
use crate::deps::DocumentPool;
use crate::diagnostics::{MeasureError, MB0004};
use crate::elm::LibraryDocument;
use crate::model::Bundle;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Compiled libraries of one run
#[derive(Debug, Clone)]
pub struct CompiledLibraries {
    pub main: LibraryDocument,
    pub pool: DocumentPool,
    /// CQL text by library name, empty when starting from ELM
    pub cql_sources: BTreeMap<String, String>,
}

/// Build a measure bundle and write it to the configured output
pub async fn run(config: BundleConfig, groups: Vec<GroupInfo>) -> Result<()> {
    let translator = HttpTranslator::new(config.translator_url.clone())?;
    let bundle = bundle(&config, &groups, &translator).await?;

    output::write_bundle(&bundle, &config.output)?;
    if config.summary {
        println!("{}", output::format_bundle_summary(&bundle));
    }
    Ok(())
}

/// Build a measure bundle.
///
/// Group constraints and population references are checked before any
/// library is read or translated.
pub async fn bundle(
    config: &BundleConfig,
    groups: &[GroupInfo],
    translator: &dyn Translator,
) -> Result<Bundle> {
    ensure_constraints(groups)?;
    for group in groups {
        group.criteria.validate_references()?;
    }

    let dependency_paths = sources::dependency_paths(&config.main, &config.dependencies)?;
    let compiled = match &config.main {
        MainInput::Cql(path) => compile_cql(path, &dependency_paths, translator).await?,
        MainInput::Elm(path) => load_elm(path, &dependency_paths)?,
    };

    check_annotations(compiled.pool.documents())?;

    if let Some(dir) = &config.debug_dir {
        write_debug_documents(dir, compiled.pool.documents())?;
    }

    let value_set_urls = referenced_value_set_urls(&compiled.main, &compiled.pool)?;
    debug!(count = value_set_urls.len(), "Collected referenced ValueSets");
    let value_sets = valuesets::resolve_value_sets(
        &config.value_sets,
        &compiled.main.identifier().id,
        &value_set_urls,
    )?;

    info!(library = %compiled.main.identifier(), groups = groups.len(), "Generating measure bundle");
    let bundle = generate_measure_bundle(MeasureBundleParts {
        main: &compiled.main,
        pool: &compiled.pool,
        cql_sources: &compiled.cql_sources,
        groups,
        value_sets,
        canonical_base: &config.canonical_base,
    })?;
    Ok(bundle)
}

/// Translate the main CQL library together with the libraries it includes
pub async fn compile_cql(
    main_path: &Path,
    dependency_paths: &[PathBuf],
    translator: &dyn Translator,
) -> Result<CompiledLibraries> {
    let main = sources::read_cql_source(main_path)?;
    let cql_pool = sources::load_cql_sources(dependency_paths)?;
    let request = sources::translation_request(&main, &cql_pool)?;

    let documents = translator.translate(&request).await?;

    let main_document = documents
        .get(main.name())
        .or_else(|| {
            documents
                .values()
                .find(|doc| doc.identifier().id == main.name())
        })
        .cloned()
        .ok_or_else(|| {
            MeasureError::parse(
                MB0004,
                format!("Translation response has no document for library {}", main.name()),
            )
        })?;

    Ok(CompiledLibraries {
        main: main_document,
        pool: DocumentPool::from_documents(documents.into_values()),
        cql_sources: request.libraries().clone(),
    })
}

/// Read precompiled ELM documents
pub fn load_elm(main_path: &Path, dependency_paths: &[PathBuf]) -> Result<CompiledLibraries> {
    let main = sources::read_elm_document(main_path)?;
    let mut pool = DocumentPool::from_documents([main.clone()]);
    for document in sources::load_elm_documents(dependency_paths)? {
        pool.insert(document);
    }

    Ok(CompiledLibraries {
        main,
        pool,
        cql_sources: BTreeMap::new(),
    })
}

/// Write each document as `<dir>/<libraryId>.json`
pub fn write_debug_documents<'a>(
    dir: &Path,
    documents: impl IntoIterator<Item = &'a LibraryDocument>,
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create debug directory: {}", dir.display()))?;

    for document in documents {
        let value: serde_json::Value = serde_json::from_str(document.raw_json())
            .context("Failed to re-read compiled library")?;
        let path = dir.join(format!("{}.json", document.identifier().id));
        output::write_output(&serde_json::to_string_pretty(&value)?, &path)?;
        debug!(path = %path.display(), "Wrote compiled library");
    }
    Ok(())
}
