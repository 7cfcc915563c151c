//! ValueSet lookup from a directory of FHIR resources

use super::config::ValueSetMode;
use crate::diagnostics::{MeasureError, MB0502};
use crate::model::{BundleResource, Resource, ValueSet};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// ValueSet resources indexed by canonical URL
#[derive(Debug, Clone, Default)]
pub struct ValueSetStore {
    by_url: IndexMap<String, ValueSet>,
}

impl ValueSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.json` ValueSet resource in a directory. Other resource
    /// types are skipped.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to read ValueSet directory: {}", dir.display()))?
        {
            let path = entry
                .with_context(|| format!("Failed to read ValueSet directory: {}", dir.display()))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut store = Self::new();
        for path in paths {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read ValueSet file: {}", path.display()))?;
            let resource: BundleResource = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse ValueSet file: {}", path.display()))?;
            match resource {
                BundleResource::Known(Resource::ValueSet(value_set)) => {
                    store.insert(*value_set);
                }
                other => {
                    debug!(
                        path = %path.display(),
                        resource_type = other.resource_type().unwrap_or("unknown"),
                        "Skipping non-ValueSet resource"
                    );
                }
            }
        }
        Ok(store)
    }

    /// Add a value set; the first one seen for a URL wins
    pub fn insert(&mut self, value_set: ValueSet) -> bool {
        let Some(url) = value_set.url.clone() else {
            debug!(id = value_set.id.as_deref().unwrap_or("-"), "Skipping ValueSet without url");
            return false;
        };
        if self.by_url.contains_key(&url) {
            debug!(url = %url, "Ignoring duplicate ValueSet");
            return false;
        }
        self.by_url.insert(url, value_set);
        true
    }

    /// Find a value set by canonical URL. A `url|version` reference falls
    /// back to the bare URL.
    pub fn lookup(&self, url: &str) -> Option<&ValueSet> {
        self.by_url.get(url).or_else(|| {
            let (bare, _version) = url.split_once('|')?;
            self.by_url.get(bare)
        })
    }

    /// Value sets for every URL, in URL order and each resource once. Fails
    /// listing every URL without a match.
    pub fn resolve(&self, urls: &[String]) -> crate::Result<Vec<ValueSet>> {
        let mut matched: IndexMap<&str, &ValueSet> = IndexMap::with_capacity(urls.len());
        let mut unmatched = Vec::new();
        for url in urls {
            match self.lookup(url) {
                Some(value_set) => {
                    let key = value_set.url.as_deref().unwrap_or(url.as_str());
                    matched.entry(key).or_insert(value_set);
                }
                None => unmatched.push(url.clone()),
            }
        }

        if unmatched.is_empty() {
            Ok(matched.into_values().cloned().collect())
        } else {
            Err(MeasureError::value_sets(unmatched))
        }
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

/// ValueSet resources for the referenced URLs under the configured mode
pub fn resolve_value_sets(
    mode: &ValueSetMode,
    library: &str,
    urls: &[String],
) -> Result<Vec<ValueSet>> {
    match mode {
        ValueSetMode::Disabled => {
            warn!(
                "Configured bundler to not resolve ValueSet resources. Resulting Bundle may be incomplete"
            );
            Ok(Vec::new())
        }
        ValueSetMode::Unspecified if urls.is_empty() => Ok(Vec::new()),
        ValueSetMode::Unspecified => Err(MeasureError::system(
            MB0502,
            format!(
                "Library {} uses valuesets, but -v/--valuesets directory not provided",
                library
            ),
        )
        .with_context("To disable ValueSet resolution, use --no-valuesets")
        .into()),
        ValueSetMode::Directory(dir) => {
            let store = ValueSetStore::from_directory(dir)?;
            info!(count = store.len(), dir = %dir.display(), "Loaded ValueSet resources");
            Ok(store.resolve(urls)?)
        }
    }
}
