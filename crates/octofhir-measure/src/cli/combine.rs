//! Combine-groups command implementation

use super::output;
use crate::compose::combine_groups;
use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::info;

/// Configuration for the combine-groups command
pub struct CombineConfig {
    pub bundles: Vec<PathBuf>,
    pub output: PathBuf,
    pub summary: bool,
}

/// Merge the measure groups of several bundles into the first one
pub async fn run(config: CombineConfig) -> Result<()> {
    if config.bundles.len() < 2 {
        bail!("combine-groups needs at least two bundles");
    }

    let bundles = config
        .bundles
        .iter()
        .map(|path| output::read_bundle(path))
        .collect::<Result<Vec<_>>>()?;
    info!(count = bundles.len(), "Combining measure groups");

    let combined = combine_groups(&bundles)?;

    output::write_bundle(&combined, &config.output)?;
    if config.summary {
        println!("{}", output::format_bundle_summary(&combined));
    }
    Ok(())
}
