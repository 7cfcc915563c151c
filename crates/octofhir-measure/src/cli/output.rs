//! Output formatting utilities

use crate::diagnostics::MeasureError;
use crate::model::Bundle;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stderr().is_terminal()),
    }
}

/// Format an error for display, expanding bundler diagnostics one per line
pub fn format_error(error: &anyhow::Error) -> String {
    let mut out = format!("{} {}", "Error:".red().bold(), error);
    if let Some(err) = error.downcast_ref::<MeasureError>() {
        let diagnostics = err.diagnostics();
        if diagnostics.len() > 1 || matches!(err, MeasureError::Translation { .. }) {
            for diag in diagnostics {
                out.push_str(&format!("\n  {} {}", "-".red(), diag));
                if let Some(help) = &diag.help {
                    out.push_str(&format!("\n    {} {}", "help:".cyan(), help));
                }
            }
        } else if let Some(help) = diagnostics.first().and_then(|d| d.help.as_ref()) {
            out.push_str(&format!("\n  {} {}", "help:".cyan(), help));
        }
    }
    out
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write content to a file, creating parent directories
pub fn write_output(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write to output file: {}", path.display()))
}

/// Serialize a bundle as pretty JSON and write it
pub fn write_bundle(bundle: &Bundle, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(bundle).context("Failed to serialize bundle")?;
    write_output(&content, path)?;
    eprintln!(
        "{}",
        format_success(&format!("Wrote bundle to {}", path.display()))
    );
    Ok(())
}

/// Read a bundle from a JSON file
pub fn read_bundle(path: &Path) -> Result<Bundle> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bundle: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse bundle: {}", path.display()))
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Url")]
    url: String,
    #[tabled(rename = "Request")]
    request: String,
}

/// One table row per bundle entry
pub fn format_bundle_summary(bundle: &Bundle) -> String {
    if bundle.entries().is_empty() {
        return "(empty bundle)".to_string();
    }

    let rows: Vec<EntryRow> = bundle
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let resource = entry.resource.as_ref();
            EntryRow {
                index: i + 1,
                resource_type: entry.resource_type().unwrap_or("-").to_string(),
                id: resource.and_then(|r| r.id()).unwrap_or("-").to_string(),
                url: entry.resource_url().unwrap_or("-").to_string(),
                request: entry
                    .request
                    .as_ref()
                    .map(|r| format!("{} {}", r.method, r.url))
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect();

    Table::new(rows).with(Style::modern()).to_string()
}
