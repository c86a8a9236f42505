//! Core CLI commands for docmark: generate, ids, info.

use std::path::PathBuf;

use crate::config::Config;
use crate::error;
use crate::generate::{self, Request, Summary};
use crate::info;

/// Command-line values that override `.docmark.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Explicit config file instead of `./.docmark.toml`.
    pub config: Option<PathBuf>,
    /// Output directory.
    pub output: Option<PathBuf>,
    /// Type universe file.
    pub universe: Option<PathBuf>,
}

/// Load config and apply overrides.
///
/// # Errors
///
/// Returns config loading errors.
pub fn load_config(overrides: &Overrides) -> Result<Config, error::Error> {
    let config = match &overrides.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load(&PathBuf::from("."))?,
    };
    return Ok(config.with_overrides(overrides.universe.clone(), overrides.output.clone()));
}

/// Resolve the generation request for the current directory.
///
/// # Errors
///
/// Returns config loading errors or `Error::UniverseNotConfigured`.
pub fn load_request(overrides: &Overrides) -> Result<Request, error::Error> {
    let config = load_config(overrides)?;
    return Request::from_config(&config);
}

/// Run one generation and print its diagnostics summary.
///
/// # Errors
///
/// Returns every fatal error of the run.
pub fn generate(overrides: &Overrides) -> Result<(), error::Error> {
    let request = load_request(overrides)?;
    let summary = generate::run(&request)?;
    print_summary(&request, &summary);
    return Ok(());
}

/// Print `canonical-id -> page address` for every symbol with a page.
/// Symbols whose comment is missing are marked.
///
/// # Errors
///
/// Returns input loading and model building errors.
pub fn ids(overrides: &Overrides) -> Result<(), error::Error> {
    let request = load_request(overrides)?;
    let entries = generate::list_ids(&request)?;
    for entry in &entries {
        let marker = if entry.has_doc { "" } else { "  (no comment)" };
        println!("{} -> {}{marker}", entry.id, entry.address);
    }
    eprintln!("{} symbols", entries.len());
    return Ok(());
}

/// Print the docmark reference document.
pub fn info(json: bool) {
    info::run(json);
}

/// Diagnostics summary after a run, on stderr.
pub fn print_summary(request: &Request, summary: &Summary) {
    eprintln!("Wrote {} pages to {}", summary.pages, request.output.join(&request.name).display());
    eprintln!();
    eprintln!("## Diagnostics\n");
    eprintln!("- comments indexed: {}", summary.comments);
    eprintln!("- symbols without comment: {}", summary.undocumented);
    eprintln!("- unrecognized comment elements: {}", summary.ignored);
    eprintln!("- duplicate comment ids: {}", summary.duplicates);
    eprintln!("- unresolved cross-references: {}", summary.unresolved);
    eprintln!("- fragments appended: {}", summary.fragments);
}
