//! File watcher: generates on startup, then regenerates on input changes.
//! Every run is a full regeneration with a fresh context.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};
use tracing::{debug, warn};

use crate::commands::{self, Overrides};
use crate::diagnostics;
use crate::error;
use crate::generate;

/// Debounce delay between filesystem events and regeneration.
const DEBOUNCE_MS: u64 = 100;

/// Directories to watch: parents of file inputs, directory inputs as-is.
fn collect_watch_dirs(inputs: &[PathBuf], config: Option<&Path>) -> HashSet<PathBuf> {
    let mut dirs = HashSet::new();
    for input in inputs.iter().map(PathBuf::as_path).chain(config) {
        if input.is_dir() {
            dirs.insert(input.to_path_buf());
        } else if let Some(parent) = input.parent() {
            let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
            dirs.insert(parent.to_path_buf());
        }
    }
    return dirs;
}

/// Create a filesystem watcher that sends events on the given channel.
/// Events that only touch the output directory are dropped so our own
/// writes never trigger another run.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    output: PathBuf,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && !event.paths.iter().all(|p| return p.starts_with(&output))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::WatchFailed { reason: format!("watcher setup failed: {e}") };
    });
}

/// Entry point for the watch command.
///
/// Runs an initial generation, then watches every input and regenerates
/// on changes.
///
/// # Errors
///
/// Returns config errors or `Error::WatchFailed` if watching cannot start.
pub fn run(overrides: &Overrides) -> Result<ExitCode, error::Error> {
    eprintln!("watch: initial generation");
    let mut last_code = run_generate(overrides);

    let config = commands::load_config(overrides)?;
    let request = generate::Request::from_config(&config)?;
    let watch_dirs = collect_watch_dirs(&request.inputs(), config.source.as_deref());
    let output = std::path::absolute(&request.output).unwrap_or_else(|_| return request.output.clone());

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, output)?;

    for dir in &watch_dirs {
        if !dir.exists() {
            continue;
        }
        if let Err(e) = watcher.watch(dir, RecursiveMode::Recursive) {
            warn!(dir = %dir.display(), error = %e, "cannot watch directory");
        }
    }

    let dir_count = watch_dirs.len();
    eprintln!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        debug!("change detected");
        eprintln!("watch: change detected, regenerating...");
        last_code = run_generate(overrides);
    }

    return Ok(last_code);
}

/// Generate once and print the result. Config is reloaded each time.
fn run_generate(overrides: &Overrides) -> ExitCode {
    return match commands::generate(overrides) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
