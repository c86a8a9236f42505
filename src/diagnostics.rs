use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::AmbiguousCanonicalId { first, id, second } => render_ambiguous_id(id, first, second),
        Error::AmbiguousPageAddress { address, claimed_by, conflicting } => {
            render_ambiguous_page(address, claimed_by, conflicting)
        },
        Error::InputMissing { path, what } => render_input_missing(path, what),
        Error::MalformedDocument { file, reason } => render_malformed_document(file, reason),
        Error::UniverseCorrupt { file, reason } => render_universe_corrupt(file, reason),
        Error::UniverseNotConfigured => render_universe_not_configured(),
        _ => render_generic(e),
    };
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Check the `--config` path, or drop it to use `./{CONFIG_FILE}`.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_ambiguous_id(id: &str, first: &str, second: &str) -> String {
    return format!("\
# Error: Ambiguous Canonical ID

`{first}` and `{second}` both produce `{id}`.

Comments keyed by this ID cannot be told apart, so generation stops
instead of attaching one symbol's documentation to the other.

## Fix

Check the type universe for a duplicated member or a signature the
introspection step flattened.
");
}

fn render_ambiguous_page(address: &str, claimed_by: &str, conflicting: &str) -> String {
    return format!("\
# Error: Ambiguous Page Address

`{conflicting}` maps to `{address}`, already written for `{claimed_by}`.

## Fix

Rename one of the symbols, or report the pair: page keys should keep
distinct signatures apart.
");
}

fn render_input_missing(path: &Path, what: &str) -> String {
    return format!("\
# Error: Input Missing

The {what} `{}` does not exist.

## Fix

Build the project so the file is produced, or point `{CONFIG_FILE}` at it.
", path.display());
}

fn render_malformed_document(file: &Path, reason: &str) -> String {
    return format!("\
# Error: Malformed Documentation File

Could not parse `{}`: {reason}

The file must be XML with a `<doc>` root holding `<assembly>` and `<members>`.
", file.display());
}

fn render_universe_corrupt(file: &Path, reason: &str) -> String {
    return format!("\
# Error: Universe Corrupt

Could not read the type universe `{}`: {reason}

## Fix

Regenerate the universe file with the introspection step.
", file.display());
}

fn render_universe_not_configured() -> String {
    return format!("\
# Error: No Type Universe

Nothing names the type universe to document.

## Fix

Pass it on the command line:

    docmark generate --universe build/Demo.universe.json

Or set it in `{CONFIG_FILE}`:

    universe = \"build/Demo.universe.json\"
");
}
