use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{self, CONFIG_FILE};
use crate::types::SymbolKind;

/// Output the comprehensive docmark reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_found: bool,
    output: Option<String>,
    universe: Option<String>,
    universe_found: bool,
}

fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let config = config::Config::load(root).ok();
    let universe = config.as_ref().and_then(|c| c.universe.clone());
    let universe_found = universe.as_ref().is_some_and(|u| u.is_file());

    CurrentState {
        config_found,
        output: config.map(|c| c.output.display().to_string()),
        universe: universe.map(|u| u.display().to_string()),
        universe_found,
    }
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# docmark {version}

Cross-linked markdown API docs from compiled type metadata and XML
documentation comments: one page per namespace, type and member.

## Workflow

    docmark generate                  Write every page under <output>/<name>/
    docmark watch                     Regenerate whenever an input changes
    docmark ids                       List canonical-id -> page address
    docmark info [--json]             This document

    --config PATH                     Config file instead of ./.docmark.toml
    --universe PATH                   Type universe file (overrides config)
    --output DIR                      Output directory (overrides config)

## Canonical IDs

    N:Demo                            namespace
    T:Demo.Box`1                      type (metadata name verbatim)
    M:Demo.Box`1.#ctor(`0)            constructor, type generic parameter 0
    M:Demo.Box`1.Map``1(``0)          generic method, method generic parameter 0
    F:Demo.Color.Red  P:...  E:...    field / enum value, property, event

## Configuration (.docmark.toml)

    name = \"Demo\"                        # default: universe file stem
    universe = \"build/Demo.universe.json\"
    output = \"docs\"
    additional = \"docs-extra\"            # fragments appended to same-named pages

    [docs]
    Demo = \"build/Demo.xml\"              # default: <assembly>.xml next to the universe

    [external]
    base_url = \"https://learn.microsoft.com/en-us/dotnet/api/\"
    namespaces = [\"System\"]              # empty: every namespace
    [external.overrides]
    \"Demo.Models.User\" = \"https://example.com/user\"

## Logging

    DOCMARK_LOG=debug docmark generate

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:   {CONFIG_FILE} (found)");
    } else {
        println!("Config:   {CONFIG_FILE} (not found)");
    }

    match (&state.universe, state.universe_found) {
        (Some(path), true) => println!("Universe: {path}"),
        (Some(path), false) => println!("Universe: {path} (not found)"),
        (None, _) => println!("Universe: (not configured)"),
    }

    match &state.output {
        Some(path) => println!("Output:   {path}"),
        None => println!("Output:   (config unreadable)"),
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success |
| 1    | Generation failed |
| 2    | Usage error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    exit_codes: Vec<ExitCodeInfo>,
    id_prefixes: Vec<PrefixInfo>,
    version: String,
}

#[derive(Serialize)]
struct PrefixInfo {
    kinds: Vec<String>,
    prefix: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    output: Option<String>,
    universe: Option<String>,
    universe_found: bool,
}

fn prefix(prefix: &str, kinds: &[&str]) -> PrefixInfo {
    PrefixInfo { kinds: kinds.iter().map(|k| (*k).to_string()).collect(), prefix: prefix.to_string() }
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            config_found: state.config_found,
            output: state.output.clone(),
            universe: state.universe.clone(),
            universe_found: state.universe_found,
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success".to_string() },
            ExitCodeInfo { code: 1, meaning: "Generation failed".to_string() },
            ExitCodeInfo { code: 2, meaning: "Usage error".to_string() },
        ],
        id_prefixes: vec![
            prefix(SymbolKind::Namespace.id_prefix(), &["namespace"]),
            prefix(SymbolKind::Class.id_prefix(), &["class", "struct", "interface", "enum", "delegate"]),
            prefix(SymbolKind::Method.id_prefix(), &["constructor", "method"]),
            prefix(SymbolKind::Field.id_prefix(), &["field", "enum value"]),
            prefix(SymbolKind::Property.id_prefix(), &["property"]),
            prefix(SymbolKind::Event.id_prefix(), &["event"]),
        ],
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
