//! One generation run: load the universe and documentation files, build the
//! model, and write every page. Each run owns a fresh cross-reference
//! context; nothing is shared between runs.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::comments::{self, CommentIndex};
use crate::config::{Config, ExternalConfig};
use crate::error::Error;
use crate::fragments::Fragments;
use crate::model::{self, Model};
use crate::pages::PageAddresses;
use crate::types::{AssemblyDesc, CanonicalId, PageAddress, SymbolKind, Universe};
use crate::writer::Writer;
use crate::xref::{ConfiguredResolver, Linker};

/// Suffix dropped from the universe file stem when deriving the run name.
const UNIVERSE_SUFFIX: &str = ".universe";

/// Everything one run needs, resolved from config and command line.
#[derive(Debug, Clone)]
pub struct Request {
    /// Additional content directory.
    pub additional: Option<PathBuf>,
    /// Explicit documentation file per assembly.
    pub docs: BTreeMap<String, PathBuf>,
    /// External link settings.
    pub external: ExternalConfig,
    /// Generation-scoped name: the directory under `output`.
    pub name: String,
    /// Output directory.
    pub output: PathBuf,
    /// Type universe file.
    pub universe: PathBuf,
}

impl Request {
    /// Resolve a request from loaded config.
    ///
    /// # Errors
    ///
    /// Returns `Error::UniverseNotConfigured` if no universe file is named.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let Some(universe) = config.universe.clone() else {
            return Err(Error::UniverseNotConfigured);
        };
        let name = config.name.clone().unwrap_or_else(|| return default_name(&universe));
        return Ok(Self {
            additional: config.additional.clone(),
            docs: config.docs.clone(),
            external: config.external.clone(),
            name,
            output: config.output.clone(),
            universe,
        });
    }

    /// Document root prefix of page addresses: the output directory with
    /// `/` separators.
    fn page_root(&self) -> String {
        return self.output.to_string_lossy().replace('\\', "/");
    }

    /// Paths whose changes should trigger a new run.
    pub fn inputs(&self) -> Vec<PathBuf> {
        let mut inputs = vec![self.universe.clone()];
        inputs.extend(self.docs.values().cloned());
        if let Some(additional) = &self.additional {
            inputs.push(additional.clone());
        }
        return inputs;
    }
}

/// Run name from the universe file: `Demo.universe.json` → `Demo`.
fn default_name(universe: &Path) -> String {
    let stem = universe.file_stem().map(|s| return s.to_string_lossy().into_owned()).unwrap_or_default();
    return stem.strip_suffix(UNIVERSE_SUFFIX).map(str::to_string).unwrap_or(stem);
}

/// Counters of one finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Comments indexed across all documentation files.
    pub comments: usize,
    /// Comments dropped because their ID was already indexed.
    pub duplicates: usize,
    /// Pages that had a fragment appended.
    pub fragments: usize,
    /// Unrecognized comment elements that were dropped.
    pub ignored: usize,
    /// Pages written.
    pub pages: usize,
    /// Documented symbols without a comment.
    pub undocumented: usize,
    /// Type mentions rendered as plain text.
    pub unresolved: usize,
}

/// Parsed inputs of one run.
struct Inputs {
    /// Comment index over every documentation file.
    comments: CommentIndex,
    /// Duplicate comment IDs dropped while indexing.
    duplicates: usize,
    /// Unrecognized elements dropped while parsing.
    ignored: usize,
    /// The type universe.
    universe: Universe,
}

/// Generate every page for `request`.
///
/// # Errors
///
/// Returns `Error::InputMissing` or `Error::UniverseCorrupt` for bad
/// inputs, `Error::MalformedDocument` for unparsable documentation,
/// `Error::AmbiguousCanonicalId` or `Error::AmbiguousPageAddress` on
/// collisions, and `Error::Io` if pages cannot be written.
pub fn run(request: &Request) -> Result<Summary, Error> {
    let inputs = load_inputs(request)?;
    let model = model::build(&inputs.universe, &inputs.comments)?;

    let resolver = ConfiguredResolver::from_config(&request.external);
    let pages = PageAddresses::new(&request.page_root(), &request.name);
    let linker = Linker::new(pages, &model.documented, &resolver);
    let fragments = Fragments::index(request.additional.as_deref());
    if !fragments.is_empty() {
        debug!(count = fragments.len(), "fragments available");
    }
    let stats = Writer::new(&model, linker, &fragments, &request.name).write_all()?;

    let summary = Summary {
        comments: inputs.comments.len(),
        duplicates: inputs.duplicates,
        fragments: stats.fragments,
        ignored: inputs.ignored,
        pages: stats.pages,
        undocumented: model.symbols.iter().filter(|s| return !s.has_doc).count(),
        unresolved: stats.unresolved,
    };
    info!(pages = summary.pages, output = %request.output.display(), "generation finished");
    return Ok(summary);
}

/// One documented symbol as listed by `docmark ids`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdEntry {
    /// Page address.
    pub address: PageAddress,
    /// Whether the documentation files carry a comment for the ID.
    pub has_doc: bool,
    /// Canonical ID.
    pub id: CanonicalId,
    /// Symbol kind.
    pub kind: SymbolKind,
}

/// Canonical ID and page address of every symbol that gets a page, sorted
/// by ID. Nothing is written.
///
/// # Errors
///
/// Same input errors as [`run`], plus `Error::AmbiguousCanonicalId`.
pub fn list_ids(request: &Request) -> Result<Vec<IdEntry>, Error> {
    let inputs = load_inputs(request)?;
    let model: Model = model::build(&inputs.universe, &inputs.comments)?;
    let mut pages = PageAddresses::new(&request.page_root(), &request.name);
    let mut entries: Vec<IdEntry> = model
        .symbols
        .iter()
        .map(|symbol| {
            return IdEntry {
                address: pages.resolve(&symbol.key),
                has_doc: symbol.has_doc,
                id: symbol.id.clone(),
                kind: symbol.kind,
            };
        })
        .collect();
    entries.sort_by(|a, b| return a.id.cmp(&b.id));
    return Ok(entries);
}

// ── Loading ───────────────────────────────────────────────────────────

/// Load the universe and every documentation file it implies.
///
/// # Errors
///
/// Returns the loading errors of [`load_universe`] and [`load_comments`].
fn load_inputs(request: &Request) -> Result<Inputs, Error> {
    let universe = load_universe(&request.universe)?;
    let mut comments = CommentIndex::default();
    let mut duplicates = 0_usize;
    let mut ignored = 0_usize;
    let base = request.universe.parent().unwrap_or_else(|| return Path::new("."));

    for assembly in &universe.assemblies {
        let Some(path) = doc_path(request, assembly, base)? else {
            continue;
        };
        let doc = comments::load(&path)?;
        if let Some(declared) = doc.assembly.as_deref().filter(|declared| return *declared != assembly.name) {
            warn!(file = %path.display(), declared, expected = %assembly.name, "documentation file names another assembly");
        }
        ignored = ignored.saturating_add(doc.ignored);
        duplicates = duplicates.saturating_add(comments.insert_file(&path, doc));
    }
    debug!(comments = comments.len(), ignored, duplicates, "comments indexed");
    return Ok(Inputs { comments, duplicates, ignored, universe });
}

/// Read and deserialize the universe file.
///
/// # Errors
///
/// Returns `Error::InputMissing` if the file is absent, `Error::Io` if it
/// cannot be read, or `Error::UniverseCorrupt` if it is not a valid universe.
pub fn load_universe(path: &Path) -> Result<Universe, Error> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::InputMissing { path: path.to_path_buf(), what: "type universe".to_string() });
        },
        Err(e) => return Err(Error::Io(e)),
    };
    return serde_json::from_str(&content)
        .map_err(|e| return Error::UniverseCorrupt { file: path.to_path_buf(), reason: e.to_string() });
}

/// Documentation file of one assembly: the `[docs]` entry, then the
/// universe's `doc` field, then `<assembly>.xml` next to the universe.
/// Returns `None` when only the implicit file was tried and it is absent.
///
/// # Errors
///
/// Returns `Error::InputMissing` if an explicitly named file is absent.
fn doc_path(request: &Request, assembly: &AssemblyDesc, base: &Path) -> Result<Option<PathBuf>, Error> {
    let explicit = request
        .docs
        .get(&assembly.name)
        .cloned()
        .or_else(|| return assembly.doc.as_ref().map(|doc| return base.join(doc)));
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::InputMissing { path, what: format!("documentation file for {}", assembly.name) });
        }
        return Ok(Some(path));
    }

    let implicit = base.join(format!("{}.xml", assembly.name));
    if implicit.is_file() {
        return Ok(Some(implicit));
    }
    warn!(assembly = %assembly.name, path = %implicit.display(), "no documentation file, pages will have no comments");
    return Ok(None);
}
