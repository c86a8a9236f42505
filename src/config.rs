use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = ".docmark.toml";

/// Default external documentation root: the .NET API browser.
pub const DEFAULT_BASE_URL: &str = "https://learn.microsoft.com/en-us/dotnet/api/";

/// Default output directory.
const DEFAULT_OUTPUT: &str = "docs";

/// Project configuration loaded from `.docmark.toml`.
/// Every path is already resolved against the config file's directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of per-page Markdown fragments appended after generated content.
    pub additional: Option<PathBuf>,
    /// Explicit documentation file per assembly name.
    pub docs: BTreeMap<String, PathBuf>,
    /// External link settings.
    pub external: ExternalConfig,
    /// Generation-scoped name; defaults to the universe file stem.
    pub name: Option<String>,
    /// Output directory.
    pub output: PathBuf,
    /// Config file the values came from, `None` when running on defaults.
    pub source: Option<PathBuf>,
    /// Type universe file.
    pub universe: Option<PathBuf>,
}

/// `[external]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalConfig {
    /// URL prefix for types outside the documented set; empty disables.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Namespaces eligible for `base_url`; empty means all.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Explicit URLs keyed by `Namespace.Name`.
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        return Self { base_url: default_base_url(), namespaces: Vec::new(), overrides: HashMap::new() };
    }
}

/// Serde default for `external.base_url`.
fn default_base_url() -> String {
    return DEFAULT_BASE_URL.to_string();
}

/// Raw TOML structure for `.docmark.toml`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DocmarkTomlConfig {
    /// Additional content directory.
    #[serde(default)]
    additional: Option<PathBuf>,
    /// Per-assembly documentation files.
    #[serde(default)]
    docs: BTreeMap<String, PathBuf>,
    /// External link settings.
    #[serde(default)]
    external: ExternalConfig,
    /// Generation-scoped name.
    #[serde(default)]
    name: Option<String>,
    /// Output directory.
    #[serde(default)]
    output: Option<PathBuf>,
    /// Type universe file.
    #[serde(default)]
    universe: Option<PathBuf>,
}

impl Config {
    /// Load config from `.docmark.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed; a config the user wrote is never
    /// silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults(root)),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content, &path);
    }

    /// Load an explicitly named config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file is absent, otherwise the
    /// same errors as [`Config::load`].
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content, path);
    }

    /// Parse TOML text and resolve its paths against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    fn parse(content: &str, path: &Path) -> Result<Self, Error> {
        let raw: DocmarkTomlConfig = toml::from_str(content)?;
        let base = path.parent().unwrap_or_else(|| return Path::new("."));
        let resolve = |p: PathBuf| return base.join(p);

        return Ok(Self {
            additional: raw.additional.map(resolve),
            docs: raw.docs.into_iter().map(|(asm, p)| return (asm, resolve(p))).collect(),
            external: raw.external,
            name: raw.name,
            output: resolve(raw.output.unwrap_or_else(|| return PathBuf::from(DEFAULT_OUTPUT))),
            source: Some(path.to_path_buf()),
            universe: raw.universe.map(resolve),
        });
    }

    /// Config used when no file exists: output under `root/docs`.
    fn defaults(root: &Path) -> Self {
        return Self {
            additional: None,
            docs: BTreeMap::new(),
            external: ExternalConfig::default(),
            name: None,
            output: root.join(DEFAULT_OUTPUT),
            source: None,
            universe: None,
        };
    }

    /// Apply command-line overrides, which win over the file.
    pub fn with_overrides(mut self, universe: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if let Some(universe) = universe {
            self.universe = Some(universe);
        }
        if let Some(output) = output {
            self.output = output;
        }
        return self;
    }
}
