/// Crate-level error types for docmark diagnostics.
use std::path::PathBuf;

/// Every fatal condition of a generation run. Each variant names the file,
/// symbol, or reason for failure so the diagnostic needs no debugger.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two distinct declared symbols produced the same canonical ID.
    #[error("ambiguous canonical id `{id}`: {first} and {second}")]
    AmbiguousCanonicalId {
        /// Display name of the symbol that produced the ID first.
        first: String,
        /// The colliding canonical ID.
        id: String,
        /// Display name of the symbol that collided with it.
        second: String,
    },

    /// Two distinct symbols tried to emit the same output page.
    #[error("ambiguous page address `{address}`: claimed by {claimed_by} and {conflicting}")]
    AmbiguousPageAddress {
        /// The contested page address.
        address: String,
        /// Canonical ID that claimed the address first.
        claimed_by: String,
        /// Canonical ID that tried to claim it second.
        conflicting: String,
    },

    /// An explicitly requested config file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A required input file is absent.
    #[error("{what} not found: {}", path.display())]
    InputMissing {
        /// Path that was expected to exist.
        path: PathBuf,
        /// Which input it is, e.g. `universe` or `documentation file`.
        what: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Documentation XML does not parse or has an unexpected root element.
    #[error("malformed documentation file {}: {reason}", file.display())]
    MalformedDocument {
        /// The documentation file.
        file: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The type universe file exists but cannot be deserialized.
    #[error("universe corrupt: {}: {reason}", file.display())]
    UniverseCorrupt {
        /// The universe file.
        file: PathBuf,
        /// Description of the corruption.
        reason: String,
    },

    /// Neither the config nor the command line names a type universe.
    #[error("no type universe configured")]
    UniverseNotConfigured,

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the failure.
        reason: String,
    },
}
