//! Hand-written Markdown fragments appended to generated pages.
//!
//! A fragment belongs to the page with the same file name, wherever it sits
//! under the additional-content directory.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::Error;

/// Fragment files indexed by file name.
#[derive(Debug, Default)]
pub struct Fragments {
    /// File name → fragment path.
    files: HashMap<String, PathBuf>,
}

impl Fragments {
    /// Index every `.md` file under `dir`. A missing directory yields an
    /// empty index. When two files share a name, the first one in walk
    /// order is kept.
    pub fn index(dir: Option<&Path>) -> Self {
        let mut files: HashMap<String, PathBuf> = HashMap::new();
        let Some(dir) = dir else {
            return Self { files };
        };
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "additional content directory not found");
            return Self { files };
        }

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| return e.file_type().is_file())
            .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "md"))
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(kept) = files.get(&name) {
                warn!(kept = %kept.display(), dropped = %entry.path().display(), "duplicate fragment name");
                continue;
            }
            files.insert(name, entry.into_path());
        }
        return Self { files };
    }

    /// Append the fragment for `file_name` to `page`, separated by a blank
    /// line. Returns whether a fragment was appended.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the fragment exists but cannot be read.
    pub fn append(&self, file_name: &str, page: &mut String) -> Result<bool, Error> {
        let Some(path) = self.files.get(file_name) else {
            return Ok(false);
        };
        let fragment = std::fs::read_to_string(path)?;
        if !page.ends_with('\n') {
            page.push('\n');
        }
        page.push('\n');
        page.push_str(&fragment);
        return Ok(true);
    }

    /// Number of indexed fragments.
    pub fn len(&self) -> usize {
        return self.files.len();
    }

    /// Whether no fragments were found.
    pub fn is_empty(&self) -> bool {
        return self.files.is_empty();
    }
}
