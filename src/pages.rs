//! Page address resolution: qualified keys to normalized, memoized output
//! paths, with a registry that rejects two symbols claiming one page.
use std::collections::HashMap;

use regex::Regex;

use crate::error::Error;
use crate::types::{CanonicalId, PageAddress};

/// Key of the root index page.
pub const INDEX_KEY: &str = "Index";

/// Generic and parameter punctuation, plus whitespace, collapsed to `.`.
const SEPARATOR_PATTERN: &str = r"[`,<>()\[\]\s.]+";

/// Per-run page address resolver. Owns the memo table and the claim
/// registry; create one per generation run.
pub struct PageAddresses {
    /// Address already handed out for each page, by claiming canonical ID.
    claims: HashMap<PageAddress, CanonicalId>,
    /// Resolved addresses keyed by the pre-normalization key.
    memo: HashMap<String, PageAddress>,
    /// Generation-scoped name, the directory under the root.
    name: String,
    /// Document root prefix, `/`-separated.
    root: String,
    /// Compiled separator pattern.
    separators: Regex,
}

impl PageAddresses {
    /// Resolver writing under `<root>/<name>/`.
    pub fn new(root: &str, name: &str) -> Self {
        let separators = Regex::new(SEPARATOR_PATTERN).expect("valid regex");
        return Self {
            claims: HashMap::new(),
            memo: HashMap::new(),
            name: name.to_string(),
            root: root.trim_end_matches('/').to_string(),
            separators,
        };
    }

    /// Address of the page for `key`. The same key always yields the
    /// identical address within one run.
    pub fn resolve(&mut self, key: &str) -> PageAddress {
        if let Some(hit) = self.memo.get(key) {
            return hit.clone();
        }
        let address = PageAddress(format!("{}/{}/{}.md", self.root, self.name, self.normalize(key)));
        self.memo.insert(key.to_string(), address.clone());
        return address;
    }

    /// Address of the root index page.
    pub fn index(&mut self) -> PageAddress {
        return self.resolve(INDEX_KEY);
    }

    /// Record that `owner` emits the page at `address`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousPageAddress` if a different canonical ID
    /// already claimed the address.
    pub fn claim(&mut self, address: &PageAddress, owner: &CanonicalId) -> Result<(), Error> {
        if let Some(existing) = self.claims.get(address) {
            if existing == owner {
                return Ok(());
            }
            return Err(Error::AmbiguousPageAddress {
                address: address.0.clone(),
                claimed_by: existing.0.clone(),
                conflicting: owner.0.clone(),
            });
        }
        self.claims.insert(address.clone(), owner.clone());
        return Ok(());
    }

    /// Replace punctuation runs with a single `.` and trim a trailing one.
    fn normalize(&self, key: &str) -> String {
        let replaced = self.separators.replace_all(key, ".");
        return replaced.trim_end_matches('.').to_string();
    }
}
