//! Cross-reference resolution: every type mention becomes an internal
//! relative link, an external link, or escaped plain text.
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::canonical::{display_head, qualified, strip_arity, type_key};
use crate::config::ExternalConfig;
use crate::markdown;
use crate::pages::PageAddresses;
use crate::paths::relative_path;
use crate::types::{PageAddress, TypeRef};

/// Collaborator that maps a type outside the documented set to a URL.
/// An empty string means there is no external page.
pub trait ExternalUrlResolver {
    /// URL for `ty`, or an empty string.
    fn resolve(&self, ty: &TypeRef) -> String;
}

impl<F> ExternalUrlResolver for F
where
    F: Fn(&TypeRef) -> String,
{
    fn resolve(&self, ty: &TypeRef) -> String {
        return self(ty);
    }
}

/// External resolver driven by the `[external]` config table.
#[derive(Debug, Clone)]
pub struct ConfiguredResolver {
    /// URL prefix; empty disables external links.
    base_url: String,
    /// Namespaces eligible for `base_url`; empty means every namespace.
    namespaces: Vec<String>,
    /// Explicit URLs keyed by `Namespace.Name`, consulted first.
    overrides: HashMap<String, String>,
}

impl ConfiguredResolver {
    /// Build from the loaded config.
    pub fn from_config(config: &ExternalConfig) -> Self {
        return Self {
            base_url: config.base_url.clone(),
            namespaces: config.namespaces.clone(),
            overrides: config.overrides.clone(),
        };
    }

    /// Whether `namespace` is `allowed` or nested inside it.
    fn namespace_allowed(&self, namespace: &str) -> bool {
        if self.namespaces.is_empty() {
            return true;
        }
        return self.namespaces.iter().any(|allowed| {
            return namespace == allowed
                || namespace.strip_prefix(allowed.as_str()).is_some_and(|rest| return rest.starts_with('.'));
        });
    }
}

impl ExternalUrlResolver for ConfiguredResolver {
    fn resolve(&self, ty: &TypeRef) -> String {
        let Some((namespace, name)) = ty.named_core() else {
            return String::new();
        };
        if let Some(url) = self.overrides.get(&qualified(namespace, &strip_arity(name))) {
            return url.clone();
        }
        if self.base_url.is_empty() || !self.namespace_allowed(namespace) {
            return String::new();
        }
        let page = qualified(namespace, &name.replace('`', "-")).to_lowercase();
        return format!("{}{page}", self.base_url);
    }
}

/// How a single (non-generic-argument) type mention resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossReference {
    /// Link to a page outside the generated set.
    External {
        /// Display text.
        text: String,
        /// Absolute URL.
        url: String,
    },
    /// Link to another generated page.
    Internal {
        /// Relative path from the referencing page.
        href: String,
        /// Address of the referenced page.
        target: PageAddress,
        /// Display text.
        text: String,
    },
    /// No page anywhere: escaped display text.
    Plain(String),
}

impl CrossReference {
    /// Markdown for this reference alone.
    fn to_markdown(&self) -> String {
        return match self {
            CrossReference::External { text, url } => markdown::hyperlink(text, url),
            CrossReference::Internal { href, text, .. } => markdown::hyperlink(text, href),
            CrossReference::Plain(text) => text.clone(),
        };
    }
}

/// A resolved type mention: the head reference, resolved generic arguments,
/// and decoration for arrays, pointers and by-ref parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReference {
    /// Resolved type arguments, each independently.
    pub args: Vec<RenderedReference>,
    /// The open type itself.
    pub head: CrossReference,
    /// Text before the head, e.g. `ref `.
    pub prefix: String,
    /// Text after the arguments, e.g. escaped `[]`.
    pub suffix: String,
}

impl RenderedReference {
    /// Undecorated reference.
    fn bare(head: CrossReference) -> Self {
        return Self { args: Vec::new(), head, prefix: String::new(), suffix: String::new() };
    }

    /// Markdown rendering: `[List](url)\<[Box](./Demo.Box.md)\>`.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("{}{}", self.prefix, self.head.to_markdown());
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(Self::to_markdown).collect();
            out.push_str(&format!("\\<{}\\>", args.join(", ")));
        }
        out.push_str(&self.suffix);
        return out;
    }
}

/// Per-run cross-reference context. Owns the page address resolver and the
/// external URL memo; drop it when the run ends.
pub struct Linker<'a> {
    /// Page keys of every type that gets its own page.
    documented: &'a HashSet<String>,
    /// External URL collaborator.
    external: &'a dyn ExternalUrlResolver,
    /// Memoized external lookups for this run.
    external_cache: HashMap<TypeRef, String>,
    /// Page address resolver for this run.
    pages: PageAddresses,
    /// Mentions that degraded to plain text.
    unresolved: usize,
}

impl<'a> Linker<'a> {
    /// New context over a fresh page resolver.
    pub fn new(
        pages: PageAddresses,
        documented: &'a HashSet<String>,
        external: &'a dyn ExternalUrlResolver,
    ) -> Self {
        return Self { documented, external, external_cache: HashMap::new(), pages, unresolved: 0 };
    }

    /// Page resolver of this run.
    pub fn pages(&mut self) -> &mut PageAddresses {
        return &mut self.pages;
    }

    /// Number of mentions rendered as plain text so far.
    pub const fn unresolved(&self) -> usize {
        return self.unresolved;
    }

    /// Page address of a documented type, `None` outside the documented set.
    pub fn type_page(&mut self, namespace: &str, path: &str) -> Option<PageAddress> {
        let key = type_key(namespace, path);
        if !self.documented.contains(&key) {
            return None;
        }
        return Some(self.pages.resolve(&key));
    }

    /// Relative link text from one page to another.
    pub fn href(from: &PageAddress, to: &PageAddress) -> String {
        return relative_path(from.as_str(), to.as_str());
    }

    /// Resolve and render `target` as seen from the page at `from`.
    pub fn link(&mut self, from: &PageAddress, target: &TypeRef) -> String {
        return self.resolve(from, target).to_markdown();
    }

    /// Resolve a type mention. Never fails: anything that is neither
    /// documented nor externally known becomes escaped plain text.
    pub fn resolve(&mut self, from: &PageAddress, target: &TypeRef) -> RenderedReference {
        return match target {
            TypeRef::Array { element, rank } => {
                let mut inner = self.resolve(from, element);
                let commas = ",".repeat(usize::try_from(*rank).unwrap_or(1).saturating_sub(1));
                inner.suffix.push_str(&format!("\\[{commas}\\]"));
                inner
            },
            TypeRef::ByRef { element } => {
                let mut inner = self.resolve(from, element);
                inner.prefix.insert_str(0, "ref ");
                inner
            },
            TypeRef::GenericParam { name, .. } => RenderedReference::bare(CrossReference::Plain(name.clone())),
            TypeRef::Named { args, name, namespace } => {
                let head = self.resolve_named(from, namespace, name);
                let args = args.iter().map(|arg| return self.resolve(from, arg)).collect();
                RenderedReference { args, head, prefix: String::new(), suffix: String::new() }
            },
            TypeRef::Pointer { element } => {
                let mut inner = self.resolve(from, element);
                inner.suffix.push_str("\\*");
                inner
            },
        };
    }

    /// Resolve an open named type: internal page, then external URL, then text.
    fn resolve_named(&mut self, from: &PageAddress, namespace: &str, name: &str) -> CrossReference {
        let text = display_head(namespace, name);
        if let Some(target) = self.type_page(namespace, name) {
            let href = Self::href(from, &target);
            return CrossReference::Internal { href, target, text };
        }

        let open = TypeRef::named(namespace, name);
        let url = match self.external_cache.get(&open) {
            Some(hit) => hit.clone(),
            None => {
                let url = self.external.resolve(&open);
                self.external_cache.insert(open, url.clone());
                url
            },
        };
        if !url.is_empty() {
            return CrossReference::External { text, url };
        }

        debug!(namespace, name, "unresolved cross-reference, rendering plain text");
        self.unresolved = self.unresolved.saturating_add(1);
        return CrossReference::Plain(markdown::escape(&text));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn documented(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| (*k).to_string()).collect()
    }

    fn page(path: &str) -> PageAddress {
        PageAddress(path.to_string())
    }

    fn no_external(_: &TypeRef) -> String {
        String::new()
    }

    #[test]
    fn documented_type_links_relatively() {
        let set = documented(&["Demo.Box"]);
        let mut linker = Linker::new(PageAddresses::new("out", "Demo"), &set, &no_external);
        let from = page("out/Demo/Demo.Other.md");
        assert_eq!(
            linker.link(&from, &TypeRef::named("Demo", "Box")),
            "[Box](./Demo.Box.md \"Box\")"
        );
    }

    #[test]
    fn unresolved_type_is_escaped_plain_text() {
        let set = documented(&[]);
        let mut linker = Linker::new(PageAddresses::new("out", "Demo"), &set, &no_external);
        let from = page("out/Demo/Demo.Box.md");
        let rendered = linker.resolve(&from, &TypeRef::named("Vendor.Lib", "Thing`1"));
        assert_eq!(rendered.head, CrossReference::Plain("Thing".to_string()));
        assert_eq!(linker.link(&from, &TypeRef::named("Vendor", "Odd-Name")), "Odd\\-Name");
        assert_eq!(linker.unresolved(), 2);
    }

    #[test]
    fn generic_arguments_resolve_independently() {
        let set = documented(&["Demo.Box`1"]);
        let external = |ty: &TypeRef| -> String {
            match ty.named_core() {
                Some(("System.Collections.Generic", "List`1")) => "https://x/list".to_string(),
                _ => String::new(),
            }
        };
        let mut linker = Linker::new(PageAddresses::new("out", "Demo"), &set, &external);
        let from = page("out/Demo/Demo.Other.md");
        let target = TypeRef::generic("System.Collections.Generic", "List`1", vec![
            TypeRef::generic("Demo", "Box`1", vec![TypeRef::type_param("T", 0)]),
            TypeRef::named("Vendor", "Opaque"),
        ]);
        assert_eq!(
            linker.link(&from, &target),
            "[List](https://x/list \"List\")\\<[Box](./Demo.Box.1.md \"Box\")\\<T\\>, Opaque\\>"
        );
    }

    #[test]
    fn generic_parameter_is_bare_name() {
        let set = documented(&[]);
        let mut linker = Linker::new(PageAddresses::new("out", "Demo"), &set, &no_external);
        let from = page("out/Demo/Demo.Box.md");
        assert_eq!(linker.link(&from, &TypeRef::method_param("TResult", 0)), "TResult");
        assert_eq!(linker.unresolved(), 0);
    }

    #[test]
    fn arrays_decorate_element_link() {
        let set = documented(&["Demo.Box"]);
        let mut linker = Linker::new(PageAddresses::new("out", "Demo"), &set, &no_external);
        let from = page("out/Demo/Demo.Other.md");
        assert_eq!(
            linker.link(&from, &TypeRef::array(TypeRef::named("Demo", "Box"))),
            "[Box](./Demo.Box.md \"Box\")\\[\\]"
        );
    }

    #[test]
    fn external_lookups_are_memoized() {
        let calls = Cell::new(0_u32);
        let counting = |_: &TypeRef| -> String {
            calls.set(calls.get() + 1);
            "https://x".to_string()
        };
        let set = documented(&[]);
        let mut linker = Linker::new(PageAddresses::new("out", "Demo"), &set, &counting);
        let from = page("out/Demo/Demo.Box.md");
        let int = TypeRef::named("System", "Int32");
        linker.link(&from, &int);
        linker.link(&from, &TypeRef::array(int.clone()));
        assert_eq!(calls.get(), 1);
    }

    fn external_config(base_url: &str, namespaces: &[&str]) -> ExternalConfig {
        ExternalConfig {
            base_url: base_url.to_string(),
            namespaces: namespaces.iter().map(|n| (*n).to_string()).collect(),
            overrides: HashMap::from([(
                "Demo.Models.User".to_string(),
                "https://example.com/user".to_string(),
            )]),
        }
    }

    #[test]
    fn configured_resolver_uses_api_browser_scheme() {
        let resolver = ConfiguredResolver::from_config(&external_config(
            "https://learn.microsoft.com/en-us/dotnet/api/",
            &["System"],
        ));
        let list = TypeRef::generic("System.Collections.Generic", "List`1", vec![]);
        assert_eq!(
            resolver.resolve(&list),
            "https://learn.microsoft.com/en-us/dotnet/api/system.collections.generic.list-1"
        );
        assert_eq!(resolver.resolve(&TypeRef::named("Systemic", "Thing")), "");
    }

    #[test]
    fn configured_resolver_overrides_win() {
        let resolver = ConfiguredResolver::from_config(&external_config("", &[]));
        assert_eq!(resolver.resolve(&TypeRef::named("Demo.Models", "User")), "https://example.com/user");
        assert_eq!(resolver.resolve(&TypeRef::named("System", "Int32")), "");
    }
}
