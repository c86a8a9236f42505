//! Page emission: root index, assembly, namespace, type, delegate and
//! member pages, each written once under its claimed address.
use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::canonical::strip_arity;
use crate::comments::CommentNode;
use crate::error::Error;
use crate::fragments::Fragments;
use crate::markdown::{self, LINE_BREAK, MISSING};
use crate::model::{AssemblyNode, GenericParamNode, MemberNode, Model, NamespaceNode, ParamNode, TypeNode};
use crate::pages::INDEX_KEY;
use crate::signature::constraint_text;
use crate::types::{CanonicalId, Constraint, PageAddress, SymbolKind, TypeRef};
use crate::xref::Linker;

/// Separator between links in an inheritance chain.
const CHAIN_ARROW: &str = " ↣ ";

/// Language tag of signature code blocks.
const SIGNATURE_LANGUAGE: &str = "csharp";

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    /// Pages that had a fragment appended.
    pub fragments: usize,
    /// Pages written.
    pub pages: usize,
    /// Type mentions rendered as plain text.
    pub unresolved: usize,
}

/// Writes every page of one model. Owns the run's cross-reference context.
pub struct Writer<'a> {
    /// Additional content.
    fragments: &'a Fragments,
    /// Cross-reference context, including the page address resolver.
    linker: Linker<'a>,
    /// The documented universe.
    model: &'a Model,
    /// Generation-scoped name, used as the index title.
    name: &'a str,
    /// Running counters.
    stats: WriteStats,
}

impl<'a> Writer<'a> {
    /// Writer over `model` with a fresh linker.
    pub fn new(model: &'a Model, linker: Linker<'a>, fragments: &'a Fragments, name: &'a str) -> Self {
        return Self { fragments, linker, model, name, stats: WriteStats::default() };
    }

    /// Write every page.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousPageAddress` if two symbols map to one page,
    /// or `Error::Io` if a page cannot be written.
    pub fn write_all(mut self) -> Result<WriteStats, Error> {
        let model = self.model;
        self.index_page()?;
        for assembly in &model.assemblies {
            self.assembly_page(assembly)?;
        }
        for namespace in &model.namespaces {
            self.namespace_page(namespace)?;
            for ty in namespace.types.iter().chain(&namespace.delegates) {
                if ty.kind == SymbolKind::Delegate {
                    self.delegate_page(ty)?;
                } else {
                    self.type_page(ty)?;
                }
                for member in members(ty).filter(|m| return m.owns_page()) {
                    self.member_page(ty, member)?;
                }
            }
        }
        self.stats.unresolved = self.linker.unresolved();
        debug!(pages = self.stats.pages, unresolved = self.stats.unresolved, "pages written");
        return Ok(self.stats);
    }

    // ── Pages ─────────────────────────────────────────────────────────

    /// Root page listing assemblies and namespaces.
    fn index_page(&mut self) -> Result<(), Error> {
        let model = self.model;
        let from = self.linker.pages().index();
        let mut out = String::new();
        let _ = writeln!(out, "{}\n", markdown::header(1, &markdown::escape(self.name)));
        let _ = writeln!(out, "{}\n", markdown::header(4, "Assemblies"));
        for assembly in &model.assemblies {
            let _ = writeln!(out, "{}", markdown::bullet(1, &self.key_link(&from, &assembly.name, &assembly.key)));
        }
        let _ = writeln!(out, "\n{}\n", markdown::header(4, "Namespaces"));
        for namespace in &model.namespaces {
            let text = namespace_name(&namespace.name);
            let _ = writeln!(out, "{}", markdown::bullet(1, &self.key_link(&from, text, &namespace.key)));
        }
        return self.emit(&from, &CanonicalId(INDEX_KEY.to_string()), out);
    }

    /// One assembly and its namespaces.
    fn assembly_page(&mut self, assembly: &AssemblyNode) -> Result<(), Error> {
        let from = self.linker.pages().resolve(&assembly.key);
        let mut out = self.home(&from);
        let _ = writeln!(out, "{}\n", markdown::header(1, &format!("{} Assembly", markdown::escape(&assembly.name))));
        let _ = writeln!(out, "{}\n", markdown::header(4, "Namespaces"));
        for name in &assembly.namespaces {
            let key = crate::canonical::namespace_key(name);
            let _ = writeln!(out, "{}", markdown::bullet(1, &self.key_link(&from, namespace_name(name), &key)));
        }
        return self.emit(&from, &CanonicalId(assembly.key.clone()), out);
    }

    /// One namespace: types grouped by directory, then delegates.
    fn namespace_page(&mut self, namespace: &NamespaceNode) -> Result<(), Error> {
        let from = self.linker.pages().resolve(&namespace.key);
        let mut out = self.home(&from);
        let title = format!("{} Namespace", markdown::escape(namespace_name(&namespace.name)));
        let _ = writeln!(out, "{}\n", markdown::header(1, &title));
        let assemblies: Vec<String> = namespace
            .assemblies
            .iter()
            .map(|name| return self.key_link(&from, name, &crate::canonical::assembly_key(name)))
            .collect();
        let _ = writeln!(out, "{} : {}\n", markdown::bold("Assembly"), assemblies.join(", "));
        if namespace.doc.summary.is_some() {
            out.push_str(&summary_block(&namespace.doc));
        }

        if !namespace.types.is_empty() {
            let _ = writeln!(out, "{}\n", markdown::header(4, "Types"));
            out.push_str(&self.directory_tree(&from, &namespace.types));
            out.push('\n');
        }
        if !namespace.delegates.is_empty() {
            let _ = writeln!(out, "{}\n", markdown::header(4, "Delegates"));
            for delegate in &namespace.delegates {
                let link = self.key_link(&from, &delegate.display, &delegate.key);
                let _ = writeln!(out, "{}", markdown::bullet(1, &link));
            }
        }
        return self.emit(&from, &namespace.id, out);
    }

    /// Class, struct, interface or enum page.
    fn type_page(&mut self, ty: &TypeNode) -> Result<(), Error> {
        let from = self.linker.pages().resolve(&ty.key);
        let mut out = self.type_header(&from, ty);
        out.push_str(&self.relations(&from, ty));
        let _ = writeln!(out, "{}\n", markdown::code(&ty.signature, SIGNATURE_LANGUAGE));
        out.push_str(&summary_block(&ty.doc));
        out.push_str(&self.generic_table(&from, &ty.generic_params));

        out.push_str(&self.constructor_table(&from, &ty.constructors));
        out.push_str(&self.enum_table(&from, &ty.enum_values));
        out.push_str(&self.value_table(&from, "Fields", &ty.fields));
        out.push_str(&self.value_table(&from, "Properties", &ty.properties));
        out.push_str(&self.method_table(&from, &ty.methods));
        out.push_str(&self.event_table(&from, &ty.events));
        if !ty.delegates.is_empty() {
            let _ = writeln!(out, "{}\n", markdown::header(4, "Delegates"));
            for delegate in &ty.delegates {
                let _ = writeln!(out, "{}", markdown::bullet(1, &self.linker.link(&from, delegate)));
            }
        }
        return self.emit(&from, &ty.id, out);
    }

    /// Delegate page: type header plus invoke parameters and return type.
    fn delegate_page(&mut self, ty: &TypeNode) -> Result<(), Error> {
        let from = self.linker.pages().resolve(&ty.key);
        let mut out = self.type_header(&from, ty);
        let _ = writeln!(out, "{}\n", markdown::code(&ty.signature, SIGNATURE_LANGUAGE));
        out.push_str(&summary_block(&ty.doc));
        out.push_str(&self.generic_table(&from, &ty.generic_params));
        out.push_str(&self.parameter_table(&from, &ty.parameters));
        let returns = self.return_text(&from, ty.return_type.as_ref());
        let _ = writeln!(out, "{} : {returns}\n", markdown::bold("Return Type"));
        if let Some(doc) = &ty.doc.returns {
            let _ = writeln!(out, "{} : {doc}\n", markdown::bold("Returns"));
        }
        return self.emit(&from, &ty.id, out);
    }

    /// Page of one member declared by `ty`.
    fn member_page(&mut self, ty: &TypeNode, member: &MemberNode) -> Result<(), Error> {
        let Some(key) = &member.key else {
            return Ok(());
        };
        let from = self.linker.pages().resolve(key);
        let mut out = self.home(&from);
        let title = format!("{} {}", markdown::escape_chars(&member.display, &['<', '>']), member.kind.label());
        let _ = writeln!(out, "{}\n", markdown::header(4, &title));
        out.push_str(&self.locations(&from, ty));
        let type_link = self.linker.link(&from, &ty.reference);
        let _ = writeln!(out, "{} : {type_link}\n", markdown::bold("Declaring Type"));
        let _ = writeln!(out, "{}\n", markdown::code(&member.signature, SIGNATURE_LANGUAGE));
        out.push_str(&summary_block(&member.doc));
        out.push_str(&self.generic_table(&from, &member.generic_params));

        match member.kind {
            SymbolKind::Method => {
                let returns = self.return_text(&from, member.value_type.as_ref());
                let _ = writeln!(out, "{} : {returns}\n", markdown::bold("Return Type"));
            },
            SymbolKind::EnumField => {
                let value = member.value.unwrap_or_default();
                let _ = writeln!(out, "{} : {value}\n", markdown::bold("Value"));
            },
            SymbolKind::Event | SymbolKind::Field | SymbolKind::Property => {
                let label = if member.kind == SymbolKind::Event { "Handler Type" } else { "Type" };
                let value = self.return_text(&from, member.value_type.as_ref());
                let _ = writeln!(out, "{} : {value}\n", markdown::bold(label));
            },
            _ => {},
        }
        out.push_str(&self.parameter_table(&from, &member.parameters));
        if let Some(doc) = &member.doc.returns {
            let _ = writeln!(out, "{} : {doc}\n", markdown::bold("Returns"));
        }
        out.push_str(&self.exception_table(&from, &member.doc));
        return self.emit(&from, &member.id, out);
    }

    // ── Page sections ─────────────────────────────────────────────────

    /// Home link, title, location links and declaring type of a type page.
    fn type_header(&mut self, from: &PageAddress, ty: &TypeNode) -> String {
        let mut out = self.home(from);
        let title = format!("{} {}", markdown::escape_chars(&ty.display, &['<', '>']), ty.kind.label());
        let _ = writeln!(out, "{}\n", markdown::header(2, &title));
        let _ = writeln!(out, "{}\n", markdown::header(3, "Definition"));
        out.push_str(&self.locations(from, ty));
        if let Some(outer) = &ty.declaring_type {
            let link = self.linker.link(from, outer);
            let _ = writeln!(out, "{} : {link}\n", markdown::bold("Declaring Type"));
        }
        return out;
    }

    /// Assembly and namespace links.
    fn locations(&mut self, from: &PageAddress, ty: &TypeNode) -> String {
        let assembly = self.key_link(from, &ty.assembly, &crate::canonical::assembly_key(&ty.assembly));
        let namespace =
            self.key_link(from, namespace_name(&ty.namespace), &crate::canonical::namespace_key(&ty.namespace));
        return format!(
            "{} : {assembly}\n\n{} : {namespace}\n\n",
            markdown::bold("Assembly"),
            markdown::bold("Namespace")
        );
    }

    /// Inheritance chain, implemented interfaces and derived types.
    fn relations(&mut self, from: &PageAddress, ty: &TypeNode) -> String {
        let mut out = String::new();
        if !ty.base_chain.is_empty() {
            let mut chain: Vec<String> = ty.base_chain.iter().map(|base| return self.linker.link(from, base)).collect();
            chain.push(markdown::escape(&strip_arity(&ty.display)));
            let _ = writeln!(out, "{} : {}\n", markdown::bold("Inheritance"), chain.join(CHAIN_ARROW));
        }
        if !ty.interfaces.is_empty() {
            let links = self.links(from, &ty.interfaces);
            let _ = writeln!(out, "{} : {links}\n", markdown::bold("Implements"));
        }
        if !ty.derived.is_empty() {
            let links = self.links(from, &ty.derived);
            let _ = writeln!(out, "{} : {links}\n", markdown::bold("Derived"));
        }
        return out;
    }

    /// Nested bullet tree of a namespace's types, grouped by directory.
    /// Types without a directory come first.
    fn directory_tree(&mut self, from: &PageAddress, types: &[TypeNode]) -> String {
        let mut entries: Vec<(Vec<&str>, &TypeNode)> = types
            .iter()
            .map(|ty| {
                let segments = ty
                    .belong_directory
                    .as_deref()
                    .map(|dir| return dir.split('/').filter(|s| return !s.is_empty()).collect())
                    .unwrap_or_default();
                return (segments, ty);
            })
            .collect();
        entries.sort_by(|a, b| return a.0.cmp(&b.0));

        let mut out = String::new();
        let mut open: Vec<&str> = Vec::new();
        for (segments, ty) in entries {
            let shared = open.iter().zip(&segments).take_while(|(a, b)| return a == b).count();
            for (depth, segment) in segments.iter().enumerate().skip(shared) {
                let _ = writeln!(out, "{}", markdown::bullet(depth.saturating_add(1), &markdown::bold(segment)));
            }
            let link = self.key_link(from, &ty.display, &ty.key);
            let _ = writeln!(out, "{}", markdown::bullet(segments.len().saturating_add(1), &link));
            open = segments;
        }
        return out;
    }

    /// Generic parameter table: name, doc, constraints.
    fn generic_table(&mut self, from: &PageAddress, params: &[GenericParamNode]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = params
            .iter()
            .map(|param| {
                let constraints: Vec<String> = param
                    .constraints
                    .iter()
                    .map(|c| {
                        return match c {
                            Constraint::Type(ty) => self.linker.link(from, ty),
                            Constraint::Keyword(_) => markdown::escape(&constraint_text(c)),
                        };
                    })
                    .collect();
                return vec![param.name.clone(), doc_or_missing(param.doc.as_deref()), join_or_missing(&constraints)];
            })
            .collect();
        return section("Type Parameters", &markdown::table(&["Name", "Doc", "Constraints"], &rows));
    }

    /// Parameter table: name, type, doc.
    fn parameter_table(&mut self, from: &PageAddress, params: &[ParamNode]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = params
            .iter()
            .map(|param| {
                return vec![
                    param.name.clone(),
                    self.linker.link(from, &param.ty),
                    doc_or_missing(param.doc.as_deref()),
                ];
            })
            .collect();
        return section("Parameters", &markdown::table(&["Name", "Type", "Doc"], &rows));
    }

    /// Exception table from `exception[cref]` docs.
    fn exception_table(&mut self, from: &PageAddress, doc: &CommentNode) -> String {
        if doc.exceptions.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = doc
            .exceptions
            .iter()
            .map(|exception| return vec![self.cref(from, &exception.name), doc_or_missing(Some(exception.text.as_str()))])
            .collect();
        return section("Exceptions", &markdown::table(&["Exception", "Condition"], &rows));
    }

    /// Constructor table: signature, doc, parameters.
    fn constructor_table(&mut self, from: &PageAddress, ctors: &[MemberNode]) -> String {
        if ctors.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = ctors
            .iter()
            .map(|ctor| {
                let params: Vec<String> = ctor
                    .parameters
                    .iter()
                    .map(|p| return format!("{} {}", self.linker.link(from, &p.ty), p.name))
                    .collect();
                return vec![
                    self.member_name(from, ctor),
                    summary_or_missing(&ctor.doc),
                    join_with(&params, LINE_BREAK),
                ];
            })
            .collect();
        return section("Constructors", &markdown::table(&["Constructor", "Doc", "Parameters"], &rows));
    }

    /// Enum value table: name, value, description.
    fn enum_table(&mut self, from: &PageAddress, values: &[MemberNode]) -> String {
        if values.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = values
            .iter()
            .map(|value| {
                return vec![
                    self.member_name(from, value),
                    value.value.unwrap_or_default().to_string(),
                    summary_or_missing(&value.doc),
                ];
            })
            .collect();
        return section("Values", &markdown::table(&["Name", "Value", "Description"], &rows));
    }

    /// Field or property table: name, type, static, doc.
    fn value_table(&mut self, from: &PageAddress, title: &str, members: &[MemberNode]) -> String {
        if members.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = members
            .iter()
            .map(|member| {
                return vec![
                    self.member_name(from, member),
                    self.return_text(from, member.value_type.as_ref()),
                    static_mark(member),
                    summary_or_missing(&member.doc),
                ];
            })
            .collect();
        return section(title, &markdown::table(&["Name", "Type", "Static", "Doc"], &rows));
    }

    /// Method table: name, return type, accessor, static, doc.
    fn method_table(&mut self, from: &PageAddress, methods: &[MemberNode]) -> String {
        if methods.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = methods
            .iter()
            .map(|method| {
                return vec![
                    self.member_name(from, method),
                    self.return_text(from, method.value_type.as_ref()),
                    method.visibility.keyword().to_string(),
                    static_mark(method),
                    summary_or_missing(&method.doc),
                ];
            })
            .collect();
        return section(
            "Methods",
            &markdown::table(&["Method", "Return Type", "Accessor", "Static", "Doc"], &rows),
        );
    }

    /// Event table: name, handler type, accessor, doc.
    fn event_table(&mut self, from: &PageAddress, events: &[MemberNode]) -> String {
        if events.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = events
            .iter()
            .map(|event| {
                return vec![
                    self.member_name(from, event),
                    self.return_text(from, event.value_type.as_ref()),
                    event.visibility.keyword().to_string(),
                    summary_or_missing(&event.doc),
                ];
            })
            .collect();
        return section("Events", &markdown::table(&["Name", "Handler Type", "Accessor", "Doc"], &rows));
    }

    // ── Links ─────────────────────────────────────────────────────────

    /// `###### [Home](...)` followed by a blank line.
    fn home(&mut self, from: &PageAddress) -> String {
        let index = self.linker.pages().index();
        let link = markdown::hyperlink("Home", &Linker::href(from, &index));
        return format!("{}\n\n", markdown::header(6, &link));
    }

    /// Link with `text` to the page of `key`.
    fn key_link(&mut self, from: &PageAddress, text: &str, key: &str) -> String {
        let target = self.linker.pages().resolve(key);
        return markdown::hyperlink(text, &Linker::href(from, &target));
    }

    /// Comma-joined links.
    fn links(&mut self, from: &PageAddress, targets: &[TypeRef]) -> String {
        let links: Vec<String> = targets.iter().map(|t| return self.linker.link(from, t)).collect();
        return links.join(", ");
    }

    /// Member name cell: a link when the member has a page anywhere, with an
    /// inherited marker naming the declaring type.
    fn member_name(&mut self, from: &PageAddress, member: &MemberNode) -> String {
        let mut name = match &member.key {
            Some(key) => self.key_link(from, &member.display, key),
            None => markdown::escape_chars(&member.display, &['<', '>']),
        };
        if let Some(declared_by) = &member.declared_by {
            let owner = self.linker.link(from, declared_by);
            name.push_str(&format!("&nbsp;&nbsp;&nbsp;&nbsp;*(inherited from {owner})*"));
        }
        return name;
    }

    /// Linked type, or `void`.
    fn return_text(&mut self, from: &PageAddress, ty: Option<&TypeRef>) -> String {
        return match ty {
            Some(ty) => self.linker.link(from, ty),
            None => markdown::keyword("void"),
        };
    }

    /// An exception `cref` (`T:Namespace.Name`) resolved like any other
    /// type mention.
    fn cref(&mut self, from: &PageAddress, cref: &str) -> String {
        let name = cref.split_once(':').map_or(cref, |(_, rest)| return rest);
        let target = match name.rsplit_once('.') {
            Some((namespace, short)) => TypeRef::named(namespace, short),
            None => TypeRef::named("", name),
        };
        return self.linker.link(from, &target);
    }

    // ── Output ────────────────────────────────────────────────────────

    /// Claim `address` for `owner`, append the matching fragment, and write
    /// the page.
    fn emit(&mut self, address: &PageAddress, owner: &CanonicalId, mut content: String) -> Result<(), Error> {
        self.linker.pages().claim(address, owner)?;
        if self.fragments.append(address.file_name(), &mut content)? {
            self.stats.fragments = self.stats.fragments.saturating_add(1);
        }
        let path = Path::new(address.as_str());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        self.stats.pages = self.stats.pages.saturating_add(1);
        return Ok(());
    }
}

/// Every member list of a type, in page order.
fn members(ty: &TypeNode) -> impl Iterator<Item = &MemberNode> {
    return ty
        .constructors
        .iter()
        .chain(&ty.enum_values)
        .chain(&ty.fields)
        .chain(&ty.properties)
        .chain(&ty.methods)
        .chain(&ty.events);
}

/// Display name of a namespace; the global namespace is called `global`.
fn namespace_name(name: &str) -> &str {
    if name.is_empty() {
        return "global";
    }
    return name;
}

/// `#### Title` plus a table, followed by a blank line.
fn section(title: &str, table: &str) -> String {
    return format!("{}\n\n{table}\n", markdown::header(4, title));
}

/// Summary text, paragraph bullets and remarks.
fn summary_block(doc: &CommentNode) -> String {
    let mut out = format!("{}\n\n", markdown::bold("Summary"));
    let Some(summary) = &doc.summary else {
        let _ = writeln!(out, "{MISSING}\n");
        return out;
    };
    if summary.text.is_empty() && summary.paras.is_empty() {
        let _ = writeln!(out, "{MISSING}\n");
    }
    if !summary.text.is_empty() {
        let _ = writeln!(out, "{}\n", markdown::italic(&summary.text));
    }
    if !summary.paras.is_empty() {
        for para in &summary.paras {
            let _ = writeln!(out, "{}", markdown::bullet(1, para));
        }
        out.push('\n');
    }
    if let Some(remarks) = &summary.remarks {
        let _ = writeln!(out, "{}\n\n{remarks}\n", markdown::bold("Remarks"));
    }
    return out;
}

/// Summary for a table cell, `-` when absent.
fn summary_or_missing(doc: &CommentNode) -> String {
    return doc.summary_text().unwrap_or_else(|| return MISSING.to_string());
}

/// Doc text, `-` when absent or blank.
fn doc_or_missing(doc: Option<&str>) -> String {
    return match doc {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        Some(_) | None => MISSING.to_string(),
    };
}

/// Comma-joined, `-` when empty.
fn join_or_missing(parts: &[String]) -> String {
    return join_with(parts, ", ");
}

/// Joined with `separator`, `-` when empty.
fn join_with(parts: &[String], separator: &str) -> String {
    if parts.is_empty() {
        return MISSING.to_string();
    }
    return parts.join(separator);
}

/// Static column value.
fn static_mark(member: &MemberNode) -> String {
    if member.is_static {
        return markdown::keyword("static");
    }
    return String::new();
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use super::*;
    use crate::comments::{self, CommentIndex};
    use crate::model;
    use crate::pages::PageAddresses;
    use crate::types::Universe;
    use crate::xref::ExternalUrlResolver;

    fn int() -> serde_json::Value {
        serde_json::json!({ "kind": "named", "namespace": "System", "name": "Int32" })
    }

    fn universe() -> Universe {
        serde_json::from_value(serde_json::json!({
            "assemblies": [{ "name": "Demo", "types": [
                { "namespace": "Demo", "name": "Calc", "kind": "class", "visibility": "public",
                  "attributes": [{ "name": "BelongDirectory", "args": ["\"Math/Basic\""] }],
                  "constructors": [{ "visibility": "public" }],
                  "methods": [
                      { "name": "Sum", "visibility": "public", "return_type": int(),
                        "parameters": [{ "name": "a", "type": int() }, { "name": "b", "type": int() }] },
                      { "name": "Sum", "visibility": "public", "return_type": int(),
                        "parameters": [{ "name": "values", "type": { "kind": "array", "element": int() } }] }
                  ] },
                { "namespace": "Demo", "name": "Plain", "kind": "struct", "visibility": "public",
                  "fields": [{ "name": "Limit", "visibility": "public", "modifiers": ["static"], "type": int() }] }
            ]}]
        }))
        .unwrap()
    }

    fn write(dir: &Path, xml: &str) -> WriteStats {
        write_linked(dir, xml, &|_: &TypeRef| String::new())
    }

    fn write_linked(dir: &Path, xml: &str, external: &dyn ExternalUrlResolver) -> WriteStats {
        let mut index = CommentIndex::default();
        index.insert_file(Path::new("Demo.xml"), comments::parse(Path::new("Demo.xml"), xml).unwrap());
        let model = model::build(&universe(), &index).unwrap();
        let root = dir.to_string_lossy().replace('\\', "/");
        let linker = Linker::new(PageAddresses::new(&root, "Demo"), &model.documented, external);
        let fragments = Fragments::index(None);
        Writer::new(&model, linker, &fragments, "Demo").write_all().unwrap()
    }

    fn read(dir: &Path, file: &str) -> String {
        std::fs::read_to_string(dir.join("Demo").join(file)).unwrap()
    }

    #[test]
    fn writes_one_page_per_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let stats = write(dir.path(), "<doc><members/></doc>");
        // index, assembly, namespace, two types, ctor, two methods, one field
        assert_eq!(stats.pages, 9);
        for file in [
            "Index.md",
            "Demo.assembly.md",
            "Demo.namespace.md",
            "Demo.Calc.md",
            "Demo.Calc.ctor.md",
            "Demo.Calc.Sum.System.Int32.System.Int32.md",
            "Demo.Calc.Sum.System.Int32Array.md",
            "Demo.Plain.Limit.md",
        ] {
            assert!(dir.path().join("Demo").join(file).exists(), "missing {file}");
        }
    }

    #[test]
    fn type_page_links_members_and_home() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            r#"<doc><members>
                 <member name="M:Demo.Calc.Sum(System.Int32,System.Int32)"><summary>Adds two numbers.</summary></member>
               </members></doc>"#,
        );
        let page = read(dir.path(), "Demo.Calc.md");
        assert!(page.starts_with("###### [Home](./Index.md \"Home\")"));
        assert!(page.contains("## Calc Class"));
        assert!(page.contains("[Sum(int, int)](./Demo.Calc.Sum.System.Int32.System.Int32.md \"Sum(int, int)\")"));
        assert!(page.contains("|Adds two numbers.|"));
        assert!(page.contains("Default constructor"));
    }

    #[test]
    fn namespace_page_groups_by_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "<doc><members/></doc>");
        let page = read(dir.path(), "Demo.namespace.md");
        let plain = page.find("* [Plain]").unwrap();
        let math = page.find("* **Math**").unwrap();
        let basic = page.find("    * **Basic**").unwrap();
        let calc = page.find("        * [Calc]").unwrap();
        assert!(plain < math && math < basic && basic < calc);
    }

    #[test]
    fn member_page_lists_parameters_with_docs() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            r#"<doc><members>
                 <member name="M:Demo.Calc.Sum(System.Int32[])">
                   <param name="values">Numbers to add.</param>
                   <exception cref="T:System.OverflowException">On overflow.</exception>
                 </member>
               </members></doc>"#,
        );
        let page = read(dir.path(), "Demo.Calc.Sum.System.Int32Array.md");
        assert!(page.contains("#### Sum(int[]) Method"));
        assert!(page.contains("|values|int\\[\\]|Numbers to add.|"));
        assert!(page.contains("|OverflowException|On overflow.|"));
        assert!(page.contains("**Declaring Type** : [Calc](./Demo.Calc.md \"Calc\")"));
    }

    #[test]
    fn exception_types_resolve_like_other_mentions() {
        let dir = tempfile::tempdir().unwrap();
        let external = |ty: &TypeRef| -> String {
            match ty.named_core() {
                Some(("System", "OverflowException")) => "https://ext/overflow".to_string(),
                _ => String::new(),
            }
        };
        let stats = write_linked(
            dir.path(),
            r#"<doc><members>
                 <member name="M:Demo.Calc.Sum(System.Int32,System.Int32)">
                   <exception cref="T:System.OverflowException">On overflow.</exception>
                   <exception cref="T:Demo.Plain">Plain failure.</exception>
                   <exception cref="T:Vendor.Oops">Vendor failure.</exception>
                 </member>
               </members></doc>"#,
            &external,
        );
        let page = read(dir.path(), "Demo.Calc.Sum.System.Int32.System.Int32.md");
        assert!(page.contains("|[OverflowException](https://ext/overflow \"OverflowException\")|On overflow.|"));
        assert!(page.contains("|[Plain](./Demo.Plain.md \"Plain\")|Plain failure.|"));
        assert!(page.contains("|Oops|Vendor failure.|"));
        assert!(stats.unresolved >= 1);
    }

    #[test]
    fn overloads_with_same_short_parameter_names_get_distinct_pages() {
        let dir = tempfile::tempdir().unwrap();
        let foo = |namespace: &str| serde_json::json!({ "kind": "named", "namespace": namespace, "name": "Foo" });
        let tuple = |args: Vec<serde_json::Value>| {
            let name = format!("Tuple`{}", args.len());
            serde_json::json!({ "kind": "named", "namespace": "System", "name": name, "args": args })
        };
        let string = serde_json::json!({ "kind": "named", "namespace": "System", "name": "String" });
        let universe: Universe = serde_json::from_value(serde_json::json!({
            "assemblies": [{ "name": "Demo", "types": [
                { "namespace": "Demo", "name": "Calc", "kind": "class", "visibility": "public",
                  "methods": [
                      { "name": "F", "visibility": "public", "parameters": [{ "name": "x", "type": foo("Demo.A") }] },
                      { "name": "F", "visibility": "public", "parameters": [{ "name": "x", "type": foo("Demo.B") }] },
                      { "name": "F", "visibility": "public", "parameters": [
                          { "name": "x", "type": tuple(vec![int()]) }, { "name": "y", "type": string.clone() }] },
                      { "name": "F", "visibility": "public", "parameters": [
                          { "name": "x", "type": tuple(vec![int(), string]) }] }
                  ] }
            ]}]
        }))
        .unwrap();
        let model = model::build(&universe, &CommentIndex::default()).unwrap();
        let root = dir.path().to_string_lossy().replace('\\', "/");
        let external = |_: &TypeRef| String::new();
        let linker = Linker::new(PageAddresses::new(&root, "Demo"), &model.documented, &external);
        let fragments = Fragments::index(None);
        let stats = Writer::new(&model, linker, &fragments, "Demo").write_all().unwrap();
        // index, assembly, namespace, type, four overloads
        assert_eq!(stats.pages, 8);
        for file in [
            "Demo.Calc.F.Demo.A.Foo.md",
            "Demo.Calc.F.Demo.B.Foo.md",
            "Demo.Calc.F.System.Tuple.1.System.Int32.System.String.md",
            "Demo.Calc.F.System.Tuple.2.System.Int32.System.String.md",
        ] {
            assert!(dir.path().join("Demo").join(file).exists(), "missing {file}");
        }
    }

    #[test]
    fn colliding_pages_fail() {
        let dir = tempfile::tempdir().unwrap();
        let model = model::build(&universe(), &CommentIndex::default()).unwrap();
        let documented: HashSet<String> = model.documented.clone();
        let root = dir.path().to_string_lossy().replace('\\', "/");
        let external = |_: &TypeRef| String::new();
        let mut linker = Linker::new(PageAddresses::new(&root, "Demo"), &documented, &external);
        let taken = linker.pages().resolve("Demo.Calc");
        linker.pages().claim(&taken, &CanonicalId("T:Other".to_string())).unwrap();
        let fragments = Fragments::index(None);
        let err = Writer::new(&model, linker, &fragments, "Demo").write_all().unwrap_err();
        assert!(matches!(err, Error::AmbiguousPageAddress { .. }));
    }
}
