//! Symbol metadata model: the assembly → namespace → type → member forest,
//! joined to parsed comments by canonical ID.
//!
//! Built once per run from the introspected universe and immutable after
//! construction. Base chains and derived sets come from linear scans over
//! the universe, which is quadratic in the number of types.
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::canonical::{
    self, assembly_key, namespace_id, namespace_key, strip_arity, type_key,
};
use crate::comments::{CommentIndex, CommentNode, Summary};
use crate::error::Error;
use crate::signature;
use crate::types::{
    AttributeDesc, CanonicalId, Constraint, EnumValueDesc, EventDesc, FieldDesc, GenericParamDesc,
    MethodDesc, Modifier, ParamDesc, PropertyDesc, SymbolKind, TypeDesc, TypeRef, Universe,
    Visibility, has_modifier,
};

/// Attribute names that place a type in a directory on its namespace page.
const BELONG_DIRECTORY: &[&str] = &["BelongDirectory", "BelongDirectoryAttribute"];

/// Summary used for an undocumented parameterless constructor.
const DEFAULT_CONSTRUCTOR_DOC: &str = "Default constructor";

// ── Nodes ─────────────────────────────────────────────────────────────

/// The documented universe of one run.
#[derive(Debug)]
pub struct Model {
    /// Assemblies in universe order.
    pub assemblies: Vec<AssemblyNode>,
    /// Page keys of every type that gets its own page.
    pub documented: HashSet<String>,
    /// One node per distinct namespace, sorted by name.
    pub namespaces: Vec<NamespaceNode>,
    /// Every symbol with its own page, in emission order.
    pub symbols: Vec<SymbolEntry>,
}

impl Model {
    /// Namespace node by name.
    #[cfg(test)]
    pub fn namespace(&self, name: &str) -> Option<&NamespaceNode> {
        return self.namespaces.iter().find(|ns| return ns.name == name);
    }
}

/// One assembly and the namespaces it contributes types to.
#[derive(Debug)]
pub struct AssemblyNode {
    /// Page key.
    pub key: String,
    /// Assembly name.
    pub name: String,
    /// Namespace names, sorted.
    pub namespaces: Vec<String>,
}

/// A generic parameter with its constraints and doc.
#[derive(Debug, Clone)]
pub struct GenericParamNode {
    /// Constraints in declaration order.
    pub constraints: Vec<Constraint>,
    /// `typeparam` doc.
    pub doc: Option<String>,
    /// Parameter name.
    pub name: String,
}

/// A constructor, method, field, property, event or enum value.
#[derive(Debug, Clone)]
pub struct MemberNode {
    /// Declaring type when the member is inherited.
    pub declared_by: Option<TypeRef>,
    /// Name shown in tables: `Sum(int, int)`, `Count`, `this[int]`.
    pub display: String,
    /// Parsed comment, empty when the documentation files had none.
    pub doc: CommentNode,
    /// Method-level generic parameters.
    pub generic_params: Vec<GenericParamNode>,
    /// Canonical ID, computed against the declaring type.
    pub id: CanonicalId,
    /// Whether the member is static.
    pub is_static: bool,
    /// Page key of the member's page, `None` when no page exists anywhere.
    pub key: Option<String>,
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Parameters in declaration order.
    pub parameters: Vec<ParamNode>,
    /// Declaration signature.
    pub signature: String,
    /// Constant value for enum members.
    pub value: Option<i64>,
    /// Return, field, property or event handler type; `None` for `void`.
    pub value_type: Option<TypeRef>,
    /// Effective visibility.
    pub visibility: Visibility,
}

impl MemberNode {
    /// Whether the member is declared by the type listing it, and so gets
    /// its page written there.
    pub const fn owns_page(&self) -> bool {
        return self.declared_by.is_none() && self.key.is_some();
    }
}

/// A namespace and its documented types.
#[derive(Debug)]
pub struct NamespaceNode {
    /// Assemblies contributing types, in universe order.
    pub assemblies: Vec<String>,
    /// Delegate types.
    pub delegates: Vec<TypeNode>,
    /// Namespace comment, when the documentation files carry one.
    pub doc: CommentNode,
    /// Canonical ID.
    pub id: CanonicalId,
    /// Page key.
    pub key: String,
    /// Namespace name; empty for the global namespace.
    pub name: String,
    /// Non-delegate types in universe order.
    pub types: Vec<TypeNode>,
}

/// A formal parameter with its doc.
#[derive(Debug, Clone)]
pub struct ParamNode {
    /// `param` doc.
    pub doc: Option<String>,
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TypeRef,
}

/// A symbol that has its own page.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    /// Whether a comment was found for the symbol.
    pub has_doc: bool,
    /// Canonical ID.
    pub id: CanonicalId,
    /// Pre-normalization page key.
    pub key: String,
    /// Symbol kind.
    pub kind: SymbolKind,
}

/// A documented type (class, struct, interface, enum or delegate).
#[derive(Debug)]
pub struct TypeNode {
    /// Declaring assembly.
    pub assembly: String,
    /// Base types, root first, ending with the immediate base.
    pub base_chain: Vec<TypeRef>,
    /// Directory path from a `BelongDirectory` attribute on the type or an ancestor.
    pub belong_directory: Option<String>,
    /// Constructors.
    pub constructors: Vec<MemberNode>,
    /// Enclosing type, for nested types.
    pub declaring_type: Option<TypeRef>,
    /// Nested delegate types.
    pub delegates: Vec<TypeRef>,
    /// Documented types deriving from or implementing this one.
    pub derived: Vec<TypeRef>,
    /// Display name with generic parameters: `Box<T>`.
    pub display: String,
    /// Parsed comment.
    pub doc: CommentNode,
    /// Enum constants.
    pub enum_values: Vec<MemberNode>,
    /// Events.
    pub events: Vec<MemberNode>,
    /// Fields.
    pub fields: Vec<MemberNode>,
    /// Type-level generic parameters.
    pub generic_params: Vec<GenericParamNode>,
    /// Canonical ID.
    pub id: CanonicalId,
    /// Implemented interfaces; empty for enums.
    pub interfaces: Vec<TypeRef>,
    /// Page key.
    pub key: String,
    /// Type kind.
    pub kind: SymbolKind,
    /// Methods.
    pub methods: Vec<MemberNode>,
    /// Containing namespace.
    pub namespace: String,
    /// Delegate invoke parameters.
    pub parameters: Vec<ParamNode>,
    /// Properties and indexers.
    pub properties: Vec<MemberNode>,
    /// Open reference to the type itself.
    pub reference: TypeRef,
    /// Delegate invoke return type; `None` for `void` and non-delegates.
    pub return_type: Option<TypeRef>,
    /// Declaration signature.
    pub signature: String,
}

// ── Catalog ───────────────────────────────────────────────────────────

/// Flat summary of one ancestor: enough to continue a base chain or an
/// attribute lookup.
struct Ancestor<'u> {
    /// Custom attributes.
    attributes: &'u [AttributeDesc],
    /// Immediate base.
    base: Option<&'u TypeRef>,
}

/// Lookup tables over the universe, built once.
struct Catalog<'u> {
    /// Declared and external types by page key.
    ancestors: HashMap<String, Ancestor<'u>>,
    /// Declared types by page key, with their assembly.
    declared: HashMap<String, (&'u str, &'u TypeDesc)>,
}

impl<'u> Catalog<'u> {
    /// Index every declared and external type.
    fn new(universe: &'u Universe) -> Self {
        let mut ancestors = HashMap::new();
        let mut declared = HashMap::new();
        for external in &universe.external_types {
            ancestors.insert(type_key(&external.namespace, &external.name), Ancestor {
                attributes: &external.attributes,
                base: external.base_type.as_ref(),
            });
        }
        for assembly in &universe.assemblies {
            for ty in &assembly.types {
                let key = type_key(&ty.namespace, &ty.path());
                ancestors.insert(key.clone(), Ancestor { attributes: &ty.attributes, base: ty.base_type.as_ref() });
                declared.insert(key, (assembly.name.as_str(), ty));
            }
        }
        return Self { ancestors, declared };
    }

    /// Declared type for a reference.
    fn declared(&self, reference: &TypeRef) -> Option<&'u TypeDesc> {
        let key = ref_key(reference)?;
        return self.declared.get(&key).map(|(_, ty)| return *ty);
    }

    /// Base types of `ty`, root first. Walks the flat ancestor list and stops
    /// at the root, at an unknown type, or on a cycle.
    fn base_chain(&self, ty: &TypeDesc) -> Vec<TypeRef> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = ty.base_type.as_ref();
        while let Some(base) = next {
            let key = ref_key(base);
            if let Some(k) = &key
                && !seen.insert(k.clone())
            {
                break;
            }
            chain.push(base.clone());
            next = key.and_then(|k| return self.ancestors.get(&k)).and_then(|a| return a.base);
        }
        chain.reverse();
        return chain;
    }

    /// First `BelongDirectory` path on `ty` or its nearest ancestor.
    fn belong_directory(&self, ty: &TypeDesc) -> Option<String> {
        if let Some(dir) = directory_of(&ty.attributes) {
            return Some(dir);
        }
        let mut seen = HashSet::new();
        let mut next = ty.base_type.as_ref().and_then(ref_key);
        while let Some(key) = next {
            if !seen.insert(key.clone()) {
                return None;
            }
            let ancestor = self.ancestors.get(&key)?;
            if let Some(dir) = directory_of(ancestor.attributes) {
                return Some(dir);
            }
            next = ancestor.base.and_then(ref_key);
        }
        return None;
    }
}

/// Page key of the named type at the core of a reference.
fn ref_key(reference: &TypeRef) -> Option<String> {
    let (namespace, name) = reference.named_core()?;
    return Some(type_key(namespace, name));
}

/// Directory path of a `BelongDirectory` attribute, quotes and outer
/// slashes trimmed.
fn directory_of(attributes: &[AttributeDesc]) -> Option<String> {
    let attr = attributes.iter().find(|a| return BELONG_DIRECTORY.contains(&a.name.as_str()))?;
    let raw = attr.args.first()?;
    let dir = raw.trim().trim_matches('"').trim_matches('/');
    if dir.is_empty() {
        return None;
    }
    return Some(dir.to_string());
}

/// Page keys of every type that gets its own page: public top-level types,
/// and public or protected nested types whose enclosing type is documented.
fn documented_set(universe: &Universe) -> HashSet<String> {
    let mut types: Vec<&TypeDesc> = universe.all_types().filter(|t| return t.kind.is_type()).collect();
    types.sort_by_key(|t| return t.declaring_type.as_deref().map_or(0, |outer| return outer.split('.').count()));

    let mut documented = HashSet::new();
    for ty in types {
        let visible = match &ty.declaring_type {
            None => ty.visibility == Visibility::Public,
            Some(outer) => {
                ty.visibility.is_documented() && documented.contains(&type_key(&ty.namespace, outer))
            },
        };
        if visible {
            documented.insert(type_key(&ty.namespace, &ty.path()));
        }
    }
    return documented;
}

/// Whether a member is part of the documented surface.
fn member_visible(visibility: Visibility, modifiers: &[Modifier]) -> bool {
    return visibility.is_documented() && !has_modifier(modifiers, Modifier::SpecialName);
}

// ── Builder ───────────────────────────────────────────────────────────

/// Model construction state.
struct Builder<'u> {
    /// Universe lookups.
    catalog: Catalog<'u>,
    /// Parsed comments.
    comments: &'u CommentIndex,
    /// Page keys of documented types.
    documented: HashSet<String>,
    /// Canonical IDs handed out so far, with the display name of the owner.
    ids: HashMap<CanonicalId, String>,
    /// Symbols with pages.
    symbols: Vec<SymbolEntry>,
    /// The universe.
    universe: &'u Universe,
}

/// Build the model for one run.
///
/// # Errors
///
/// Returns `Error::AmbiguousCanonicalId` if two distinct declared symbols
/// produce the same canonical ID.
pub fn build(universe: &Universe, comments: &CommentIndex) -> Result<Model, Error> {
    let mut builder = Builder {
        catalog: Catalog::new(universe),
        comments,
        documented: documented_set(universe),
        ids: HashMap::new(),
        symbols: Vec::new(),
        universe,
    };

    let mut namespaces: BTreeMap<String, NamespaceNode> = BTreeMap::new();
    let mut assemblies = Vec::new();
    for assembly in &universe.assemblies {
        let mut names = Vec::new();
        for ty in &assembly.types {
            let key = type_key(&ty.namespace, &ty.path());
            if !builder.documented.contains(&key) {
                continue;
            }
            let node = builder.type_node(&assembly.name, ty, key)?;
            let namespace = namespaces
                .entry(ty.namespace.clone())
                .or_insert_with(|| return empty_namespace(&ty.namespace));
            if !namespace.assemblies.contains(&assembly.name) {
                namespace.assemblies.push(assembly.name.clone());
            }
            if node.kind == SymbolKind::Delegate {
                namespace.delegates.push(node);
            } else {
                namespace.types.push(node);
            }
            names.push(ty.namespace.clone());
        }
        names.sort();
        names.dedup();
        assemblies.push(AssemblyNode { key: assembly_key(&assembly.name), name: assembly.name.clone(), namespaces: names });
    }

    for namespace in namespaces.values_mut() {
        namespace.doc = builder.doc(&namespace.id);
        builder.symbols.push(SymbolEntry {
            has_doc: comments.get(&namespace.id).is_some(),
            id: namespace.id.clone(),
            key: namespace.key.clone(),
            kind: SymbolKind::Namespace,
        });
    }

    debug!(types = builder.documented.len(), symbols = builder.symbols.len(), "model built");
    return Ok(Model {
        assemblies,
        documented: builder.documented,
        namespaces: namespaces.into_values().collect(),
        symbols: builder.symbols,
    });
}

/// Namespace node with no types yet.
fn empty_namespace(name: &str) -> NamespaceNode {
    return NamespaceNode {
        assemblies: Vec::new(),
        delegates: Vec::new(),
        doc: CommentNode::default(),
        id: namespace_id(name),
        key: namespace_key(name),
        name: name.to_string(),
        types: Vec::new(),
    };
}

impl<'u> Builder<'u> {
    /// Comment for `id`, or an empty one.
    fn doc(&self, id: &CanonicalId) -> CommentNode {
        return self.comments.get(id).cloned().unwrap_or_default();
    }

    /// Record a declared symbol that gets its own page.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` if another symbol already
    /// produced `id`.
    fn register(&mut self, id: &CanonicalId, kind: SymbolKind, key: &str, display: String) -> Result<(), Error> {
        if let Some(first) = self.ids.get(id) {
            return Err(Error::AmbiguousCanonicalId { first: first.clone(), id: id.0.clone(), second: display });
        }
        self.ids.insert(id.clone(), display);
        self.symbols.push(SymbolEntry {
            has_doc: self.comments.get(id).is_some(),
            id: id.clone(),
            key: key.to_string(),
            kind,
        });
        return Ok(());
    }

    /// Build one type node and all of its members.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn type_node(&mut self, assembly: &str, ty: &'u TypeDesc, key: String) -> Result<TypeNode, Error> {
        let id = canonical::type_id(ty);
        self.register(&id, ty.kind, &key, canonical::qualified(&ty.namespace, &ty.path()))?;
        let doc = self.doc(&id);
        let reference = ty.as_type_ref();

        let (parameters, return_type) = match (&ty.invoke, ty.kind) {
            (Some(invoke), SymbolKind::Delegate) => (params(&invoke.parameters, &doc), invoke.return_type.clone()),
            _ => (Vec::new(), None),
        };
        let signature = if ty.kind == SymbolKind::Delegate {
            signature::delegate_signature(ty)
        } else {
            signature::type_signature(ty)
        };
        let interfaces = if ty.kind == SymbolKind::Enum { Vec::new() } else { ty.interfaces.clone() };
        let generic_params = generics(&ty.generic_params, &doc);

        let mut node = TypeNode {
            assembly: assembly.to_string(),
            base_chain: self.catalog.base_chain(ty),
            belong_directory: self.catalog.belong_directory(ty),
            constructors: Vec::new(),
            declaring_type: self.declaring_type(ty),
            delegates: self.nested_delegates(ty),
            derived: self.derived(ty),
            display: canonical::display_declared(ty),
            doc,
            enum_values: Vec::new(),
            events: Vec::new(),
            fields: Vec::new(),
            generic_params,
            id,
            interfaces,
            key,
            kind: ty.kind,
            methods: Vec::new(),
            namespace: ty.namespace.clone(),
            parameters,
            properties: Vec::new(),
            reference,
            return_type,
            signature,
        };
        self.members(ty, &mut node)?;
        return Ok(node);
    }

    /// Fill the member lists of a type node.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn members(&mut self, ty: &'u TypeDesc, node: &mut TypeNode) -> Result<(), Error> {
        match ty.kind {
            SymbolKind::Delegate => return Ok(()),
            SymbolKind::Enum => {
                for value in &ty.enum_values {
                    node.enum_values.push(self.enum_value(ty, value)?);
                }
                return Ok(());
            },
            _ => {},
        }

        for ctor in ty.constructors.iter().filter(|c| return member_visible(c.visibility, &c.modifiers)) {
            node.constructors.push(self.constructor(ty, ctor)?);
        }
        for field in ty.fields.iter().filter(|f| return member_visible(f.visibility, &f.modifiers)) {
            node.fields.push(self.field(ty, field)?);
        }
        for property in ty.properties.iter().filter(|p| return member_visible(p.visibility(), &p.modifiers)) {
            node.properties.push(self.property(ty, property)?);
        }
        for method in ty.methods.iter().filter(|m| return member_visible(m.visibility, &m.modifiers)) {
            node.methods.push(self.method(ty, method)?);
        }
        for event in ty.events.iter().filter(|e| return member_visible(e.visibility, &e.modifiers)) {
            node.events.push(self.event(ty, event)?);
        }
        return Ok(());
    }

    /// Type a member's ID and key are computed against, and whether that
    /// type has pages. Inherited members use their declaring type.
    fn owner(&self, ty: &'u TypeDesc, declared_by: Option<&TypeRef>) -> (&'u TypeDesc, bool) {
        let Some(reference) = declared_by else {
            return (ty, true);
        };
        let Some(declaring) = self.catalog.declared(reference) else {
            return (ty, false);
        };
        let documented = self.documented.contains(&type_key(&declaring.namespace, &declaring.path()));
        return (declaring, documented);
    }

    /// Finish a member: look up its doc, register it when it owns a page.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn finish(&mut self, mut member: MemberNode, owner: &TypeDesc) -> Result<MemberNode, Error> {
        if member.owns_page()
            && let Some(key) = member.key.clone()
        {
            let display = format!("{}.{}", canonical::qualified(&owner.namespace, &owner.path()), member.display);
            self.register(&member.id, member.kind, &key, display)?;
        }
        member.doc = self.doc(&member.id);
        for param in &mut member.parameters {
            param.doc = member.doc.param(&param.name).map(str::to_string);
        }
        for generic in &mut member.generic_params {
            generic.doc = member.doc.type_param(&generic.name).map(str::to_string);
        }
        return Ok(member);
    }

    /// Constructor node. An undocumented parameterless constructor gets a
    /// stock summary.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn constructor(&mut self, ty: &'u TypeDesc, ctor: &MethodDesc) -> Result<MemberNode, Error> {
        let (owner, linkable) = self.owner(ty, ctor.declared_by.as_ref());
        let member = MemberNode {
            declared_by: ctor.declared_by.clone(),
            display: format!("{}({})", strip_arity(&ty.name), param_types(&ctor.parameters)),
            doc: CommentNode::default(),
            generic_params: Vec::new(),
            id: canonical::constructor_id(owner, ctor),
            is_static: has_modifier(&ctor.modifiers, Modifier::Static),
            key: linkable.then(|| return canonical::constructor_key(owner, ctor)),
            kind: SymbolKind::Constructor,
            parameters: bare_params(&ctor.parameters),
            signature: signature::constructor_signature(ty, ctor),
            value: None,
            value_type: None,
            visibility: ctor.visibility,
        };
        let mut member = self.finish(member, owner)?;
        if ctor.parameters.is_empty() && member.doc.summary_text().is_none() {
            member.doc.summary = Some(Summary { text: DEFAULT_CONSTRUCTOR_DOC.to_string(), ..Summary::default() });
        }
        return Ok(member);
    }

    /// Method node.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn method(&mut self, ty: &'u TypeDesc, method: &MethodDesc) -> Result<MemberNode, Error> {
        let (owner, linkable) = self.owner(ty, method.declared_by.as_ref());
        let member = MemberNode {
            declared_by: method.declared_by.clone(),
            display: format!("{}({})", signature::method_display(method), param_types(&method.parameters)),
            doc: CommentNode::default(),
            generic_params: bare_generics(&method.generic_params),
            id: canonical::method_id(owner, method),
            is_static: has_modifier(&method.modifiers, Modifier::Static),
            key: linkable.then(|| return canonical::method_key(owner, method)),
            kind: SymbolKind::Method,
            parameters: bare_params(&method.parameters),
            signature: signature::method_signature(method),
            value: None,
            value_type: method.return_type.clone(),
            visibility: method.visibility,
        };
        return self.finish(member, owner);
    }

    /// Field node.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn field(&mut self, ty: &'u TypeDesc, field: &FieldDesc) -> Result<MemberNode, Error> {
        let (owner, linkable) = self.owner(ty, field.declared_by.as_ref());
        let member = MemberNode {
            declared_by: field.declared_by.clone(),
            display: field.name.clone(),
            doc: CommentNode::default(),
            generic_params: Vec::new(),
            id: canonical::field_id(owner, field),
            is_static: has_modifier(&field.modifiers, Modifier::Static),
            key: linkable.then(|| return canonical::member_key(owner, &field.name, &[])),
            kind: SymbolKind::Field,
            parameters: Vec::new(),
            signature: signature::field_signature(field),
            value: None,
            value_type: Some(field.ty.clone()),
            visibility: field.visibility,
        };
        return self.finish(member, owner);
    }

    /// Property or indexer node.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn property(&mut self, ty: &'u TypeDesc, property: &PropertyDesc) -> Result<MemberNode, Error> {
        let (owner, linkable) = self.owner(ty, property.declared_by.as_ref());
        let display = if property.parameters.is_empty() {
            property.name.clone()
        } else {
            format!("this[{}]", param_types(&property.parameters))
        };
        let member = MemberNode {
            declared_by: property.declared_by.clone(),
            display,
            doc: CommentNode::default(),
            generic_params: Vec::new(),
            id: canonical::property_id(owner, property),
            is_static: has_modifier(&property.modifiers, Modifier::Static),
            key: linkable.then(|| return canonical::member_key(owner, &property.name, &property.parameters)),
            kind: SymbolKind::Property,
            parameters: bare_params(&property.parameters),
            signature: signature::property_signature(property),
            value: None,
            value_type: Some(property.ty.clone()),
            visibility: property.visibility(),
        };
        return self.finish(member, owner);
    }

    /// Event node.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn event(&mut self, ty: &'u TypeDesc, event: &EventDesc) -> Result<MemberNode, Error> {
        let (owner, linkable) = self.owner(ty, event.declared_by.as_ref());
        let member = MemberNode {
            declared_by: event.declared_by.clone(),
            display: event.name.clone(),
            doc: CommentNode::default(),
            generic_params: Vec::new(),
            id: canonical::event_id(owner, event),
            is_static: has_modifier(&event.modifiers, Modifier::Static),
            key: linkable.then(|| return canonical::member_key(owner, &event.name, &[])),
            kind: SymbolKind::Event,
            parameters: Vec::new(),
            signature: signature::event_signature(event),
            value: None,
            value_type: Some(event.handler.clone()),
            visibility: event.visibility,
        };
        return self.finish(member, owner);
    }

    /// Enum constant node.
    ///
    /// # Errors
    ///
    /// Returns `Error::AmbiguousCanonicalId` on an ID collision.
    fn enum_value(&mut self, ty: &'u TypeDesc, value: &EnumValueDesc) -> Result<MemberNode, Error> {
        let member = MemberNode {
            declared_by: None,
            display: value.name.clone(),
            doc: CommentNode::default(),
            generic_params: Vec::new(),
            id: canonical::enum_value_id(ty, value),
            is_static: true,
            key: Some(canonical::member_key(ty, &value.name, &[])),
            kind: SymbolKind::EnumField,
            parameters: Vec::new(),
            signature: signature::enum_value_signature(value),
            value: Some(value.value),
            value_type: None,
            visibility: Visibility::Public,
        };
        return self.finish(member, ty);
    }

    /// Enclosing type of a nested type, as an open reference.
    fn declaring_type(&self, ty: &TypeDesc) -> Option<TypeRef> {
        let outer = ty.declaring_type.as_ref()?;
        let key = type_key(&ty.namespace, outer);
        return Some(match self.catalog.declared.get(&key) {
            Some((_, outer_ty)) => outer_ty.as_type_ref(),
            None => TypeRef::named(&ty.namespace, outer),
        });
    }

    /// Documented delegates nested directly in `ty`.
    fn nested_delegates(&self, ty: &TypeDesc) -> Vec<TypeRef> {
        let path = ty.path();
        return self
            .universe
            .all_types()
            .filter(|t| return t.kind == SymbolKind::Delegate && t.namespace == ty.namespace)
            .filter(|t| return t.declaring_type.as_deref() == Some(path.as_str()))
            .filter(|t| return self.documented.contains(&type_key(&t.namespace, &t.path())))
            .map(TypeDesc::as_type_ref)
            .collect();
    }

    /// Documented types whose base type or interfaces name `ty`. Linear scan.
    fn derived(&self, ty: &TypeDesc) -> Vec<TypeRef> {
        let key = Some(type_key(&ty.namespace, &ty.path()));
        return self
            .universe
            .all_types()
            .filter(|t| return self.documented.contains(&type_key(&t.namespace, &t.path())))
            .filter(|t| {
                let base_matches = t.base_type.as_ref().and_then(ref_key) == key;
                let interface_matches = t.interfaces.iter().any(|i| return ref_key(i) == key);
                return base_matches || interface_matches;
            })
            .map(TypeDesc::as_type_ref)
            .collect();
    }
}

/// Parameter nodes without docs; docs are attached in `finish`.
fn bare_params(parameters: &[ParamDesc]) -> Vec<ParamNode> {
    return parameters
        .iter()
        .map(|p| return ParamNode { doc: None, name: p.name.clone(), ty: p.ty.clone() })
        .collect();
}

/// Parameter nodes with docs from `doc`.
fn params(parameters: &[ParamDesc], doc: &CommentNode) -> Vec<ParamNode> {
    let mut nodes = bare_params(parameters);
    for node in &mut nodes {
        node.doc = doc.param(&node.name).map(str::to_string);
    }
    return nodes;
}

/// Generic parameter nodes without docs.
fn bare_generics(generic_params: &[GenericParamDesc]) -> Vec<GenericParamNode> {
    return generic_params
        .iter()
        .map(|g| return GenericParamNode { constraints: g.constraints.clone(), doc: None, name: g.name.clone() })
        .collect();
}

/// Generic parameter nodes with docs from `doc`.
fn generics(generic_params: &[GenericParamDesc], doc: &CommentNode) -> Vec<GenericParamNode> {
    let mut nodes = bare_generics(generic_params);
    for node in &mut nodes {
        node.doc = doc.type_param(&node.name).map(str::to_string);
    }
    return nodes;
}

/// `int, List<T>` for display names.
fn param_types(parameters: &[ParamDesc]) -> String {
    let types: Vec<String> = parameters.iter().map(|p| return canonical::display_type(&p.ty)).collect();
    return types.join(", ");
}
