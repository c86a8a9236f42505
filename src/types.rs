//! Core domain types: the introspected type universe, structured type
//! references, and the identifier newtypes passed between modules.
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Everything the introspection collaborator reports for one generation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Universe {
    /// Assemblies whose public surface gets documented.
    pub assemblies: Vec<AssemblyDesc>,
    /// Flat ancestor summaries for types outside the documented assemblies.
    #[serde(default)]
    pub external_types: Vec<ExternalTypeDesc>,
}

impl Universe {
    /// Every type declared by a documented assembly, in declaration order.
    pub fn all_types(&self) -> impl Iterator<Item = &TypeDesc> {
        return self.assemblies.iter().flat_map(|a| return a.types.iter());
    }
}

/// One compiled assembly and the types it declares.
#[derive(Debug, Clone, Deserialize)]
pub struct AssemblyDesc {
    /// Documentation XML for this assembly, relative to the universe file.
    #[serde(default)]
    pub doc: Option<PathBuf>,
    /// Assembly name without extension, e.g. `Demo`.
    pub name: String,
    /// Types declared by the assembly, any visibility.
    #[serde(default)]
    pub types: Vec<TypeDesc>,
}

/// A custom attribute applied to a type or member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeDesc {
    /// Constructor arguments, already rendered as source text.
    #[serde(default)]
    pub args: Vec<String>,
    /// Attribute type name, e.g. `ObsoleteAttribute`.
    pub name: String,
}

/// A generic parameter constraint: either a keyword (`class`, `struct`,
/// `new()`) or a type the argument must derive from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Keyword constraint such as `class` or `new()`.
    Keyword(String),
    /// Base type or interface constraint.
    Type(TypeRef),
}

/// A named constant of an enum.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumValueDesc {
    /// Constant name.
    pub name: String,
    /// Underlying integral value.
    pub value: i64,
}

/// An event member.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDesc {
    /// Custom attributes on the event.
    #[serde(default)]
    pub attributes: Vec<AttributeDesc>,
    /// Declaring type when the event is inherited.
    #[serde(default)]
    pub declared_by: Option<TypeRef>,
    /// Delegate type of the event handler.
    pub handler: TypeRef,
    /// Modifier flags.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Event name.
    pub name: String,
    /// Visibility of the add accessor.
    pub visibility: Visibility,
}

/// A type outside the documented assemblies, known only well enough to
/// continue a base-type chain or an attribute lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalTypeDesc {
    /// Custom attributes on the type.
    #[serde(default)]
    pub attributes: Vec<AttributeDesc>,
    /// Immediate base type, `None` at the root of the hierarchy.
    #[serde(default)]
    pub base_type: Option<TypeRef>,
    /// Metadata name, including any arity suffix.
    pub name: String,
    /// Containing namespace.
    pub namespace: String,
}

/// A field member.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDesc {
    /// Custom attributes on the field.
    #[serde(default)]
    pub attributes: Vec<AttributeDesc>,
    /// Declaring type when the field is inherited.
    #[serde(default)]
    pub declared_by: Option<TypeRef>,
    /// Modifier flags.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Field visibility.
    pub visibility: Visibility,
}

/// Which declaration a generic parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericOwner {
    /// Declared on a generic method.
    Method,
    /// Declared on a generic type.
    Type,
}

/// A generic parameter declaration on a type or method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenericParamDesc {
    /// Constraints in declaration order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Parameter name, e.g. `T`.
    pub name: String,
}

/// A constructor, method, or delegate invoke signature.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDesc {
    /// Custom attributes on the method.
    #[serde(default)]
    pub attributes: Vec<AttributeDesc>,
    /// Declaring type when the method is inherited.
    #[serde(default)]
    pub declared_by: Option<TypeRef>,
    /// Method-level generic parameters.
    #[serde(default)]
    pub generic_params: Vec<GenericParamDesc>,
    /// Modifier flags.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Method name; ignored for constructors.
    #[serde(default)]
    pub name: String,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParamDesc>,
    /// Return type, `None` for `void`.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    /// Method visibility.
    pub visibility: Visibility,
}

/// Modifier flags shared by types and members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// `abstract`.
    Abstract,
    /// First parameter is the extension receiver (`this`).
    Extension,
    /// `readonly` field.
    Readonly,
    /// `sealed`.
    Sealed,
    /// Compiler-special member (accessor, operator, backing field).
    SpecialName,
    /// `static`.
    Static,
    /// `virtual`.
    Virtual,
}

/// Whether `modifiers` contains `wanted`.
pub fn has_modifier(modifiers: &[Modifier], wanted: Modifier) -> bool {
    return modifiers.contains(&wanted);
}

/// A formal parameter of a method, constructor, indexer, or delegate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParamDesc {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A property or indexer.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDesc {
    /// Custom attributes on the property.
    #[serde(default)]
    pub attributes: Vec<AttributeDesc>,
    /// Declaring type when the property is inherited.
    #[serde(default)]
    pub declared_by: Option<TypeRef>,
    /// Visibility of the getter, `None` when there is no getter.
    #[serde(default)]
    pub getter: Option<Visibility>,
    /// Modifier flags.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Property name; `Item` for indexers.
    pub name: String,
    /// Index parameters; empty for ordinary properties.
    #[serde(default)]
    pub parameters: Vec<ParamDesc>,
    /// Visibility of the setter, `None` when there is no setter.
    #[serde(default)]
    pub setter: Option<Visibility>,
    /// Property type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl PropertyDesc {
    /// The most visible accessor decides the property's own visibility.
    pub fn visibility(&self) -> Visibility {
        return match (self.getter, self.setter) {
            (Some(get), Some(set)) => get.max(set),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => Visibility::Private,
        };
    }
}

/// The closed set of symbol kinds. Consumers pattern-match on this rather
/// than inspecting descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Reference type.
    Class,
    /// Instance or static constructor.
    Constructor,
    /// Delegate type.
    Delegate,
    /// Enumeration type.
    Enum,
    /// Named constant of an enum.
    EnumField,
    /// Event member.
    Event,
    /// Field member.
    Field,
    /// Generic parameter of a type or method.
    GenericParameter,
    /// Interface type.
    Interface,
    /// Ordinary method.
    Method,
    /// Namespace.
    Namespace,
    /// Property or indexer.
    Property,
    /// Value type.
    Struct,
}

impl SymbolKind {
    /// Documentation-comment ID prefix for this kind family.
    pub const fn id_prefix(self) -> &'static str {
        return match self {
            SymbolKind::Class
            | SymbolKind::Delegate
            | SymbolKind::Enum
            | SymbolKind::Interface
            | SymbolKind::Struct => "T",
            SymbolKind::Constructor | SymbolKind::Method => "M",
            SymbolKind::EnumField | SymbolKind::Field => "F",
            SymbolKind::Event => "E",
            SymbolKind::GenericParameter => "!",
            SymbolKind::Namespace => "N",
            SymbolKind::Property => "P",
        };
    }

    /// Human-readable label used in page titles.
    pub const fn label(self) -> &'static str {
        return match self {
            SymbolKind::Class => "Class",
            SymbolKind::Constructor => "Constructor",
            SymbolKind::Delegate => "Delegate",
            SymbolKind::Enum => "Enum",
            SymbolKind::EnumField => "Enum Value",
            SymbolKind::Event => "Event",
            SymbolKind::Field => "Field",
            SymbolKind::GenericParameter => "Type Parameter",
            SymbolKind::Interface => "Interface",
            SymbolKind::Method => "Method",
            SymbolKind::Namespace => "Namespace",
            SymbolKind::Property => "Property",
            SymbolKind::Struct => "Struct",
        };
    }

    /// Whether this kind is a type that gets its own page.
    pub const fn is_type(self) -> bool {
        return matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Delegate
                | SymbolKind::Enum
                | SymbolKind::Interface
                | SymbolKind::Struct
        );
    }
}

/// A type declared by a documented assembly.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDesc {
    /// Custom attributes on the type.
    #[serde(default)]
    pub attributes: Vec<AttributeDesc>,
    /// Immediate base type, `None` for interfaces and the hierarchy root.
    #[serde(default)]
    pub base_type: Option<TypeRef>,
    /// Constructors.
    #[serde(default)]
    pub constructors: Vec<MethodDesc>,
    /// Path of the enclosing type within the namespace, for nested types.
    #[serde(default)]
    pub declaring_type: Option<String>,
    /// Enum constants; only meaningful for enums.
    #[serde(default)]
    pub enum_values: Vec<EnumValueDesc>,
    /// Events.
    #[serde(default)]
    pub events: Vec<EventDesc>,
    /// Fields.
    #[serde(default)]
    pub fields: Vec<FieldDesc>,
    /// Type-level generic parameters in declaration order.
    #[serde(default)]
    pub generic_params: Vec<GenericParamDesc>,
    /// Implemented interfaces.
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    /// Invoke signature; only meaningful for delegates.
    #[serde(default)]
    pub invoke: Option<MethodDesc>,
    /// Kind of type; must be one of the type kinds.
    pub kind: SymbolKind,
    /// Methods.
    #[serde(default)]
    pub methods: Vec<MethodDesc>,
    /// Modifier flags.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Metadata name, verbatim; generic types may carry an arity suffix.
    pub name: String,
    /// Containing namespace; empty for the global namespace.
    #[serde(default)]
    pub namespace: String,
    /// Properties and indexers.
    #[serde(default)]
    pub properties: Vec<PropertyDesc>,
    /// Declared visibility.
    pub visibility: Visibility,
}

impl TypeDesc {
    /// Path of the type within its namespace: `Outer.Inner` for nested types.
    pub fn path(&self) -> String {
        return match &self.declaring_type {
            None => self.name.clone(),
            Some(outer) => format!("{outer}.{}", self.name),
        };
    }

    /// Open reference to this type: its own generic parameters as arguments.
    pub fn as_type_ref(&self) -> TypeRef {
        let args = self
            .generic_params
            .iter()
            .enumerate()
            .map(|(position, p)| return TypeRef::type_param(&p.name, position))
            .collect();
        return TypeRef::Named {
            args,
            name: self.path(),
            namespace: self.namespace.clone(),
        };
    }
}

/// Structured reference to a type as it appears in a signature.
///
/// Generic parameters carry their owner and position so canonical IDs never
/// depend on textual substitution of parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// Single- or multi-dimensional array.
    Array {
        /// Element type.
        element: Box<TypeRef>,
        /// Number of dimensions.
        #[serde(default = "single_rank")]
        rank: u32,
    },
    /// Parameter passed by reference (`ref`, `out`, `in`).
    ByRef {
        /// Referenced type.
        element: Box<TypeRef>,
    },
    /// Unbound generic parameter.
    GenericParam {
        /// Parameter name as declared.
        name: String,
        /// Declaration the parameter belongs to.
        owner: GenericOwner,
        /// Zero-based declaration index on its owner.
        position: usize,
    },
    /// Named type, optionally instantiated with type arguments.
    Named {
        /// Type arguments; empty for non-generic or open references.
        #[serde(default)]
        args: Vec<TypeRef>,
        /// Metadata path within the namespace, e.g. `List`1` or `Outer.Inner`.
        name: String,
        /// Containing namespace.
        #[serde(default)]
        namespace: String,
    },
    /// Unmanaged pointer.
    Pointer {
        /// Pointee type.
        element: Box<TypeRef>,
    },
}

/// Default array rank for deserialization.
const fn single_rank() -> u32 {
    return 1;
}

impl TypeRef {
    /// Non-generic named type.
    pub fn named(namespace: &str, name: &str) -> Self {
        return TypeRef::Named {
            args: Vec::new(),
            name: name.to_string(),
            namespace: namespace.to_string(),
        };
    }

    /// Instantiated generic type.
    #[cfg(test)]
    pub fn generic(namespace: &str, name: &str, args: Vec<TypeRef>) -> Self {
        return TypeRef::Named {
            args,
            name: name.to_string(),
            namespace: namespace.to_string(),
        };
    }

    /// Type-level generic parameter at `position`.
    pub fn type_param(name: &str, position: usize) -> Self {
        return TypeRef::GenericParam {
            name: name.to_string(),
            owner: GenericOwner::Type,
            position,
        };
    }

    /// Method-level generic parameter at `position`.
    #[cfg(test)]
    pub fn method_param(name: &str, position: usize) -> Self {
        return TypeRef::GenericParam {
            name: name.to_string(),
            owner: GenericOwner::Method,
            position,
        };
    }

    /// Single-dimensional array of `element`.
    #[cfg(test)]
    pub fn array(element: TypeRef) -> Self {
        return TypeRef::Array { element: Box::new(element), rank: 1 };
    }

    /// Namespace and metadata path of the named type at the core of this
    /// reference, looking through arrays, pointers and by-ref wrappers.
    pub fn named_core(&self) -> Option<(&str, &str)> {
        return match self {
            TypeRef::Array { element, .. }
            | TypeRef::ByRef { element }
            | TypeRef::Pointer { element } => element.named_core(),
            TypeRef::GenericParam { .. } => None,
            TypeRef::Named { name, namespace, .. } => Some((namespace.as_str(), name.as_str())),
        };
    }
}

/// Declared accessibility, ordered from least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `private`.
    Private,
    /// `private protected`.
    PrivateProtected,
    /// `internal`.
    Internal,
    /// `protected`.
    Protected,
    /// `protected internal`.
    ProtectedInternal,
    /// `public`.
    Public,
}

impl Visibility {
    /// Whether code outside the assembly can see a member with this visibility.
    pub const fn is_documented(self) -> bool {
        return matches!(
            self,
            Visibility::Protected | Visibility::ProtectedInternal | Visibility::Public
        );
    }

    /// Source keyword for signatures.
    pub const fn keyword(self) -> &'static str {
        return match self {
            Visibility::Internal => "internal",
            Visibility::Private => "private",
            Visibility::PrivateProtected => "private protected",
            Visibility::Protected => "protected",
            Visibility::ProtectedInternal => "protected internal",
            Visibility::Public => "public",
        };
    }
}

/// Documentation-comment identifier, e.g. `M:Demo.Box.#ctor(`0)`.
/// Newtype prevents mixing with page keys and display names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalId(
    /// The identifier text.
    pub String,
);

impl CanonicalId {
    /// Borrow the identifier text.
    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// Normalized, slash-separated virtual path of one output document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageAddress(
    /// The path text, always `/`-separated.
    pub String,
);

impl PageAddress {
    /// Borrow the path text.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// Last path segment, e.g. `Demo.Box.md`.
    pub fn file_name(&self) -> &str {
        return self.0.rsplit('/').next().unwrap_or(&self.0);
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_type_refs() {
        let json = r#"{
            "kind": "named",
            "namespace": "System.Collections.Generic",
            "name": "List`1",
            "args": [{ "kind": "generic_param", "name": "T", "owner": "type", "position": 0 }]
        }"#;
        let parsed: TypeRef = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            TypeRef::generic("System.Collections.Generic", "List`1", vec![TypeRef::type_param("T", 0)])
        );
    }

    #[test]
    fn array_rank_defaults_to_one() {
        let json = r#"{ "kind": "array", "element": { "kind": "named", "namespace": "System", "name": "Int32" } }"#;
        let parsed: TypeRef = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, TypeRef::array(TypeRef::named("System", "Int32")));
    }

    #[test]
    fn property_visibility_is_most_visible_accessor() {
        let json = r#"{ "name": "Count", "type": { "kind": "named", "namespace": "System", "name": "Int32" },
                        "getter": "public", "setter": "private" }"#;
        let property: PropertyDesc = serde_json::from_str(json).unwrap();
        assert_eq!(property.visibility(), Visibility::Public);
    }

    #[test]
    fn nested_type_path_includes_outer() {
        let json = r#"{ "namespace": "Demo", "name": "Inner", "declaring_type": "Outer",
                        "kind": "class", "visibility": "public" }"#;
        let ty: TypeDesc = serde_json::from_str(json).unwrap();
        assert_eq!(ty.path(), "Outer.Inner");
    }

    #[test]
    fn page_address_file_name() {
        let address = PageAddress("out/Root/Ns.A.md".to_string());
        assert_eq!(address.file_name(), "Ns.A.md");
    }
}
