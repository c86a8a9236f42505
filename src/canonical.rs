//! Canonical documentation-comment IDs, page keys and display names derived
//! from structured signatures.
//!
//! Generic parameters are rendered from their owner and position, so a
//! parameter named `T` inside a type named `TKey` can never be mangled by
//! textual substitution.
use crate::types::{
    CanonicalId, EnumValueDesc, EventDesc, FieldDesc, GenericOwner, MethodDesc, ParamDesc,
    PropertyDesc, SymbolKind, TypeDesc, TypeRef,
};

/// Member name used for constructors in canonical IDs.
const CTOR_NAME: &str = "#ctor";

/// Primitive type aliases shown in signatures and display names.
const ALIASES: &[(&str, &str)] = &[
    ("Boolean", "bool"),
    ("Byte", "byte"),
    ("Char", "char"),
    ("Decimal", "decimal"),
    ("Double", "double"),
    ("Int16", "short"),
    ("Int32", "int"),
    ("Int64", "long"),
    ("Object", "object"),
    ("SByte", "sbyte"),
    ("Single", "float"),
    ("String", "string"),
    ("UInt16", "ushort"),
    ("UInt32", "uint"),
    ("UInt64", "ulong"),
    ("Void", "void"),
];

// ── Shared helpers ────────────────────────────────────────────────────

/// `namespace.path`, or just `path` in the global namespace.
pub fn qualified(namespace: &str, path: &str) -> String {
    if namespace.is_empty() {
        return path.to_string();
    }
    return format!("{namespace}.{path}");
}

/// Drop generic arity suffixes from every segment: ``Outer`1.Inner`2`` → `Outer.Inner`.
pub fn strip_arity(path: &str) -> String {
    return path
        .split('.')
        .map(|segment| return segment.split('`').next().unwrap_or(segment))
        .collect::<Vec<_>>()
        .join(".");
}

// ── Canonical IDs ─────────────────────────────────────────────────────

/// `N:<Namespace>`.
pub fn namespace_id(namespace: &str) -> CanonicalId {
    return prefixed(SymbolKind::Namespace, namespace);
}

/// `T:<Namespace>.<Outer>.<Name>` with the metadata name verbatim.
pub fn type_id(ty: &TypeDesc) -> CanonicalId {
    return prefixed(ty.kind, &type_part(ty));
}

/// `M:<Type>.#ctor(<params>)`, parens dropped when there are no parameters.
pub fn constructor_id(ty: &TypeDesc, ctor: &MethodDesc) -> CanonicalId {
    return prefixed(
        SymbolKind::Constructor,
        &format!("{}.{CTOR_NAME}{}", type_part(ty), param_list(&ctor.parameters)),
    );
}

/// `M:<Type>.<Name>[``N](<params>)`, where `N` is the method's own generic arity.
pub fn method_id(ty: &TypeDesc, method: &MethodDesc) -> CanonicalId {
    let arity = if method.generic_params.is_empty() {
        String::new()
    } else {
        format!("``{}", method.generic_params.len())
    };
    return prefixed(
        SymbolKind::Method,
        &format!("{}.{}{arity}{}", type_part(ty), member_name(&method.name), param_list(&method.parameters)),
    );
}

/// `F:<Type>.<Name>`.
pub fn field_id(ty: &TypeDesc, field: &FieldDesc) -> CanonicalId {
    return prefixed(SymbolKind::Field, &format!("{}.{}", type_part(ty), member_name(&field.name)));
}

/// `F:<Type>.<Name>` for an enum constant.
pub fn enum_value_id(ty: &TypeDesc, value: &EnumValueDesc) -> CanonicalId {
    return prefixed(SymbolKind::EnumField, &format!("{}.{}", type_part(ty), member_name(&value.name)));
}

/// `P:<Type>.<Name>`, with the parameter list for indexers.
pub fn property_id(ty: &TypeDesc, property: &PropertyDesc) -> CanonicalId {
    return prefixed(
        SymbolKind::Property,
        &format!("{}.{}{}", type_part(ty), member_name(&property.name), param_list(&property.parameters)),
    );
}

/// `E:<Type>.<Name>`.
pub fn event_id(ty: &TypeDesc, event: &EventDesc) -> CanonicalId {
    return prefixed(SymbolKind::Event, &format!("{}.{}", type_part(ty), member_name(&event.name)));
}

/// `<prefix>:<body>` for a symbol of `kind`.
fn prefixed(kind: SymbolKind, body: &str) -> CanonicalId {
    return CanonicalId(format!("{}:{body}", kind.id_prefix()));
}

/// Namespace-qualified metadata path of a declared type.
fn type_part(ty: &TypeDesc) -> String {
    return qualified(&ty.namespace, &ty.path());
}

/// Explicit interface implementations carry dots in their names; the ID
/// scheme spells those as `#`.
fn member_name(name: &str) -> String {
    return name.replace('.', "#");
}

/// `(<a>,<b>)`, or nothing for an empty list.
fn param_list(parameters: &[ParamDesc]) -> String {
    if parameters.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = parameters.iter().map(|p| return canonical_type(&p.ty)).collect();
    return format!("({})", rendered.join(","));
}

/// Canonical form of a type mention inside a parameter list.
pub fn canonical_type(ty: &TypeRef) -> String {
    return match ty {
        TypeRef::Array { element, rank } => {
            let commas = ",".repeat(usize::try_from(*rank).unwrap_or(1).saturating_sub(1));
            format!("{}[{commas}]", canonical_type(element))
        },
        TypeRef::ByRef { element } => format!("{}@", canonical_type(element)),
        TypeRef::GenericParam { owner: GenericOwner::Type, position, .. } => format!("`{position}"),
        TypeRef::GenericParam { owner: GenericOwner::Method, position, .. } => {
            format!("``{position}")
        },
        TypeRef::Named { args, name, namespace } if args.is_empty() => qualified(namespace, name),
        TypeRef::Named { args, name, namespace } => qualified(namespace, &instantiated_path(name, args)),
        TypeRef::Pointer { element } => format!("{}*", canonical_type(element)),
    };
}

/// Metadata path with each segment's arguments placed on that segment:
/// ``Outer`1.Inner`1`` with `[A, B]` → `Outer{A}.Inner{B}`. Arguments left
/// over when the arity suffixes undercount go on the last segment.
fn instantiated_path(name: &str, args: &[TypeRef]) -> String {
    let mut remaining = args;
    let segments: Vec<&str> = name.split('.').collect();
    let last = segments.len().saturating_sub(1);
    let mut out: Vec<String> = Vec::with_capacity(segments.len());
    for (index, segment) in segments.into_iter().enumerate() {
        let (base, arity) = match segment.split_once('`') {
            Some((base, count)) => (base, count.parse::<usize>().unwrap_or(0)),
            None => (segment, 0),
        };
        let take = if index == last { remaining.len() } else { arity.min(remaining.len()) };
        let (own, rest) = remaining.split_at(take);
        remaining = rest;
        if own.is_empty() {
            out.push(base.to_string());
            continue;
        }
        let rendered: Vec<String> = own.iter().map(canonical_type).collect();
        out.push(format!("{base}{{{}}}", rendered.join(",")));
    }
    return out.join(".");
}

// ── Display names ─────────────────────────────────────────────────────

/// Short, human-readable rendering: `List<int>`, `string[]`, `ref T`.
pub fn display_type(ty: &TypeRef) -> String {
    return match ty {
        TypeRef::Array { element, rank } => {
            let commas = ",".repeat(usize::try_from(*rank).unwrap_or(1).saturating_sub(1));
            format!("{}[{commas}]", display_type(element))
        },
        TypeRef::ByRef { element } => format!("ref {}", display_type(element)),
        TypeRef::GenericParam { name, .. } => name.clone(),
        TypeRef::Named { args, name, namespace } => {
            let head = display_head(namespace, name);
            if args.is_empty() {
                return head;
            }
            let rendered: Vec<String> = args.iter().map(display_type).collect();
            format!("{head}<{}>", rendered.join(", "))
        },
        TypeRef::Pointer { element } => format!("{}*", display_type(element)),
    };
}

/// Display name of a named type without its arguments: a primitive alias
/// or the arity-free metadata path.
pub fn display_head(namespace: &str, name: &str) -> String {
    if namespace == "System"
        && let Some((_, alias)) = ALIASES.iter().find(|(full, _)| return *full == name)
    {
        return (*alias).to_string();
    }
    return strip_arity(name);
}

/// Display name of a declared type with its own generic parameters: `Box<T>`.
pub fn display_declared(ty: &TypeDesc) -> String {
    return display_type(&ty.as_type_ref());
}

// ── Page keys ─────────────────────────────────────────────────────────

/// Page key of an assembly: `<Assembly>.assembly`.
pub fn assembly_key(name: &str) -> String {
    return format!("{name}.assembly");
}

/// Page key of a namespace: `<Namespace>.namespace`, `global.namespace`
/// for types outside any namespace.
pub fn namespace_key(namespace: &str) -> String {
    if namespace.is_empty() {
        return "global.namespace".to_string();
    }
    return format!("{namespace}.namespace");
}

/// Pre-normalization page key of a type: `<Namespace>.<Outer>.<Name>`.
pub fn type_key(namespace: &str, path: &str) -> String {
    return qualified(namespace, path);
}

/// Page key of a constructor: `<TypeKey>.ctor[(<params>)]`.
pub fn constructor_key(ty: &TypeDesc, ctor: &MethodDesc) -> String {
    return format!("{}.ctor{}", type_part(ty), key_params(&ctor.parameters));
}

/// Page key of a method: `<TypeKey>.<Name>[<T, U>][(<params>)]`.
pub fn method_key(ty: &TypeDesc, method: &MethodDesc) -> String {
    let generics = if method.generic_params.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = method.generic_params.iter().map(|g| return g.name.as_str()).collect();
        format!("<{}>", names.join(", "))
    };
    return format!(
        "{}.{}{generics}{}",
        type_part(ty),
        method.name,
        key_params(&method.parameters)
    );
}

/// Page key of a field, property, event or enum value: `<TypeKey>.<Name>`,
/// plus the parameter list for indexers.
pub fn member_key(ty: &TypeDesc, name: &str, parameters: &[ParamDesc]) -> String {
    return format!("{}.{name}{}", type_part(ty), key_params(parameters));
}

/// `(<type>, <type>)`, or nothing for an empty list.
fn key_params(parameters: &[ParamDesc]) -> String {
    if parameters.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = parameters.iter().map(|p| return key_type(&p.ty)).collect();
    return format!("({})", rendered.join(", "));
}

/// Key-side rendering of a parameter type. Named types keep their namespace
/// and metadata name, so the arity survives normalization as `Tuple.2`.
/// Arrays, pointers and by-ref wrappers become word suffixes.
fn key_type(ty: &TypeRef) -> String {
    return match ty {
        TypeRef::Array { element, rank } if *rank > 1 => format!("{}Array{rank}", key_type(element)),
        TypeRef::Array { element, .. } => format!("{}Array", key_type(element)),
        TypeRef::ByRef { element } => format!("{}Ref", key_type(element)),
        TypeRef::GenericParam { name, .. } => name.clone(),
        TypeRef::Named { args, name, namespace } => {
            let head = qualified(namespace, name);
            if args.is_empty() {
                return head;
            }
            let rendered: Vec<String> = args.iter().map(key_type).collect();
            format!("{head}<{}>", rendered.join(", "))
        },
        TypeRef::Pointer { element } => format!("{}Ptr", key_type(element)),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GenericParamDesc, Visibility};

    fn class(namespace: &str, name: &str, generics: &[&str]) -> TypeDesc {
        let json = serde_json::json!({
            "namespace": namespace,
            "name": name,
            "kind": "class",
            "visibility": "public",
        });
        let mut ty: TypeDesc = serde_json::from_value(json).unwrap();
        ty.generic_params = generics
            .iter()
            .map(|g| GenericParamDesc { constraints: Vec::new(), name: (*g).to_string() })
            .collect();
        ty
    }

    fn method(name: &str, generics: &[&str], params: Vec<TypeRef>) -> MethodDesc {
        MethodDesc {
            attributes: Vec::new(),
            declared_by: None,
            generic_params: generics
                .iter()
                .map(|g| GenericParamDesc { constraints: Vec::new(), name: (*g).to_string() })
                .collect(),
            modifiers: Vec::new(),
            name: name.to_string(),
            parameters: params
                .into_iter()
                .enumerate()
                .map(|(i, ty)| ParamDesc { name: format!("p{i}"), ty })
                .collect(),
            return_type: None,
            visibility: Visibility::Public,
        }
    }

    fn int() -> TypeRef {
        TypeRef::named("System", "Int32")
    }

    #[test]
    fn parameterless_constructor_drops_parens() {
        let ty = class("Demo", "Box", &[]);
        assert_eq!(constructor_id(&ty, &method("", &[], vec![])).as_str(), "M:Demo.Box.#ctor");
    }

    #[test]
    fn type_generic_parameter_becomes_single_backtick() {
        let ty = class("Demo", "Box", &["T"]);
        let ctor = method("", &[], vec![TypeRef::type_param("T", 0)]);
        assert_eq!(constructor_id(&ty, &ctor).as_str(), "M:Demo.Box.#ctor(`0)");
    }

    #[test]
    fn method_generic_parameter_becomes_double_backtick() {
        let ty = class("Demo", "Box`1", &["T"]);
        let m = method("Map", &["TResult"], vec![
            TypeRef::type_param("T", 0),
            TypeRef::method_param("TResult", 0),
        ]);
        assert_eq!(method_id(&ty, &m).as_str(), "M:Demo.Box`1.Map``1(`0,``0)");
    }

    #[test]
    fn substring_parameter_names_do_not_corrupt() {
        // `T` is a substring of `TKey`; structured substitution keeps them apart.
        let ty = class("Demo", "Map`2", &["TKey", "T"]);
        let m = method("Put", &[], vec![TypeRef::type_param("TKey", 0), TypeRef::type_param("T", 1)]);
        assert_eq!(method_id(&ty, &m).as_str(), "M:Demo.Map`2.Put(`0,`1)");
    }

    #[test]
    fn generic_arguments_use_braces_without_spaces() {
        let ty = class("Demo", "Store", &[]);
        let dict = TypeRef::generic("System.Collections.Generic", "Dictionary`2", vec![
            TypeRef::named("System", "String"),
            TypeRef::array(int()),
        ]);
        let m = method("Load", &[], vec![dict]);
        assert_eq!(
            method_id(&ty, &m).as_str(),
            "M:Demo.Store.Load(System.Collections.Generic.Dictionary{System.String,System.Int32[]})"
        );
    }

    #[test]
    fn array_pointer_byref_suffixes() {
        let multi = TypeRef::Array { element: Box::new(int()), rank: 2 };
        assert_eq!(canonical_type(&multi), "System.Int32[,]");
        assert_eq!(canonical_type(&TypeRef::Pointer { element: Box::new(int()) }), "System.Int32*");
        assert_eq!(canonical_type(&TypeRef::ByRef { element: Box::new(int()) }), "System.Int32@");
    }

    #[test]
    fn overloads_get_distinct_ids_and_keys() {
        let ty = class("Demo", "Calc", &[]);
        let scalar = method("Sum", &[], vec![int()]);
        let array = method("Sum", &[], vec![TypeRef::array(int())]);
        assert_ne!(method_id(&ty, &scalar), method_id(&ty, &array));
        assert_eq!(method_key(&ty, &scalar), "Demo.Calc.Sum(System.Int32)");
        assert_eq!(method_key(&ty, &array), "Demo.Calc.Sum(System.Int32Array)");
    }

    #[test]
    fn identical_signatures_share_an_id() {
        let ty = class("Demo", "Calc", &[]);
        let a = method("Sum", &[], vec![int(), int()]);
        let b = method("Sum", &[], vec![int(), int()]);
        assert_eq!(method_id(&ty, &a), method_id(&ty, &b));
    }

    #[test]
    fn explicit_interface_member_uses_hash() {
        let ty = class("Demo", "Bag", &[]);
        let m = method("System.IDisposable.Dispose", &[], vec![]);
        assert_eq!(method_id(&ty, &m).as_str(), "M:Demo.Bag.System#IDisposable#Dispose");
    }

    #[test]
    fn global_namespace_has_no_leading_dot() {
        let ty = class("", "Loose", &[]);
        assert_eq!(type_id(&ty).as_str(), "T:Loose");
    }

    #[test]
    fn display_uses_aliases_and_angle_brackets() {
        let list = TypeRef::generic("System.Collections.Generic", "List`1", vec![int()]);
        assert_eq!(display_type(&list), "List<int>");
        assert_eq!(display_declared(&class("Demo", "Box`1", &["T"])), "Box<T>");
    }

    #[test]
    fn container_keys() {
        assert_eq!(assembly_key("Demo"), "Demo.assembly");
        assert_eq!(namespace_key("Demo.Models"), "Demo.Models.namespace");
        assert_eq!(namespace_key(""), "global.namespace");
    }

    #[test]
    fn generic_method_key_lists_parameters() {
        let ty = class("Demo", "Box", &["T"]);
        let m = method("Map", &["U"], vec![TypeRef::method_param("U", 0)]);
        assert_eq!(method_key(&ty, &m), "Demo.Box.Map<U>(U)");
    }

    #[test]
    fn nested_generic_arguments_sit_on_their_segment() {
        let inner = TypeRef::generic("Demo", "Outer`1.Inner", vec![TypeRef::type_param("T", 0)]);
        assert_eq!(canonical_type(&inner), "Demo.Outer{`0}.Inner");
        let both = TypeRef::generic("Demo", "Outer`1.Inner`1", vec![int(), TypeRef::method_param("U", 0)]);
        assert_eq!(canonical_type(&both), "Demo.Outer{System.Int32}.Inner{``0}");
    }

    #[test]
    fn same_short_name_in_different_namespaces_gets_distinct_keys() {
        let ty = class("Demo", "Calc", &[]);
        let a = method("F", &[], vec![TypeRef::named("Demo.A", "Foo")]);
        let b = method("F", &[], vec![TypeRef::named("Demo.B", "Foo")]);
        let mut pages = crate::pages::PageAddresses::new("out", "Demo");
        assert_ne!(pages.resolve(&method_key(&ty, &a)), pages.resolve(&method_key(&ty, &b)));
    }

    #[test]
    fn generic_grouping_survives_normalization() {
        let ty = class("Demo", "Calc", &[]);
        let string = TypeRef::named("System", "String");
        let split = method("F", &[], vec![
            TypeRef::generic("System", "Tuple`1", vec![int()]),
            string.clone(),
        ]);
        let joined = method("F", &[], vec![TypeRef::generic("System", "Tuple`2", vec![int(), string])]);
        let mut pages = crate::pages::PageAddresses::new("out", "Demo");
        let split_page = pages.resolve(&method_key(&ty, &split));
        let joined_page = pages.resolve(&method_key(&ty, &joined));
        assert_eq!(split_page.as_str(), "out/Demo/Demo.Calc.F.System.Tuple.1.System.Int32.System.String.md");
        assert_eq!(joined_page.as_str(), "out/Demo/Demo.Calc.F.System.Tuple.2.System.Int32.System.String.md");
    }
}
