//! Source-like declaration signatures shown in each page's code block.
use crate::canonical::{display_declared, display_type, strip_arity};
use crate::types::{
    AttributeDesc, Constraint, EnumValueDesc, EventDesc, FieldDesc, GenericParamDesc, MethodDesc,
    Modifier, ParamDesc, PropertyDesc, SymbolKind, TypeDesc, TypeRef, has_modifier,
};

/// Base types that are implied by the type's kind and never spelled out.
const IMPLICIT_BASES: &[(&str, &str)] = &[
    ("System", "Enum"),
    ("System", "MulticastDelegate"),
    ("System", "Object"),
    ("System", "ValueType"),
];

/// `public sealed class Box<T> : Base, IThing` plus attributes and constraints.
pub fn type_signature(ty: &TypeDesc) -> String {
    let mut out = attributes(&ty.attributes);
    out.push_str(ty.visibility.keyword());
    out.push(' ');
    if ty.kind == SymbolKind::Class {
        out.push_str(class_modifier(&ty.modifiers));
    }
    out.push_str(kind_keyword(ty.kind));
    out.push(' ');
    out.push_str(&display_declared(ty));

    let mut supertypes: Vec<String> = Vec::new();
    if let Some(base) = ty.base_type.as_ref().filter(|b| return !is_implicit_base(b)) {
        supertypes.push(display_type(base));
    }
    if ty.kind != SymbolKind::Enum {
        supertypes.extend(ty.interfaces.iter().map(display_type));
    }
    if !supertypes.is_empty() {
        out.push_str(" : ");
        out.push_str(&supertypes.join(", "));
    }
    out.push_str(&where_clauses(&ty.generic_params));
    return out;
}

/// `public delegate TResult Map<T, TResult>(T item)`.
pub fn delegate_signature(ty: &TypeDesc) -> String {
    let mut out = attributes(&ty.attributes);
    let (parameters, return_type) = match &ty.invoke {
        Some(invoke) => (invoke.parameters.as_slice(), invoke.return_type.as_ref()),
        None => (&[][..], None),
    };
    out.push_str(&format!(
        "{} delegate {} {}{}",
        ty.visibility.keyword(),
        return_text(return_type),
        display_declared(ty),
        parameter_list(parameters, false)
    ));
    out.push_str(&where_clauses(&ty.generic_params));
    return out;
}

/// `public Box(T value)`.
pub fn constructor_signature(ty: &TypeDesc, ctor: &MethodDesc) -> String {
    let mut out = attributes(&ctor.attributes);
    out.push_str(ctor.visibility.keyword());
    out.push(' ');
    if has_modifier(&ctor.modifiers, Modifier::Static) {
        out.push_str("static ");
    }
    out.push_str(&strip_arity(&ty.name));
    out.push_str(&parameter_list(&ctor.parameters, false));
    return out;
}

/// `public static virtual int Sum(this int[] values)` plus constraints.
pub fn method_signature(method: &MethodDesc) -> String {
    let mut out = attributes(&method.attributes);
    out.push_str(method.visibility.keyword());
    out.push(' ');
    out.push_str(member_modifiers(&method.modifiers));
    out.push_str(&return_text(method.return_type.as_ref()));
    out.push(' ');
    out.push_str(&method_display(method));
    out.push_str(&parameter_list(
        &method.parameters,
        has_modifier(&method.modifiers, Modifier::Extension),
    ));
    out.push_str(&where_clauses(&method.generic_params));
    return out;
}

/// `public static readonly int Limit`.
pub fn field_signature(field: &FieldDesc) -> String {
    let mut out = attributes(&field.attributes);
    out.push_str(field.visibility.keyword());
    out.push(' ');
    if has_modifier(&field.modifiers, Modifier::Static) {
        out.push_str("static ");
    }
    if has_modifier(&field.modifiers, Modifier::Readonly) {
        out.push_str("readonly ");
    }
    out.push_str(&format!("{} {}", display_type(&field.ty), field.name));
    return out;
}

/// `public int Count { get; protected set; }`, or `this[int index]` for indexers.
pub fn property_signature(property: &PropertyDesc) -> String {
    let visibility = property.visibility();
    let mut out = attributes(&property.attributes);
    out.push_str(visibility.keyword());
    out.push(' ');
    out.push_str(member_modifiers(&property.modifiers));
    out.push_str(&display_type(&property.ty));
    out.push(' ');
    if property.parameters.is_empty() {
        out.push_str(&property.name);
    } else {
        let params: Vec<String> = property.parameters.iter().map(parameter).collect();
        out.push_str(&format!("this[{}]", params.join(", ")));
    }

    let mut accessors = Vec::new();
    for (word, access) in [("get", property.getter), ("set", property.setter)] {
        match access {
            Some(v) if v == visibility => accessors.push(format!("{word};")),
            Some(v) if v.is_documented() => accessors.push(format!("{} {word};", v.keyword())),
            Some(_) | None => {},
        }
    }
    out.push_str(&format!(" {{ {} }}", accessors.join(" ")));
    return out;
}

/// `public event EventHandler Changed`.
pub fn event_signature(event: &EventDesc) -> String {
    let mut out = attributes(&event.attributes);
    out.push_str(event.visibility.keyword());
    out.push(' ');
    out.push_str(member_modifiers(&event.modifiers));
    out.push_str(&format!("event {} {}", display_type(&event.handler), event.name));
    return out;
}

/// `Red = 1`.
pub fn enum_value_signature(value: &EnumValueDesc) -> String {
    return format!("{} = {}", value.name, value.value);
}

/// Method name with its own generic parameters: `Map<U>`.
pub fn method_display(method: &MethodDesc) -> String {
    if method.generic_params.is_empty() {
        return method.name.clone();
    }
    let names: Vec<&str> = method.generic_params.iter().map(|g| return g.name.as_str()).collect();
    return format!("{}<{}>", method.name, names.join(", "));
}

/// Constraint text as written after `where T :`.
pub fn constraint_text(constraint: &Constraint) -> String {
    return match constraint {
        Constraint::Keyword(word) => word.clone(),
        Constraint::Type(ty) => display_type(ty),
    };
}

/// Attribute lines, one `[Name(args)]` per line.
fn attributes(attrs: &[AttributeDesc]) -> String {
    let mut out = String::new();
    for attr in attrs {
        let name = attr.name.strip_suffix("Attribute").unwrap_or(&attr.name);
        if attr.args.is_empty() {
            out.push_str(&format!("[{name}]\n"));
        } else {
            out.push_str(&format!("[{name}({})]\n", attr.args.join(", ")));
        }
    }
    return out;
}

/// `static `, `abstract ` or `sealed ` for classes.
fn class_modifier(modifiers: &[Modifier]) -> &'static str {
    if has_modifier(modifiers, Modifier::Static) {
        return "static ";
    }
    if has_modifier(modifiers, Modifier::Abstract) {
        return "abstract ";
    }
    if has_modifier(modifiers, Modifier::Sealed) {
        return "sealed ";
    }
    return "";
}

/// `static `, `abstract ` or `virtual ` for members.
fn member_modifiers(modifiers: &[Modifier]) -> &'static str {
    if has_modifier(modifiers, Modifier::Static) {
        return "static ";
    }
    if has_modifier(modifiers, Modifier::Abstract) {
        return "abstract ";
    }
    if has_modifier(modifiers, Modifier::Virtual) {
        return "virtual ";
    }
    return "";
}

/// Source keyword of a type kind.
const fn kind_keyword(kind: SymbolKind) -> &'static str {
    return match kind {
        SymbolKind::Delegate => "delegate",
        SymbolKind::Enum => "enum",
        SymbolKind::Interface => "interface",
        SymbolKind::Struct => "struct",
        _ => "class",
    };
}

/// Whether `base` is implied by the declaration keyword.
fn is_implicit_base(base: &TypeRef) -> bool {
    let Some(core) = base.named_core() else {
        return false;
    };
    return IMPLICIT_BASES.iter().any(|&implicit| return implicit == core);
}

/// `void` or the display name of the return type.
fn return_text(return_type: Option<&TypeRef>) -> String {
    return return_type.map_or_else(|| return "void".to_string(), display_type);
}

/// `(int a, T b)`, with `this ` on the first parameter of extension methods.
fn parameter_list(parameters: &[ParamDesc], extension: bool) -> String {
    let rendered: Vec<String> = parameters
        .iter()
        .enumerate()
        .map(|(index, p)| {
            if extension && index == 0 {
                return format!("this {}", parameter(p));
            }
            return parameter(p);
        })
        .collect();
    return format!("({})", rendered.join(", "));
}

/// `int a`.
fn parameter(param: &ParamDesc) -> String {
    return format!("{} {}", display_type(&param.ty), param.name);
}

/// `\n    where T : class, new()` for each constrained parameter.
fn where_clauses(generic_params: &[GenericParamDesc]) -> String {
    let mut out = String::new();
    for param in generic_params.iter().filter(|p| return !p.constraints.is_empty()) {
        let constraints: Vec<String> = param.constraints.iter().map(constraint_text).collect();
        out.push_str(&format!("\n    where {} : {}", param.name, constraints.join(", ")));
    }
    return out;
}
