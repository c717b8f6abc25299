//! Semantic types (§3): computed by the binder and type solver, distinct from
//! [`ion_parser::ast::ty::TypeRef`], the syntactic form a type takes in source text.

use std::fmt;

use rustc_hash::FxHashMap;

use ion_parser::ast::expr::PrimitiveValue;
use ion_parser::ast::ty::{PrimitiveTypeKind, TypeRef};

/// A computed type. `is_same` (not `PartialEq`) is the equality relation the solver
/// actually uses, since object/interface comparison is asymmetric and nominal.
#[derive(Debug, Clone)]
pub enum Type {
    Primitive(PrimitiveTypeKind),
    /// The precise singleton type of a literal, distinct from its widened primitive
    /// parent (`"hi"` is never `is_same` to `string`; widening is explicit).
    Literal(PrimitiveValue),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Nullable(Box<Type>),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Function { type_parameters: Vec<String>, parameters: Vec<Type>, return_type: Box<Type> },
    Object(FxHashMap<String, Type>),
    Interface { name: String, members: FxHashMap<String, Type> },
    /// An unresolved named reference, e.g. a type-parameter-qualified `Box<T>`.
    TypeName { name: String, type_arguments: Vec<Type> },
    TypeParameter(String),
}

impl Type {
    pub fn number() -> Type {
        Type::Primitive(PrimitiveTypeKind::Number)
    }
    pub fn string() -> Type {
        Type::Primitive(PrimitiveTypeKind::String)
    }
    pub fn bool_() -> Type {
        Type::Primitive(PrimitiveTypeKind::Bool)
    }
    pub fn void() -> Type {
        Type::Primitive(PrimitiveTypeKind::Void)
    }

    /// The primitive parent a literal widens to when it loses constness
    /// (`let x = "hi"` → `x: string`).
    pub fn widen(&self) -> Type {
        match self {
            Type::Literal(PrimitiveValue::Number(_)) => Type::number(),
            Type::Literal(PrimitiveValue::String(_)) => Type::string(),
            Type::Literal(PrimitiveValue::Bool(_)) => Type::bool_(),
            Type::Literal(PrimitiveValue::Null) => Type::void(),
            other => other.clone(),
        }
    }

    /// Lowers a syntactic `TypeRef` (as written in source) to its semantic `Type`.
    /// Named references are left unresolved (`TypeName`); nothing here looks up
    /// declarations — that is the binder's job.
    pub fn from_type_ref(type_ref: &TypeRef) -> Type {
        match type_ref {
            TypeRef::PrimitiveTypeRef(n) => Type::Primitive(n.kind),
            TypeRef::LiteralTypeRef(n) => Type::Literal(n.value.clone()),
            TypeRef::TypeNameRef(n) => Type::TypeName {
                name: n.name.clone(),
                type_arguments: n.type_arguments.iter().map(Type::from_type_ref).collect(),
            },
            TypeRef::NullableTypeRef(n) => Type::Nullable(Box::new(Type::from_type_ref(&n.inner))),
            TypeRef::ArrayTypeRef(n) => Type::Array(Box::new(Type::from_type_ref(&n.element))),
            TypeRef::TupleTypeRef(n) => Type::Tuple(n.elements.iter().map(Type::from_type_ref).collect()),
            TypeRef::FunctionTypeRef(n) => Type::Function {
                type_parameters: Vec::new(),
                parameters: n.parameters.iter().map(Type::from_type_ref).collect(),
                return_type: Box::new(Type::from_type_ref(&n.return_type)),
            },
            TypeRef::UnionTypeRef(n) => Type::Union(n.members.iter().map(Type::from_type_ref).collect()),
            TypeRef::IntersectionTypeRef(n) => Type::Intersection(n.members.iter().map(Type::from_type_ref).collect()),
            TypeRef::TypeParameterRef(n) => Type::TypeParameter(n.name.clone()),
        }
    }

    /// Structural equality for every form except `Interface`/`TypeName`, which compare
    /// nominally (name must match; type arguments compared pointwise).
    pub fn is_same(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Literal(a), Type::Literal(b)) => literal_eq(a, b),
            (Type::Array(a), Type::Array(b)) => a.is_same(b),
            (Type::Tuple(a), Type::Tuple(b)) => same_sequence(a, b),
            (Type::Nullable(a), Type::Nullable(b)) => a.is_same(b),
            (Type::Union(a), Type::Union(b)) => same_set(a, b),
            (Type::Intersection(a), Type::Intersection(b)) => same_set(a, b),
            (
                Type::Function { type_parameters: tpa, parameters: pa, return_type: ra },
                Type::Function { type_parameters: tpb, parameters: pb, return_type: rb },
            ) => tpa == tpb && same_sequence(pa, pb) && ra.is_same(rb),
            (Type::Object(a), Type::Object(b)) => {
                a.iter().all(|(key, value)| b.get(key).is_some_and(|other_value| value.is_same(other_value)))
            }
            (Type::Interface { name: a, .. }, Type::Interface { name: b, .. }) => a == b,
            (Type::TypeName { name: na, type_arguments: ta }, Type::TypeName { name: nb, type_arguments: tb }) => {
                na == nb && same_sequence(ta, tb)
            }
            (Type::TypeParameter(a), Type::TypeParameter(b)) => a == b,
            _ => false,
        }
    }
}

fn literal_eq(a: &PrimitiveValue, b: &PrimitiveValue) -> bool {
    match (a, b) {
        (PrimitiveValue::Number(a), PrimitiveValue::Number(b)) => a == b,
        (PrimitiveValue::String(a), PrimitiveValue::String(b)) => a == b,
        (PrimitiveValue::Bool(a), PrimitiveValue::Bool(b)) => a == b,
        (PrimitiveValue::Null, PrimitiveValue::Null) => true,
        _ => false,
    }
}

fn same_sequence(a: &[Type], b: &[Type]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_same(y))
}

fn same_set(a: &[Type], b: &[Type]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.is_same(y)))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(PrimitiveTypeKind::Number) => write!(f, "number"),
            Type::Primitive(PrimitiveTypeKind::String) => write!(f, "string"),
            Type::Primitive(PrimitiveTypeKind::Bool) => write!(f, "bool"),
            Type::Primitive(PrimitiveTypeKind::Void) => write!(f, "void"),
            Type::Literal(PrimitiveValue::Number(n)) => write!(f, "{n}"),
            Type::Literal(PrimitiveValue::String(s)) => write!(f, "{s:?}"),
            Type::Literal(PrimitiveValue::Bool(b)) => write!(f, "{b}"),
            Type::Literal(PrimitiveValue::Null) => write!(f, "null"),
            Type::Array(el) => write!(f, "{el}[]"),
            Type::Tuple(elements) => {
                write!(f, "(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            Type::Nullable(inner) => write!(f, "{inner}?"),
            Type::Union(members) => write_joined(f, members, " | "),
            Type::Intersection(members) => write_joined(f, members, " & "),
            Type::Function { parameters, return_type, .. } => {
                write!(f, "(")?;
                for (i, p) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") --> {return_type}")
            }
            Type::Object(members) => {
                write!(f, "{{ ")?;
                for (i, (key, value)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, " }}")
            }
            Type::Interface { name, .. } => write!(f, "{name}"),
            Type::TypeName { name, type_arguments } => {
                write!(f, "{name}")?;
                if !type_arguments.is_empty() {
                    write!(f, "<")?;
                    write_joined(f, type_arguments, ", ")?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::TypeParameter(name) => write!(f, "{name}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Type], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_is_not_same_as_its_primitive_parent() {
        let lit = Type::Literal(PrimitiveValue::String("hi".into()));
        assert!(!lit.is_same(&Type::string()));
        assert!(lit.is_same(&Type::Literal(PrimitiveValue::String("hi".into()))));
    }

    #[test]
    fn object_is_same_is_asymmetric() {
        let mut small = FxHashMap::default();
        small.insert("x".to_string(), Type::number());
        let mut big = FxHashMap::default();
        big.insert("x".to_string(), Type::number());
        big.insert("y".to_string(), Type::string());
        assert!(Type::Object(small).is_same(&Type::Object(big.clone())));
        assert!(!Type::Object(big).is_same(&Type::Object(FxHashMap::default())));
    }

    #[test]
    fn interface_equality_is_nominal() {
        let a = Type::Interface { name: "Shape".into(), members: FxHashMap::default() };
        let b = Type::Interface { name: "Shape".into(), members: FxHashMap::default() };
        let c = Type::Interface { name: "Other".into(), members: FxHashMap::default() };
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
    }

    #[test]
    fn widen_drops_constness() {
        assert!(Type::Literal(PrimitiveValue::Number(1.0)).widen().is_same(&Type::number()));
        assert!(Type::number().widen().is_same(&Type::number()));
    }
}
