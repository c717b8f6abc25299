//! Intrinsic names pre-declared before resolution begins (§4.4).
//!
//! Currently just `print`, typed `(string) -> void`. The resolver consults
//! [`INTRINSIC_NAMES`] to seed the global scope; the binder/solver consult
//! [`intrinsic_type`] to give call sites a real `Type::Function` instead of leaving
//! them unresolved.

use crate::ty::Type;

pub const INTRINSIC_NAMES: &[&str] = &["print"];

pub fn intrinsic_type(name: &str) -> Option<Type> {
    match name {
        "print" => Some(Type::Function {
            type_parameters: Vec::new(),
            parameters: vec![Type::string()],
            return_type: Box::new(Type::void()),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_is_a_one_argument_string_to_void_function() {
        let ty = intrinsic_type("print").expect("print must be registered");
        match ty {
            Type::Function { parameters, return_type, .. } => {
                assert_eq!(parameters.len(), 1);
                assert!(parameters[0].is_same(&Type::string()));
                assert!(return_type.is_same(&Type::void()));
            }
            other => panic!("expected a function type, got {other:?}"),
        }
    }

    #[test]
    fn unknown_name_has_no_intrinsic_type() {
        assert!(intrinsic_type("frobnicate").is_none());
    }
}
