//! Symbols (§3): created by the binder, shared between a declaration and every use
//! that points at it.
//!
//! A symbol's `type` cell is written at most once, during the type-solver pass (§4.6);
//! every other field is fixed at bind time. Shared ownership is a reference-counted
//! handle rather than an index, matching the source's pointer-shared symbols (§9).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ion_parser::NodeId;

use crate::ty::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Carries no name — created for expressions with no declaring target (literals,
    /// arithmetic results) so they still have somewhere to stash a computed type.
    Anonymous,
    Named,
    /// Links back to the declaration node that created it.
    Declaration,
    Type,
    TypeDeclaration,
}

pub struct Symbol {
    pub kind: SymbolKind,
    pub name: Option<String>,
    pub declaring_node: Option<NodeId>,
    ty: RefCell<Option<Type>>,
}

pub type SymbolHandle = Rc<Symbol>;

impl Symbol {
    fn new(kind: SymbolKind, name: Option<String>, declaring_node: Option<NodeId>) -> SymbolHandle {
        Rc::new(Symbol { kind, name, declaring_node, ty: RefCell::new(None) })
    }

    pub fn anonymous() -> SymbolHandle {
        Self::new(SymbolKind::Anonymous, None, None)
    }

    pub fn named(name: impl Into<String>) -> SymbolHandle {
        Self::new(SymbolKind::Named, Some(name.into()), None)
    }

    pub fn declaration(name: impl Into<String>, node: NodeId) -> SymbolHandle {
        Self::new(SymbolKind::Declaration, Some(name.into()), Some(node))
    }

    pub fn type_symbol(name: impl Into<String>, node: NodeId) -> SymbolHandle {
        Self::new(SymbolKind::Type, Some(name.into()), Some(node))
    }

    pub fn type_declaration(name: impl Into<String>, node: NodeId) -> SymbolHandle {
        Self::new(SymbolKind::TypeDeclaration, Some(name.into()), Some(node))
    }

    pub fn ty(&self) -> Option<Type> {
        self.ty.borrow().clone()
    }

    /// Writes the computed type. Only the type solver calls this, and only once per
    /// symbol — a second call is an internal invariant violation, not a user error.
    pub fn set_ty(&self, ty: Type) {
        let mut slot = self.ty.borrow_mut();
        debug_assert!(slot.is_none(), "symbol type written twice: {:?}", self.name);
        *slot = Some(ty);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("type", &self.ty.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_cell_is_write_once_observable() {
        let sym = Symbol::named("x");
        assert!(sym.ty().is_none());
        sym.set_ty(Type::number());
        assert!(sym.ty().unwrap().is_same(&Type::number()));
    }
}
