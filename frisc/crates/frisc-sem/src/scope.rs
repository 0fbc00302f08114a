//! The lexical scope tree.
//!
//! The tree owns its blocks top-down (`Rc`); each child keeps a `Weak`
//! back-reference to its parent so the cycle never needs a garbage
//! collector. Parent -> child is the owning edge, child -> parent a
//! lookup-only back edge.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use frisc_util::{IndexMap, Symbol};

use crate::object::{Base, Object};

pub type ScopeRef = Rc<RefCell<Block>>;

/// One lexical scope: the global scope, a function body, or a nested
/// compound statement.
///
/// `table` is insertion-ordered (not a hash map): `frisc-gen` assigns each
/// local a stack slot by its position here, so declaration order has to be
/// preserved, not just membership. Keys are interned [`Symbol`]s so the
/// outward walk in [`resolve`] compares integers, not strings.
#[derive(Debug, Default)]
pub struct Block {
    pub table: IndexMap<Symbol, Object>,
    /// The return type of the nearest enclosing function, or `None` outside
    /// any function (used to type-check `return`).
    pub function: Base,
    /// Set on the scope a function body opens; `None` for the global scope
    /// and for plain nested compound statements.
    pub fn_name: Option<Symbol>,
    pub param_names: Vec<Symbol>,
    pub parent: Weak<RefCell<Block>>,
    pub children: Vec<ScopeRef>,
    /// Set by `frisc-gen` as it re-walks this scope tree a second time to
    /// emit code, so a plain nested block is matched to its parse-tree
    /// node by position (the order `frisc-sem` created it in).
    pub visited: Cell<bool>,
}

impl Block {
    fn root() -> ScopeRef {
        Rc::new(RefCell::new(Block::default()))
    }
}

/// Owns the global block and hands out child scopes as the walker enters
/// compound statements.
#[derive(Debug)]
pub struct ScopeTree {
    pub root: ScopeRef,
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree { root: Block::root() }
    }

    /// Allocates a new child of `parent`, links it, and returns it as the
    /// new current scope.
    pub fn enter(parent: &ScopeRef) -> ScopeRef {
        let child = Rc::new(RefCell::new(Block {
            parent: Rc::downgrade(parent),
            ..Block::default()
        }));
        parent.borrow_mut().children.push(Rc::clone(&child));
        child
    }

    /// The scope a child scope's parent edge points to, if it hasn't been
    /// dropped (it never is while `self.root` keeps the tree alive).
    pub fn exit(scope: &ScopeRef) -> ScopeRef {
        scope
            .borrow()
            .parent
            .upgrade()
            .expect("scope tree root is kept alive by ScopeTree")
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks `scope` outward (including `scope` itself) looking for `name`,
/// returning the scope it was found in and a clone of its descriptor.
pub fn resolve(scope: &ScopeRef, name: &str) -> Option<(ScopeRef, Object)> {
    let name = Symbol::intern(name);
    let mut current = Rc::clone(scope);
    loop {
        if let Some(obj) = current.borrow().table.get(&name) {
            return Some((Rc::clone(&current), obj.clone()));
        }
        let parent = current.borrow().parent.upgrade();
        match parent {
            Some(p) => current = p,
            None => return None,
        }
    }
}

/// Walks `scope` outward looking for the nearest enclosing function whose
/// return type is not `Base::None` (used by `return` and `break`/`continue`
/// style checks that need to know "am I inside a function").
pub fn enclosing_function(scope: &ScopeRef) -> Option<Base> {
    let mut current = Rc::clone(scope);
    loop {
        let function = current.borrow().function;
        if function != Base::None {
            return Some(function);
        }
        let parent = current.borrow().parent.upgrade();
        match parent {
            Some(p) => current = p,
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_parent_chain() {
        let tree = ScopeTree::new();
        tree.root.borrow_mut().table.insert(Symbol::intern("x"), Object::int());
        let child = ScopeTree::enter(&tree.root);
        let (found_in, obj) = resolve(&child, "x").unwrap();
        assert!(Rc::ptr_eq(&found_in, &tree.root));
        assert_eq!(obj, Object::int());
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let tree = ScopeTree::new();
        tree.root.borrow_mut().table.insert(Symbol::intern("x"), Object::int());
        let child = ScopeTree::enter(&tree.root);
        child.borrow_mut().table.insert(Symbol::intern("x"), Object::char_());
        let (found_in, obj) = resolve(&child, "x").unwrap();
        assert!(Rc::ptr_eq(&found_in, &child));
        assert_eq!(obj, Object::char_());
    }

    #[test]
    fn exit_returns_to_parent() {
        let tree = ScopeTree::new();
        let child = ScopeTree::enter(&tree.root);
        let back = ScopeTree::exit(&child);
        assert!(Rc::ptr_eq(&back, &tree.root));
    }

    #[test]
    fn enclosing_function_skips_plain_blocks() {
        let tree = ScopeTree::new();
        let body = ScopeTree::enter(&tree.root);
        body.borrow_mut().function = Base::Int;
        let nested = ScopeTree::enter(&body);
        assert_eq!(enclosing_function(&nested), Some(Base::Int));
    }
}
