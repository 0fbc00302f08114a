//! Stack-slot addressing for locals and parameters.
//!
//! `frisc-gen` never builds its own scope tree. It re-walks the parse tree
//! a second time against the one `frisc-sem` already built and fully
//! populated, so every block's local count is known before a single
//! instruction is emitted. `frisc_sem::Block::table` is insertion-ordered
//! for exactly this reason: a local's address is its position in that
//! order.

use std::rc::Rc;

use frisc_sem::{Object, ScopeRef};
use frisc_util::Symbol;

pub enum Addr {
    Global(String),
    /// Byte offset from the current `R7`.
    Local(i32),
}

/// Resolves `name` starting at `scope` and walking outward. `stack_depth`
/// is the number of expression temporaries currently pushed past the
/// declared locals.
///
/// Walking from the innermost scope out, each scope passed over *without*
/// finding the name adds its whole table size to the running offset
/// (those locals are nested deeper on the stack than the one we're about
/// to address).
pub fn resolve(scope: &ScopeRef, name: &str, stack_depth: i32) -> Option<(Addr, Object)> {
    let sym = Symbol::intern(name);
    let mut current = Rc::clone(scope);
    let mut spill = 0i32;
    loop {
        let is_global = current.borrow().parent.upgrade().is_none();
        let found = current.borrow().table.get_index_of(&sym).map(|index| {
            let obj = current.borrow().table.get_index(index).unwrap().1.clone();
            let addr = if is_global {
                Addr::Global(name.to_string())
            } else {
                Addr::Local(4 * (index as i32 + spill + stack_depth))
            };
            (addr, obj)
        });
        if let Some(result) = found {
            return Some(result);
        }
        spill += current.borrow().table.len() as i32;
        let parent = current.borrow().parent.upgrade();
        match parent {
            Some(p) => current = p,
            None => return None,
        }
    }
}

/// Total locals live on the stack between `scope` and its enclosing
/// function's own body scope, inclusive: what a `return` from `scope`
/// has to give back in one `ADD R7` before `RET`.
pub fn frame_size_to_function_root(scope: &ScopeRef) -> i32 {
    let mut total = 0;
    let mut current = Rc::clone(scope);
    loop {
        total += current.borrow().table.len() as i32;
        if current.borrow().fn_name.is_some() {
            return total;
        }
        let parent = current
            .borrow()
            .parent
            .upgrade()
            .expect("a return statement is always inside some function's scope chain");
        current = parent;
    }
}
