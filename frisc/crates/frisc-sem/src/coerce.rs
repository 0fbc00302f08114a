//! Coercion and lvalue predicates of the dialect's type system.

use crate::object::{Base, Object};

/// Can `from` flow into a slot of type `to` without an explicit cast?
///
/// Functions never coerce. Scalars widen `CHAR -> INT` and otherwise
/// require an exact base match. Arrays decay the same way by base, and a
/// `const` array may not flow into a non-const one.
pub fn can_implicit(from: &Object, to: &Object) -> bool {
    if to.is_fn {
        return false;
    }
    let base_ok = matches!(
        (from.base, to.base),
        (Base::Char, Base::Char) | (Base::Int, Base::Int) | (Base::Char, Base::Int)
    );
    if !from.array && !to.array {
        return base_ok;
    }
    if from.array && !from.const_ && to.array {
        return base_ok;
    }
    false
}

/// `can_implicit`, plus the one allowed narrowing cast: `INT -> CHAR`.
pub fn can_explicit(from: &Object, to: &Object) -> bool {
    (from.base == Base::Int && to.base == Base::Char) || can_implicit(from, to)
}

/// An object can appear on the left of an assignment iff it names a
/// variable (not a function), is not `const`, and is not an array (arrays
/// have no assignment form in this dialect).
pub fn is_lvalue(obj: &Object) -> bool {
    !obj.is_fn && !obj.const_ && !obj.array
}
