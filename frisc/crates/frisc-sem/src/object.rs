use std::fmt;

/// The four base types of the dialect. `None` is not a real source type; it
/// marks an uninitialized [`Object`] or the "not inside a function" value of
/// [`crate::scope::Block::function`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Base {
    #[default]
    None,
    Char,
    Int,
    Void,
}

/// The type descriptor attached to every declaration, expression, and
/// function signature.
///
/// Invariants upheld by construction, not by a validator: `is_fn` implies
/// `!const_ && !array`; `array` implies `base` is `Char` or `Int`; `Void`
/// only ever appears as a function's `ret` or as the sole "no parameters"
/// marker, never as a variable or parameter's `base`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    pub base: Base,
    pub const_: bool,
    pub array: bool,
    pub is_fn: bool,
    pub defined: bool,
    pub ret: Base,
    pub fn_name: String,
    pub params: Vec<Object>,
}

impl Object {
    pub fn scalar(base: Base) -> Self {
        Object { base, ..Default::default() }
    }

    pub fn int() -> Self {
        Object::scalar(Base::Int)
    }

    pub fn char_() -> Self {
        Object::scalar(Base::Char)
    }

    pub fn const_char_array() -> Self {
        Object { base: Base::Char, const_: true, array: true, ..Default::default() }
    }

    /// Builds the "plain value" descriptor for a function reference found
    /// during name resolution: `base = None`, `fn_name` set so a later
    /// `<postfiks_izraz>` production can look the real declaration back up.
    pub fn function_reference(fn_name: String, ret: Base, params: Vec<Object>) -> Self {
        Object { is_fn: true, fn_name, ret, params, ..Default::default() }
    }

    /// Builds the descriptor stored in a scope's table for a function
    /// declaration or definition.
    pub fn function_decl(ret: Base, params: Vec<Object>, defined: bool) -> Self {
        Object { base: ret, is_fn: true, defined, params, ..Default::default() }
    }

    pub fn without_const(&self) -> Object {
        Object { const_: false, ..self.clone() }
    }

    pub fn without_const_or_array(&self) -> Object {
        Object { const_: false, array: false, ..self.clone() }
    }

    pub fn as_array(&self) -> Object {
        Object { array: true, ..self.clone() }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Base::None => "NONE",
            Base::Char => "CHAR",
            Base::Int => "INT",
            Base::Void => "VOID",
        })
    }
}
