//! frisc-util - foundation types shared by every stage of the frisc pipeline.
//!
//! This crate has no knowledge of regexes, lex tables, parse trees, or
//! FRISC assembly. It provides the small set of infrastructure every other
//! crate in the workspace builds on:
//!
//! - [`symbol::Symbol`], a compact interned-string handle used to key scope
//!   tables by identifier.
//! - [`index_vec::IndexVec`] / [`index_vec::Idx`] / [`define_idx!`], a
//!   typed-index vector so e.g. an ε-NFA state index and a rule index can't
//!   be mixed up at a call site.
//! - [`span::Line`], the one piece of source-location metadata this
//!   pipeline carries.
//! - [`diagnostic::Handler`], a sink for the messages a stage reports
//!   alongside its fixed stdout/stderr protocol.

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::Line;
pub use symbol::Symbol;

pub use indexmap::IndexMap;
pub use rustc_hash::{FxHashMap, FxHashSet};
