//! String interner backed by a thread-local table.
//!
//! The pipeline is single-threaded and strictly sequential, so unlike a
//! multi-threaded compiler's interner this one needs no locking: a
//! `thread_local!` `RefCell` over a hash-indexed table is enough.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};

use super::Symbol;

thread_local! {
    static TABLE: RefCell<StringTable> = RefCell::new(StringTable::new());
}

/// Backing store for interned strings.
///
/// Strings are leaked to obtain `'static` references. This is acceptable
/// here because a single compiler invocation interns a bounded number of
/// identifiers (one program's worth) and never needs to release them.
pub struct StringTable {
    index: FxHashMap<u64, u32>,
    strings: Vec<&'static str>,
}

impl StringTable {
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        let hash = hash_str(s);
        if let Some(&idx) = self.index.get(&hash) {
            if self.strings[idx as usize] == s {
                return Symbol::from_index(idx);
            }
        }
        let stored: &'static str = Box::leak(s.to_string().into_boxed_str());
        let idx = self.strings.len() as u32;
        self.strings.push(stored);
        self.index.insert(hash, idx);
        Symbol::from_index(idx)
    }

    pub fn get(&self, index: u32) -> Option<&'static str> {
        self.strings.get(index as usize).copied()
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_str(s: &str) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    s.hash(&mut hasher);
    hasher.finish()
}

pub(super) fn intern(s: &str) -> Symbol {
    TABLE.with(|t| t.borrow_mut().intern(s))
}

pub(super) fn resolve(index: u32) -> &'static str {
    TABLE.with(|t| {
        t.borrow()
            .get(index)
            .expect("Symbol index not present in thread-local table")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_interns_to_same_index() {
        let mut t = StringTable::new();
        let a = t.intern("izraz");
        let b = t.intern("izraz");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        let mut t = StringTable::new();
        let a = t.intern("x");
        let b = t.intern("y");
        assert_ne!(a, b);
    }
}
