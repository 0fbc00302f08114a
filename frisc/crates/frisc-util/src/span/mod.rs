//! Source location tracking.
//!
//! Every terminal leaf in a parse tree (see `frisc-tree`) carries a 1-based
//! source line number assigned by whatever produced the tree. There is no
//! byte-offset or multi-file source map in this pipeline: the upstream
//! parser hands L3/L4 a tree whose leaves already say `SYMBOL line lexeme`,
//! so the only thing worth tracking here is that line number.
//!
//! # Examples
//!
//! ```
//! use frisc_util::span::Line;
//!
//! let line = Line::new(12);
//! assert_eq!(line.get(), 12);
//! ```

/// A 1-based source line number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(u32);

impl Line {
    /// A placeholder line used for synthesized nodes that have no source origin.
    pub const DUMMY: Line = Line(0);

    #[inline]
    pub const fn new(line: u32) -> Self {
        Self(line)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_is_zero() {
        assert_eq!(Line::DUMMY.get(), 0);
    }

    #[test]
    fn new_roundtrips() {
        assert_eq!(Line::new(42).get(), 42);
    }
}
