//! Diagnostic collection for the pipeline's recoverable/fatal messages.
//!
//! Every stage keeps its own fixed output protocol (token lines on stdout,
//! unknown bytes on stderr, `LHS ::= ...` on stdout then exit). `Handler`
//! is the one place that protocol funnels through so a stage can be
//! unit-tested by inspecting `handler.diagnostics()` instead of capturing
//! process stdout/stderr.
//!
//! # Examples
//!
//! ```
//! use frisc_util::diagnostic::{Handler, Level};
//! use frisc_util::span::Line;
//!
//! let handler = Handler::new();
//! handler.emit(Level::Warning, "unexpected byte 'q'", Line::new(3));
//! assert!(!handler.has_errors());
//! assert_eq!(handler.diagnostics().len(), 1);
//! ```

mod level;

pub use level::Level;

use crate::span::Line;
use std::cell::RefCell;

/// A single diagnostic message with severity and source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub line: Line,
}

/// Accumulates diagnostics for a single stage invocation.
///
/// The whole pipeline is single-threaded, so `Handler` uses a plain
/// `RefCell` rather than a lock.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn emit(&self, level: Level, message: impl Into<String>, line: Line) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            level,
            message: message.into(),
            line,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level.is_error())
            .count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_handler_has_no_errors() {
        let h = Handler::new();
        assert!(!h.has_errors());
        assert_eq!(h.error_count(), 0);
    }

    #[test]
    fn warning_does_not_count_as_error() {
        let h = Handler::new();
        h.emit(Level::Warning, "skip byte", Line::new(1));
        assert!(!h.has_errors());
        assert_eq!(h.diagnostics().len(), 1);
    }

    #[test]
    fn error_counts_and_clear_resets() {
        let h = Handler::new();
        h.emit(Level::Error, "boom", Line::new(2));
        assert!(h.has_errors());
        assert_eq!(h.error_count(), 1);
        h.clear();
        assert!(!h.has_errors());
    }
}
