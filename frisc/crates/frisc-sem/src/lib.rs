//! frisc-sem - L3, the semantic analyzer.
//!
//! Consumes the parse tree `frisc-tree` reads from a textual dump and
//! produces a fully resolved [`scope::ScopeTree`]: every identifier tied to
//! its declaration, every declared type checked against the dialect's
//! coercion rules, every function either defined or flagged undefined. The
//! first rule violation halts the walk and is reported in the fixed
//! `LHS ::= …` format; there is no error recovery here, unlike
//! `frisc-lexrun`.

pub mod coerce;
pub mod error;
pub mod literal;
pub mod object;
pub mod scope;
pub mod walk;

pub use error::{Result, SemError};
pub use object::{Base, Object};
pub use scope::{Block, ScopeRef, ScopeTree};

use frisc_tree::Node;

/// Runs the full semantic analysis pipeline over a parse tree: the
/// recursive walk, then the two whole-program checks (`main` exists;
/// every referenced function is defined). Returns the completed scope
/// tree, or the first diagnostic.
pub fn analyze(tree: &Node) -> Result<ScopeTree> {
    walk::analyze(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(dump: &str) -> Node {
        frisc_tree::parse(dump).unwrap()
    }

    /// Renders `(indent, line)` pairs into a dump, so nesting is explicit
    /// column counts instead of something fragile hand-aligned in source.
    fn dump(lines: &[(usize, String)]) -> String {
        let mut out = String::new();
        for (indent, text) in lines {
            out.push_str(&" ".repeat(*indent));
            out.push_str(text);
            out.push('\n');
        }
        out
    }

    fn lit(lines: &[(usize, &str)]) -> Vec<(usize, String)> {
        lines.iter().map(|(i, s)| (*i, s.to_string())).collect()
    }

    /// An `int main(void) { <body> }` translation unit, with `body`'s own
    /// indents given relative to 0 (this prepends the function header's
    /// fixed depth of 6 to each of them).
    fn int_main(fn_name: &str, body: &[(usize, &str)]) -> String {
        let mut lines = lit(&[
            (0, "<prijevodna_jedinica>"),
            (2, "<vanjska_deklaracija>"),
            (4, "<definicija_funkcije>"),
            (6, "<ime_tipa>"),
            (8, "<specifikator_tipa>"),
            (10, "KR_INT 1 int"),
        ]);
        lines.push((6, format!("IDN 1 {fn_name}")));
        lines.extend(lit(&[(6, "L_ZAGRADA 1 ("), (6, "KR_VOID 1 void"), (6, "D_ZAGRADA 1 )")]));
        for (indent, text) in body {
            lines.push((indent + 6, text.to_string()));
        }
        dump(&lines)
    }

    const EMPTY_BODY: &[(usize, &str)] = &[
        (0, "<slozena_naredba>"),
        (2, "L_VIT_ZAGRADA 2 {"),
        (2, "D_VIT_ZAGRADA 3 }"),
    ];

    #[test]
    fn missing_main_is_reported() {
        let tree = parse(&int_main("f", EMPTY_BODY));
        assert_eq!(analyze(&tree).unwrap_err(), SemError::MissingMain);
    }

    #[test]
    fn well_formed_main_resolves() {
        let tree = parse(&int_main("main", EMPTY_BODY));
        let scopes = analyze(&tree).unwrap();
        let main =
            scopes.root.borrow().table.get(&frisc_util::Symbol::intern("main")).cloned().unwrap();
        assert!(main.is_fn);
        assert!(main.defined);
        assert_eq!(main.base, Base::Int);
        assert!(main.params.is_empty());
    }

    #[test]
    fn empty_main_opens_exactly_one_child_scope() {
        let tree = parse(&int_main("main", EMPTY_BODY));
        let scopes = analyze(&tree).unwrap();
        assert_eq!(scopes.root.borrow().children.len(), 1);
    }
}
