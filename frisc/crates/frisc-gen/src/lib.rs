//! frisc-gen - L4, the FRISC assembly code generator.
//!
//! Takes the same parse tree `frisc-sem` already validated and re-walks it
//! once more, this time only to emit. Nothing here repeats a type check:
//! any structural surprise means `frisc-sem` would have already
//! rejected the program, and surfaces as [`error::CodeGenError::MalformedTree`],
//! a bug in this crate rather than a diagnostic for the user's source.

pub mod addr;
pub mod emit;
pub mod error;
mod walk;

pub use error::{CodeGenError, Result};

use frisc_tree::Node;

/// Runs L3 then L4: analyzes `tree`, then emits the FRISC assembly listing
/// for it. The fixed three-line prologue always opens the output; `main`'s
/// presence and signature were already checked by `frisc_sem::analyze`.
pub fn generate(tree: &Node) -> Result<String> {
    walk::generate(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(dump: &str) -> Node {
        frisc_tree::parse(dump).unwrap()
    }

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

    fn int_main(body: &[(usize, &str)]) -> String {
        let mut lines = lit(&[
            (0, "<prijevodna_jedinica>"),
            (2, "<vanjska_deklaracija>"),
            (4, "<definicija_funkcije>"),
            (6, "<ime_tipa>"),
            (8, "<specifikator_tipa>"),
            (10, "KR_INT 1 int"),
            (6, "IDN 1 main"),
            (6, "L_ZAGRADA 1 ("),
            (6, "KR_VOID 1 void"),
            (6, "D_ZAGRADA 1 )"),
        ]);
        for (indent, text) in body {
            lines.push((indent + 6, text.to_string()));
        }
        dump(&lines)
    }

    /// `int main(void) { return 0; }`
    #[test]
    fn trivial_main_emits_prologue_and_return() {
        let body: &[(usize, &str)] = &[
            (0, "<slozena_naredba>"),
            (2, "L_VIT_ZAGRADA 2 {"),
            (2, "<lista_naredbi>"),
            (4, "<naredba>"),
            (6, "<naredba_skoka>"),
            (8, "KR_RETURN 3 return"),
            (8, "<izraz>"),
            (10, "<izraz_pridruzivanja>"),
            (12, "<log_ili_izraz>"),
            (14, "<log_i_izraz>"),
            (16, "<bin_ili_izraz>"),
            (18, "<bin_xili_izraz>"),
            (20, "<bin_i_izraz>"),
            (22, "<jednakosni_izraz>"),
            (24, "<odnosni_izraz>"),
            (26, "<aditivni_izraz>"),
            (28, "<multiplikativni_izraz>"),
            (30, "<cast_izraz>"),
            (32, "<unarni_izraz>"),
            (34, "<postfiks_izraz>"),
            (36, "<primarni_izraz>"),
            (38, "BROJ 3 0"),
            (8, "TOCKAZAREZ 3 ;"),
            (2, "D_VIT_ZAGRADA 4 }"),
        ];
        let tree = parse(&int_main(body));
        let asm = generate(&tree).unwrap();
        assert!(asm.starts_with("\tMOVE 40000, R7\n"));
        assert!(asm.contains("\tCALL F_main\n"));
        assert!(asm.contains("\tHALT\n"));
        assert!(asm.contains("F_main\n"));
        assert!(asm.contains("MOVE %D 0, R1"));
        assert!(asm.contains("\tRET\n"));
    }

    /// `int counter;` alone at file scope is not a whole program.
    #[test]
    fn global_declaration_without_main_is_rejected() {
        let tree = parse(
            "<prijevodna_jedinica>\n\
             \x20\x20<vanjska_deklaracija>\n\
             \x20\x20\x20\x20<deklaracija>\n\
             \x20\x20\x20\x20\x20\x20<ime_tipa>\n\
             \x20\x20\x20\x20\x20\x20\x20\x20<specifikator_tipa>\n\
             \x20\x20\x20\x20\x20\x20\x20\x20\x20\x20KR_INT 1 int\n\
             \x20\x20\x20\x20\x20\x20<lista_init_deklaratora>\n\
             \x20\x20\x20\x20\x20\x20\x20\x20<init_deklarator>\n\
             \x20\x20\x20\x20\x20\x20\x20\x20\x20\x20<izravni_deklarator>\n\
             \x20\x20\x20\x20\x20\x20\x20\x20\x20\x20\x20\x20IDN 1 counter\n\
             \x20\x20\x20\x20\x20\x20TOCKAZAREZ 1 ;\n",
        );
        let err = generate(&tree).unwrap_err();
        // `counter` alone at file scope isn't a complete program (no
        // `main`): confirms `frisc-sem`'s whole-program check still runs
        // ahead of emission, the same gate a real program goes through.
        assert!(matches!(err, CodeGenError::Semantic(_)));
    }
}
