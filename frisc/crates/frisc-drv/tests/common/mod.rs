//! Builders for the indented parse-tree dumps the compiler-side tests
//! feed to L3/L4. Keeping indentation as explicit column counts (instead
//! of hand-aligned string literals) is what makes these trees reviewable.
#![allow(dead_code)] // each test binary uses its own subset of builders

/// An indented dump under construction.
pub struct Dump {
    lines: Vec<(usize, String)>,
}

impl Dump {
    pub fn new(root: &str) -> Self {
        Dump { lines: vec![(0, root.to_string())] }
    }

    pub fn push(&mut self, indent: usize, text: impl Into<String>) {
        self.lines.push((indent, text.into()));
    }

    pub fn finish(&self) -> String {
        let mut out = String::new();
        for (indent, text) in &self.lines {
            out.push_str(&" ".repeat(*indent));
            out.push_str(text);
            out.push('\n');
        }
        out
    }
}

/// The single-child production chain from `<izraz>` down to
/// `<primarni_izraz>`, in grammar order.
pub const EXPR_LAYERS: &[&str] = &[
    "<izraz>",
    "<izraz_pridruzivanja>",
    "<log_ili_izraz>",
    "<log_i_izraz>",
    "<bin_ili_izraz>",
    "<bin_xili_izraz>",
    "<bin_i_izraz>",
    "<jednakosni_izraz>",
    "<odnosni_izraz>",
    "<aditivni_izraz>",
    "<multiplikativni_izraz>",
    "<cast_izraz>",
    "<unarni_izraz>",
    "<postfiks_izraz>",
    "<primarni_izraz>",
];

/// Pushes layers `[from..to)` of the expression chain starting at
/// `indent`, each one level deeper, and returns the indent the next node
/// (a leaf or a wider production) belongs at.
pub fn push_chain(d: &mut Dump, mut indent: usize, from: usize, to: usize) -> usize {
    for layer in &EXPR_LAYERS[from..to] {
        d.push(indent, *layer);
        indent += 2;
    }
    indent
}

/// Pushes the full `<izraz>`-to-leaf chain for a single terminal.
pub fn push_expr_leaf(d: &mut Dump, indent: usize, from: usize, leaf: &str) {
    let leaf_indent = push_chain(d, indent, from, EXPR_LAYERS.len());
    d.push(leaf_indent, leaf);
}

/// Opens `int main(void)` and returns the indent of its body's
/// `<slozena_naredba>` children.
fn open_int_main(d: &mut Dump) -> usize {
    d.push(2, "<vanjska_deklaracija>");
    d.push(4, "<definicija_funkcije>");
    d.push(6, "<ime_tipa>");
    d.push(8, "<specifikator_tipa>");
    d.push(10, "KR_INT 1 int");
    d.push(6, "IDN 1 main");
    d.push(6, "L_ZAGRADA 1 (");
    d.push(6, "KR_VOID 1 void");
    d.push(6, "D_ZAGRADA 1 )");
    d.push(6, "<slozena_naredba>");
    d.push(8, "L_VIT_ZAGRADA 1 {");
    8
}

/// `int main(void) { return 0; }`
pub fn trivial_main() -> String {
    let mut d = Dump::new("<prijevodna_jedinica>");
    let body = open_int_main(&mut d);
    d.push(body, "<lista_naredbi>");
    push_return_zero(&mut d, body + 2, 2);
    d.push(body, "D_VIT_ZAGRADA 3 }");
    d.finish()
}

fn push_return_zero(d: &mut Dump, indent: usize, line: u32) {
    d.push(indent, "<naredba>");
    d.push(indent + 2, "<naredba_skoka>");
    d.push(indent + 4, format!("KR_RETURN {line} return"));
    push_expr_leaf(d, indent + 4, 0, &format!("BROJ {line} 0"));
    d.push(indent + 4, format!("TOCKAZAREZ {line} ;"));
}

/// `int f(void) { }` and no `main` anywhere.
pub fn missing_main() -> String {
    let mut d = Dump::new("<prijevodna_jedinica>");
    d.push(2, "<vanjska_deklaracija>");
    d.push(4, "<definicija_funkcije>");
    d.push(6, "<ime_tipa>");
    d.push(8, "<specifikator_tipa>");
    d.push(10, "KR_INT 1 int");
    d.push(6, "IDN 1 f");
    d.push(6, "L_ZAGRADA 1 (");
    d.push(6, "KR_VOID 1 void");
    d.push(6, "D_ZAGRADA 1 )");
    d.push(6, "<slozena_naredba>");
    d.push(8, "L_VIT_ZAGRADA 1 {");
    d.push(8, "D_VIT_ZAGRADA 1 }");
    d.finish()
}

/// `int main(void) { const int y = 0; y = 1; }`: the reassignment of a
/// `const` is the first (and only) rule violation.
pub fn const_reassignment() -> String {
    let mut d = Dump::new("<prijevodna_jedinica>");
    let body = open_int_main(&mut d);

    d.push(body, "<lista_deklaracija>");
    d.push(body + 2, "<deklaracija>");
    d.push(body + 4, "<ime_tipa>");
    d.push(body + 6, "KR_CONST 2 const");
    d.push(body + 6, "<specifikator_tipa>");
    d.push(body + 8, "KR_INT 2 int");
    d.push(body + 4, "<lista_init_deklaratora>");
    d.push(body + 6, "<init_deklarator>");
    d.push(body + 8, "<izravni_deklarator>");
    d.push(body + 10, "IDN 2 y");
    d.push(body + 8, "OP_PRIDRUZI 2 =");
    d.push(body + 8, "<inicijalizator>");
    push_expr_leaf(&mut d, body + 10, 1, "BROJ 2 0");
    d.push(body + 4, "TOCKAZAREZ 2 ;");

    d.push(body, "<lista_naredbi>");
    d.push(body + 2, "<naredba>");
    d.push(body + 4, "<izraz_naredba>");
    d.push(body + 6, "<izraz>");
    d.push(body + 8, "<izraz_pridruzivanja>");
    d.push(body + 10, "<postfiks_izraz>");
    d.push(body + 12, "<primarni_izraz>");
    d.push(body + 14, "IDN 3 y");
    d.push(body + 10, "OP_PRIDRUZI 3 =");
    let rhs = push_chain(&mut d, body + 10, 1, EXPR_LAYERS.len());
    d.push(rhs, "BROJ 3 1");
    d.push(body + 6, "TOCKAZAREZ 3 ;");

    d.push(body, "D_VIT_ZAGRADA 4 }");
    d.finish()
}

/// `int main(void) { int g(void); return 0; }`: `g` is declared but never
/// defined at global scope.
pub fn undefined_function_decl() -> String {
    let mut d = Dump::new("<prijevodna_jedinica>");
    let body = open_int_main(&mut d);

    d.push(body, "<lista_deklaracija>");
    d.push(body + 2, "<deklaracija>");
    d.push(body + 4, "<ime_tipa>");
    d.push(body + 6, "<specifikator_tipa>");
    d.push(body + 8, "KR_INT 2 int");
    d.push(body + 4, "<lista_init_deklaratora>");
    d.push(body + 6, "<init_deklarator>");
    d.push(body + 8, "<izravni_deklarator>");
    d.push(body + 10, "IDN 2 g");
    d.push(body + 10, "L_ZAGRADA 2 (");
    d.push(body + 10, "KR_VOID 2 void");
    d.push(body + 10, "D_ZAGRADA 2 )");
    d.push(body + 4, "TOCKAZAREZ 2 ;");

    d.push(body, "<lista_naredbi>");
    push_return_zero(&mut d, body + 2, 3);
    d.push(body, "D_VIT_ZAGRADA 4 }");
    d.finish()
}

/// `int main(void) { int x = 65536; return 0; }`
pub fn big_literal_main() -> String {
    let mut d = Dump::new("<prijevodna_jedinica>");
    let body = open_int_main(&mut d);

    d.push(body, "<lista_deklaracija>");
    d.push(body + 2, "<deklaracija>");
    d.push(body + 4, "<ime_tipa>");
    d.push(body + 6, "<specifikator_tipa>");
    d.push(body + 8, "KR_INT 2 int");
    d.push(body + 4, "<lista_init_deklaratora>");
    d.push(body + 6, "<init_deklarator>");
    d.push(body + 8, "<izravni_deklarator>");
    d.push(body + 10, "IDN 2 x");
    d.push(body + 8, "OP_PRIDRUZI 2 =");
    d.push(body + 8, "<inicijalizator>");
    push_expr_leaf(&mut d, body + 10, 1, "BROJ 2 65536");
    d.push(body + 4, "TOCKAZAREZ 2 ;");

    d.push(body, "<lista_naredbi>");
    push_return_zero(&mut d, body + 2, 3);
    d.push(body, "D_VIT_ZAGRADA 4 }");
    d.finish()
}

/// `int main(void) { int x; x = 1 + 2; return 0; }`
pub fn arith_main() -> String {
    let mut d = Dump::new("<prijevodna_jedinica>");
    let body = open_int_main(&mut d);

    d.push(body, "<lista_deklaracija>");
    d.push(body + 2, "<deklaracija>");
    d.push(body + 4, "<ime_tipa>");
    d.push(body + 6, "<specifikator_tipa>");
    d.push(body + 8, "KR_INT 2 int");
    d.push(body + 4, "<lista_init_deklaratora>");
    d.push(body + 6, "<init_deklarator>");
    d.push(body + 8, "<izravni_deklarator>");
    d.push(body + 10, "IDN 2 x");
    d.push(body + 4, "TOCKAZAREZ 2 ;");

    d.push(body, "<lista_naredbi>");
    d.push(body + 2, "<naredba>");
    d.push(body + 4, "<izraz_naredba>");
    d.push(body + 6, "<izraz>");
    d.push(body + 8, "<izraz_pridruzivanja>");
    d.push(body + 10, "<postfiks_izraz>");
    d.push(body + 12, "<primarni_izraz>");
    d.push(body + 14, "IDN 3 x");
    d.push(body + 10, "OP_PRIDRUZI 3 =");
    // `1 + 2` hangs off a 3-child `<aditivni_izraz>` inside the chain.
    let additive = push_chain(&mut d, body + 10, 1, 10);
    let left = push_chain(&mut d, additive, 9, EXPR_LAYERS.len());
    d.push(left, "BROJ 3 1");
    d.push(additive, "PLUS 3 +");
    let right = push_chain(&mut d, additive, 10, EXPR_LAYERS.len());
    d.push(right, "BROJ 3 2");
    d.push(body + 6, "TOCKAZAREZ 3 ;");

    push_return_zero(&mut d, body + 2, 4);
    d.push(body, "D_VIT_ZAGRADA 5 }");
    d.finish()
}
