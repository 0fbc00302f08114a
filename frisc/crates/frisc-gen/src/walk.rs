//! The code-generation re-walk.
//!
//! `frisc-sem::analyze` has already built and fully populated the scope
//! tree by the time this runs. This walk reads the same parse tree a
//! second time, never re-checking a type, only emitting: it leans on the
//! scope tree for addressing and on the tree shape itself for control flow.
//! Two pieces of ambient state survive across productions: a pending unary
//! minus, and the name of the function whose root body scope is about to
//! open ([`GenCtx`]).

use frisc_sem::{Base, ScopeRef};
use frisc_tree::{Branch, Leaf, Node};
use frisc_util::Symbol;
use tracing::debug;

use crate::addr::{self, Addr};
use crate::emit::Emitter;
use crate::error::{CodeGenError, Result};

#[derive(Default)]
struct GenCtx {
    minus_pending: bool,
    pending_function: Option<String>,
    label_counter: u32,
    /// Expression temporaries currently pushed past the declared locals.
    /// Kept in lock-step with every `push`/`pop` this module emits so
    /// [`addr::resolve`] always sees the true depth at the instruction
    /// it's addressing for.
    stack_depth: i32,
    /// `(continue_target, break_target)`, pushed on loop entry.
    loop_labels: Vec<(String, String)>,
}

impl GenCtx {
    fn next_label(&mut self) -> u32 {
        let l = self.label_counter;
        self.label_counter += 2;
        l
    }

    fn push(&mut self, e: &mut Emitter, reg: &str) {
        e.instr(format!("PUSH {reg}"));
        self.stack_depth += 1;
    }

    fn pop(&mut self, e: &mut Emitter, reg: &str) {
        e.instr(format!("POP {reg}"));
        self.stack_depth -= 1;
    }
}

fn malformed(symbol: &str, reason: &str) -> CodeGenError {
    CodeGenError::MalformedTree { symbol: symbol.to_string(), reason: reason.to_string() }
}

fn as_branch<'t>(node: &'t Node, context: &str) -> Result<&'t Branch> {
    node.as_branch().ok_or_else(|| malformed(node.symbol(), &format!("expected a nonterminal while emitting {context}")))
}

fn as_leaf<'t>(node: &'t Node, context: &str) -> Result<&'t Leaf> {
    node.as_leaf().ok_or_else(|| malformed(node.symbol(), &format!("expected a terminal while emitting {context}")))
}

fn nth<'t>(branch: &'t Branch, index: usize) -> Result<&'t Node> {
    branch
        .children
        .get(index)
        .ok_or_else(|| malformed(&branch.symbol, &format!("production has no child {index}")))
}

fn addr_label(addr: &Addr) -> String {
    match addr {
        Addr::Global(name) => format!("G_{name}"),
        Addr::Local(off) => format!("(R7+{off})"),
    }
}

/// Runs L4 end to end: L3's analysis, then this emission pass.
pub fn generate(tree: &Node) -> Result<String> {
    let scopes = frisc_sem::analyze(tree)?;
    let mut e = Emitter::new();
    e.instr("MOVE 40000, R7");
    e.instr("CALL F_main");
    e.instr("HALT");
    let mut ctx = GenCtx::default();
    gen(tree, &scopes.root, &scopes.root, &mut e, &mut ctx)?;
    Ok(e.finish())
}

/// Descends through single-child productions to the terminal or multi-child
/// branch they ultimately stand for, the same shape `is_string_literal_chain`
/// in `frisc-sem` walks for initializers.
fn unwrap_single_child(mut node: &Node) -> &Node {
    while let Some(b) = node.as_branch() {
        if b.children.len() == 1 {
            node = &b.children[0];
        } else {
            break;
        }
    }
    node
}

/// The name an expression calls, if it reduces to a bare `IDN` through a
/// chain of single-child productions. Used at `<postfiks_izraz>` call
/// sites, where the callee is named directly rather than evaluated as a
/// value.
fn callee_name(node: &Node) -> Option<&str> {
    match unwrap_single_child(node) {
        Node::Leaf(l) if l.symbol == "IDN" => Some(&l.lexeme),
        _ => None,
    }
}

enum LTarget {
    /// A plain identifier, re-resolved to an address each time it's used:
    /// its stack offset depends on `ctx.stack_depth` at the point of the
    /// load or store, which can change between the two (a postfix `++`
    /// pushes the old value in between).
    Plain(String),
    /// The element address is already computed and sitting in `R1`.
    IndexedInR1,
}

/// Resolves an assignment/increment target down to either a plain
/// identifier or a single-dimension array element's address (computed into
/// `R1`). The grammar only ever nests one level of indexing, so no
/// recursive element-of-element case exists here.
fn resolve_ltarget(node: &Node, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<LTarget> {
    let _ = global;
    match unwrap_single_child(node) {
        Node::Leaf(l) if l.symbol == "IDN" => Ok(LTarget::Plain(l.lexeme.clone())),
        Node::Branch(b) if b.symbol == "<postfiks_izraz>" && b.children.len() == 4 && nth(b, 2)?.symbol() == "<izraz>" => {
            let base_name = callee_name(nth(b, 0)?)
                .ok_or_else(|| malformed(&b.symbol, "array base is not a plain identifier"))?;
            let Some((base_addr, _)) = addr::resolve(scope, base_name, ctx.stack_depth) else {
                return Err(malformed("IDN", "array base missing from scope tree"));
            };
            match &base_addr {
                Addr::Global(name) => e.instr(format!("MOVE G_{name}, R1")),
                Addr::Local(off) => {
                    e.instr(format!("MOVE %D {off}, R1"));
                    e.instr("ADD R7, R1, R1");
                }
            }
            ctx.push(e, "R1");
            gen_expr(nth(b, 2)?, global, scope, e, ctx)?;
            ctx.pop(e, "R2");
            ctx.pop(e, "R1");
            e.instr("SHL R2, %D 2, R2");
            e.instr("ADD R1, R2, R1");
            Ok(LTarget::IndexedInR1)
        }
        other => Err(malformed(other.symbol(), "not an lvalue this generator can address")),
    }
}

fn load_ltarget(t: &LTarget, scope: &ScopeRef, e: &mut Emitter, ctx: &GenCtx) -> Result<()> {
    match t {
        LTarget::Plain(name) => {
            let (addr, _) = addr::resolve(scope, name, ctx.stack_depth)
                .ok_or_else(|| malformed("IDN", "identifier missing from a scope tree frisc-sem already validated"))?;
            e.instr(format!("LOAD R1, {}", addr_label(&addr)));
            Ok(())
        }
        LTarget::IndexedInR1 => {
            e.instr("LOAD R1, (R1+0)");
            Ok(())
        }
    }
}

/// Stores `reg` to `t`. A plain target is re-resolved against the current
/// stack depth; an indexed target's element address was protected on the
/// stack across whatever evaluated `reg`, and is popped back here.
fn store_ltarget(t: LTarget, reg: &str, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match t {
        LTarget::Plain(name) => {
            let (addr, _) = addr::resolve(scope, &name, ctx.stack_depth)
                .ok_or_else(|| malformed("IDN", "identifier missing from a scope tree frisc-sem already validated"))?;
            e.instr(format!("STORE {reg}, {}", addr_label(&addr)));
            Ok(())
        }
        LTarget::IndexedInR1 => {
            ctx.pop(e, "R2");
            e.instr(format!("STORE {reg}, (R2+0)"));
            Ok(())
        }
    }
}

fn znak_code(lexeme: &str) -> i32 {
    let bytes = lexeme.as_bytes();
    if bytes.len() == 4 {
        match bytes[2] {
            b't' => 9,
            b'n' => 10,
            b'0' => 0,
            b'\'' => 0x27,
            b'"' => 0x22,
            b'\\' => 0x5C,
            other => other as i32,
        }
    } else {
        bytes[1] as i32
    }
}

fn string_literal_codes(lexeme: &str) -> Vec<i32> {
    let inner = &lexeme[1..lexeme.len() - 1];
    let bytes = inner.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            out.push(znak_code(&format!("'\\{}'", bytes[i + 1] as char)));
            i += 2;
        } else {
            out.push(bytes[i] as i32);
            i += 1;
        }
    }
    out.push(0);
    out
}

/// Materializes a `BROJ` value already known to fit `i32`. Values that
/// don't fit a 16-bit immediate are split into two halves; below that,
/// one `MOVE` suffices.
fn emit_int_literal(value: i32, e: &mut Emitter, ctx: &mut GenCtx) {
    if (0..65536).contains(&value) {
        e.instr(format!("MOVE %D {value}, R1"));
    } else {
        let bits = value as u32;
        let upper = (bits & 0xFFFF0000) >> 16;
        let lower = bits & 0xFFFF;
        e.instr(format!("MOVE %D {upper}, R1"));
        e.instr("SHL R1, %D 16, R1");
        e.instr(format!("MOVE %D {lower}, R2"));
        e.instr("OR R1, R2, R1");
    }
    ctx.push(e, "R1");
}

/// Walks down a single-child chain trying to fold a constant expression to
/// an `i32`. A global initializer is folded into its `DW` value, so it is
/// restricted to a literal, optionally unary-minus-prefixed.
fn fold_const_int(node: &Node) -> Option<i32> {
    match node {
        Node::Branch(b) if b.children.len() == 1 => fold_const_int(&b.children[0]),
        Node::Branch(b) if b.symbol == "<unarni_izraz>" && b.children.len() == 2 => {
            let op = b.children[0].as_branch()?;
            let leaf = op.children.first()?.as_leaf()?;
            if leaf.symbol != "MINUS" {
                return None;
            }
            fold_const_int(&b.children[1]).map(|v| -v)
        }
        Node::Leaf(l) if l.symbol == "BROJ" => frisc_sem::literal::parse_int(&l.lexeme, false),
        Node::Leaf(l) if l.symbol == "ZNAK" => Some(znak_code(&l.lexeme)),
        _ => None,
    }
}

/// Dispatches on a branch's nonterminal symbol, mirroring
/// `frisc-sem::walk`'s production set. `global` is the root scope;
/// `scope` is the lexically current one, advanced as `<slozena_naredba>`
/// is entered (re-navigating the scope tree `frisc-sem` already built).
fn gen(node: &Node, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    let branch = as_branch(node, "a production")?;
    match branch.symbol.as_str() {
        "<primarni_izraz>" => primary_expr(branch, global, scope, e, ctx),
        "<postfiks_izraz>" => postfix_expr(node, branch, global, scope, e, ctx),
        "<unarni_izraz>" => unary_expr(branch, global, scope, e, ctx),
        "<unarni_operator>" => unary_operator(branch, ctx),
        "<cast_izraz>" => cast_expr(branch, global, scope, e, ctx),
        "<multiplikativni_izraz>" | "<aditivni_izraz>" | "<odnosni_izraz>" | "<jednakosni_izraz>"
        | "<bin_i_izraz>" | "<bin_xili_izraz>" | "<bin_ili_izraz>" => binary_expr(branch, global, scope, e, ctx),
        "<log_i_izraz>" => short_circuit(branch, global, scope, e, ctx, true),
        "<log_ili_izraz>" => short_circuit(branch, global, scope, e, ctx, false),
        "<izraz_pridruzivanja>" => assignment_expr(branch, global, scope, e, ctx),
        "<izraz>" => comma_expr(branch, global, scope, e, ctx),
        "<slozena_naredba>" => compound_stmt(branch, global, scope, e, ctx),
        "<lista_naredbi>" => {
            for child in &branch.children {
                gen(child, global, scope, e, ctx)?;
            }
            Ok(())
        }
        "<naredba>" => gen(nth(branch, 0)?, global, scope, e, ctx),
        "<izraz_naredba>" => expr_stmt(branch, global, scope, e, ctx),
        "<naredba_grananja>" => branch_stmt(branch, global, scope, e, ctx),
        "<naredba_petlje>" => loop_stmt(branch, global, scope, e, ctx),
        "<naredba_skoka>" => jump_stmt(branch, global, scope, e, ctx),
        "<prijevodna_jedinica>" | "<vanjska_deklaracija>" | "<lista_deklaracija>" => {
            for child in &branch.children {
                gen(child, global, scope, e, ctx)?;
            }
            Ok(())
        }
        "<definicija_funkcije>" => function_definition(branch, global, scope, e, ctx),
        "<deklaracija>" => {
            gen(nth(branch, 1)?, global, scope, e, ctx)
        }
        "<lista_init_deklaratora>" => {
            gen(nth(branch, 0)?, global, scope, e, ctx)?;
            if branch.children.len() == 3 {
                gen(nth(branch, 2)?, global, scope, e, ctx)?;
            }
            Ok(())
        }
        "<init_deklarator>" => init_declarator(branch, global, scope, e, ctx),
        // A scalar initializer evaluates like the expression it wraps; the
        // brace-enclosed form only reaches here with a single element (an
        // array initializer was already folded or skipped by
        // `init_declarator`).
        "<inicijalizator>" => {
            if branch.children.len() == 3 {
                gen(nth(branch, 1)?, global, scope, e, ctx)
            } else {
                gen(nth(branch, 0)?, global, scope, e, ctx)
            }
        }
        "<lista_izraza_pridruzivanja>" => gen(nth(branch, 0)?, global, scope, e, ctx),
        other => Err(malformed(other, "unrecognized production")),
    }
}

/// Walks an expression-valued production, leaving exactly one word on the
/// stack and `ctx.stack_depth` incremented to match.
fn gen_expr(node: &Node, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    gen(node, global, scope, e, ctx)
}

fn primary_expr(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => {
            let leaf = as_leaf(nth(branch, 0)?, "<primarni_izraz>")?;
            match leaf.symbol.as_str() {
                "IDN" => {
                    let Some((addr, obj)) = addr::resolve(scope, &leaf.lexeme, ctx.stack_depth) else {
                        // A bare function name outside a call reaches here
                        // only if frisc-sem already rejected it as a value;
                        // nothing to emit.
                        return Ok(());
                    };
                    if obj.is_fn {
                        return Ok(());
                    }
                    e.instr(format!("LOAD R1, {}", addr_label(&addr)));
                    ctx.push(e, "R1");
                    Ok(())
                }
                "BROJ" => {
                    let minus = std::mem::take(&mut ctx.minus_pending);
                    let value = frisc_sem::literal::parse_int(&leaf.lexeme, minus)
                        .ok_or_else(|| malformed("BROJ", "literal frisc-sem already validated failed to parse"))?;
                    emit_int_literal(value, e, ctx);
                    Ok(())
                }
                "ZNAK" => {
                    let mut value = znak_code(&leaf.lexeme);
                    if std::mem::take(&mut ctx.minus_pending) {
                        value = -value;
                    }
                    e.instr(format!("MOVE %D {value}, R1"));
                    ctx.push(e, "R1");
                    Ok(())
                }
                "NIZ_ZNAKOVA" => Err(malformed(
                    "NIZ_ZNAKOVA",
                    "a string literal used as a value (outside an initializer) has no backing storage in this target",
                )),
                other => Err(malformed(other, "unexpected terminal in <primarni_izraz>")),
            }
        }
        3 => gen_expr(nth(branch, 1)?, global, scope, e, ctx),
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn postfix_expr(node: &Node, branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => gen(nth(branch, 0)?, global, scope, e, ctx),
        2 => {
            // `++`/`--` on a resolvable lvalue; yields the *old* value.
            // Restricted to plain identifiers: an array-indexed target
            // would need its index expression evaluated twice (address,
            // then re-addressed after the push).
            let leaf = as_leaf(nth(branch, 1)?, "<postfiks_izraz>")?;
            let target = resolve_ltarget(nth(branch, 0)?, global, scope, e, ctx)?;
            let LTarget::Plain(name) = target else {
                return Err(malformed(&branch.symbol, "++/-- on an array element is not supported"));
            };
            load_ltarget(&LTarget::Plain(name.clone()), scope, e, ctx)?;
            ctx.push(e, "R1");
            let op = if leaf.symbol == "OP_INC" { "ADD" } else { "SUB" };
            e.instr("MOVE %D 1, R2");
            e.instr(format!("{op} R1, R2, R1"));
            store_ltarget(LTarget::Plain(name), "R1", scope, e, ctx)?;
            Ok(())
        }
        3 => {
            // Zero-argument function call.
            let name = callee_name(nth(branch, 0)?)
                .ok_or_else(|| malformed(&branch.symbol, "call target is not a plain identifier"))?;
            emit_call(name, 0, global, e, ctx)
        }
        4 => {
            let third = nth(branch, 2)?;
            if third.symbol() == "<izraz>" {
                let target = resolve_ltarget(node, global, scope, e, ctx)?;
                load_ltarget(&target, scope, e, ctx)?;
                ctx.push(e, "R1");
                Ok(())
            } else {
                let name = callee_name(nth(branch, 0)?)
                    .ok_or_else(|| malformed(&branch.symbol, "call target is not a plain identifier"))?;
                let count = argument_list(as_branch(third, "<lista_argumenata>")?, global, scope, e, ctx)?;
                emit_call(name, count, global, e, ctx)
            }
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn emit_call(name: &str, arg_count: u32, global: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    e.instr(format!("CALL F_{name}"));
    if arg_count > 0 {
        e.instr(format!("ADD R7, %D {}, R7", 4 * arg_count));
        ctx.stack_depth -= arg_count as i32;
    }
    let func = frisc_sem::scope::resolve(global, name).map(|(_, obj)| obj);
    if let Some(func) = func {
        if func.base != Base::Void {
            ctx.push(e, "R6");
        }
    }
    Ok(())
}

fn argument_list(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<u32> {
    match branch.children.len() {
        1 => {
            gen_expr(nth(branch, 0)?, global, scope, e, ctx)?;
            Ok(1)
        }
        3 => {
            let rest = argument_list(as_branch(nth(branch, 0)?, "<lista_argumenata>")?, global, scope, e, ctx)?;
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)?;
            Ok(rest + 1)
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn unary_expr(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => gen(nth(branch, 0)?, global, scope, e, ctx),
        2 => {
            let second = nth(branch, 1)?;
            if second.symbol() == "<unarni_izraz>" {
                // Prefix `++`/`--`: yields the *new* value.
                let leaf = as_leaf(nth(branch, 0)?, "<unarni_izraz>")?;
                let op = leaf_of_unary_prefix(leaf)?;
                let target = resolve_ltarget(second, global, scope, e, ctx)?;
                let LTarget::Plain(_) = &target else {
                    return Err(malformed(&branch.symbol, "++/-- on an array element is not supported"));
                };
                load_ltarget(&target, scope, e, ctx)?;
                e.instr("MOVE %D 1, R2");
                e.instr(format!("{op} R1, R2, R1"));
                store_ltarget(target, "R1", scope, e, ctx)?;
                ctx.push(e, "R1");
                Ok(())
            } else {
                gen(nth(branch, 0)?, global, scope, e, ctx)?;
                let had_minus = ctx.minus_pending;
                gen_expr(second, global, scope, e, ctx)?;
                if had_minus && ctx.minus_pending {
                    // The operand wasn't a literal (those already fold the
                    // sign in while materializing), so negate at runtime.
                    ctx.minus_pending = false;
                    ctx.pop(e, "R1");
                    e.instr("MOVE %D 0, R2");
                    e.instr("SUB R2, R1, R1");
                    ctx.push(e, "R1");
                }
                Ok(())
            }
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

/// Only `MINUS` carries meaning here; this dialect has no unary `+`/`!`/`~`
/// (mirrors `frisc-sem`'s own `unary_operator`, which checks for nothing
/// else either).
fn unary_operator(branch: &Branch, ctx: &mut GenCtx) -> Result<()> {
    let leaf = as_leaf(nth(branch, 0)?, "<unarni_operator>")?;
    if leaf.symbol == "MINUS" {
        ctx.minus_pending = true;
    }
    Ok(())
}

fn leaf_of_unary_prefix(leaf: &Leaf) -> Result<&'static str> {
    match leaf.symbol.as_str() {
        "OP_INC" => Ok("ADD"),
        "OP_DEC" => Ok("SUB"),
        other => Err(malformed(other, "unexpected prefix operator")),
    }
}

fn cast_expr(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => gen(nth(branch, 0)?, global, scope, e, ctx),
        // `( <ime_tipa> ) <cast_izraz>`: INT and CHAR share one word of
        // representation on this target, so a cast is a pure type-system
        // fiction at runtime: only the value survives.
        4 => gen_expr(nth(branch, 3)?, global, scope, e, ctx),
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn binary_expr(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => gen(nth(branch, 0)?, global, scope, e, ctx),
        3 => {
            gen_expr(nth(branch, 0)?, global, scope, e, ctx)?;
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)?;
            let op_leaf = as_leaf(nth(branch, 1)?, &branch.symbol)?;
            match branch.symbol.as_str() {
                "<multiplikativni_izraz>" => {
                    ctx.pop(e, "R2");
                    ctx.pop(e, "R1");
                    e.instr("MUL R1, R2, R1");
                    ctx.push(e, "R1");
                }
                "<aditivni_izraz>" => {
                    ctx.pop(e, "R2");
                    ctx.pop(e, "R1");
                    let op = if op_leaf.symbol == "PLUS" { "ADD" } else { "SUB" };
                    e.instr(format!("{op} R1, R2, R1"));
                    ctx.push(e, "R1");
                }
                "<odnosni_izraz>" => {
                    ctx.pop(e, "R2");
                    ctx.pop(e, "R1");
                    e.instr("CMP R1, R2");
                    let jp = match op_leaf.symbol.as_str() {
                        "OP_LT" => "JP_SLT",
                        "OP_GT" => "JP_SGT",
                        "OP_LTE" => "JP_SLE",
                        "OP_GTE" => "JP_SGE",
                        other => return Err(malformed(other, "unexpected relational operator")),
                    };
                    emit_bool_result(jp, e, ctx);
                }
                "<jednakosni_izraz>" => {
                    ctx.pop(e, "R2");
                    ctx.pop(e, "R1");
                    if op_leaf.symbol == "OP_EQ" {
                        e.instr("CMP R1, R2");
                        emit_bool_result("JP_EQ", e, ctx);
                    } else {
                        e.instr("SUB R1, R2, R1");
                        ctx.push(e, "R1");
                    }
                }
                "<bin_i_izraz>" => {
                    ctx.pop(e, "R2");
                    ctx.pop(e, "R1");
                    e.instr("AND R1, R2, R1");
                    ctx.push(e, "R1");
                }
                "<bin_xili_izraz>" => {
                    ctx.pop(e, "R2");
                    ctx.pop(e, "R1");
                    e.instr("XOR R1, R2, R1");
                    ctx.push(e, "R1");
                }
                "<bin_ili_izraz>" => {
                    ctx.pop(e, "R2");
                    ctx.pop(e, "R1");
                    e.instr("OR R1, R2, R1");
                    ctx.push(e, "R1");
                }
                other => return Err(malformed(other, "unexpected binary production")),
            }
            Ok(())
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

/// `CMP` already ran; `jp` is the conditional jump to the true branch. Only
/// one of the two `PUSH`es below ever executes, so the stack effect is a
/// single word either way.
fn emit_bool_result(jp: &str, e: &mut Emitter, ctx: &mut GenCtx) {
    let l = ctx.next_label();
    e.instr(format!("{jp} J_{l}"));
    e.instr("MOVE %D 0, R1");
    e.instr("PUSH R1");
    e.instr(format!("JP J_{}", l + 1));
    e.label(format!("J_{l}"));
    e.instr("MOVE %D 1, R1");
    e.instr("PUSH R1");
    e.label(format!("J_{}", l + 1));
    ctx.stack_depth += 1;
}

fn short_circuit(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    e: &mut Emitter,
    ctx: &mut GenCtx,
    is_and: bool,
) -> Result<()> {
    match branch.children.len() {
        1 => gen(nth(branch, 0)?, global, scope, e, ctx),
        3 => {
            let l = ctx.next_label();
            let short_circuit_label = format!("J_{l}");
            let end_label = format!("J_{}", l + 1);
            gen_expr(nth(branch, 0)?, global, scope, e, ctx)?;
            ctx.pop(e, "R1");
            e.instr("CMP R1, %D 0");
            e.instr(format!("{} {short_circuit_label}", if is_and { "JP_Z" } else { "JP_NZ" }));
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)?;
            ctx.pop(e, "R1");
            e.instr("CMP R1, %D 0");
            e.instr(format!("{} {short_circuit_label}", if is_and { "JP_Z" } else { "JP_NZ" }));
            // Only one of the two `PUSH`es executes on any path, so the
            // depth bookkeeping counts a single word (same as
            // `emit_bool_result`).
            e.instr(format!("MOVE %D {}, R1", if is_and { 1 } else { 0 }));
            e.instr("PUSH R1");
            e.instr(format!("JP {end_label}"));
            e.label(&short_circuit_label);
            e.instr(format!("MOVE %D {}, R1", if is_and { 0 } else { 1 }));
            e.instr("PUSH R1");
            e.label(&end_label);
            ctx.stack_depth += 1;
            Ok(())
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn assignment_expr(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => gen(nth(branch, 0)?, global, scope, e, ctx),
        3 => {
            let target = resolve_ltarget(nth(branch, 0)?, global, scope, e, ctx)?;
            let protect = matches!(target, LTarget::IndexedInR1);
            if protect {
                ctx.push(e, "R1");
            }
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)?;
            ctx.pop(e, "R1");
            store_ltarget(target, "R1", scope, e, ctx)?;
            ctx.push(e, "R1");
            Ok(())
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn comma_expr(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => gen(nth(branch, 0)?, global, scope, e, ctx),
        3 => {
            let before = ctx.stack_depth;
            gen_expr(nth(branch, 0)?, global, scope, e, ctx)?;
            if ctx.stack_depth > before {
                ctx.pop(e, "R1");
            }
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

/// Matches `frisc-sem`'s `Block::visited`/`fn_name` navigation exactly: a
/// function's own root body scope is found by name, a plain nested block
/// by position (the next unvisited child, in the order `frisc-sem` built
/// them).
fn next_child_scope(scope: &ScopeRef, pending_function: Option<&str>) -> Result<ScopeRef> {
    let children = scope.borrow().children.clone();
    if let Some(name) = pending_function {
        let sym = Symbol::intern(name);
        children
            .into_iter()
            .find(|c| c.borrow().fn_name == Some(sym))
            .ok_or_else(|| malformed("<slozena_naredba>", "no scope recorded for this function body"))
    } else {
        children
            .into_iter()
            .find(|c| !c.borrow().visited.get())
            .ok_or_else(|| malformed("<slozena_naredba>", "no unvisited child scope left to descend into"))
    }
}

fn compound_stmt(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    let pending = ctx.pending_function.take();
    let is_function_root = pending.is_some();
    let body_scope = next_child_scope(scope, pending.as_deref())?;

    if let Some(name) = &pending {
        e.blank();
        e.label(format!("F_{name}"));
        debug!(function = %name, locals = body_scope.borrow().table.len(), "emitting function body");
        let locals = body_scope.borrow().table.len();
        if locals > 0 {
            e.instr(format!("SUB R7, %D {}, R7", 4 * locals));
        }
        let param_names = body_scope.borrow().param_names.clone();
        for (i, pname) in param_names.iter().enumerate().rev() {
            let j = body_scope.borrow().table.get_index_of(pname).expect("parameter always present in its own scope");
            e.instr(format!("LOAD R1, (R7+{})", 4 * (locals + param_names.len() - i)));
            e.instr(format!("STORE R1, (R7+{})", 4 * j));
        }
    } else {
        let locals = body_scope.borrow().table.len();
        if locals > 0 {
            e.instr(format!("SUB R7, %D {}, R7", 4 * locals));
        }
    }

    match branch.children.len() {
        2 => {}
        3 => gen(nth(branch, 1)?, global, &body_scope, e, ctx)?,
        4 => {
            gen(nth(branch, 1)?, global, &body_scope, e, ctx)?;
            gen(nth(branch, 2)?, global, &body_scope, e, ctx)?;
        }
        _ => return Err(malformed(&branch.symbol, "unexpected arity")),
    }

    if !is_function_root {
        let locals = body_scope.borrow().table.len();
        if locals > 0 {
            e.instr(format!("ADD R7, %D {}, R7", 4 * locals));
        }
    } else {
        // Every function falls through to a defensive epilogue even if it
        // has no explicit `return` on this path (always true for `void`
        // functions, and a correctness net for `int`/`char` ones too).
        let total = addr::frame_size_to_function_root(&body_scope);
        e.instr(format!("ADD R7, %D {total}, R7"));
        e.instr("RET");
    }
    body_scope.borrow().visited.set(true);
    Ok(())
}

fn expr_stmt(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        1 => Ok(()),
        2 => {
            // A call to a `void` function is the one expression that leaves
            // nothing behind, so the discarding pop is conditional on the
            // depth actually having grown.
            let before = ctx.stack_depth;
            gen_expr(nth(branch, 0)?, global, scope, e, ctx)?;
            if ctx.stack_depth > before {
                ctx.pop(e, "R1");
            }
            Ok(())
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn branch_stmt(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        5 => {
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)?;
            ctx.pop(e, "R1");
            e.instr("CMP R1, 0");
            let l = ctx.next_label();
            e.instr(format!("JP_Z J_{l}"));
            gen(nth(branch, 4)?, global, scope, e, ctx)?;
            e.label(format!("J_{l}"));
            Ok(())
        }
        7 => {
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)?;
            ctx.pop(e, "R1");
            e.instr("CMP R1, 0");
            let l = ctx.next_label();
            e.instr(format!("JP_Z J_{l}"));
            gen(nth(branch, 4)?, global, scope, e, ctx)?;
            // An unconditional jump terminates the then-branch so a true
            // condition never falls into the else-branch.
            e.instr(format!("JP J_{}", l + 1));
            e.label(format!("J_{l}"));
            gen(nth(branch, 6)?, global, scope, e, ctx)?;
            e.label(format!("J_{}", l + 1));
            Ok(())
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn loop_stmt(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    let l = ctx.next_label();
    let top = format!("J_{l}");
    let end = format!("J_{}", l + 1);
    match branch.children.len() {
        5 => {
            // `while ( <izraz> ) <naredba>`
            e.label(&top);
            gen_expr(nth(branch, 2)?, global, scope, e, ctx)?;
            ctx.pop(e, "R1");
            e.instr("CMP R1, 0");
            e.instr(format!("JP_Z {end}"));
            ctx.loop_labels.push((top.clone(), end.clone()));
            gen(nth(branch, 4)?, global, scope, e, ctx)?;
            ctx.loop_labels.pop();
            e.instr(format!("JP {top}"));
            e.label(&end);
            Ok(())
        }
        6 => {
            // `for ( <izraz_naredba> <izraz_naredba> ) <naredba>`: no
            // increment clause, so `continue` re-tests the condition.
            expr_stmt_like(nth(branch, 2)?, global, scope, e, ctx)?;
            e.label(&top);
            gen_condition_stmt(nth(branch, 3)?, global, scope, e, ctx, &end)?;
            ctx.loop_labels.push((top.clone(), end.clone()));
            gen(nth(branch, 5)?, global, scope, e, ctx)?;
            ctx.loop_labels.pop();
            e.instr(format!("JP {top}"));
            e.label(&end);
            Ok(())
        }
        7 => {
            // `for ( <izraz_naredba> <izraz_naredba> <izraz> ) <naredba>`:
            // the middle `<izraz_naredba>` is the loop condition, evaluated
            // (not discarded) each time round; `continue` has to land on
            // the increment step, not the condition test, so it gets its
            // own label.
            let incr_label = format!("J_{}", ctx.next_label());
            expr_stmt_like(nth(branch, 2)?, global, scope, e, ctx)?;
            e.label(&top);
            gen_condition_stmt(nth(branch, 3)?, global, scope, e, ctx, &end)?;
            ctx.loop_labels.push((incr_label.clone(), end.clone()));
            gen(nth(branch, 6)?, global, scope, e, ctx)?;
            ctx.loop_labels.pop();
            e.label(&incr_label);
            // The increment is a bare `<izraz>`, evaluated for effect only
            // (a void call leaves nothing to discard).
            let before = ctx.stack_depth;
            gen_expr(nth(branch, 4)?, global, scope, e, ctx)?;
            if ctx.stack_depth > before {
                ctx.pop(e, "R1");
            }
            e.instr(format!("JP {top}"));
            e.label(&end);
            Ok(())
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

/// `<izraz_naredba>` used as a `for`-clause: evaluate for side effects
/// only, discarding any value the way a real expression statement would.
fn expr_stmt_like(node: &Node, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    let branch = as_branch(node, "<izraz_naredba>")?;
    expr_stmt(branch, global, scope, e, ctx)
}

/// `<izraz_naredba>` used as a `for`-clause's *condition*: evaluate and
/// branch to `end` when false, instead of discarding the value.
fn gen_condition_stmt(node: &Node, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx, end: &str) -> Result<()> {
    let branch = as_branch(node, "<izraz_naredba>")?;
    if branch.children.len() == 1 {
        // `for (...; ; ...)`: an omitted condition is always true.
        return Ok(());
    }
    gen_expr(nth(branch, 0)?, global, scope, e, ctx)?;
    ctx.pop(e, "R1");
    e.instr("CMP R1, 0");
    e.instr(format!("JP_Z {end}"));
    Ok(())
}

fn jump_stmt(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    match branch.children.len() {
        2 => {
            let keyword = as_leaf(nth(branch, 0)?, "<naredba_skoka>")?;
            match keyword.symbol.as_str() {
                "KR_RETURN" => {
                    let total = addr::frame_size_to_function_root(scope);
                    e.instr(format!("ADD R7, %D {total}, R7"));
                    e.instr("RET");
                }
                "KR_CONTINUE" => {
                    let (cont, _) = ctx.loop_labels.last().cloned().ok_or_else(|| {
                        malformed(&branch.symbol, "continue outside a loop should have been rejected during analysis")
                    })?;
                    e.instr(format!("JP {cont}"));
                }
                "KR_BREAK" => {
                    let (_, brk) = ctx.loop_labels.last().cloned().ok_or_else(|| {
                        malformed(&branch.symbol, "break outside a loop should have been rejected during analysis")
                    })?;
                    e.instr(format!("JP {brk}"));
                }
                other => return Err(malformed(other, "unexpected jump keyword")),
            }
            Ok(())
        }
        3 => {
            gen_expr(nth(branch, 1)?, global, scope, e, ctx)?;
            ctx.pop(e, "R6");
            let total = addr::frame_size_to_function_root(scope);
            e.instr(format!("ADD R7, %D {total}, R7"));
            e.instr("RET");
            Ok(())
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

fn function_definition(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    let name_leaf = as_leaf(nth(branch, 1)?, "<definicija_funkcije>")?;
    ctx.pending_function = Some(name_leaf.lexeme.clone());
    let body = nth(branch, branch.children.len() - 1)?;
    gen(body, global, scope, e, ctx)
}

fn init_declarator(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, e: &mut Emitter, ctx: &mut GenCtx) -> Result<()> {
    let is_global = scope.borrow().parent.upgrade().is_none();
    let name = declarator_name(nth(branch, 0)?)?;
    match branch.children.len() {
        1 => {
            if is_global {
                e.blank();
                e.label(format!("G_{name}\tDW %D 0"));
            }
            Ok(())
        }
        3 => {
            let init = nth(branch, 2)?;
            if is_global {
                emit_global_initializer(name, init, e);
                Ok(())
            } else {
                // Array initializers on a local have no per-element address
                // under this frame model (a local occupies one stack slot
                // regardless of declared size): only a scalar initializer
                // has anywhere to store to.
                if initializer_values(init).len() > 1 {
                    return Ok(());
                }
                let Some((addr, _)) = addr::resolve(scope, name, ctx.stack_depth) else {
                    return Err(malformed("IDN", "declared local missing from its own scope"));
                };
                gen_expr(init, global, scope, e, ctx)?;
                ctx.pop(e, "R1");
                e.instr(format!("STORE R1, {}", addr_label(&addr)));
                Ok(())
            }
        }
        _ => Err(malformed(&branch.symbol, "unexpected arity")),
    }
}

/// Folds an `<inicijalizator>` to the sequence of `i32`s it contributes to a
/// global's `DW` lines: one value for a scalar or string-literal
/// initializer (the string's case unfolds to N+1 character codes, the
/// trailing NUL included), or one per element of a brace-enclosed list.
fn initializer_values(node: &Node) -> Vec<i32> {
    let unwrapped = unwrap_single_child(node);
    if let Node::Leaf(l) = unwrapped {
        if l.symbol == "NIZ_ZNAKOVA" {
            return string_literal_codes(&l.lexeme);
        }
    }
    if let Node::Branch(b) = node {
        if b.symbol == "<inicijalizator>" && b.children.len() == 3 {
            return assignment_list_values(&b.children[1]);
        }
    }
    vec![fold_const_int(node).unwrap_or(0)]
}

fn assignment_list_values(node: &Node) -> Vec<i32> {
    match node {
        Node::Branch(b) if b.symbol == "<lista_izraza_pridruzivanja>" && b.children.len() == 3 => {
            let mut values = assignment_list_values(&b.children[0]);
            values.push(fold_const_int(&b.children[2]).unwrap_or(0));
            values
        }
        other => vec![fold_const_int(other).unwrap_or(0)],
    }
}

fn emit_global_initializer(name: &str, init: &Node, e: &mut Emitter) {
    let values = initializer_values(init);
    e.blank();
    let mut values = values.into_iter();
    let first = values.next().unwrap_or(0);
    e.label(format!("G_{name}\tDW %D {first}"));
    for value in values {
        e.instr(format!("DW %D {value}"));
    }
}

fn declarator_name(node: &Node) -> Result<&str> {
    let branch = as_branch(node, "<izravni_deklarator>")?;
    Ok(&as_leaf(nth(branch, 0)?, "<izravni_deklarator>")?.lexeme)
}
