//! The single recursive pre-order walk that type-checks a parse tree and
//! builds the scope tree alongside it.
//!
//! Every production handler returns the synthesized attributes a parent
//! production needs ([`Attrs`]). Inherited attributes (a pending unary
//! minus, a function header waiting to hand its parameters to the body's
//! scope) are carried explicitly in [`WalkCtx`], passed by `&mut` down
//! the recursion rather than living in ambient globals.

use frisc_tree::{Branch, Leaf, Node};
use frisc_util::Symbol;
use tracing::debug;

use crate::error::{Result, SemError};
use crate::literal;
use crate::object::{Base, Object};
use crate::scope::{self, ScopeRef, ScopeTree};

/// Synthesized attributes a production hands back to its parent.
#[derive(Clone, Debug, Default)]
pub struct Attrs {
    pub ty: Object,
    pub l_value: bool,
    pub amount: i32,
    pub arguments: Vec<Object>,
    pub argument_names: Vec<String>,
}

impl Attrs {
    fn of(ty: Object) -> Self {
        Attrs { ty, ..Default::default() }
    }
}

/// A function header's return type and parameter list, captured while
/// walking `<definicija_funkcije>` and handed to the body's
/// `<slozena_naredba>` so its scope can seed its own table.
struct PendingFunction {
    fn_name: String,
    ret: Base,
    params: Vec<(String, Object)>,
}

#[derive(Default)]
struct WalkCtx {
    /// Set by a `<unarni_operator>` MINUS leaf for the `BROJ` literal that
    /// follows it two levels down in the same `<unarni_izraz>`.
    minus_pending: bool,
    pending_function: Option<PendingFunction>,
}

/// Runs the walk over a full parse tree, returning the completed scope
/// tree on success.
pub fn analyze(tree: &Node) -> Result<ScopeTree> {
    let scopes = ScopeTree::new();
    let mut ctx = WalkCtx::default();
    walk(tree, &scopes.root, &scopes.root, false, &mut ctx)?;
    check_main(&scopes.root)?;
    check_function_definitions(&scopes.root, &scopes.root)?;
    debug!(globals = scopes.root.borrow().table.len(), "semantic analysis passed");
    Ok(scopes)
}

fn as_branch<'t>(node: &'t Node, context: &str) -> Result<&'t Branch> {
    node.as_branch().ok_or_else(|| SemError::MalformedTree {
        symbol: node.symbol().to_string(),
        reason: format!("expected a nonterminal while walking {context}"),
    })
}

fn as_leaf<'t>(node: &'t Node, context: &str) -> Result<&'t Leaf> {
    node.as_leaf().ok_or_else(|| SemError::MalformedTree {
        symbol: node.symbol().to_string(),
        reason: format!("expected a terminal while walking {context}"),
    })
}

fn nth<'t>(branch: &'t Branch, index: usize) -> Result<&'t Node> {
    branch.children.get(index).ok_or_else(|| SemError::MalformedTree {
        symbol: branch.symbol.clone(),
        reason: format!("production has no child {index}"),
    })
}

fn format_production(branch: &Branch) -> String {
    let mut out = format!("{} ::=", branch.symbol);
    for child in &branch.children {
        match child {
            Node::Branch(b) => {
                out.push(' ');
                out.push_str(&b.symbol);
            }
            Node::Leaf(l) => {
                out.push(' ');
                out.push_str(&format!("{}({},{})", l.symbol, l.line.get(), l.lexeme));
            }
        }
    }
    out
}

fn prod_err(branch: &Branch) -> SemError {
    SemError::Production { production: format_production(branch) }
}

/// Declarator productions only make sense under a `<deklaracija>` that
/// supplies the declared type; a tree that reaches one any other way is
/// malformed.
fn declarator_outside_declaration(branch: &Branch) -> SemError {
    SemError::MalformedTree {
        symbol: branch.symbol.clone(),
        reason: "declarator reached without an enclosing declaration".to_string(),
    }
}

/// Dispatches on a branch's nonterminal symbol. `global` is the root scope
/// (functions always live there, regardless of `scope`, the lexically
/// current one).
fn walk(node: &Node, global: &ScopeRef, scope: &ScopeRef, in_loop: bool, ctx: &mut WalkCtx) -> Result<Attrs> {
    let branch = as_branch(node, "a production")?;
    match branch.symbol.as_str() {
        "<primarni_izraz>" => primary_expr(branch, global, scope, in_loop, ctx),
        "<postfiks_izraz>" => postfix_expr(branch, global, scope, in_loop, ctx),
        "<lista_argumenata>" => argument_list(branch, global, scope, in_loop, ctx),
        "<unarni_izraz>" => unary_expr(branch, global, scope, in_loop, ctx),
        "<unarni_operator>" => unary_operator(branch, ctx),
        "<cast_izraz>" => cast_expr(branch, global, scope, in_loop, ctx),
        "<ime_tipa>" => type_name(branch, global, scope, in_loop, ctx),
        "<specifikator_tipa>" => type_specifier(branch),
        "<multiplikativni_izraz>" | "<aditivni_izraz>" | "<odnosni_izraz>" | "<jednakosni_izraz>"
        | "<bin_i_izraz>" | "<bin_xili_izraz>" | "<bin_ili_izraz>" | "<log_i_izraz>"
        | "<log_ili_izraz>" => binary_int_expr(branch, global, scope, in_loop, ctx),
        "<izraz_pridruzivanja>" => assignment_expr(branch, global, scope, in_loop, ctx),
        "<izraz>" => comma_expr(branch, global, scope, in_loop, ctx),
        "<slozena_naredba>" => compound_stmt(branch, global, scope, in_loop, ctx),
        "<lista_naredbi>" => statement_list(branch, global, scope, in_loop, ctx),
        "<naredba>" => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        "<izraz_naredba>" => expr_stmt(branch, global, scope, in_loop, ctx),
        "<naredba_grananja>" => branch_stmt(branch, global, scope, in_loop, ctx),
        "<naredba_petlje>" => loop_stmt(branch, global, scope, ctx),
        "<naredba_skoka>" => jump_stmt(branch, global, scope, in_loop, ctx),
        "<prijevodna_jedinica>" => translation_unit(branch, global, scope, in_loop, ctx),
        "<vanjska_deklaracija>" => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        "<definicija_funkcije>" => function_definition(branch, global, scope, in_loop, ctx),
        "<lista_parametara>" => parameter_list(branch, global, scope, in_loop, ctx),
        "<deklaracija_parametra>" => parameter_decl(branch, global, scope, in_loop, ctx),
        "<lista_deklaracija>" => declaration_list(branch, global, scope, in_loop, ctx),
        "<deklaracija>" => declaration(branch, global, scope, in_loop, ctx),
        "<lista_init_deklaratora>" => init_declarator_list(branch, global, scope, in_loop, ctx, None),
        "<init_deklarator>" => init_declarator(branch, global, scope, in_loop, ctx, None),
        "<izravni_deklarator>" => direct_declarator(branch, global, scope, in_loop, ctx, None),
        "<inicijalizator>" => initializer(branch, global, scope, in_loop, ctx),
        "<lista_izraza_pridruzivanja>" => assignment_expr_list(branch, global, scope, in_loop, ctx),
        other => Err(SemError::MalformedTree {
            symbol: other.to_string(),
            reason: "unrecognized production".to_string(),
        }),
    }
}

fn primary_expr(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => {
            let leaf = as_leaf(nth(branch, 0)?, "<primarni_izraz>")?;
            match leaf.symbol.as_str() {
                "IDN" => {
                    let Some((_, obj)) = scope::resolve(scope, &leaf.lexeme) else {
                        return Err(prod_err(branch));
                    };
                    let l_value = crate::coerce::is_lvalue(&obj);
                    let ty = if obj.is_fn {
                        Object::function_reference(leaf.lexeme.clone(), obj.base, obj.params.clone())
                    } else {
                        obj
                    };
                    Ok(Attrs { ty, l_value, ..Default::default() })
                }
                "BROJ" => {
                    let minus = std::mem::take(&mut ctx.minus_pending);
                    if !literal::is_valid_int(&leaf.lexeme, minus) {
                        return Err(prod_err(branch));
                    }
                    Ok(Attrs::of(Object::int()))
                }
                "ZNAK" => {
                    if !literal::is_valid_char(&leaf.lexeme) {
                        return Err(prod_err(branch));
                    }
                    Ok(Attrs::of(Object::char_()))
                }
                "NIZ_ZNAKOVA" => {
                    let Some(amount) = literal::is_valid_char_array(&leaf.lexeme) else {
                        return Err(prod_err(branch));
                    };
                    Ok(Attrs {
                        ty: Object::const_char_array(),
                        amount: amount as i32,
                        ..Default::default()
                    })
                }
                _ => Err(SemError::MalformedTree {
                    symbol: leaf.symbol.clone(),
                    reason: "unexpected terminal in <primarni_izraz>".to_string(),
                }),
            }
        }
        3 => {
            // `( <izraz> )`
            let inner = walk(nth(branch, 1)?, global, scope, in_loop, ctx)?;
            Ok(Attrs { ty: inner.ty, l_value: inner.l_value, ..Default::default() })
        }
        _ => Err(SemError::MalformedTree {
            symbol: branch.symbol.clone(),
            reason: "unexpected arity".to_string(),
        }),
    }
}

fn postfix_expr(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        2 => {
            let operand = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            let int_ty = Object::int();
            if !operand.l_value || !crate::coerce::can_implicit(&operand.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            let mut ty = int_ty;
            ty.fn_name = operand.ty.fn_name.clone();
            Ok(Attrs { ty, l_value: false, ..Default::default() })
        }
        3 => {
            // Zero-argument function call: `<postfiks_izraz> ( )`.
            let callee = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            if !callee.ty.is_fn || !callee.ty.params.is_empty() {
                return Err(prod_err(branch));
            }
            if callee.ty.fn_name.is_empty() {
                return Err(prod_err(branch));
            }
            if let Some((_, func)) = scope::resolve(global, &callee.ty.fn_name) {
                if !func.is_fn || !func.params.is_empty() {
                    return Err(prod_err(branch));
                }
            }
            Ok(Attrs::of(Object::scalar(callee.ty.ret)))
        }
        4 => {
            let third = nth(branch, 2)?;
            if third.symbol() == "<izraz>" {
                // Array indexing: `<postfiks_izraz> [ <izraz> ]`.
                let array = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
                if array.ty.is_fn || !array.ty.array {
                    return Err(prod_err(branch));
                }
                let index = walk(third, global, scope, in_loop, ctx)?;
                if !crate::coerce::can_implicit(&index.ty, &Object::int()) {
                    return Err(prod_err(branch));
                }
                let elem = array.ty.without_const_or_array();
                let l_value = !elem.const_;
                let mut ty = elem;
                ty.fn_name = array.ty.fn_name.clone();
                Ok(Attrs { ty, l_value, ..Default::default() })
            } else {
                // Function call with arguments.
                let callee = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
                let args = walk(third, global, scope, in_loop, ctx)?;
                if !callee.ty.is_fn {
                    return Err(prod_err(branch));
                }
                if args.arguments.len() != callee.ty.params.len() {
                    return Err(prod_err(branch));
                }
                for (arg, param) in args.arguments.iter().zip(&callee.ty.params) {
                    if !crate::coerce::can_implicit(arg, param) {
                        return Err(prod_err(branch));
                    }
                }
                Ok(Attrs::of(Object::scalar(callee.ty.ret)))
            }
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn argument_list(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => {
            let arg = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            Ok(Attrs { arguments: vec![arg.ty], ..Default::default() })
        }
        3 => {
            let rest = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            let arg = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            let mut arguments = rest.arguments;
            arguments.push(arg.ty);
            Ok(Attrs { arguments, ..Default::default() })
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn unary_expr(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        2 => {
            let second = nth(branch, 1)?;
            let int_ty = Object::int();
            if second.symbol() == "<unarni_izraz>" {
                // `++`/`--` applied to an lvalue.
                let operand = walk(second, global, scope, in_loop, ctx)?;
                if !crate::coerce::is_lvalue(&operand.ty) || !crate::coerce::can_implicit(&operand.ty, &int_ty) {
                    return Err(prod_err(branch));
                }
                Ok(Attrs::of(int_ty))
            } else {
                // `<unarni_operator> <cast_izraz>`.
                walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
                let operand = walk(second, global, scope, in_loop, ctx)?;
                if !crate::coerce::can_implicit(&operand.ty, &int_ty) {
                    return Err(prod_err(branch));
                }
                Ok(Attrs::of(int_ty))
            }
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn unary_operator(branch: &Branch, ctx: &mut WalkCtx) -> Result<Attrs> {
    let leaf = as_leaf(nth(branch, 0)?, "<unarni_operator>")?;
    if leaf.symbol == "MINUS" {
        ctx.minus_pending = true;
    }
    Ok(Attrs::default())
}

fn cast_expr(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        4 => {
            let target = walk(nth(branch, 1)?, global, scope, in_loop, ctx)?;
            let source = walk(nth(branch, 3)?, global, scope, in_loop, ctx)?;
            if !crate::coerce::can_explicit(&source.ty, &target.ty) {
                return Err(prod_err(branch));
            }
            Ok(Attrs::of(target.ty))
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn type_name(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        2 => {
            let base = walk(nth(branch, 1)?, global, scope, in_loop, ctx)?;
            if base.ty.base == Base::Void {
                return Err(prod_err(branch));
            }
            Ok(Attrs::of(Object { const_: true, ..base.ty }))
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn type_specifier(branch: &Branch) -> Result<Attrs> {
    let leaf = as_leaf(nth(branch, 0)?, "<specifikator_tipa>")?;
    let base = match leaf.symbol.as_str() {
        "KR_VOID" => Base::Void,
        "KR_CHAR" => Base::Char,
        _ => Base::Int,
    };
    Ok(Attrs::of(Object::scalar(base)))
}

fn binary_int_expr(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        3 => {
            let lhs = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            let int_ty = Object::int();
            if !crate::coerce::can_implicit(&lhs.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            let rhs = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            if !crate::coerce::can_implicit(&rhs.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            Ok(Attrs::of(int_ty))
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn assignment_expr(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        3 => {
            let lhs = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            if !lhs.l_value {
                return Err(prod_err(branch));
            }
            let rhs = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            if !crate::coerce::can_implicit(&rhs.ty, &lhs.ty) {
                return Err(prod_err(branch));
            }
            Ok(Attrs::of(lhs.ty))
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn comma_expr(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => walk(nth(branch, 0)?, global, scope, in_loop, ctx),
        3 => {
            walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            let rhs = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            Ok(Attrs { ty: rhs.ty, l_value: false, ..Default::default() })
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn open_function_body(scope: &ScopeRef, ctx: &mut WalkCtx) -> Result<ScopeRef> {
    let child = ScopeTree::enter(scope);
    if let Some(pending) = ctx.pending_function.take() {
        child.borrow_mut().function = pending.ret;
        child.borrow_mut().fn_name = Some(Symbol::intern(&pending.fn_name));
        for (name, ty) in pending.params {
            let sym = Symbol::intern(&name);
            if child.borrow().table.contains_key(&sym) {
                return Err(SemError::MalformedTree {
                    symbol: "<slozena_naredba>".to_string(),
                    reason: format!("duplicate parameter `{name}`"),
                });
            }
            child.borrow_mut().param_names.push(sym);
            child.borrow_mut().table.insert(sym, ty);
        }
    }
    Ok(child)
}

fn compound_stmt(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    let body_scope = open_function_body(scope, ctx).map_err(|_| prod_err(branch))?;
    match branch.children.len() {
        3 => {
            walk(nth(branch, 1)?, global, &body_scope, in_loop, ctx)?;
        }
        4 => {
            walk(nth(branch, 1)?, global, &body_scope, in_loop, ctx)?;
            walk(nth(branch, 2)?, global, &body_scope, in_loop, ctx)?;
        }
        2 => {}
        _ => return Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
    Ok(Attrs::default())
}

fn statement_list(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    for child in &branch.children {
        walk(child, global, scope, in_loop, ctx)?;
    }
    Ok(Attrs::default())
}

fn expr_stmt(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => Ok(Attrs::of(Object::int())),
        2 => {
            let expr = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            Ok(Attrs::of(expr.ty))
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn branch_stmt(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    let int_ty = Object::int();
    match branch.children.len() {
        5 => {
            let cond = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            if !crate::coerce::can_implicit(&cond.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            walk(nth(branch, 4)?, global, scope, in_loop, ctx)?;
            Ok(Attrs::default())
        }
        7 => {
            let cond = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            if !crate::coerce::can_implicit(&cond.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            walk(nth(branch, 4)?, global, scope, in_loop, ctx)?;
            walk(nth(branch, 6)?, global, scope, in_loop, ctx)?;
            Ok(Attrs::default())
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn loop_stmt(branch: &Branch, global: &ScopeRef, scope: &ScopeRef, ctx: &mut WalkCtx) -> Result<Attrs> {
    let int_ty = Object::int();
    match branch.children.len() {
        5 => {
            // `while (<izraz>) <naredba>`
            let cond = walk(nth(branch, 2)?, global, scope, false, ctx)?;
            if !crate::coerce::can_implicit(&cond.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            walk(nth(branch, 4)?, global, scope, true, ctx)?;
            Ok(Attrs::default())
        }
        6 => {
            // `for` without an increment clause: the init expression
            // statement is unconstrained, the second one is the condition
            // (an empty `;` condition types as INT and so always passes).
            walk(nth(branch, 2)?, global, scope, false, ctx)?;
            let cond = walk(nth(branch, 3)?, global, scope, false, ctx)?;
            if !crate::coerce::can_implicit(&cond.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            walk(nth(branch, 5)?, global, scope, true, ctx)?;
            Ok(Attrs::default())
        }
        7 => {
            walk(nth(branch, 2)?, global, scope, false, ctx)?;
            let cond = walk(nth(branch, 3)?, global, scope, false, ctx)?;
            if !crate::coerce::can_implicit(&cond.ty, &int_ty) {
                return Err(prod_err(branch));
            }
            walk(nth(branch, 4)?, global, scope, false, ctx)?;
            walk(nth(branch, 6)?, global, scope, true, ctx)?;
            Ok(Attrs::default())
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn jump_stmt(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        2 => {
            let keyword = as_leaf(nth(branch, 0)?, "<naredba_skoka>")?;
            if keyword.symbol != "KR_RETURN" {
                if !in_loop {
                    return Err(prod_err(branch));
                }
            } else if scope::enclosing_function(scope) != Some(Base::Void) {
                return Err(prod_err(branch));
            }
            Ok(Attrs::default())
        }
        3 => {
            // `return <izraz> ;`: the enclosing function's return type
            // must be the nearest non-`NONE` `function` up the scope chain
            // and must be `CHAR` or `INT` (a `void` function returning a
            // value is rejected the same way an absent function is).
            let value = walk(nth(branch, 1)?, global, scope, in_loop, ctx)?;
            let enclosing = scope::enclosing_function(scope);
            match enclosing {
                Some(Base::Char) | Some(Base::Int) => {
                    let want = Object::scalar(enclosing.unwrap());
                    if !crate::coerce::can_implicit(&value.ty, &want) {
                        return Err(prod_err(branch));
                    }
                }
                _ => return Err(prod_err(branch)),
            }
            Ok(Attrs::default())
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn translation_unit(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    for child in &branch.children {
        walk(child, global, scope, in_loop, ctx)?;
    }
    Ok(Attrs::default())
}

fn function_definition(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    let ret_spec = nth(branch, 0)?;
    let name_leaf = as_leaf(nth(branch, 1)?, "<definicija_funkcije>")?;
    let fn_name = name_leaf.lexeme.clone();
    let is_void_params = nth(branch, 3)?.symbol() == "KR_VOID";

    let ret = walk(ret_spec, global, scope, in_loop, ctx)?;

    if is_void_params {
        if matches!(ret.ty.base, Base::Int | Base::Char) && !ret.ty.array && ret.ty.const_ {
            return Err(prod_err(branch));
        }
        let body = nth(branch, 5)?;
        register_function(global, branch, &fn_name, ret.ty.base, vec![])?;
        ctx.pending_function =
            Some(PendingFunction { fn_name: fn_name.clone(), ret: ret.ty.base, params: vec![] });
        walk(body, global, scope, in_loop, ctx)
    } else {
        if ret.ty.const_ {
            return Err(prod_err(branch));
        }
        let params_node = nth(branch, 3)?;
        let params_attrs = walk(params_node, global, scope, in_loop, ctx)?;
        let params: Vec<Object> = params_attrs.arguments.clone();
        register_function(global, branch, &fn_name, ret.ty.base, params.clone())?;
        let body = nth(branch, 5)?;
        let named_params = params_attrs
            .argument_names
            .iter()
            .cloned()
            .zip(params.iter().cloned())
            .collect();
        ctx.pending_function =
            Some(PendingFunction { fn_name: fn_name.clone(), ret: ret.ty.base, params: named_params });
        walk(body, global, scope, in_loop, ctx)
    }
}

fn register_function(
    global: &ScopeRef,
    branch: &Branch,
    fn_name: &str,
    ret: Base,
    params: Vec<Object>,
) -> Result<()> {
    let sym = Symbol::intern(fn_name);
    let existing = global.borrow().table.get(&sym).cloned();
    match existing {
        Some(func) => {
            if func.is_fn && func.defined {
                return Err(prod_err(branch));
            }
            if !func.is_fn || func.base != ret || func.params.len() != params.len() {
                return Err(prod_err(branch));
            }
            for (have, want) in func.params.iter().zip(&params) {
                if have.base != want.base {
                    return Err(prod_err(branch));
                }
            }
            global.borrow_mut().table.insert(sym, Object::function_decl(ret, params, true));
        }
        None => {
            global.borrow_mut().table.insert(sym, Object::function_decl(ret, params, true));
        }
    }
    Ok(())
}

fn parameter_list(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => {
            let p = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            Ok(Attrs { arguments: vec![p.ty], argument_names: p.argument_names, ..Default::default() })
        }
        3 => {
            let rest = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            let p = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            if rest.argument_names.iter().any(|n| Some(n) == p.argument_names.first()) {
                return Err(prod_err(branch));
            }
            let mut arguments = rest.arguments;
            arguments.push(p.ty);
            let mut argument_names = rest.argument_names;
            argument_names.extend(p.argument_names);
            Ok(Attrs { arguments, argument_names, ..Default::default() })
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn parameter_decl(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    let name_index = match branch.children.len() {
        2 => 1,
        4 => 1,
        _ => return Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    };
    let ty_attrs = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
    if ty_attrs.ty.base == Base::Void {
        return Err(prod_err(branch));
    }
    let name_leaf = as_leaf(nth(branch, name_index)?, "<deklaracija_parametra>")?;
    let ty = if branch.children.len() == 4 { ty_attrs.ty.as_array() } else { ty_attrs.ty };
    Ok(Attrs { ty, argument_names: vec![name_leaf.lexeme.clone()], ..Default::default() })
}

fn declaration_list(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    for child in &branch.children {
        walk(child, global, scope, in_loop, ctx)?;
    }
    Ok(Attrs::default())
}

fn declaration(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    let declared = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
    init_declarator_list(as_branch(nth(branch, 1)?, "<deklaracija>")?, global, scope, in_loop, ctx, Some(&declared.ty))
}

fn init_declarator_list(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
    declared: Option<&Object>,
) -> Result<Attrs> {
    let declared = declared.ok_or_else(|| declarator_outside_declaration(branch))?;
    match branch.children.len() {
        1 => init_declarator(as_branch(nth(branch, 0)?, "<lista_init_deklaratora>")?, global, scope, in_loop, ctx, Some(declared)),
        3 => {
            init_declarator_list(as_branch(nth(branch, 0)?, "<lista_init_deklaratora>")?, global, scope, in_loop, ctx, Some(declared))?;
            init_declarator(as_branch(nth(branch, 2)?, "<lista_init_deklaratora>")?, global, scope, in_loop, ctx, Some(declared))
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn init_declarator(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
    declared: Option<&Object>,
) -> Result<Attrs> {
    let declared = declared.ok_or_else(|| declarator_outside_declaration(branch))?;
    match branch.children.len() {
        1 => {
            let d = direct_declarator(as_branch(nth(branch, 0)?, "<init_deklarator>")?, global, scope, in_loop, ctx, Some(declared))?;
            if d.ty.const_ {
                return Err(prod_err(branch));
            }
            Ok(d)
        }
        3 => {
            let d = direct_declarator(as_branch(nth(branch, 0)?, "<init_deklarator>")?, global, scope, in_loop, ctx, Some(declared))?;
            let init = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            if matches!(d.ty.base, Base::Int | Base::Char) && !d.ty.array {
                if !crate::coerce::can_implicit(&init.ty, &d.ty.without_const()) {
                    return Err(prod_err(branch));
                }
            } else if matches!(d.ty.base, Base::Int | Base::Char) && d.ty.array {
                if init.amount > d.amount {
                    return Err(prod_err(branch));
                }
                let elem = d.ty.without_const_or_array();
                for arg in &init.arguments {
                    if !crate::coerce::can_implicit(arg, &elem) {
                        return Err(prod_err(branch));
                    }
                }
            }
            Ok(d)
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn direct_declarator(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
    declared: Option<&Object>,
) -> Result<Attrs> {
    let declared = declared.ok_or_else(|| declarator_outside_declaration(branch))?;
    match branch.children.len() {
        1 => {
            let name = as_leaf(nth(branch, 0)?, "<izravni_deklarator>")?;
            let sym = Symbol::intern(&name.lexeme);
            if declared.base == Base::Void {
                return Err(prod_err(branch));
            }
            if scope.borrow().table.contains_key(&sym) {
                return Err(prod_err(branch));
            }
            scope.borrow_mut().table.insert(sym, declared.clone());
            Ok(Attrs::of(declared.clone()))
        }
        4 => {
            let name = as_leaf(nth(branch, 0)?, "<izravni_deklarator>")?;
            let sym = Symbol::intern(&name.lexeme);
            let third = nth(branch, 2)?;
            if third.symbol() == "BROJ" {
                let size_leaf = as_leaf(third, "<izravni_deklarator>")?;
                if declared.base == Base::Void {
                    return Err(prod_err(branch));
                }
                if scope.borrow().table.contains_key(&sym) {
                    return Err(prod_err(branch));
                }
                if !literal::is_valid_array_size(&size_leaf.lexeme) {
                    return Err(prod_err(branch));
                }
                let array_ty = declared.as_array();
                scope.borrow_mut().table.insert(sym, array_ty.clone());
                let amount: i32 = size_leaf.lexeme.parse().unwrap_or(0);
                Ok(Attrs { ty: array_ty, amount, ..Default::default() })
            } else if third.symbol() == "KR_VOID" {
                let existing = scope.borrow().table.get(&sym).cloned();
                if let Some(func) = existing {
                    if !func.is_fn || !func.params.is_empty() || func.base != declared.base {
                        return Err(prod_err(branch));
                    }
                } else {
                    scope
                        .borrow_mut()
                        .table
                        .insert(sym, Object::function_decl(declared.base, vec![], false));
                }
                Ok(Attrs::of(Object::function_decl(declared.base, vec![], false)))
            } else {
                let params = walk(third, global, scope, in_loop, ctx)?;
                let existing = scope.borrow().table.get(&sym).cloned();
                if let Some(func) = existing {
                    if !func.is_fn || func.params.len() != params.arguments.len() || func.base != declared.base {
                        return Err(prod_err(branch));
                    }
                    for (have, want) in func.params.iter().zip(&params.arguments) {
                        if have.base != want.base {
                            return Err(prod_err(branch));
                        }
                    }
                } else {
                    scope.borrow_mut().table.insert(
                        sym,
                        Object::function_decl(declared.base, params.arguments.clone(), false),
                    );
                }
                Ok(Attrs::of(Object::function_decl(declared.base, params.arguments, false)))
            }
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn initializer(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => {
            let first = nth(branch, 0)?;
            let result = walk(first, global, scope, in_loop, ctx)?;
            if is_string_literal_chain(first) {
                let amount = result.amount + 1;
                let chars = vec![Object::char_(); amount as usize];
                Ok(Attrs { amount, arguments: chars, ..Default::default() })
            } else {
                Ok(Attrs::of(result.ty))
            }
        }
        3 => {
            let list = walk(nth(branch, 1)?, global, scope, in_loop, ctx)?;
            Ok(Attrs { amount: list.amount, arguments: list.arguments, ..Default::default() })
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

/// Walks down a chain of single-child productions (as an `<inicijalizator>`
/// reduces down to `<primarni_izraz>`) to see whether the literal at the
/// bottom is a `NIZ_ZNAKOVA`.
fn is_string_literal_chain(node: &Node) -> bool {
    let mut current = node;
    loop {
        match current {
            Node::Branch(b) if b.children.len() == 1 => current = &b.children[0],
            Node::Leaf(l) => return l.symbol == "NIZ_ZNAKOVA",
            _ => return false,
        }
    }
}

fn assignment_expr_list(
    branch: &Branch,
    global: &ScopeRef,
    scope: &ScopeRef,
    in_loop: bool,
    ctx: &mut WalkCtx,
) -> Result<Attrs> {
    match branch.children.len() {
        1 => {
            let a = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            Ok(Attrs { arguments: vec![a.ty], amount: 1, ..Default::default() })
        }
        3 => {
            let rest = walk(nth(branch, 0)?, global, scope, in_loop, ctx)?;
            let a = walk(nth(branch, 2)?, global, scope, in_loop, ctx)?;
            let mut arguments = rest.arguments;
            arguments.push(a.ty);
            Ok(Attrs { arguments, amount: rest.amount + 1, ..Default::default() })
        }
        _ => Err(SemError::MalformedTree { symbol: branch.symbol.clone(), reason: "unexpected arity".to_string() }),
    }
}

fn check_main(global: &ScopeRef) -> Result<()> {
    let main = global.borrow().table.get(&Symbol::intern("main")).cloned();
    match main {
        Some(obj) if obj.is_fn && obj.base == Base::Int && obj.params.is_empty() => Ok(()),
        _ => Err(SemError::MissingMain),
    }
}

fn check_function_definitions(block: &ScopeRef, global: &ScopeRef) -> Result<()> {
    let entries: Vec<(Symbol, Object)> =
        block.borrow().table.iter().map(|(k, v)| (*k, v.clone())).collect();
    for (name, func) in entries {
        if !func.is_fn {
            continue;
        }
        let found = global.borrow().table.get(&name).cloned();
        match found {
            Some(global_func) if global_func.is_fn && global_func.defined => {
                if func.base != global_func.base || func.params.len() != global_func.params.len() {
                    return Err(SemError::UndefinedFunction);
                }
                for (have, want) in func.params.iter().zip(&global_func.params) {
                    if have.base != want.base {
                        return Err(SemError::UndefinedFunction);
                    }
                }
            }
            _ => return Err(SemError::UndefinedFunction),
        }
    }
    let children: Vec<ScopeRef> = block.borrow().children.clone();
    for child in children {
        check_function_definitions(&child, global)?;
    }
    Ok(())
}
