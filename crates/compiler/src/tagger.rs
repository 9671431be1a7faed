//! Two-pass name resolution.
//!
//! Walk A assigns every [`Scope`] a [`ScopeInfo`] (the function list is
//! always empty in this revision; the field exists for the
//! not-yet-implemented user-defined-function case). Walk B resolves
//! every [`NameRef`]/`Assignment` against the lexical bindings visible
//! at that point, flagging unbound names, writes to immutable
//! bindings, and inner-function capture of an outer mutable binding.

use crate::ast::*;
use crate::error::{CompileError, CompileErrorKind};
use crate::state::CompilerState;
use std::collections::HashMap;

pub fn tag(scope: &mut Scope, st: &mut CompilerState) {
    walk_a_scope(scope);
    let mut ctx = ResolveCtx { current_func_id: MAIN_FUNC_ID, bindings: HashMap::new() };
    walk_b_scope(scope, &mut ctx, st);
}

fn walk_a_scope(scope: &mut Scope) {
    for stmt in &mut scope.statements {
        walk_a_stmt(stmt);
    }
    scope.info = Some(ScopeInfo::default());
}

fn walk_a_stmt(stmt: &mut Stmt) {
    match stmt {
        Stmt::NewScope { body, .. } => walk_a_scope(body),
        Stmt::IfStmt { body, orelse, .. } => {
            walk_a_scope(body);
            walk_a_scope(orelse);
        }
        Stmt::While { body, .. } => walk_a_scope(body),
        Stmt::Binding { init, .. } => walk_a_expr(init),
        Stmt::Assignment { src, .. } => walk_a_expr(src),
        Stmt::EvalExpr { expr, .. } => walk_a_expr(expr),
        Stmt::NoOp { .. } => {}
    }
}

fn walk_a_expr(expr: &mut Expr) {
    match expr {
        Expr::GetType { ex, .. } | Expr::Prim1 { ex1: ex, .. } => walk_a_expr(ex),
        Expr::Prim2 { left, right, .. } => {
            walk_a_expr(left);
            walk_a_expr(right);
        }
        Expr::Print { args, .. } | Expr::Input { args, .. } | Expr::RuntimeCall { args, .. } => {
            for a in args {
                walk_a_expr(a);
            }
        }
        Expr::ExprScope { scope, .. } => walk_a_scope(scope),
        Expr::IfExpr { test, body, orelse, .. } => {
            walk_a_expr(test);
            walk_a_expr(body);
            walk_a_expr(orelse);
        }
        Expr::Name(_)
        | Expr::Integer { .. }
        | Expr::Boolean { .. }
        | Expr::StringLiteral { .. }
        | Expr::TypeLiteral { .. }
        | Expr::Unit { .. }
        | Expr::Imm(_) => {}
    }
}

#[derive(Clone)]
struct ResolveCtx {
    current_func_id: FuncId,
    bindings: HashMap<String, VarId>,
}

fn walk_b_scope(scope: &mut Scope, ctx: &mut ResolveCtx, st: &mut CompilerState) {
    // Lexical shadowing is scope-local: siblings outside this scope must
    // not observe bindings introduced inside it.
    let mut inner = ctx.clone();
    for stmt in &mut scope.statements {
        walk_b_stmt(stmt, &mut inner, st);
    }
}

fn walk_b_stmt(stmt: &mut Stmt, ctx: &mut ResolveCtx, st: &mut CompilerState) {
    match stmt {
        Stmt::Binding { mutable, name, init, info, .. } => {
            walk_b_expr(init, ctx, st);
            let var_id = st.new_var(VarInfo::new(ctx.current_func_id, *mutable));
            *info = Some(var_id);
            ctx.bindings.insert(name.clone(), var_id);
        }
        Stmt::Assignment { name, src, target_span, info, .. } => {
            walk_b_expr(src, ctx, st);
            match ctx.bindings.get(name) {
                None => {
                    st.err(CompileError::new(CompileErrorKind::UnboundVar(name.clone()), *target_span));
                }
                Some(var_id) => {
                    *info = Some(*var_id);
                    if !st.var(*var_id).mutable {
                        st.err(CompileError::new(
                            CompileErrorKind::ImmutableVar(name.clone()),
                            *target_span,
                        ));
                    }
                }
            }
        }
        Stmt::EvalExpr { expr, .. } => walk_b_expr(expr, ctx, st),
        Stmt::NoOp { .. } => {}
        Stmt::NewScope { body, .. } => walk_b_scope(body, ctx, st),
        Stmt::IfStmt { test, body, orelse, .. } => {
            walk_b_expr(test, ctx, st);
            walk_b_scope(body, ctx, st);
            walk_b_scope(orelse, ctx, st);
        }
        Stmt::While { test, body, .. } => {
            walk_b_expr(test, ctx, st);
            walk_b_scope(body, ctx, st);
        }
    }
}

fn walk_b_expr(expr: &mut Expr, ctx: &mut ResolveCtx, st: &mut CompilerState) {
    match expr {
        Expr::Name(name_ref) => resolve_name(name_ref, ctx, st),
        Expr::GetType { ex, .. } | Expr::Prim1 { ex1: ex, .. } => walk_b_expr(ex, ctx, st),
        Expr::Prim2 { left, right, .. } => {
            walk_b_expr(left, ctx, st);
            walk_b_expr(right, ctx, st);
        }
        Expr::Print { args, .. } | Expr::Input { args, .. } | Expr::RuntimeCall { args, .. } => {
            for a in args {
                walk_b_expr(a, ctx, st);
            }
        }
        Expr::ExprScope { scope, .. } => walk_b_scope(scope, ctx, st),
        Expr::IfExpr { test, body, orelse, .. } => {
            walk_b_expr(test, ctx, st);
            walk_b_expr(body, ctx, st);
            walk_b_expr(orelse, ctx, st);
        }
        Expr::Integer { .. }
        | Expr::Boolean { .. }
        | Expr::StringLiteral { .. }
        | Expr::TypeLiteral { .. }
        | Expr::Unit { .. }
        | Expr::Imm(_) => {}
    }
}

fn resolve_name(name_ref: &mut NameRef, ctx: &ResolveCtx, st: &mut CompilerState) {
    let Some(&var_id) = ctx.bindings.get(&name_ref.name) else {
        st.err(CompileError::new(CompileErrorKind::UnboundVar(name_ref.name.clone()), name_ref.span));
        return;
    };
    name_ref.info = Some(var_id);
    let info = st.var(var_id);
    if info.mutable && info.origin_function_id != ctx.current_func_id {
        st.err(CompileError::new(
            CompileErrorKind::MutableClosureVar(name_ref.name.clone()),
            name_ref.span,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn resolves_binding_to_later_reference() {
        let mut scope = parse("val(x := 2)\nprint(x)").unwrap();
        let mut st = CompilerState::new();
        tag(&mut scope, &mut st);
        assert!(st.errors.is_empty());
        let Stmt::EvalExpr { expr: Expr::Print { args, .. }, .. } = &scope.statements[1] else {
            panic!("expected print statement")
        };
        let Expr::Name(n) = &args[0] else { panic!("expected name") };
        assert!(n.info.is_some());
    }

    #[test]
    fn flags_unbound_reference() {
        let mut scope = parse("print(x)").unwrap();
        let mut st = CompilerState::new();
        tag(&mut scope, &mut st);
        assert_eq!(st.errors.len(), 1);
        assert!(matches!(st.errors[0].kind, CompileErrorKind::UnboundVar(_)));
    }

    #[test]
    fn flags_assignment_to_immutable_binding() {
        let mut scope = parse("val(x := 1)\nx = 2").unwrap();
        let mut st = CompilerState::new();
        tag(&mut scope, &mut st);
        assert!(st.errors.iter().any(|e| matches!(e.kind, CompileErrorKind::ImmutableVar(_))));
    }

    #[test]
    fn allows_assignment_to_mutable_binding() {
        let mut scope = parse("var(x := 1)\nx = 2").unwrap();
        let mut st = CompilerState::new();
        tag(&mut scope, &mut st);
        assert!(st.errors.is_empty());
    }

    #[test]
    fn shadowing_is_scope_local() {
        let mut scope = parse("val(x := 1)\nwith _:\n    val(x := 2)\n    print(x)\nprint(x)").unwrap();
        let mut st = CompilerState::new();
        tag(&mut scope, &mut st);
        assert!(st.errors.is_empty());
    }
}
