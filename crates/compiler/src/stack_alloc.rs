//! Frame-offset assignment.
//!
//! A depth-first walk carrying a mutable "next offset" position,
//! initialized to 0. Entering a nested `Scope` (an `if`/`while` body,
//! a `with _:` block, or an `ExprScope` ANF introduced) forks the
//! position: the sub-scope is walked starting from the same value,
//! but its consumption never advances the position seen by the
//! sibling that follows the enclosing statement — only one branch of
//! an `if`, or one loop body iteration's temporaries, is ever live at
//! once. A `Binding` is the only thing that permanently consumes
//! frame space, and only after its initializer's own nested scopes
//! have been walked (so inner temporaries get offsets first).

use crate::ast::*;
use crate::state::CompilerState;

const SLOT_SIZE: i32 = 16;

pub fn allocate(function: &mut CompiledFunction, st: &mut CompilerState) {
    let mut min_offset = 0i32;
    walk_scope(&mut function.body, 0, &mut min_offset, st);
    function.stack_usage = round_up_16(min_offset.unsigned_abs());
}

fn round_up_16(n: u32) -> u32 {
    n.div_ceil(SLOT_SIZE as u32) * SLOT_SIZE as u32
}

fn walk_scope(scope: &mut Scope, pos: i32, min: &mut i32, st: &mut CompilerState) {
    let mut cur = pos;
    for stmt in &mut scope.statements {
        cur = walk_stmt(stmt, cur, min, st);
    }
}

fn walk_stmt(stmt: &mut Stmt, pos: i32, min: &mut i32, st: &mut CompilerState) -> i32 {
    match stmt {
        Stmt::Binding { init, info, .. } => {
            walk_expr(init, pos, min, st);
            let offset = pos - SLOT_SIZE;
            let var_id = info.expect("tagger/anf must resolve every Binding before stack allocation");
            st.var_mut(var_id).stack_offset = Some(offset);
            if offset < *min {
                *min = offset;
            }
            offset
        }
        Stmt::Assignment { src, .. } => {
            walk_expr(src, pos, min, st);
            pos
        }
        Stmt::NoOp { .. } => pos,
        Stmt::EvalExpr { expr, .. } => {
            walk_expr(expr, pos, min, st);
            pos
        }
        Stmt::NewScope { body, .. } => {
            walk_scope(body, pos, min, st);
            pos
        }
        Stmt::IfStmt { test, body, orelse, .. } => {
            walk_expr(test, pos, min, st);
            walk_scope(body, pos, min, st);
            walk_scope(orelse, pos, min, st);
            pos
        }
        Stmt::While { test, body, .. } => {
            walk_expr(test, pos, min, st);
            walk_scope(body, pos, min, st);
            pos
        }
    }
}

/// Finds and forks any `ExprScope` nested inside `expr`. After ANF,
/// everything else in expression position is already a leaf
/// (`Name`/`Imm`) or a shallow node over leaves, so this never needs
/// to itself consume frame space.
fn walk_expr(expr: &mut Expr, pos: i32, min: &mut i32, st: &mut CompilerState) {
    match expr {
        Expr::ExprScope { scope, .. } => walk_scope(scope, pos, min, st),
        Expr::GetType { ex, .. } => walk_expr(ex, pos, min, st),
        Expr::IfExpr { test, body, orelse, .. } => {
            walk_expr(test, pos, min, st);
            walk_expr(body, pos, min, st);
            walk_expr(orelse, pos, min, st);
        }
        Expr::Prim1 { ex1, .. } => walk_expr(ex1, pos, min, st),
        Expr::Prim2 { left, right, .. } => {
            walk_expr(left, pos, min, st);
            walk_expr(right, pos, min, st);
        }
        Expr::Print { args, .. } | Expr::Input { args, .. } | Expr::RuntimeCall { args, .. } => {
            for a in args {
                walk_expr(a, pos, min, st);
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::lower;
    use crate::checker::check;
    use crate::parser::parse;
    use crate::tagger::tag;

    fn alloc_source(src: &str) -> (CompiledFunction, CompilerState) {
        let mut scope = parse(src).unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        tag(&mut scope, &mut st);
        assert!(st.errors.is_empty(), "{:?}", st.errors);
        let scope = lower(scope, &mut st);
        let mut func = CompiledFunction {
            id: MAIN_FUNC_ID,
            symbol: MAIN_SYMBOL.to_string(),
            body: scope,
            stack_usage: 0,
        };
        allocate(&mut func, &mut st);
        (func, st)
    }

    #[test]
    fn sequential_bindings_get_distinct_offsets() {
        let (func, st) = alloc_source("val(x := 2)\nval(y := x + x)\nprint(y * y)");
        let Stmt::Binding { info: Some(x_id), .. } = &func.body.statements[0] else { panic!() };
        let Stmt::Binding { info: Some(y_id), .. } = &func.body.statements[1] else { panic!() };
        let x_off = st.var(*x_id).stack_offset.unwrap();
        let y_off = st.var(*y_id).stack_offset.unwrap();
        assert_ne!(x_off, y_off);
        assert_eq!(func.stack_usage % 16, 0);
        assert!(func.stack_usage >= 32);
    }

    #[test]
    fn if_branches_share_offsets() {
        let (func, st) = alloc_source(
            "var(x := 0)\nif x == 0:\n    val(a := 1)\n    print(a)\nelse:\n    val(b := 2)\n    print(b)",
        );
        let Stmt::IfStmt { body, orelse, .. } =
            func.body.statements.iter().find_map(|s| match s {
                Stmt::IfStmt { .. } => Some(s),
                Stmt::NewScope { body, .. } => body.statements.iter().find(|s| matches!(s, Stmt::IfStmt { .. })),
                _ => None,
            }).unwrap()
        else {
            panic!("expected an if statement")
        };
        let Stmt::Binding { info: Some(a_id), .. } = &body.statements[0] else { panic!() };
        let Stmt::Binding { info: Some(b_id), .. } = &orelse.statements[0] else { panic!() };
        assert_eq!(st.var(*a_id).stack_offset, st.var(*b_id).stack_offset);
    }
}
