//! A-Normal Form lowering.
//!
//! Rewrites the tagged AST so that every "needs-immediate" child slot
//! (`Prim1.ex1`, `Prim2.left`/`right`, `Print.args[*]`, `Input.args[0]`,
//! `RuntimeCall.args[*]`, `IfStmt.test`) holds a `Name` or a pooled
//! constant reference. `IfExpr.test`/`body`/`orelse`, `GetType.ex`, and
//! `While.test` are compiled directly into the value/type register
//! pair by codegen and are deliberately left alone here.
//!
//! Each node gathers the temporaries its own immediate slots need into
//! a bindings-builder local to that node, then wraps itself
//! (`NewScope` for statements, `ExprScope` for expressions) only if it
//! introduced any — matching the traversal the stack allocator and
//! codegen both assume.

use crate::ast::*;
use crate::state::CompilerState;
use compy_core::Span;

pub fn lower(scope: Scope, st: &mut CompilerState) -> Scope {
    process_scope(scope, st)
}

fn process_scope(scope: Scope, st: &mut CompilerState) -> Scope {
    let statements = scope.statements.into_iter().map(|s| process_stmt(s, st)).collect();
    Scope { statements, info: scope.info }
}

fn process_stmt(stmt: Stmt, st: &mut CompilerState) -> Stmt {
    match stmt {
        Stmt::EvalExpr { expr, span } => Stmt::EvalExpr { expr: process_expr(expr, st), span },
        Stmt::Binding { mutable, name, init, span, info } => {
            Stmt::Binding { mutable, name, init: process_expr(init, st), span, info }
        }
        Stmt::Assignment { name, src, target_span, span, info } => {
            Stmt::Assignment { name, src: process_expr(src, st), target_span, span, info }
        }
        Stmt::NoOp { span } => Stmt::NoOp { span },
        Stmt::NewScope { body, span } => {
            Stmt::NewScope { body: Box::new(process_scope(*body, st)), span }
        }
        Stmt::IfStmt { test, body, orelse, span } => {
            let mut temps = Vec::new();
            let test = to_immediate(test, &mut temps, st);
            let body = Box::new(process_scope(*body, st));
            let orelse = Box::new(process_scope(*orelse, st));
            wrap_stmt(temps, Stmt::IfStmt { test, body, orelse, span }, span)
        }
        Stmt::While { test, body, span } => {
            let test = process_expr(test, st);
            let body = Box::new(process_scope(*body, st));
            Stmt::While { test, body, span }
        }
    }
}

/// Normalizes `expr` for a slot that does not require an immediate.
fn process_expr(expr: Expr, st: &mut CompilerState) -> Expr {
    match expr {
        Expr::Name(_)
        | Expr::Integer { .. }
        | Expr::Boolean { .. }
        | Expr::TypeLiteral { .. }
        | Expr::Unit { .. }
        | Expr::Imm(_) => expr,
        Expr::StringLiteral { value, span, .. } => {
            let label = st.string_pool.pool(&value);
            Expr::StringLiteral { value, span, data_label: Some(label) }
        }
        Expr::GetType { ex, span } => Expr::GetType { ex: Box::new(process_expr(*ex, st)), span },
        Expr::Prim1 { op, ex1, span } => {
            let mut temps = Vec::new();
            let ex1 = to_immediate(*ex1, &mut temps, st);
            wrap_expr(temps, Expr::Prim1 { op, ex1: Box::new(ex1), span }, span)
        }
        Expr::Prim2 { op, left, right, span } => {
            let mut temps = Vec::new();
            let left = to_immediate(*left, &mut temps, st);
            let right = to_immediate(*right, &mut temps, st);
            wrap_expr(temps, Expr::Prim2 { op, left: Box::new(left), right: Box::new(right), span }, span)
        }
        Expr::Print { args, span } => {
            let mut temps = Vec::new();
            let args = args.into_iter().map(|a| to_immediate(a, &mut temps, st)).collect();
            wrap_expr(temps, Expr::Print { args, span }, span)
        }
        Expr::Input { args, span } => {
            let mut temps = Vec::new();
            let args = args.into_iter().map(|a| to_immediate(a, &mut temps, st)).collect();
            wrap_expr(temps, Expr::Input { args, span }, span)
        }
        Expr::RuntimeCall { func, args, span } => {
            let mut temps = Vec::new();
            let args = args.into_iter().map(|a| to_immediate(a, &mut temps, st)).collect();
            wrap_expr(temps, Expr::RuntimeCall { func, args, span }, span)
        }
        Expr::ExprScope { scope, span } => {
            Expr::ExprScope { scope: Box::new(process_scope(*scope, st)), span }
        }
        Expr::IfExpr { test, body, orelse, span } => Expr::IfExpr {
            test: Box::new(process_expr(*test, st)),
            body: Box::new(process_expr(*body, st)),
            orelse: Box::new(process_expr(*orelse, st)),
            span,
        },
    }
}

/// Normalizes `expr` and ensures the result is an immediate, appending
/// any synthesized temporary to `temps` (the caller's local builder).
fn to_immediate(expr: Expr, temps: &mut Vec<Stmt>, st: &mut CompilerState) -> Expr {
    let span = expr.span();
    let processed = process_expr(expr, st);
    if processed.is_const_literal() {
        let (type_code, payload) = match &processed {
            Expr::Integer { value, .. } => (compy_core::TYPE_INT, *value),
            Expr::Boolean { value, .. } => (compy_core::TYPE_BOOL, *value as i64),
            Expr::TypeLiteral { ty, .. } => (compy_core::TYPE_TYPE, ty.type_code()),
            Expr::Unit { .. } => (compy_core::TYPE_NONE, 0),
            _ => unreachable!("is_const_literal guards this match"),
        };
        let symbol = st.const_pool.pool(type_code, payload);
        return Expr::Imm(Immediate::Const(ImmConst { symbol, type_code, payload }));
    }
    match processed {
        Expr::Name(n) => Expr::Name(n),
        Expr::Imm(imm) => Expr::Imm(imm),
        other => {
            let fresh = st.fresh_anf_name();
            let var_id = st.new_var(VarInfo::new(SYNTHETIC_FUNC_ID, false));
            temps.push(Stmt::Binding {
                mutable: false,
                name: fresh.clone(),
                init: other,
                span,
                info: Some(var_id),
            });
            Expr::Name(NameRef { name: fresh, span, info: Some(var_id) })
        }
    }
}

fn wrap_stmt(temps: Vec<Stmt>, stmt: Stmt, span: Span) -> Stmt {
    if temps.is_empty() {
        return stmt;
    }
    let mut statements = temps;
    statements.push(stmt);
    Stmt::NewScope { body: Box::new(Scope::new(statements)), span }
}

fn wrap_expr(temps: Vec<Stmt>, expr: Expr, span: Span) -> Expr {
    if temps.is_empty() {
        expr
    } else {
        mk_expr_scope(temps, expr, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::check;
    use crate::parser::parse;
    use crate::tagger::tag;

    fn lower_source(src: &str) -> Scope {
        let mut scope = parse(src).unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        tag(&mut scope, &mut st);
        assert!(st.errors.is_empty(), "{:?}", st.errors);
        lower(scope, &mut st)
    }

    #[test]
    fn nested_arithmetic_gets_one_shared_temp_scope() {
        let scope = lower_source("print(1 + 2 + 3)");
        let Stmt::EvalExpr { expr: Expr::Print { args, .. }, .. } = &scope.statements[0] else {
            panic!("expected print statement")
        };
        // `1 + 2` is not already immediate, so it is hoisted into a temp;
        // the outer `+ 3` then receives that temp's Name directly.
        assert!(matches!(&args[0], Expr::Name(_)));
    }

    #[test]
    fn integer_literal_immediate_is_pooled_not_temp_bound() {
        let scope = lower_source("print(42)");
        let Stmt::EvalExpr { expr: Expr::Print { args, .. }, .. } = &scope.statements[0] else {
            panic!("expected print statement")
        };
        assert!(matches!(&args[0], Expr::Imm(Immediate::Const(_))));
    }

    #[test]
    fn if_test_is_hoisted_to_a_name() {
        let scope = lower_source("if 1 + 1:\n    pass\nelse:\n    pass");
        match &scope.statements[0] {
            Stmt::NewScope { body, .. } => {
                assert!(matches!(body.statements.last(), Some(Stmt::IfStmt { .. })));
            }
            other => panic!("expected the if to be wrapped in a temp scope: {other:?}"),
        }
    }

    #[test]
    fn while_test_is_left_compound() {
        let scope = lower_source("var(x := 0)\nwhile x < 10:\n    x = x + 1");
        let Stmt::While { test, .. } = &scope.statements[1] else { panic!("expected while") };
        assert!(matches!(test, Expr::Prim2 { .. }));
    }
}
