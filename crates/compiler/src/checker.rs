//! Post-parse diagnostic pass: integer-literal bounds and built-in
//! call arity. Non-fatal — every violation is accumulated onto
//! [`crate::state::CompilerState`] rather than aborting the walk.

use crate::ast::*;
use crate::error::{CompileError, CompileErrorKind};
use crate::state::CompilerState;

pub fn check(scope: &Scope, st: &mut CompilerState) {
    check_scope(scope, st);
}

fn check_scope(scope: &Scope, st: &mut CompilerState) {
    for stmt in &scope.statements {
        check_stmt(stmt, st);
    }
}

fn check_stmt(stmt: &Stmt, st: &mut CompilerState) {
    match stmt {
        Stmt::EvalExpr { expr, .. } => check_expr(expr, st),
        Stmt::Binding { init, .. } => check_expr(init, st),
        Stmt::Assignment { src, .. } => check_expr(src, st),
        Stmt::NoOp { .. } => {}
        Stmt::NewScope { body, .. } => check_scope(body, st),
        Stmt::IfStmt { test, body, orelse, .. } => {
            check_expr(test, st);
            check_scope(body, st);
            check_scope(orelse, st);
        }
        Stmt::While { test, body, .. } => {
            check_expr(test, st);
            check_scope(body, st);
        }
    }
}

fn check_expr(expr: &Expr, st: &mut CompilerState) {
    match expr {
        Expr::Name(_) | Expr::Boolean { .. } | Expr::TypeLiteral { .. } | Expr::Unit { .. } => {}
        Expr::Integer { oob, value, span } => {
            if *oob {
                st.err(CompileError::new(CompileErrorKind::IntegerOOB(*value), *span));
            }
        }
        Expr::StringLiteral { .. } => {}
        Expr::GetType { ex, .. } => check_expr(ex, st),
        Expr::Prim1 { ex1, .. } => check_expr(ex1, st),
        Expr::Prim2 { left, right, .. } => {
            check_expr(left, st);
            check_expr(right, st);
        }
        Expr::Print { args, .. } => {
            for a in args {
                check_expr(a, st);
            }
        }
        Expr::Input { args, span } => {
            for a in args {
                check_expr(a, st);
            }
            if args.len() > 1 {
                st.err(CompileError::new(
                    CompileErrorKind::FuncArgs { name: "input".to_string(), expected: 1, actual: args.len() },
                    *span,
                ));
            }
        }
        Expr::RuntimeCall { func, args, span } => {
            for a in args {
                check_expr(a, st);
            }
            if args.len() != func.arity() {
                st.err(CompileError::new(
                    CompileErrorKind::FuncArgs {
                        name: func.symbol().to_string(),
                        expected: func.arity(),
                        actual: args.len(),
                    },
                    *span,
                ));
            }
        }
        Expr::ExprScope { scope, .. } => check_scope(scope, st),
        Expr::IfExpr { test, body, orelse, .. } => {
            check_expr(test, st);
            check_expr(body, st);
            check_expr(orelse, st);
        }
        Expr::Imm(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn flags_integer_out_of_range() {
        let scope = parse("print(99999999999999999999999)").unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        assert_eq!(st.errors.len(), 1);
        assert!(matches!(st.errors[0].kind, CompileErrorKind::IntegerOOB(_)));
    }

    #[test]
    fn flags_input_arity() {
        let scope = parse("print(input(1, 2))").unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        assert!(st.errors.iter().any(|e| matches!(e.kind, CompileErrorKind::FuncArgs { .. })));
    }

    #[test]
    fn flags_runtime_call_arity() {
        let scope = parse("sleep(1, 2)").unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        assert!(st.errors.iter().any(|e| matches!(e.kind, CompileErrorKind::FuncArgs { .. })));
    }

    #[test]
    fn accepts_well_formed_program() {
        let scope = parse("val(x := 2)\nprint(x + x)").unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        assert!(st.errors.is_empty());
    }
}
