//! Per-statement compilation rules (§4.6).

use super::error::CodeGenError;
use super::expr::{compile_expr, emit_extract_bool_branch};
use super::{RTYPE, RVAL, var_type, var_val};
use crate::ast::*;
use crate::state::CompilerState;
use std::fmt::Write as _;

pub(super) fn compile_scope(out: &mut String, scope: &Scope, st: &mut CompilerState) -> Result<(), CodeGenError> {
    for stmt in &scope.statements {
        compile_stmt(out, stmt, st)?;
    }
    Ok(())
}

fn assign(out: &mut String, var_id: VarId, st: &CompilerState) -> Result<(), CodeGenError> {
    let offset = st.var(var_id).stack_offset.expect("stack allocator runs before codegen");
    writeln!(out, "\tmov {}, {RVAL}", var_val(offset))?;
    writeln!(out, "\tmov {}, {RTYPE}", var_type(offset))?;
    Ok(())
}

fn compile_stmt(out: &mut String, stmt: &Stmt, st: &mut CompilerState) -> Result<(), CodeGenError> {
    match stmt {
        Stmt::EvalExpr { expr, .. } => compile_expr(out, expr, st),
        Stmt::Binding { init, info, .. } => {
            compile_expr(out, init, st)?;
            assign(out, info.expect("tagger/anf resolve every Binding"), st)
        }
        Stmt::Assignment { src, info, .. } => {
            compile_expr(out, src, st)?;
            assign(out, info.expect("tagger resolves every Assignment"), st)
        }
        Stmt::NoOp { .. } => Ok(()),
        Stmt::NewScope { body, .. } => compile_scope(out, body, st),
        Stmt::IfStmt { test, body, orelse, span } => {
            compile_expr(out, test, st)?;
            let false_label = st.fresh_label("ifstmt_false");
            let end_label = st.fresh_label("ifstmt_end");
            emit_extract_bool_branch(out, span.lineno(), &false_label)?;
            compile_scope(out, body, st)?;
            writeln!(out, "\tjmp {end_label}")?;
            writeln!(out, "{false_label}:")?;
            compile_scope(out, orelse, st)?;
            writeln!(out, "{end_label}:")?;
            Ok(())
        }
        Stmt::While { test, body, span } => {
            let cond_label = st.fresh_label("while_cond");
            let body_label = st.fresh_label("while_body");
            let false_label = st.fresh_label("while_end");
            writeln!(out, "\tjmp {cond_label}")?;
            writeln!(out, "{body_label}:")?;
            compile_scope(out, body, st)?;
            writeln!(out, "{cond_label}:")?;
            compile_expr(out, test, st)?;
            writeln!(out, "\tmov {}, {RVAL}", super::ARG_REGS[1])?;
            writeln!(out, "\tmov {}, {}", super::ARG_REGS[0], span.lineno())?;
            writeln!(out, "\tcall extract_bool")?;
            writeln!(out, "\tcmp rax, 0")?;
            writeln!(out, "\tje {false_label}")?;
            writeln!(out, "\tjmp {body_label}")?;
            writeln!(out, "{false_label}:")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::lower;
    use crate::checker::check;
    use crate::parser::parse;
    use crate::stack_alloc::allocate;
    use crate::tagger::tag;

    fn emit(src: &str) -> String {
        let mut scope = parse(src).unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        tag(&mut scope, &mut st);
        assert!(st.errors.is_empty(), "{:?}", st.errors);
        let scope = lower(scope, &mut st);
        let mut func =
            CompiledFunction { id: MAIN_FUNC_ID, symbol: MAIN_SYMBOL.to_string(), body: scope, stack_usage: 0 };
        allocate(&mut func, &mut st);
        let mut out = String::new();
        compile_scope(&mut out, &func.body, &mut st).unwrap();
        out
    }

    #[test]
    fn while_loop_jumps_to_condition_before_the_first_body_iteration() {
        let out = emit("var(x := 0)\nwhile x < 10:\n    x = x + 1");
        let jmp_line = out.lines().find(|l| l.trim_start().starts_with("jmp")).unwrap();
        let cond_label = jmp_line.trim_start().strip_prefix("jmp ").unwrap();
        assert!(out.contains(&format!("{cond_label}:")));
    }

    #[test]
    fn if_statement_has_matching_false_and_end_labels() {
        let out = emit("var(x := 0)\nif x == 0:\n    x = 1\nelse:\n    x = 2");
        assert!(out.contains("call extract_bool"));
        assert!(out.contains("je .Lifstmt_false"));
    }
}
