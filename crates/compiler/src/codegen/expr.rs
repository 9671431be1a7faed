//! Per-expression compilation rules (§4.6): every variant is compiled
//! into the `RVAL`/`RTYPE` register pair.

use super::error::CodeGenError;
use super::{ARG_REGS, RTYPE, RVAL, align16, var_type, var_val};
use crate::ast::*;
use crate::state::CompilerState;
use compy_core::{TYPE_BOOL, TYPE_INT, TYPE_NONE, TYPE_TYPE};
use std::fmt::Write as _;

/// A bare `[rbp - k]`/`[rel sym]` address expression, for `lea` (no
/// size prefix — the destination register determines the width).
fn address_of(expr: &Expr, st: &CompilerState) -> String {
    match expr {
        Expr::Name(n) | Expr::Imm(Immediate::Name(n)) => {
            let info = n.info.expect("ANF guarantees every immediate Name is resolved");
            let offset = st.var(info).stack_offset.expect("stack allocator runs before codegen");
            rbp_address(offset)
        }
        Expr::Imm(Immediate::Const(c)) => format!("[rel {}]", c.symbol),
        other => unreachable!("not an immediate after ANF: {other:?}"),
    }
}

fn rbp_address(offset: i32) -> String {
    match offset.cmp(&0) {
        std::cmp::Ordering::Equal => "[rbp]".to_string(),
        std::cmp::Ordering::Greater => format!("[rbp + {offset}]"),
        std::cmp::Ordering::Less => format!("[rbp - {}]", -offset),
    }
}

fn load_none(out: &mut String) -> Result<(), CodeGenError> {
    writeln!(out, "\tmov {RVAL}, 0")?;
    writeln!(out, "\tmov {RTYPE}, {TYPE_NONE}")?;
    Ok(())
}

fn load_name(out: &mut String, n: &NameRef, st: &CompilerState) -> Result<(), CodeGenError> {
    let info = n.info.expect("tagger resolves every Name before codegen");
    let offset = st.var(info).stack_offset.expect("stack allocator runs before codegen");
    writeln!(out, "\tmov {RVAL}, {}", var_val(offset))?;
    writeln!(out, "\tmov {RTYPE}, {}", var_type(offset))?;
    Ok(())
}

pub(super) fn compile_expr(out: &mut String, expr: &Expr, st: &mut CompilerState) -> Result<(), CodeGenError> {
    match expr {
        Expr::Name(n) => load_name(out, n, st),
        Expr::Imm(Immediate::Name(n)) => load_name(out, n, st),
        Expr::Imm(Immediate::Const(c)) => {
            writeln!(out, "\tmov {RVAL}, {}", c.payload)?;
            writeln!(out, "\tmov {RTYPE}, {}", c.type_code)?;
            Ok(())
        }
        Expr::Integer { value, oob, .. } => {
            debug_assert!(!oob, "checker must reject out-of-range literals before codegen");
            writeln!(out, "\tmov {RVAL}, {value}")?;
            writeln!(out, "\tmov {RTYPE}, {TYPE_INT}")?;
            Ok(())
        }
        Expr::Boolean { value, .. } => {
            writeln!(out, "\tmov {RVAL}, {}", *value as i64)?;
            writeln!(out, "\tmov {RTYPE}, {TYPE_BOOL}")?;
            Ok(())
        }
        Expr::TypeLiteral { ty, .. } => {
            writeln!(out, "\tmov {RVAL}, {}", ty.type_code())?;
            writeln!(out, "\tmov {RTYPE}, {TYPE_TYPE}")?;
            Ok(())
        }
        Expr::Unit { .. } => load_none(out),
        Expr::StringLiteral { data_label, .. } => {
            let label = data_label.as_ref().expect("ANF pools every StringLiteral's data_label");
            writeln!(out, "\tlea {RVAL}, [rel {label}]")?;
            writeln!(out, "\tmov {RTYPE}, {}", compy_core::TYPE_STRING)?;
            Ok(())
        }
        Expr::GetType { ex, .. } => {
            compile_expr(out, ex, st)?;
            writeln!(out, "\tmov {RVAL}, {RTYPE}")?;
            writeln!(out, "\tmov {RTYPE}, {TYPE_TYPE}")?;
            Ok(())
        }
        Expr::Prim1 { op, ex1, span } => {
            let addr = address_of(ex1, st);
            writeln!(out, "\tlea {}, {addr}", ARG_REGS[1])?;
            writeln!(out, "\tmov {}, {}", ARG_REGS[0], span.lineno())?;
            writeln!(out, "\tcall {}", op.runtime_symbol())?;
            Ok(())
        }
        Expr::Prim2 { op, left, right, span } => {
            let left_addr = address_of(left, st);
            let right_addr = address_of(right, st);
            writeln!(out, "\tlea {}, {left_addr}", ARG_REGS[1])?;
            writeln!(out, "\tlea {}, {right_addr}", ARG_REGS[2])?;
            writeln!(out, "\tmov {}, {}", ARG_REGS[0], span.lineno())?;
            writeln!(out, "\tcall {}", op.runtime_symbol())?;
            if op.negated() {
                writeln!(out, "\txor {RVAL}, 1")?;
            }
            Ok(())
        }
        Expr::Print { args, span } => compile_print(out, args, span.lineno(), st),
        Expr::Input { args, span } => compile_input(out, args, span.lineno(), st),
        Expr::RuntimeCall { func, args, span } => {
            writeln!(out, "\tmov {}, {}", ARG_REGS[0], span.lineno())?;
            if let Some(arg) = args.first() {
                let addr = address_of(arg, st);
                writeln!(out, "\tlea {}, {addr}", ARG_REGS[1])?;
            }
            writeln!(out, "\tcall {}", func.symbol())?;
            Ok(())
        }
        Expr::ExprScope { scope, .. } => crate::codegen::stmt::compile_scope(out, scope, st),
        Expr::IfExpr { test, body, orelse, span } => {
            compile_expr(out, test, st)?;
            let false_label = st.fresh_label("if_false");
            let end_label = st.fresh_label("if_end");
            emit_extract_bool_branch(out, span.lineno(), &false_label)?;
            compile_expr(out, body, st)?;
            writeln!(out, "\tjmp {end_label}")?;
            writeln!(out, "{false_label}:")?;
            compile_expr(out, orelse, st)?;
            writeln!(out, "{end_label}:")?;
            Ok(())
        }
    }
}

/// Compiles the `RVAL`/`RTYPE` test pair into a 0/1 flag via
/// `extract_bool` and jumps to `false_label` when it is false. Shared
/// by `IfExpr`, `IfStmt`, and `While`.
pub(super) fn emit_extract_bool_branch(
    out: &mut String,
    lineno: u32,
    false_label: &str,
) -> Result<(), CodeGenError> {
    writeln!(out, "\tmov {}, {RVAL}", ARG_REGS[1])?;
    writeln!(out, "\tmov {}, {lineno}", ARG_REGS[0])?;
    writeln!(out, "\tcall extract_bool")?;
    writeln!(out, "\tcmp rax, 0")?;
    writeln!(out, "\tje {false_label}")?;
    Ok(())
}

fn compile_print(out: &mut String, args: &[Expr], lineno: u32, st: &mut CompilerState) -> Result<(), CodeGenError> {
    let n = args.len() as i64;
    let padded = align16(n * 8);
    if padded > 0 {
        writeln!(out, "\tsub rsp, {padded}")?;
    }
    for (i, arg) in args.iter().enumerate() {
        let addr = address_of(arg, st);
        writeln!(out, "\tlea r10, {addr}")?;
        writeln!(out, "\tmov {}, r10", rbp_like_rsp(i))?;
    }
    writeln!(out, "\tmov {}, {lineno}", ARG_REGS[0])?;
    writeln!(out, "\tmov {}, {n}", ARG_REGS[1])?;
    if padded > 0 {
        writeln!(out, "\tmov {}, rsp", ARG_REGS[2])?;
    } else {
        writeln!(out, "\tmov {}, 0", ARG_REGS[2])?;
    }
    writeln!(out, "\txor eax, eax")?;
    writeln!(out, "\tcall print_variadic")?;
    if padded > 0 {
        writeln!(out, "\tadd rsp, {padded}")?;
    }
    load_none(out)
}

fn rbp_like_rsp(i: usize) -> String {
    if i == 0 { "qword [rsp]".to_string() } else { format!("qword [rsp + {}]", i * 8) }
}

/// `input()`/`input(prompt)` reads the prompt's *value* (a raw string
/// pointer), not its address — `eval_input` takes `prompt: *const i8`
/// directly, unlike the address-of-`TaggedValue` convention every
/// other runtime call uses.
fn compile_input(out: &mut String, args: &[Expr], lineno: u32, st: &mut CompilerState) -> Result<(), CodeGenError> {
    match args.first() {
        Some(prompt) => {
            compile_expr(out, prompt, st)?;
            writeln!(out, "\tmov {}, {RVAL}", ARG_REGS[1])?;
        }
        None => {
            writeln!(out, "\tmov {}, 0", ARG_REGS[1])?;
        }
    }
    writeln!(out, "\tmov {}, {lineno}", ARG_REGS[0])?;
    writeln!(out, "\tcall eval_input")?;
    Ok(())
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
        let mut func = CompiledFunction { id: MAIN_FUNC_ID, symbol: MAIN_SYMBOL.to_string(), body: scope, stack_usage: 0 };
        allocate(&mut func, &mut st);
        let mut out = String::new();
        crate::codegen::stmt::compile_scope(&mut out, &func.body, &mut st).unwrap();
        out
    }

    #[test]
    fn integer_literal_loads_immediate_payload_and_type() {
        let out = emit("print(42)");
        assert!(out.contains("mov rax, 42") || out.contains(&format!("mov {RVAL}, 42")));
    }

    #[test]
    fn binary_prim_calls_runtime_symbol_with_operand_addresses() {
        let out = emit("print(1 + 2)");
        assert!(out.contains("call add"));
        assert!(out.contains("lea rsi,"));
        assert!(out.contains("lea rdx,"));
    }

    #[test]
    fn not_equal_negates_after_the_runtime_call() {
        let out = emit("print(1 != 2)");
        assert!(out.contains("call is_eq"));
        assert!(out.contains("xor rax, 1"));
    }
}
