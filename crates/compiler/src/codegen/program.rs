//! Top-level assembly emission: per-function prologue/epilogue and
//! the program-level `global`/`extern`/`.rodata`/`.text` wrapping.

use super::error::CodeGenError;
use super::pools::{emit_const_pool, emit_string_pool};
use super::runtime_decls::emit_externs;
use super::stmt::compile_scope;
use crate::ast::CompiledFunction;
use crate::state::CompilerState;
use std::fmt::Write as _;

fn compile_func(out: &mut String, func: &CompiledFunction, st: &mut CompilerState) -> Result<(), CodeGenError> {
    writeln!(out, "{}:", func.symbol)?;
    writeln!(out, "\tpush rbp")?;
    writeln!(out, "\tmov rbp, rsp")?;
    writeln!(out, "\tsub rsp, {}", func.stack_usage)?;
    compile_scope(out, &func.body, st)?;
    // Falling off the end of the function returns `None`, matching
    // Python's implicit-return convention.
    writeln!(out, "\tmov rax, 0")?;
    writeln!(out, "\tmov rdx, {}", compy_core::TYPE_NONE)?;
    writeln!(out, "\tadd rsp, {}", func.stack_usage)?;
    writeln!(out, "\tpop rbp")?;
    writeln!(out, "\tret")?;
    Ok(())
}

/// Assembles the full `.nasm` source for a compiled program: the
/// single `compy_main` function plus the `.rodata`/`.text` wrapping
/// §4.6 specifies.
pub fn generate(func: &CompiledFunction, st: &mut CompilerState) -> Result<String, CodeGenError> {
    let mut out = String::new();
    writeln!(out, "global {}", func.symbol)?;
    emit_externs(&mut out)?;
    writeln!(out)?;

    writeln!(out, "section .rodata")?;
    emit_const_pool(&mut out, st)?;
    emit_string_pool(&mut out, st)?;
    writeln!(out)?;

    writeln!(out, "section .text")?;
    compile_func(&mut out, func, st)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::lower;
    use crate::ast::{MAIN_FUNC_ID, MAIN_SYMBOL};
    use crate::checker::check;
    use crate::parser::parse;
    use crate::stack_alloc::allocate;
    use crate::tagger::tag;

    fn compile(src: &str) -> String {
        let mut scope = parse(src).unwrap();
        let mut st = CompilerState::new();
        check(&scope, &mut st);
        tag(&mut scope, &mut st);
        assert!(st.errors.is_empty(), "{:?}", st.errors);
        let scope = lower(scope, &mut st);
        let mut func =
            CompiledFunction { id: MAIN_FUNC_ID, symbol: MAIN_SYMBOL.to_string(), body: scope, stack_usage: 0 };
        allocate(&mut func, &mut st);
        generate(&func, &mut st).unwrap()
    }

    #[test]
    fn program_has_global_externs_rodata_and_text_in_order() {
        let asm = compile("print(42)");
        let global_pos = asm.find("global compy_main").unwrap();
        let rodata_pos = asm.find("section .rodata").unwrap();
        let text_pos = asm.find("section .text").unwrap();
        assert!(global_pos < rodata_pos);
        assert!(rodata_pos < text_pos);
        assert!(asm.contains("compy_main:"));
        assert!(asm.contains("ret"));
    }

    #[test]
    fn frame_is_torn_down_before_returning() {
        let asm = compile("val(x := 1)\nprint(x)");
        assert!(asm.contains("push rbp"));
        assert!(asm.contains("pop rbp"));
        let sub_pos = asm.find("sub rsp,").unwrap();
        let add_pos = asm.find("add rsp,").unwrap();
        assert!(sub_pos < add_pos);
    }
}
