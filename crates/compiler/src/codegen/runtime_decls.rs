//! `extern` declarations for every runtime symbol codegen might call.
//!
//! One flat, data-driven table rather than scattered `writeln!` calls
//! at each call site — every symbol the runtime ABI exposes is
//! declared unconditionally, whether or not the program being
//! compiled happens to use it.

use super::error::CodeGenError;
use std::fmt::Write as _;

const UNARY_OPS: &[&str] = &["negate", "boolean_not", "add1", "sub1"];
const BINARY_OPS: &[&str] =
    &["add", "sub", "mul", "div", "mod", "is_identical", "is_eq", "is_lt", "is_le", "is_gt", "is_ge"];
const MISC: &[&str] =
    &["extract_bool", "print_variadic", "eval_input", "compy_time_int", "compy_sleep", "compy_exit"];

pub fn emit_externs(out: &mut String) -> Result<(), CodeGenError> {
    writeln!(out, "; Runtime externs")?;
    for sym in UNARY_OPS.iter().chain(BINARY_OPS).chain(MISC) {
        writeln!(out, "extern {sym}")?;
    }
    Ok(())
}
