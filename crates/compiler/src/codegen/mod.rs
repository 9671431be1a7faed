//! x86-64 NASM code generation.
//!
//! Every expression compiles into the `RVAL`/`RTYPE` register pair;
//! every statement either discards that pair or stores it into a
//! variable's two stack slots. The module is split by concern the way
//! the rest of the pipeline is: [`pools`] for `.rodata`,
//! [`runtime_decls`] for the `extern` table, [`expr`]/[`stmt`] for the
//! per-node emission rules in §4.6, and [`program`] for the
//! function/program-level wrapping (prologue, epilogue, externs).

mod error;
mod expr;
mod pools;
mod program;
mod runtime_decls;
mod stmt;

pub use error::CodeGenError;
pub use program::generate;

/// Holds the value payload of whatever was most recently compiled into
/// the register pair.
pub(super) const RVAL: &str = "rax";
/// Holds the type tag of whatever was most recently compiled into the
/// register pair.
pub(super) const RTYPE: &str = "rdx";
/// Argument-passing registers, in calling-convention order.
pub(super) const ARG_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

/// Formats an `rbp`-relative memory operand, sized for a single
/// 8-byte word (`qword [rbp - k]`, `qword [rbp + k]`, or `qword [rbp]`
/// when `offset` is zero).
pub(super) fn rbp_operand(offset: i32) -> String {
    match offset.cmp(&0) {
        std::cmp::Ordering::Equal => "qword [rbp]".to_string(),
        std::cmp::Ordering::Greater => format!("qword [rbp + {offset}]"),
        std::cmp::Ordering::Less => format!("qword [rbp - {}]", -offset),
    }
}

/// The value slot of a binding at frame offset `k`.
pub(super) fn var_val(offset: i32) -> String {
    rbp_operand(offset)
}

/// The type slot of a binding at frame offset `k`, eight bytes past
/// its value slot.
pub(super) fn var_type(offset: i32) -> String {
    rbp_operand(offset + 8)
}

/// Rounds `n` up to the next multiple of 16, for stack-alignment
/// padding around a variadic call's argument-pointer array.
pub(super) fn align16(n: i64) -> i64 {
    (n + 15) / 16 * 16
}
