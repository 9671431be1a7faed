//! `.rodata` emission for the constant and string pools.

use super::error::CodeGenError;
use crate::state::CompilerState;
use std::fmt::Write as _;

/// Pooled constants are laid out as a 16-byte `(payload, type)` pair —
/// bit-for-bit the same layout as a stack variable's two slots — so
/// codegen can `lea` either one and hand the result to a runtime call
/// expecting `*const TaggedValue`.
pub fn emit_const_pool(out: &mut String, st: &CompilerState) -> Result<(), CodeGenError> {
    let entries = st.const_pool.to_asm();
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(out, "; Pooled constants")?;
    for (symbol, payload, type_code) in entries {
        writeln!(out, "{symbol}: dq {payload}, {type_code}")?;
    }
    Ok(())
}

/// Pooled strings are raw NUL-terminated byte buffers — codegen loads
/// their address directly as a `TYPE_STRING` payload rather than
/// through a `(payload, type)` pair, so no type word is stored here.
/// Emitted as a byte list rather than a quoted `db` string so that
/// any content (quotes, backslashes, embedded newlines) round-trips
/// without NASM string-escaping rules.
pub fn emit_string_pool(out: &mut String, st: &CompilerState) -> Result<(), CodeGenError> {
    let entries = st.string_pool.to_asm();
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(out, "; Pooled strings")?;
    for (symbol, content) in entries {
        let mut bytes: Vec<String> = content.bytes().map(|b| b.to_string()).collect();
        bytes.push("0".to_string());
        writeln!(out, "{symbol}: db {}", bytes.join(","))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_pool_emits_payload_then_type() {
        let mut st = CompilerState::new();
        st.const_pool.pool(compy_core::TYPE_INT, 42);
        let mut out = String::new();
        emit_const_pool(&mut out, &st).unwrap();
        assert!(out.contains("_compy_const_0: dq 42, 0"));
    }

    #[test]
    fn string_pool_emits_nul_terminated_bytes() {
        let mut st = CompilerState::new();
        st.string_pool.pool("hi");
        let mut out = String::new();
        emit_string_pool(&mut out, &st).unwrap();
        assert!(out.contains("_compy_str_0: db 104,105,0"));
    }
}
