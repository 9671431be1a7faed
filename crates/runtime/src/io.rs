//! I/O operations for Compy: `print`, `input`.
//!
//! # Safety Contract
//!
//! These functions are designed to be called ONLY by compiler-generated
//! code. Writes go straight through `libc::write` to fd 1/2 rather than
//! buffered Rust stdio, since the compiled program's `main` is emitted
//! assembly calling in before any Rust runtime setup is guaranteed.

use crate::error::panic_abort;
use compy_core::{PanicReason, TYPE_BOOL, TYPE_INT, TYPE_NONE, TYPE_STRING, TYPE_TYPE, TaggedValue};
use std::ffi::CStr;

fn write_fd(fd: i32, bytes: &[u8]) {
    unsafe {
        libc::write(fd, bytes.as_ptr() as *const libc::c_void, bytes.len());
    }
}

fn render(lineno: i64, v: TaggedValue) -> String {
    match v.ty {
        TYPE_INT => v.payload.to_string(),
        TYPE_BOOL => {
            if v.payload != 0 { "True".to_string() } else { "False".to_string() }
        }
        TYPE_NONE => "None".to_string(),
        TYPE_TYPE => compy_core::type_name(v.payload).to_string(),
        TYPE_STRING => {
            let cstr = unsafe { CStr::from_ptr(v.payload as *const i8) };
            cstr.to_string_lossy().into_owned()
        }
        other => panic_abort(
            PanicReason::TypeError,
            lineno,
            &format!("print: unrecognized type code {other}"),
        ),
    }
}

/// Prints `n` values, each read through one of the `argv` pointers,
/// space-separated, followed by a newline.
///
/// # Safety
/// `argv` must point to `n` valid `*const TaggedValue` entries.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn print_variadic(lineno: i64, n: i64, argv: *const *const TaggedValue) {
    let n = n as usize;
    let mut out = String::new();
    for i in 0..n {
        if i > 0 {
            out.push(' ');
        }
        let ptr = unsafe { *argv.add(i) };
        let v = unsafe { *ptr };
        out.push_str(&render(lineno, v));
    }
    out.push('\n');
    write_fd(1, out.as_bytes());
}

/// `input()` / `input(prompt)`. Writes `prompt` (if non-null) to
/// stdout without a trailing newline, then reads one line from stdin,
/// stripping the trailing newline, returning it as a `TYPE_STRING`.
///
/// The returned string is leaked intentionally: compiled Compy
/// programs run once and exit, and the runtime has no string-pool GC,
/// matching the single-function, no-garbage-collection scope of this
/// compiler.
///
/// # Safety
/// `prompt` must be either null or a valid NUL-terminated C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eval_input(lineno: i64, prompt: *const i8) -> TaggedValue {
    if !prompt.is_null() {
        let cstr = unsafe { CStr::from_ptr(prompt) };
        write_fd(1, cstr.to_bytes());
    }

    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(_) => {}
        Err(e) => panic_abort(PanicReason::IoError, lineno, &e.to_string()),
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    let mut bytes = line.into_bytes();
    bytes.push(0);
    let ptr = bytes.leak().as_ptr();
    TaggedValue::string(ptr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_formats_like_python_print() {
        assert_eq!(render(1, TaggedValue::int(42)), "42");
        assert_eq!(render(1, TaggedValue::bool(true)), "True");
        assert_eq!(render(1, TaggedValue::bool(false)), "False");
        assert_eq!(render(1, TaggedValue::none()), "None");
        assert_eq!(render(1, TaggedValue::type_value(TYPE_INT)), "int");
    }

    #[test]
    fn print_variadic_joins_with_spaces() {
        let a = TaggedValue::int(1);
        let b = TaggedValue::int(2);
        let argv = [&a as *const TaggedValue, &b as *const TaggedValue];
        unsafe { print_variadic(1, 2, argv.as_ptr()) };
    }
}
