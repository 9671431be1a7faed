//! Arithmetic operations callable from compiler-generated assembly.
//!
//! # Safety Contract
//!
//! These functions are designed to be called ONLY by `compyc`-generated
//! code: the checker/tagger have already ensured every operand position
//! here receives an immediate (a stack slot or a pooled constant), and
//! codegen passes the *address* of that immediate, never the value
//! itself — hence every operand parameter is `*const TaggedValue`.
//!
//! # Overflow behavior
//!
//! Unlike a Forth-style runtime that wraps on overflow, signed 64-bit
//! overflow here is a reportable failure: `add`, `sub`, `mul`, and
//! `add1`/`sub1` use checked arithmetic and abort via the dump-file
//! protocol with `ARITH_OVERFLOW` when the checked operation returns
//! `None`, matching the literal end-to-end requirement that
//! `9223372036854775807 + 1` produce `ARITH_OVERFLOW` rather than a
//! silently wrapped result.

use crate::error::panic_abort;
use compy_core::{PanicReason, TYPE_INT, TaggedValue};

unsafe fn read_int(lineno: i64, ptr: *const TaggedValue, who: &str) -> i64 {
    let v = unsafe { *ptr };
    if v.ty != TYPE_INT {
        panic_abort(
            PanicReason::TypeError,
            lineno,
            &format!("{who}: expected int, got {}", compy_core::type_name(v.ty)),
        );
    }
    v.payload
}

/// Two's-complement negation. `-(i64::MIN)` overflows and reports
/// `ARITH_OVERFLOW`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn negate(lineno: i64, operand: *const TaggedValue) -> TaggedValue {
    let a = unsafe { read_int(lineno, operand, "negate") };
    match a.checked_neg() {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "negate: overflow"),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn add1(lineno: i64, operand: *const TaggedValue) -> TaggedValue {
    let a = unsafe { read_int(lineno, operand, "add1") };
    match a.checked_add(1) {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "add1: overflow"),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn sub1(lineno: i64, operand: *const TaggedValue) -> TaggedValue {
    let a = unsafe { read_int(lineno, operand, "sub1") };
    match a.checked_sub(1) {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "sub1: overflow"),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn add(
    lineno: i64,
    left: *const TaggedValue,
    right: *const TaggedValue,
) -> TaggedValue {
    let a = unsafe { read_int(lineno, left, "+") };
    let b = unsafe { read_int(lineno, right, "+") };
    match a.checked_add(b) {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "+: overflow"),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn sub(
    lineno: i64,
    left: *const TaggedValue,
    right: *const TaggedValue,
) -> TaggedValue {
    let a = unsafe { read_int(lineno, left, "-") };
    let b = unsafe { read_int(lineno, right, "-") };
    match a.checked_sub(b) {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "-: overflow"),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn mul(
    lineno: i64,
    left: *const TaggedValue,
    right: *const TaggedValue,
) -> TaggedValue {
    let a = unsafe { read_int(lineno, left, "*") };
    let b = unsafe { read_int(lineno, right, "*") };
    match a.checked_mul(b) {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "*: overflow"),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn div(
    lineno: i64,
    left: *const TaggedValue,
    right: *const TaggedValue,
) -> TaggedValue {
    let a = unsafe { read_int(lineno, left, "/") };
    let b = unsafe { read_int(lineno, right, "/") };
    if b == 0 {
        panic_abort(PanicReason::DivByZero, lineno, &format!("{a} / 0"));
    }
    match a.checked_div(b) {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "/: overflow"),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn r#mod(
    lineno: i64,
    left: *const TaggedValue,
    right: *const TaggedValue,
) -> TaggedValue {
    let a = unsafe { read_int(lineno, left, "%") };
    let b = unsafe { read_int(lineno, right, "%") };
    if b == 0 {
        panic_abort(PanicReason::DivByZero, lineno, &format!("{a} % 0"));
    }
    match a.checked_rem(b) {
        Some(r) => TaggedValue::int(r),
        None => panic_abort(PanicReason::ArithOverflow, lineno, "%: overflow"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> TaggedValue {
        TaggedValue::int(v)
    }

    #[test]
    fn add_computes_sum() {
        let a = int(5);
        let b = int(3);
        let r = unsafe { add(1, &a, &b) };
        assert_eq!(r, int(8));
    }

    #[test]
    fn sub_computes_difference() {
        let a = int(10);
        let b = int(3);
        let r = unsafe { sub(1, &a, &b) };
        assert_eq!(r, int(7));
    }

    #[test]
    fn mul_computes_product() {
        let a = int(4);
        let b = int(5);
        let r = unsafe { mul(1, &a, &b) };
        assert_eq!(r, int(20));
    }

    #[test]
    fn div_truncates_toward_zero() {
        let a = int(-10);
        let b = int(3);
        let r = unsafe { div(1, &a, &b) };
        assert_eq!(r, int(-3));
    }

    #[test]
    fn add1_and_sub1_step_by_one() {
        let a = int(41);
        assert_eq!(unsafe { add1(1, &a) }, int(42));
        let b = int(43);
        assert_eq!(unsafe { sub1(1, &b) }, int(42));
    }

    #[test]
    fn negate_flips_sign() {
        let a = int(7);
        assert_eq!(unsafe { negate(1, &a) }, int(-7));
    }
}
