//! Comparison and boolean operators, plus the `extract_bool` helper
//! codegen calls to turn a tagged value into a branch condition.

use crate::error::panic_abort;
use compy_core::{PanicReason, TYPE_BOOL, TYPE_INT, TaggedValue};

fn require_int(lineno: i64, v: TaggedValue, who: &str) -> i64 {
    if v.ty != TYPE_INT {
        panic_abort(
            PanicReason::TypeError,
            lineno,
            &format!("{who}: expected int, got {}", compy_core::type_name(v.ty)),
        );
    }
    v.payload
}

/// Identity comparison (`is`/`is-not`). Operates on the raw two-word
/// representation: identical payload and type code. The compiler only
/// forwards this call — whether `is` and `==` diverge for integers is
/// left to this function, not folded at compile time (spec Open
/// Question).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn is_identical(
    _lineno: i64,
    left: *const TaggedValue,
    right: *const TaggedValue,
) -> TaggedValue {
    let a = unsafe { *left };
    let b = unsafe { *right };
    TaggedValue::bool(a == b)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn is_eq(
    lineno: i64,
    left: *const TaggedValue,
    right: *const TaggedValue,
) -> TaggedValue {
    let a = unsafe { *left };
    let b = unsafe { *right };
    if a.ty != b.ty {
        return TaggedValue::bool(false);
    }
    match a.ty {
        TYPE_INT | TYPE_BOOL | compy_core::TYPE_NONE | compy_core::TYPE_TYPE => {
            TaggedValue::bool(a.payload == b.payload)
        }
        compy_core::TYPE_STRING => TaggedValue::bool(cstr_eq(a.payload, b.payload)),
        _ => panic_abort(PanicReason::TypeError, lineno, "==: unsupported type"),
    }
}

fn cstr_eq(a: i64, b: i64) -> bool {
    unsafe {
        let a = std::ffi::CStr::from_ptr(a as *const i8);
        let b = std::ffi::CStr::from_ptr(b as *const i8);
        a == b
    }
}

macro_rules! int_compare {
    ($name:ident, $op:tt) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(
            lineno: i64,
            left: *const TaggedValue,
            right: *const TaggedValue,
        ) -> TaggedValue {
            let a = require_int(lineno, unsafe { *left }, stringify!($name));
            let b = require_int(lineno, unsafe { *right }, stringify!($name));
            TaggedValue::bool(a $op b)
        }
    };
}

int_compare!(is_lt, <);
int_compare!(is_gt, >);
int_compare!(is_le, <=);
int_compare!(is_ge, >=);

#[unsafe(no_mangle)]
pub unsafe extern "C" fn boolean_not(lineno: i64, operand: *const TaggedValue) -> TaggedValue {
    let v = unsafe { *operand };
    if v.ty != TYPE_BOOL {
        panic_abort(
            PanicReason::TypeError,
            lineno,
            &format!("not: expected bool, got {}", compy_core::type_name(v.ty)),
        );
    }
    TaggedValue::bool(v.payload == 0)
}

/// Extracts a branch condition from a `(value, type)` pair. Panics
/// with `TYPE_ERROR` if the value isn't a bool — every `if`/`while`
/// test must type-check to `bool` by the time it reaches codegen.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn extract_bool(lineno: i64, value: i64, ty: i64) -> i64 {
    if ty != TYPE_BOOL {
        panic_abort(
            PanicReason::TypeError,
            lineno,
            &format!(
                "condition: expected bool, got {}",
                compy_core::type_name(ty)
            ),
        );
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_compares_equal_ints() {
        let a = TaggedValue::int(5);
        let b = TaggedValue::int(5);
        assert_eq!(unsafe { is_eq(1, &a, &b) }, TaggedValue::bool(true));
    }

    #[test]
    fn eq_is_false_across_mismatched_types() {
        let a = TaggedValue::int(0);
        let b = TaggedValue::bool(false);
        assert_eq!(unsafe { is_eq(1, &a, &b) }, TaggedValue::bool(false));
    }

    #[test]
    fn ordering_comparisons() {
        let a = TaggedValue::int(3);
        let b = TaggedValue::int(5);
        assert_eq!(unsafe { is_lt(1, &a, &b) }, TaggedValue::bool(true));
        assert_eq!(unsafe { is_gt(1, &a, &b) }, TaggedValue::bool(false));
        assert_eq!(unsafe { is_le(1, &a, &a) }, TaggedValue::bool(true));
        assert_eq!(unsafe { is_ge(1, &b, &a) }, TaggedValue::bool(true));
    }

    #[test]
    fn boolean_not_flips() {
        let t = TaggedValue::bool(true);
        assert_eq!(unsafe { boolean_not(1, &t) }, TaggedValue::bool(false));
    }

    #[test]
    fn extract_bool_returns_payload_for_bool_values() {
        assert_eq!(unsafe { extract_bool(1, 1, TYPE_BOOL) }, 1);
        assert_eq!(unsafe { extract_bool(1, 0, TYPE_BOOL) }, 0);
    }

    #[test]
    fn is_identical_compares_raw_words() {
        let a = TaggedValue::int(7);
        let b = TaggedValue::int(7);
        assert_eq!(unsafe { is_identical(1, &a, &b) }, TaggedValue::bool(true));
    }
}
