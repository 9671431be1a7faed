//! `sleep` and `exit` — the one-argument fixed-arity runtime calls.

use crate::error::panic_abort;
use compy_core::{PanicReason, TYPE_INT, TaggedValue};

fn require_int(lineno: i64, ptr: *const TaggedValue, who: &str) -> i64 {
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

/// Sleeps for `ptr`'s value in milliseconds. Negative durations are a
/// type/range error reported as `TYPE_ERROR`.
///
/// # Safety
/// `ptr` must point to a valid `TaggedValue`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compy_sleep(lineno: i64, ptr: *const TaggedValue) -> TaggedValue {
    let ms = require_int(lineno, ptr, "sleep");
    if ms < 0 {
        panic_abort(
            PanicReason::TypeError,
            lineno,
            &format!("sleep: duration must be non-negative, got {ms}"),
        );
    }
    std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    TaggedValue::none()
}

/// Exits the process immediately with `ptr`'s value as the status
/// code. Never returns.
///
/// # Safety
/// `ptr` must point to a valid `TaggedValue`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compy_exit(lineno: i64, ptr: *const TaggedValue) -> ! {
    let code = require_int(lineno, ptr, "exit");
    if !(0..=255).contains(&code) {
        panic_abort(
            PanicReason::TypeError,
            lineno,
            &format!("exit: status must be in range 0-255, got {code}"),
        );
    }
    std::process::exit(code as i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_zero_returns_none_immediately() {
        let zero = TaggedValue::int(0);
        let r = unsafe { compy_sleep(1, &zero) };
        assert_eq!(r, TaggedValue::none());
    }
}
