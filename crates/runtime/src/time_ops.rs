//! `time_int` — the zero-arity fixed-arity runtime call.

use compy_core::TaggedValue;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns whole seconds since the Unix epoch.
///
/// # Safety
/// Always safe to call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compy_time_int(_lineno: i64) -> TaggedValue {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    TaggedValue::int(secs)
}
