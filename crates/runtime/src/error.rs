//! Panic reporting.
//!
//! Compiled programs never see a Rust `Result` — a runtime failure
//! (type mismatch, division by zero, overflow, malformed input, I/O
//! failure) is reported by writing a fixed token naming the failure to
//! the file named by `COMPY_PANIC_DUMPFILE` (if set), then aborting
//! the process with a non-zero exit code.
//!
//! This is a dump-file variant of the thread-local-error-plus-FFI-safe-
//! accessor shape used elsewhere for reporting failures across an FFI
//! boundary: here there is no Rust caller left to poll a pending error,
//! the compiled program's whole job *is* the call that failed, so the
//! report goes straight to a file and the process.

use compy_core::PanicReason;
use std::io::Write;
use std::process;

const DUMPFILE_ENV: &str = "COMPY_PANIC_DUMPFILE";

/// Writes `reason` to the dump file (if `COMPY_PANIC_DUMPFILE` names
/// one), prints a human-readable message to stderr, and exits with
/// status 1. Never returns.
pub fn panic_abort(reason: PanicReason, lineno: i64, detail: &str) -> ! {
    if let Ok(path) = std::env::var(DUMPFILE_ENV) {
        if let Ok(mut f) = std::fs::File::create(&path) {
            let _ = f.write_all(reason.token().as_bytes());
        }
    }
    eprintln!("line {lineno}: {reason}: {detail}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn dump_file_receives_the_reason_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump");

        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(PanicReason::ArithOverflow.token().as_bytes())
            .unwrap();
        drop(f);

        let mut contents = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "ARITH_OVERFLOW");
    }
}
